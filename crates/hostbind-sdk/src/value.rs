//! SlotValue: tagged value representation for parameter slots
//!
//! Every slot of a function context holds one `SlotValue`. The variant is
//! the value's [`Kind`]; accessors are kind-checked and return `None` on a
//! mismatch instead of reinterpreting bits.
//!
//! # Layout
//!
//! ```text
//! Void                       empty return slot
//! Int(i32)                   script `int`
//! Float(f32)                 script `float`
//! Bool(bool)                 script `bool`
//! String(Arc<str>)           script `string` (shared, immutable)
//! Object(ObjectId)           script object reference, by id
//! Vector3f(Vector3f)         script `vector3f`
//! ```

use std::fmt;
use std::sync::Arc;

use crate::kind::Kind;

// ============================================================================
// Object handles
// ============================================================================

/// Script-side object identifier.
///
/// Objects are referred to by id on the script side; id 0 never names a
/// live object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// The null object id
    pub const NONE: ObjectId = ObjectId(0);

    /// Check if this is the null id
    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque native address of a host object.
///
/// Only used as a lookup key into the object registry; never dereferenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ObjectAddr(usize);

impl ObjectAddr {
    /// Address of a host object
    #[inline]
    pub fn of<T: ?Sized>(object: &T) -> Self {
        Self(object as *const T as *const () as usize)
    }

    /// Create from a raw address
    #[inline(always)]
    pub const fn from_raw(addr: usize) -> Self {
        Self(addr)
    }

    /// Get the raw address
    #[inline(always)]
    pub const fn to_raw(self) -> usize {
        self.0
    }
}

// ============================================================================
// Vector3f
// ============================================================================

/// Three-component float vector, the script `vector3f` type.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3f {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
}

impl Vector3f {
    /// The zero vector
    pub const ZERO: Vector3f = Vector3f::new(0.0, 0.0, 0.0);

    /// Create a vector from its components
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Vector3f {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} {:.4} {:.4}", self.x, self.y, self.z)
    }
}

// ============================================================================
// SlotValue
// ============================================================================

/// Value held by a parameter slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SlotValue {
    /// No value
    #[default]
    Void,
    /// 32-bit integer
    Int(i32),
    /// 32-bit float
    Float(f32),
    /// Boolean
    Bool(bool),
    /// Immutable shared string
    String(Arc<str>),
    /// Object reference
    Object(ObjectId),
    /// Float vector
    Vector3f(Vector3f),
}

impl SlotValue {
    /// Create a string value
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        SlotValue::String(s.into())
    }

    /// Kind of the held value
    pub const fn kind(&self) -> Kind {
        match self {
            SlotValue::Void => Kind::Void,
            SlotValue::Int(_) => Kind::Int,
            SlotValue::Float(_) => Kind::Float,
            SlotValue::Bool(_) => Kind::Bool,
            SlotValue::String(_) => Kind::String,
            SlotValue::Object(_) => Kind::Object,
            SlotValue::Vector3f(_) => Kind::Vector3f,
        }
    }

    /// Check if the slot is empty
    #[inline]
    pub const fn is_void(&self) -> bool {
        matches!(self, SlotValue::Void)
    }

    /// Extract an int
    #[inline]
    pub const fn as_int(&self) -> Option<i32> {
        match self {
            SlotValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Extract a float
    #[inline]
    pub const fn as_float(&self) -> Option<f32> {
        match self {
            SlotValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Extract a bool
    #[inline]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            SlotValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow the string contents
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SlotValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extract an object id
    #[inline]
    pub const fn as_object(&self) -> Option<ObjectId> {
        match self {
            SlotValue::Object(id) => Some(*id),
            _ => None,
        }
    }

    /// Extract a vector
    #[inline]
    pub const fn as_vector3f(&self) -> Option<Vector3f> {
        match self {
            SlotValue::Vector3f(v) => Some(*v),
            _ => None,
        }
    }
}

/// Renders the value the way the interpreter prints it: `%d` ints,
/// four-decimal floats, `true`/`false`, object ids as integers.
impl fmt::Display for SlotValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotValue::Void => Ok(()),
            SlotValue::Int(i) => write!(f, "{}", i),
            SlotValue::Float(v) => write!(f, "{:.4}", v),
            SlotValue::Bool(b) => f.write_str(if *b { "true" } else { "false" }),
            SlotValue::String(s) => f.write_str(s),
            SlotValue::Object(id) => write!(f, "{}", id),
            SlotValue::Vector3f(v) => write!(f, "{}", v),
        }
    }
}
