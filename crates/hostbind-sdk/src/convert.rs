//! Typed conversion between native values and parameter slots.
//!
//! `FromSlot` reads a native parameter out of a slot, `IntoSlot` boxes a
//! native return value into one. Both are strict: no cross-kind coercion
//! happens here (that is the job of the engine's conversion matrix).
//!
//! `HostArg` describes how an argument enters a host-to-script call. Strings
//! are passed by reference and dereferenced at conversion time; every other
//! kind is passed by value.
//!
//! # Example
//!
//! ```ignore
//! use hostbind_sdk::{FromSlot, IntoSlot, SlotValue};
//!
//! let slot = "foo".to_string().into_slot();
//! assert_eq!(String::from_slot(&slot)?, "foo");
//! ```

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::BindError;
use crate::kind::Kind;
use crate::value::{ObjectId, SlotValue, Vector3f};

// ============================================================================
// Native type descriptor
// ============================================================================

/// Opaque descriptor of a native type, compared by `TypeId`.
#[derive(Debug, Clone, Copy)]
pub struct NativeType {
    id: TypeId,
    name: &'static str,
}

impl NativeType {
    /// Descriptor of `T`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Underlying type id
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Full native type name, for diagnostics
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for NativeType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for NativeType {}

impl Hash for NativeType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// ============================================================================
// Slot conversion traits
// ============================================================================

/// Read a native value out of a slot.
pub trait FromSlot: Sized {
    /// Extract `Self`, failing if the slot holds another kind
    fn from_slot(value: &SlotValue) -> Result<Self, BindError>;
}

/// Box a native value into a slot.
pub trait IntoSlot {
    /// Convert into a slot value
    fn into_slot(self) -> SlotValue;
}

fn mismatch(expected: Kind, value: &SlotValue) -> BindError {
    BindError::TypeMismatch {
        expected,
        found: value.kind(),
    }
}

macro_rules! impl_slot_conv {
    ($ty:ty, $kind:ident, $accessor:ident) => {
        impl FromSlot for $ty {
            fn from_slot(value: &SlotValue) -> Result<Self, BindError> {
                value.$accessor().ok_or_else(|| mismatch(Kind::$kind, value))
            }
        }

        impl IntoSlot for $ty {
            fn into_slot(self) -> SlotValue {
                SlotValue::$kind(self)
            }
        }
    };
}

impl_slot_conv!(i32, Int, as_int);
impl_slot_conv!(f32, Float, as_float);
impl_slot_conv!(bool, Bool, as_bool);
impl_slot_conv!(ObjectId, Object, as_object);
impl_slot_conv!(Vector3f, Vector3f, as_vector3f);

impl FromSlot for String {
    fn from_slot(value: &SlotValue) -> Result<Self, BindError> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| mismatch(Kind::String, value))
    }
}

impl IntoSlot for String {
    fn into_slot(self) -> SlotValue {
        SlotValue::string(self)
    }
}

impl IntoSlot for &'static str {
    fn into_slot(self) -> SlotValue {
        SlotValue::string(self)
    }
}

/// Procedures return nothing; any slot content is accepted and discarded.
impl FromSlot for () {
    fn from_slot(_value: &SlotValue) -> Result<Self, BindError> {
        Ok(())
    }
}

impl IntoSlot for () {
    fn into_slot(self) -> SlotValue {
        SlotValue::Void
    }
}

impl FromSlot for SlotValue {
    fn from_slot(value: &SlotValue) -> Result<Self, BindError> {
        Ok(value.clone())
    }
}

impl IntoSlot for SlotValue {
    fn into_slot(self) -> SlotValue {
        self
    }
}

// ============================================================================
// Host call arguments
// ============================================================================

/// How a host argument reaches the conversion step.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgSource<'a> {
    /// Passed by value
    Value(SlotValue),
    /// String passed by reference, dereferenced during conversion
    Str(&'a str),
}

impl ArgSource<'_> {
    /// Materialize the argument as a slot value
    pub fn into_value(self) -> SlotValue {
        match self {
            ArgSource::Value(v) => v,
            ArgSource::Str(s) => SlotValue::string(s),
        }
    }
}

/// A natively typed argument to a host-to-script call.
pub trait HostArg {
    /// Source of the argument value
    fn source(&self) -> ArgSource<'_>;
}

macro_rules! impl_host_arg_by_value {
    ($($ty:ty),*) => {
        $(
            impl HostArg for $ty {
                fn source(&self) -> ArgSource<'_> {
                    ArgSource::Value(self.clone().into_slot())
                }
            }
        )*
    };
}

impl_host_arg_by_value!(i32, f32, bool, ObjectId, Vector3f, SlotValue);

impl HostArg for str {
    fn source(&self) -> ArgSource<'_> {
        ArgSource::Str(self)
    }
}

impl HostArg for String {
    fn source(&self) -> ArgSource<'_> {
        ArgSource::Str(self.as_str())
    }
}

impl<T: HostArg + ?Sized> HostArg for &T {
    fn source(&self) -> ArgSource<'_> {
        (**self).source()
    }
}
