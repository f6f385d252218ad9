//! Dynamic value kinds
//!
//! The interpreter recognizes a small closed set of value categories. Every
//! native type that crosses the binding boundary maps onto exactly one of
//! them, or onto the `Unregistered` sentinel when no mapping exists.

use std::fmt;

/// Closed set of runtime value categories, plus the `Unregistered` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    /// No mapping exists for the native type
    Unregistered,
    /// No value (return slot of procedures)
    Void,
    /// 32-bit signed integer
    Int,
    /// 32-bit float
    Float,
    /// Boolean
    Bool,
    /// String
    String,
    /// Reference to a script object, by id
    Object,
    /// Three-component float vector
    Vector3f,
}

impl Kind {
    /// Every registered kind, in conversion-preference order
    pub const REGISTERED: [Kind; 7] = [
        Kind::Void,
        Kind::Object,
        Kind::String,
        Kind::Float,
        Kind::Int,
        Kind::Bool,
        Kind::Vector3f,
    ];

    /// Script-facing name of the kind
    pub const fn name(self) -> &'static str {
        match self {
            Kind::Unregistered => "<unregistered>",
            Kind::Void => "void",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Bool => "bool",
            Kind::String => "string",
            Kind::Object => "object",
            Kind::Vector3f => "vector3f",
        }
    }

    /// Look a kind up by its script-facing name
    pub fn from_name(name: &str) -> Option<Kind> {
        Kind::REGISTERED.iter().copied().find(|k| k.name() == name)
    }

    /// False only for the `Unregistered` sentinel
    pub const fn is_registered(self) -> bool {
        !matches!(self, Kind::Unregistered)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
