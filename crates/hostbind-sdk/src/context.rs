//! Collaborator interfaces consumed by the binding layer.
//!
//! The object model and diagnostic reporting live outside this crate; the
//! engine only talks to them through these traits.

use std::fmt;

use crate::value::{ObjectAddr, ObjectId};

// ============================================================================
// Diagnostics
// ============================================================================

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// Informational
    Info,
    /// Recoverable, but likely a mistake
    Warning,
    /// An operation failed
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// One reported message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
}

impl Diagnostic {
    /// Error diagnostic
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    /// Warning diagnostic
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Sink for binding-layer diagnostics.
///
/// Every failure path reports exactly once before returning its error.
pub trait DiagnosticSink: Send + Sync {
    /// Report a diagnostic
    fn report(&self, diagnostic: Diagnostic);
}

// ============================================================================
// Object registry
// ============================================================================

/// Registry view of one object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    /// Object id
    pub id: ObjectId,
    /// Namespace hashes searched for methods, most derived first
    pub namespaces: Vec<u32>,
}

impl ObjectEntry {
    /// Whether the object's namespace chain includes `namespace`
    pub fn has_namespace(&self, namespace: u32) -> bool {
        self.namespaces.contains(&namespace)
    }
}

/// Lookup of script objects by native address or id.
pub trait ObjectRegistry: Send + Sync {
    /// Resolve a native object address to its script id
    fn find_object_by_address(&self, addr: ObjectAddr) -> Option<ObjectId>;

    /// Look up an object's entry
    fn find_object_entry(&self, id: ObjectId) -> Option<ObjectEntry>;

    /// Whether an object with this id exists
    fn contains(&self, id: ObjectId) -> bool {
        !id.is_none() && self.find_object_entry(id).is_some()
    }
}
