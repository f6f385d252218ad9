//! Error types for the binding layer

use crate::kind::Kind;

/// Result type for binding operations
pub type BindResult<T> = Result<T, BindError>;

/// Binding-layer error types
///
/// Registration-time errors keep the offending entry out of the registry.
/// Call-time errors leave the registry untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BindError {
    /// A native type in a signature has no kind mapping (position 0 is the return slot)
    #[error("Unrecognized type '{type_name}' at position {position}")]
    UnrecognizedType {
        /// Native type name
        type_name: String,
        /// Slot position
        position: usize,
    },

    /// An entry already exists under the same (scope, name) key
    #[error("Registration conflict: '{scope}::{name}' is already registered")]
    RegistrationConflict {
        /// Owner scope (empty for free functions)
        scope: String,
        /// Function name
        name: String,
    },

    /// Signature has more parameters than the slot table allows
    #[error("Function '{name}' has {arity} parameters, max is {max}")]
    TooManyParameters {
        /// Function name
        name: String,
        /// Declared arity
        arity: usize,
        /// Configured maximum
        max: usize,
    },

    /// Function, method or object could not be resolved
    #[error("Target not found: {0}")]
    TargetNotFound(String),

    /// Supplied argument count does not match the declared arity
    #[error("Arity mismatch calling '{function}': expected {expected}, got {supplied}")]
    ArityMismatch {
        /// Function name
        function: String,
        /// Declared arity
        expected: usize,
        /// Supplied argument count
        supplied: usize,
    },

    /// Requested return type has no kind mapping
    #[error("Unsupported return type: {0}")]
    UnsupportedReturnType(String),

    /// An argument could not be converted to its slot kind (1-based index)
    #[error("Argument {index} of '{function}' could not be converted")]
    ArgumentConversionFailed {
        /// Function name
        function: String,
        /// Slot index of the argument
        index: usize,
    },

    /// The result in slot 0 could not be converted to the requested type
    #[error("Return value of '{function}' could not be converted from {from} to {to}")]
    ReturnConversionFailed {
        /// Function name
        function: String,
        /// Kind found in slot 0
        from: Kind,
        /// Kind requested by the caller
        to: Kind,
    },

    /// The execute collaborator reported failure
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// The shared function context is held by another call
    #[error("Function context of '{0}' is busy")]
    ContextBusy(String),

    /// A slot holds a value of a different kind than the native parameter expects
    #[error("Slot {slot} holds {found}, expected {expected}")]
    SlotKindMismatch {
        /// Slot index
        slot: usize,
        /// Kind the adapter expects
        expected: Kind,
        /// Kind found in the slot
        found: Kind,
    },

    /// Typed extraction from a slot value failed
    #[error("Type mismatch: expected {expected}, got {found}")]
    TypeMismatch {
        /// Kind requested
        expected: Kind,
        /// Kind found
        found: Kind,
    },

    /// Method dispatched without a receiver object
    #[error("Method '{0}' called without an object")]
    MissingReceiver(String),

    /// Receiver object is not of the method's owning type
    #[error("Method '{function}' called on an object that is not a {expected}")]
    ReceiverMismatch {
        /// Function name
        function: String,
        /// Owning type name
        expected: String,
    },

    /// Default-argument record does not fit the function's signature
    #[error("Default arguments for '{function}' rejected: {reason}")]
    DefaultArgsMismatch {
        /// Function name
        function: String,
        /// What did not match
        reason: String,
    },

    /// A default-argument record was already attached
    #[error("Default arguments for '{0}' are already attached")]
    DefaultsAlreadyAttached(String),

    /// The process-wide registry was installed twice
    #[error("A global registry is already installed")]
    AlreadyInstalled,
}

impl BindError {
    /// Whether the error happened while building the registry
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            BindError::UnrecognizedType { .. }
                | BindError::RegistrationConflict { .. }
                | BindError::TooManyParameters { .. }
                | BindError::DefaultArgsMismatch { .. }
                | BindError::DefaultsAlreadyAttached(_)
        )
    }
}
