//! Default constants for the binding layer.
//!
//! Centralizes the slot-naming convention and configuration defaults shared
//! by the slot model, the registry and the config loader.

/// Maximum number of parameters a binding may declare (slot table holds one more).
pub const MAX_PARAMETERS: usize = 15;

/// Name of slot 0, which receives the return value.
pub const RETURN_SLOT_NAME: &str = "__return";

/// Prefix of parameter slot names; slot `i` is named `_p{i}`.
pub const PARAM_SLOT_PREFIX: &str = "_p";

/// Whether default-argument records are type-checked on attach unless configured otherwise.
pub const DEFAULT_VALIDATE_DEFAULTS: bool = true;

/// `tracing` target used by the diagnostic sink and engine logging.
pub const LOG_TARGET: &str = "hostbind";
