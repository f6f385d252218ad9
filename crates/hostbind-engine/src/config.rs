//! Binding-layer configuration
//!
//! Loaded from the `[bindings]` table of a TOML file:
//!
//! ```toml
//! [bindings]
//! duplicate_policy = "reject"   # or "last-wins"
//! max_parameters = 15
//! validate_defaults = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::defaults::{DEFAULT_VALIDATE_DEFAULTS, MAX_PARAMETERS};

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error while reading the config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parsed but are out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// What happens when two bindings share a (scope, name) key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// The second registration fails with a conflict
    #[default]
    Reject,
    /// The second registration replaces the first, with a warning
    LastWins,
}

/// Registry configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindConfig {
    /// Duplicate-key policy
    pub duplicate_policy: DuplicatePolicy,

    /// Largest accepted arity
    pub max_parameters: usize,

    /// Type-check default-argument records on attach
    pub validate_defaults: bool,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Reject,
            max_parameters: MAX_PARAMETERS,
            validate_defaults: DEFAULT_VALIDATE_DEFAULTS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    bindings: BindConfig,
}

impl BindConfig {
    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse from a TOML string; a missing `[bindings]` table yields defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        file.bindings.validate()?;
        Ok(file.bindings)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_parameters == 0 || self.max_parameters > MAX_PARAMETERS {
            return Err(ConfigError::Invalid(format!(
                "max_parameters must be between 1 and {}, got {}",
                MAX_PARAMETERS, self.max_parameters
            )));
        }
        Ok(())
    }

    /// Builder-style setter for the duplicate policy
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }
}
