//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or checking `cellctl.toml`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file not found: {} (run `cellctl config init` to create one)", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value for '{field}': {message}")]
    Validation { field: String, message: String },
}

impl ConfigError {
    /// Validation failure for a dotted config key such as `backend.base_url`.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// The offending key, for validation errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}
