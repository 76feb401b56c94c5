//! Configuration error types.

use std::fmt;

/// Error type for configuration loading and assembly.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse environment variable.
    Parse {
        key: String,
        value: String,
        error: String,
    },
    /// Invalid value for a setting.
    Invalid { key: String, message: String },
    /// Document root could not be made absolute or its symlinks resolved.
    DocumentRoot { path: String, error: std::io::Error },
    /// Two workers were registered under the same name.
    DuplicateWorker { name: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse { key, value, error } => {
                write!(f, "failed to parse {}='{}': {}", key, value, error)
            }
            ConfigError::Invalid { key, message } => {
                write!(f, "invalid value for {}: {}", key, message)
            }
            ConfigError::DocumentRoot { path, error } => {
                write!(f, "cannot resolve document root '{}': {}", path, error)
            }
            ConfigError::DuplicateWorker { name } => {
                write!(f, "duplicate worker name: {}", name)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::DocumentRoot { error, .. } => Some(error),
            _ => None,
        }
    }
}
