//! Error types for catchup-core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A configuration value broke its contract at construction time
    #[error("Invalid config: {field} {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    /// A call argument broke its contract
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A config file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(String),
}

impl Error {
    pub(crate) fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
