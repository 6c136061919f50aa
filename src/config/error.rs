//! Configuration error types.

use thiserror::Error;

/// Errors while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment parsing failed.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A configuration file could not be read.
    #[error("failed to read {path}: {reason}")]
    File { path: String, reason: String },

    /// A configuration file could not be parsed.
    #[error("failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },
}

impl ConfigError {
    /// Creates a file read error.
    pub fn file(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::File {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a file parse error.
    pub fn parse(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Errors from semantic validation of loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required value is missing.
    #[error("missing required configuration: {0}")]
    MissingRequired(&'static str),

    /// The notification sender address is malformed.
    #[error("invalid from_email: must contain '@'")]
    InvalidFromEmail,

    /// The generation timeout is zero.
    #[error("generation timeout must be greater than zero")]
    ZeroTimeout,

    /// The history window is zero.
    #[error("widget history_window must be greater than zero")]
    ZeroHistoryWindow,
}
