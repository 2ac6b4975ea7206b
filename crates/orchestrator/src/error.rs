//! Error types for orchestrator configuration.

use thiserror::Error;

/// Errors raised while loading or validating [`BotConfig`](crate::BotConfig).
///
/// All of them are fatal at startup.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A setting could not be parsed or is out of range.
    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },

    /// Settings are individually valid but inconsistent.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.to_string(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}
