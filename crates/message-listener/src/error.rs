//! Error types for the Signal adapter.

use signal_daemon::DaemonError;
use thiserror::Error;

/// Errors that can occur while listening to a Signal group.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Daemon communication error.
    #[error("daemon error: {0}")]
    Daemon(#[from] DaemonError),

    /// Invalid or missing listener settings.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The message stream ended unexpectedly.
    #[error("message stream ended")]
    StreamEnded,
}
