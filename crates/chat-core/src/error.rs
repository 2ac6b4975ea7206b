//! Error types for the two external collaborators.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while requesting a completion from the AI backend.
#[derive(Debug, Error)]
pub enum BrainError {
    /// The backend is temporarily unavailable.
    #[error("brain unavailable: {0}")]
    Unavailable(String),

    /// The request could not be delivered.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with an error.
    #[error("processing failed: {0}")]
    ProcessingFailed(String),

    /// The backend answered, but without usable text.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The completion did not arrive in time.
    #[error("completion timed out after {0:?}")]
    Timeout(Duration),

    /// Missing or invalid backend configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Errors reported by the chat transport.
///
/// None of these are fatal: the orchestrator logs them and skips the
/// affected sub-step.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The final message could not be delivered.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// The composing indicator could not be set.
    #[error("composing indicator failed: {0}")]
    Indicator(String),

    /// An attached image could not be downloaded.
    #[error("image download failed: {0}")]
    Download(String),

    /// Groups could not be listed.
    #[error("group listing failed: {0}")]
    Listing(String),

    /// The backend connection is gone.
    #[error("connection failed: {0}")]
    Connection(String),
}
