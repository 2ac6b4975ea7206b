//! The Brain trait definition.

use async_trait::async_trait;

use crate::error::BrainError;
use crate::message::CompletionRequest;

/// An AI backend that writes the persona's replies.
///
/// Implementations can range from scripted test doubles to hosted models.
/// This trait is object-safe and can be used with `Box<dyn Brain>`.
#[async_trait]
pub trait Brain: Send + Sync {
    /// Produce the reply text for the last entry of `request.context`.
    ///
    /// A single call; implementations must not stream partial output.
    async fn complete(&self, request: CompletionRequest) -> Result<String, BrainError>;

    /// Get a human-readable name for this brain implementation.
    fn name(&self) -> &str;

    /// Check if the brain is ready to process requests.
    ///
    /// Default implementation always returns true.
    async fn is_ready(&self) -> bool {
        true
    }

    /// Gracefully shut down the brain.
    ///
    /// Default implementation does nothing.
    async fn shutdown(&self) -> Result<(), BrainError> {
        Ok(())
    }
}
