//! Core traits and types for the nonno persona bot.
//!
//! This crate defines the narrow interfaces the response core depends on:
//!
//! - [`Brain`] - AI completion backend (one call per reply, no streaming)
//! - [`ChatTransport`] - chat backend used to send replies and indicators
//! - [`ChatEvent`] / [`ContextEntry`] - inbound messages and the rolling context
//! - [`BrainError`] / [`TransportError`] - collaborator failures
//!
//! # Example
//!
//! ```rust
//! use chat_core::{async_trait, Brain, BrainError, CompletionRequest};
//!
//! struct Parrot;
//!
//! #[async_trait]
//! impl Brain for Parrot {
//!     async fn complete(&self, request: CompletionRequest) -> Result<String, BrainError> {
//!         request
//!             .latest()
//!             .map(|entry| entry.text.clone())
//!             .ok_or_else(|| BrainError::ProcessingFailed("empty context".to_string()))
//!     }
//!
//!     fn name(&self) -> &str {
//!         "Parrot"
//!     }
//! }
//! ```

mod error;
mod message;
mod trait_def;
mod transport;

pub use error::{BrainError, TransportError};
pub use message::{
    ChatEvent, CompletionRequest, ContextEntry, GroupDescriptor, ImagePayload, ImageRef,
    MessageRef, ReplyRef,
};
pub use trait_def::Brain;
pub use transport::ChatTransport;

// Re-export async_trait for convenience
pub use async_trait::async_trait;
