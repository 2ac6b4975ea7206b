//! Mock collaborators for testing the nonno persona bot.
//!
//! This crate provides test doubles for the two traits the core depends on:
//! - `EchoBrain` - Replies with the message being answered
//! - `ScriptedBrain` - Replays canned replies and failures in order
//! - `FailingBrain` - Fails every completion with a chosen error
//! - `DelayedBrain` - Wraps another brain with artificial delay
//! - `RecordingTransport` - Records sends, indicators and downloads
//!
//! All of them record what they were asked, and clones share that record, so
//! a test can hand one clone to the code under test and inspect the other.
//!
//! # Example
//!
//! ```rust
//! use mock_brain::{Brain, CompletionRequest, EchoBrain};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_brain::BrainError> {
//!     let brain = EchoBrain::new();
//!     let request = CompletionRequest {
//!         persona: "nonno".to_string(),
//!         group_name: "Famiglia".to_string(),
//!         context: Vec::new(),
//!         image: None,
//!     };
//!
//!     let reply = brain.complete(request).await?;
//!     assert!(reply.is_empty());
//!     assert_eq!(brain.call_count(), 1);
//!     Ok(())
//! }
//! ```

mod delayed;
mod echo;
mod failing;
mod scripted;
mod transport;

// Re-export chat-core types for convenience
pub use chat_core::{async_trait, Brain, BrainError, ChatTransport, CompletionRequest};

pub use delayed::DelayedBrain;
pub use echo::EchoBrain;
pub use failing::{FailingBrain, FailureKind};
pub use scripted::{Scripted, ScriptedBrain};
pub use transport::{IndicatorEvent, RecordingTransport, SentMessage};
