//! OpenRouter brain implementation.
//!
//! This crate provides a [`Brain`] that writes persona replies through an
//! OpenAI-compatible chat-completions API. OpenRouter is the default
//! endpoint; any compatible gateway works via `OPENROUTER_API_URL`.
//!
//! # Features
//!
//! - Conversation context rendered into a single prompt
//! - Images sent inline as `data:` URLs (multimodal models)
//! - Retries on network errors, timeouts and 429/5xx answers
//! - Configurable via environment variables
//!
//! # Usage
//!
//! ```rust,no_run
//! use openrouter_brain::OpenRouterBrain;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let brain = OpenRouterBrain::from_env()?;
//!     println!("using {}", brain.config().model);
//!     Ok(())
//! }
//! ```

mod api_types;
mod brain;
mod config;
pub mod prompt;

pub use brain::OpenRouterBrain;
pub use config::{OpenRouterConfig, OpenRouterConfigBuilder, DEFAULT_API_URL, DEFAULT_MODEL};

// Re-export chat-core types for convenience
pub use chat_core::{async_trait, Brain, BrainError, CompletionRequest};
