//! Response core for the nonno persona bot.
//!
//! This crate decides whether the persona answers a group message, how long a
//! human would take to do it, and drives the reply through the [`Brain`] and
//! [`ChatTransport`] collaborators.
//!
//! # Features
//!
//! - Trigger classification with unconditional triggers (reply, mention, image)
//!   and a weighted Italian keyword heuristic
//! - Sliding-window rate limiting for autonomous replies
//! - Humanized thinking and typing pauses
//! - Bounded per-group context window
//! - Composing indicator kept alive while the persona "types"
//!
//! # Architecture
//!
//! ```text
//! ChatEvent (from message-listener)
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ORCHESTRATOR                           │
//! │                                                             │
//! │  1. Drop bots and empty messages, record in context         │
//! │         ↓                                                   │
//! │  2. Classify (ResponsePolicy) and draw                      │
//! │         ↓                                                   │
//! │  3. Rate limit (unless reply / mention / image)             │
//! │         ↓                                                   │
//! │  4. Composing indicator, thinking pause                     │
//! │         ↓                                                   │
//! │  5. AI completion with context (and image)                  │
//! │         ↓                                                   │
//! │  6. Typing pause, indicator refreshed                       │
//! │         ↓                                                   │
//! │  7. Send as a quote, record own reply                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use orchestrator::{BotConfig, Orchestrator, Outcome};
//!
//! let config = BotConfig::from_env()?;
//! let orchestrator = Orchestrator::new(config, brain, transport)?;
//!
//! while let Some(event) = events.recv().await {
//!     match orchestrator.handle_event(&event).await {
//!         Outcome::Responded { text } => println!("replied: {}", text),
//!         other => println!("no reply: {:?}", other),
//!     }
//! }
//! ```

pub mod config;
mod context;
mod error;
mod orchestrator;
pub mod policy;
mod rate_limit;
pub mod text;
mod timing;

pub use chat_core::{Brain, ChatEvent, ChatTransport};
pub use config::{
    BotConfig, LogLevel, LoggingConfig, PersonaConfig, ResponseConfig, SafetyConfig, TimingConfig,
};
pub use context::{ContextStore, ContextWindow};
pub use error::ConfigError;
pub use orchestrator::{Orchestrator, Outcome, SuppressReason};
pub use policy::{HeuristicWeights, ResponsePolicy, Trigger};
pub use rate_limit::RateLimiter;
pub use timing::{Delays, TimingModel};
