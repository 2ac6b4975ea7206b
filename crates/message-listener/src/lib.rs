//! Signal adapter for the nonno persona bot.
//!
//! This crate connects the signal-cli daemon to the response core:
//!
//! - [`EnvelopeExt`] turns daemon envelopes into [`ChatEvent`]s, detecting
//!   quotes and mentions of the persona
//! - [`SignalTransport`] implements [`ChatTransport`] on top of
//!   [`SignalClient`]
//! - [`ActivityTracker`] remembers when each group was last active
//! - [`GroupListener`] runs the listening loop with graceful shutdown
//!
//! # Example
//!
//! ```rust,ignore
//! use message_listener::{ActivityTracker, GroupListener, ListenerConfig, SignalTransport};
//! use signal_daemon::{DaemonConfig, SignalClient};
//!
//! # async fn example(
//! #     brain: impl chat_core::Brain,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let listener_config = ListenerConfig::from_env()?;
//! let client = SignalClient::connect(DaemonConfig::from_env()?).await?;
//! let activity = ActivityTracker::new();
//!
//! let transport = SignalTransport::new(client.clone(), activity.clone());
//! let orchestrator =
//!     orchestrator::Orchestrator::new(orchestrator::BotConfig::from_env()?, brain, transport)?;
//!
//! let listener = GroupListener::new(client, listener_config, "Z3JvdXA=", activity);
//! listener
//!     .run_with_shutdown(&orchestrator, async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod activity;
mod config;
mod convert;
mod error;
mod listener;
mod transport;

pub use activity::ActivityTracker;
pub use config::ListenerConfig;
pub use convert::EnvelopeExt;
pub use error::ListenerError;
pub use listener::GroupListener;
pub use transport::SignalTransport;

// Re-export the types callers need alongside the listener.
pub use chat_core::{ChatEvent, ChatTransport};
pub use signal_daemon::{Envelope, ReconnectConfig, SignalClient};

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
