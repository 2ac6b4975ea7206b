//! Signal-cli daemon client library.
//!
//! This crate provides a Rust client for the signal-cli daemon's HTTP
//! interface, limited to what a group persona needs:
//!
//! - Sending group messages (optionally quoting another message)
//! - Group typing indicators
//! - Retrieving downloaded attachments
//! - Listing the account's groups
//! - Receiving messages via Server-Sent Events (SSE) with reconnect backoff
//!
//! # Example
//!
//! ```no_run
//! use signal_daemon::{DaemonConfig, SignalClient};
//!
//! # async fn example() -> Result<(), signal_daemon::DaemonError> {
//! let config = DaemonConfig::with_account("http://localhost:8080", "+15551234567");
//! let client = SignalClient::connect(config).await?;
//!
//! for group in client.list_groups().await? {
//!     println!("{} ({})", group.name, group.id);
//! }
//!
//! use futures::StreamExt;
//! let mut messages = signal_daemon::subscribe(&client)?;
//! while let Some(result) = messages.next().await {
//!     if let Ok(envelope) = result {
//!         println!("From {}: {:?}", envelope.source, envelope.text());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod sse;
pub mod types;

pub use client::SignalClient;
pub use config::DaemonConfig;
pub use error::DaemonError;
pub use sse::{subscribe, subscribe_with_reconnect, MessageStream, ReconnectConfig};
pub use types::*;

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
