//! Configuration types for signal-daemon.

use std::env;

use crate::error::DaemonError;

/// Default daemon address used when `SIGNAL_DAEMON_URL` is not set.
pub const DEFAULT_DAEMON_URL: &str = "http://localhost:8080";

/// Configuration for connecting to the signal-cli daemon.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Base URL of the daemon HTTP server (e.g., "http://localhost:8080").
    pub base_url: String,
    /// Account phone number for multi-account mode.
    /// If None, assumes single-account mode.
    pub account: Option<String>,
}

impl DaemonConfig {
    /// Create a new configuration with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            account: None,
        }
    }

    /// Create configuration with a specific account for multi-account mode.
    pub fn with_account(base_url: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            account: Some(account.into()),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// - `SIGNAL_DAEMON_URL` - daemon address (default: http://localhost:8080);
    ///   a bare `host:port` is accepted
    /// - `SIGNAL_ACCOUNT` - account number for multi-account daemons (optional)
    pub fn from_env() -> Result<Self, DaemonError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`DaemonConfig::from_env`] with an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DaemonError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("SIGNAL_DAEMON_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_DAEMON_URL.to_string());

        if base_url.contains(char::is_whitespace) {
            return Err(DaemonError::Config(format!(
                "SIGNAL_DAEMON_URL is not a valid address: {:?}",
                base_url
            )));
        }

        let account = lookup("SIGNAL_ACCOUNT")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Ok(Self {
            base_url: normalize_base_url(base_url),
            account,
        })
    }

    /// Get the RPC endpoint URL.
    pub fn rpc_url(&self) -> String {
        format!("{}/api/v1/rpc", self.base_url)
    }

    /// Get the events endpoint URL (with account query param if set).
    pub fn events_url(&self) -> String {
        match &self.account {
            Some(account) => {
                let encoded = urlencoding::encode(account);
                format!("{}/api/v1/events?account={}", self.base_url, encoded)
            }
            None => format!("{}/api/v1/events", self.base_url),
        }
    }

    /// Get the health check endpoint URL.
    pub fn check_url(&self) -> String {
        format!("{}/api/v1/check", self.base_url)
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DAEMON_URL)
    }
}

fn normalize_base_url(url: String) -> String {
    let url = url.trim_end_matches('/');
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}
