//! Listener settings.

use std::env;

use crate::error::ListenerError;

/// Who the persona is on Signal and which group it watches.
#[derive(Debug, Clone, Default)]
pub struct ListenerConfig {
    /// Persona phone number.
    pub account: String,
    /// Persona account UUID (ACI), used to recognise quotes and mentions.
    pub account_uuid: Option<String>,
    /// Numbers or UUIDs of automated accounts.
    pub known_bots: Vec<String>,
    /// Group to monitor; when unset the binary asks interactively.
    pub monitor_group: Option<String>,
}

impl ListenerConfig {
    /// Create a config for the given persona account.
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            ..Default::default()
        }
    }

    /// Load from environment variables.
    ///
    /// - `SIGNAL_ACCOUNT` (required)
    /// - `SIGNAL_ACCOUNT_UUID`
    /// - `KNOWN_BOT_ACCOUNTS` - comma-separated numbers or UUIDs
    /// - `MONITOR_GROUP` - group id
    pub fn from_env() -> Result<Self, ListenerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ListenerConfig::from_env`] with an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ListenerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let account = get("SIGNAL_ACCOUNT")
            .ok_or_else(|| ListenerError::Config("SIGNAL_ACCOUNT is required".to_string()))?;

        let known_bots = get("KNOWN_BOT_ACCOUNTS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            account,
            account_uuid: get("SIGNAL_ACCOUNT_UUID"),
            known_bots,
            monitor_group: get("MONITOR_GROUP"),
        })
    }

    /// Set the account UUID.
    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.account_uuid = Some(uuid.into());
        self
    }

    /// Mark an address as a bot.
    pub fn with_known_bot(mut self, address: impl Into<String>) -> Self {
        self.known_bots.push(address.into());
        self
    }

    /// Monitor the given group.
    pub fn with_monitor_group(mut self, group_id: impl Into<String>) -> Self {
        self.monitor_group = Some(group_id.into());
        self
    }

    pub(crate) fn uuid(&self) -> Option<&str> {
        self.account_uuid.as_deref()
    }

    /// Whether any of `addresses` belongs to a known bot.
    pub fn is_known_bot<'a>(&self, addresses: impl IntoIterator<Item = &'a str>) -> bool {
        addresses
            .into_iter()
            .any(|addr| self.known_bots.iter().any(|bot| bot == addr))
    }
}
