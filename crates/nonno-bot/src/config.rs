//! Startup configuration, gathered from every crate's own loader.

use std::env;

use message_listener::{ListenerConfig, ListenerError};
use openrouter_brain::{BrainError, OpenRouterConfig};
use orchestrator::{BotConfig, ConfigError};
use signal_daemon::{DaemonConfig, DaemonError};
use thiserror::Error;

/// A setting that keeps the bot from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("bot settings: {0}")]
    Bot(#[from] ConfigError),

    #[error("signal daemon settings: {0}")]
    Daemon(#[from] DaemonError),

    #[error("listener settings: {0}")]
    Listener(#[from] ListenerError),

    #[error("AI settings: {0}")]
    Brain(#[from] BrainError),
}

/// Everything the binary needs, loaded once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub daemon: DaemonConfig,
    pub listener: ListenerConfig,
    pub brain: OpenRouterConfig,
    pub bot: BotConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, StartupError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, StartupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            daemon: DaemonConfig::from_lookup(&lookup)?,
            listener: ListenerConfig::from_lookup(&lookup)?,
            brain: OpenRouterConfig::from_lookup(&lookup)?,
            bot: BotConfig::from_lookup(&lookup)?,
        })
    }

    /// Group picked in the environment, unless the command line names one.
    pub fn monitor_group<'a>(&'a self, cli: Option<&'a str>) -> Option<&'a str> {
        cli.or(self.listener.monitor_group.as_deref())
    }
}
