//! Signal group bot that answers as a 70-year-old Italian grandfather.
//!
//! Connects to a running signal-cli daemon, picks a group (from `--group`,
//! `MONITOR_GROUP` or an interactive prompt) and replies through OpenRouter.
//!
//! ```bash
//! SIGNAL_ACCOUNT=+39... OPENROUTER_API_KEY=sk-... TRIGGER_WORDS=nonno,nonnino \
//!     cargo run -p nonno-bot
//! ```

mod config;
mod logging;
mod select;

use std::time::Duration;

use chat_core::{Brain, ChatTransport};
use chrono::Utc;
use clap::Parser;
use message_listener::{ActivityTracker, GroupListener, SignalTransport};
use openrouter_brain::OpenRouterBrain;
use orchestrator::Orchestrator;
use signal_daemon::SignalClient;
use tracing::{info, warn};

use crate::config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "nonno-bot")]
#[command(about = "Answer in a Signal group as a tech-confused Italian grandfather")]
struct Args {
    /// Group id to monitor. Falls back to MONITOR_GROUP, then to a prompt.
    #[arg(long)]
    group: Option<String>,

    /// Print the recently active groups and exit
    #[arg(long)]
    list_groups: bool,

    /// How far back group activity counts, in hours
    #[arg(long, default_value_t = 48)]
    activity_hours: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let config = AppConfig::from_env()?;
    let _log_guard = logging::init(&config.bot.logging);

    info!("Connecting to Signal daemon at {}", config.daemon.base_url);
    let client = SignalClient::connect(config.daemon.clone()).await?;
    match client.version().await {
        Ok(version) => info!("Connected to signal-cli {}", version),
        Err(e) => warn!("Connected, but could not read signal-cli version: {}", e),
    }

    let activity = ActivityTracker::new();
    let transport = SignalTransport::new(client.clone(), activity.clone());
    let window = Duration::from_secs(args.activity_hours.saturating_mul(3600));

    if args.list_groups {
        let groups = transport.list_groups_by_recent_activity(window).await?;
        print!("{}", select::render_groups(&groups, args.activity_hours, Utc::now()));
        return Ok(());
    }

    let group_id = match config.monitor_group(args.group.as_deref()) {
        Some(id) => id.to_string(),
        None => {
            let groups = transport.list_groups_by_recent_activity(window).await?;
            if groups.is_empty() {
                println!("No groups found. Make sure you're a member of at least one group.");
                return Ok(());
            }
            print!("{}", select::render_groups(&groups, args.activity_hours, Utc::now()));

            match select::prompt_for_group(&groups).await? {
                Some(group) => {
                    println!("\nSelected: {}", group.name);
                    group.id
                }
                None => {
                    println!("No group selected. Exiting.");
                    return Ok(());
                }
            }
        }
    };

    let brain = OpenRouterBrain::new(config.brain.clone())?;
    let orchestrator = Orchestrator::new(config.bot.clone(), brain, transport)?;
    let listener = GroupListener::new(client, config.listener.clone(), group_id, activity);

    if !orchestrator.brain().is_ready().await {
        warn!("AI backend {} is not ready yet", orchestrator.brain().name());
    }
    log_startup_summary(&config, listener.group_id());
    println!("\nPress Ctrl+C to stop the bot.\n");

    let result = listener
        .run_with_shutdown(&orchestrator, shutdown_signal())
        .await;

    if let Err(e) = orchestrator.brain().shutdown().await {
        warn!("Failed to shut down AI backend: {}", e);
    }
    result?;

    info!("Bot stopped");
    Ok(())
}

fn log_startup_summary(config: &AppConfig, group_id: &str) {
    let personality: String = config.bot.persona.personality.chars().take(50).collect();

    info!("Bot is now active");
    info!("Monitoring group: {}", group_id);
    info!("Personality: {}...", personality);
    info!("Model: {}", config.brain.model);
    info!(
        "Rate limit: {} messages per {}s",
        config.bot.safety.rate_limit_messages,
        config.bot.safety.rate_limit_window.as_secs()
    );
    if config.bot.persona.trigger_words.is_empty() {
        warn!("TRIGGER_WORDS is empty; only replies, mentions and images are answered for sure");
    }
}

/// Completes on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    println!("\nShutting down...");
}
