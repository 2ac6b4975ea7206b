//! Listening loop for the monitored group.

use std::future::Future;

use chat_core::{Brain, ChatEvent, ChatTransport};
use futures::{future, Stream, StreamExt};
use orchestrator::{Orchestrator, Outcome};
use signal_daemon::{Envelope, ReconnectConfig, SignalClient};
use tracing::{debug, info, warn};

use crate::activity::ActivityTracker;
use crate::config::ListenerConfig;
use crate::convert::EnvelopeExt;
use crate::error::ListenerError;

/// Receives messages of one Signal group and feeds them to an [`Orchestrator`].
#[derive(Debug, Clone)]
pub struct GroupListener {
    client: SignalClient,
    config: ListenerConfig,
    group_id: String,
    activity: ActivityTracker,
    reconnect: ReconnectConfig,
}

impl GroupListener {
    /// Create a listener for `group_id`.
    pub fn new(
        client: SignalClient,
        config: ListenerConfig,
        group_id: impl Into<String>,
        activity: ActivityTracker,
    ) -> Self {
        Self {
            client,
            config,
            group_id: group_id.into(),
            activity,
            reconnect: ReconnectConfig::default(),
        }
    }

    /// Use a custom reconnection policy for the event stream.
    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn activity(&self) -> &ActivityTracker {
        &self.activity
    }

    /// Convert an envelope, keeping it only if it belongs to the monitored group.
    ///
    /// Activity is recorded for every group message seen.
    pub fn accept(&self, envelope: &Envelope) -> Option<ChatEvent> {
        let event = envelope.to_chat_event(&self.config)?;
        self.activity.record(&event.group_id, event.timestamp);

        if event.group_id != self.group_id {
            debug!("Ignoring message from unmonitored group {}", event.group_id);
            return None;
        }
        Some(event)
    }

    /// Stream of chat events from the monitored group.
    ///
    /// Stream errors are logged and skipped; the stream ends when the daemon
    /// connection gives up.
    pub fn events(&self) -> Result<impl Stream<Item = ChatEvent> + '_, ListenerError> {
        let stream = signal_daemon::subscribe_with_reconnect(&self.client, self.reconnect.clone())?;

        Ok(stream.filter_map(move |item| {
            let event = match item {
                Ok(envelope) => self.accept(&envelope),
                Err(e) => {
                    warn!("Stream error: {}", e);
                    None
                }
            };
            future::ready(event)
        }))
    }

    /// Handle events until `shutdown` completes or the stream ends.
    ///
    /// Events are handled one at a time. A shutdown that arrives while a
    /// reply is being prepared drops that reply before anything is sent.
    pub async fn run_with_shutdown<B, T, S>(
        &self,
        orchestrator: &Orchestrator<B, T>,
        shutdown: S,
    ) -> Result<(), ListenerError>
    where
        B: Brain,
        T: ChatTransport,
        S: Future<Output = ()> + Send,
    {
        info!("Listening to group {}", self.group_id);

        let events = self.events()?;
        tokio::pin!(events);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                () = &mut shutdown => {
                    info!("Shutdown signal received, stopping listener");
                    return Ok(());
                }

                next = events.next() => {
                    let Some(event) = next else {
                        warn!("Message stream ended");
                        return Err(ListenerError::StreamEnded);
                    };

                    tokio::select! {
                        biased;

                        () = &mut shutdown => {
                            info!(
                                "Shutdown signal received while handling message {}, dropping it",
                                event.message_id
                            );
                            return Ok(());
                        }

                        outcome = orchestrator.handle_event(&event) => match outcome {
                            Outcome::Responded { text } => {
                                debug!("Responded to {}: {}", event.sender_name, text);
                            }
                            Outcome::RateLimited => {
                                debug!("Rate limited message {}", event.message_id);
                            }
                            Outcome::Suppressed(reason) => {
                                debug!("No reply to message {}: {:?}", event.message_id, reason);
                            }
                        },
                    }
                }
            }
        }
    }
}
