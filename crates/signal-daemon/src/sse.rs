//! Server-Sent Events (SSE) client for receiving messages.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::stream::Stream;
use reqwest_eventsource::retry::ExponentialBackoff;
use reqwest_eventsource::{Event, EventSource, RequestBuilderExt};
use tracing::{debug, info, warn};

use crate::error::DaemonError;
use crate::types::{Envelope, ReceiveEvent};
use crate::SignalClient;

/// Configuration for automatic reconnection.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Maximum number of retries (None = infinite).
    pub max_retries: Option<u32>,
    /// Initial delay before first retry.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Backoff multiplier for each retry.
    pub backoff_multiplier: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_retries: None,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl ReconnectConfig {
    fn retry_policy(&self) -> ExponentialBackoff {
        ExponentialBackoff::new(
            self.initial_delay,
            self.backoff_multiplier,
            Some(self.max_delay),
            self.max_retries.map(|max| max as usize),
        )
    }
}

/// A stream of incoming Signal message envelopes.
///
/// Transport errors are yielded as `Err` items while the underlying event
/// source retries; the stream ends once the retry budget is exhausted.
pub struct MessageStream {
    event_source: EventSource,
    reconnect_attempts: u32,
}

impl MessageStream {
    /// Create a new message stream with custom reconnection config.
    pub fn connect(
        client: &SignalClient,
        reconnect_config: ReconnectConfig,
    ) -> Result<Self, DaemonError> {
        let url = client.config().events_url();
        info!("Creating SSE connection to {}", url);

        // SSE connections are long-lived; the RPC client's timeout would cut them.
        let sse_client = reqwest::Client::builder()
            .build()
            .map_err(DaemonError::Http)?;

        let mut event_source = sse_client
            .get(&url)
            .eventsource()
            .map_err(|e| DaemonError::Sse(e.to_string()))?;
        event_source.set_retry_policy(Box::new(reconnect_config.retry_policy()));

        Ok(Self {
            event_source,
            reconnect_attempts: 0,
        })
    }

    /// Consecutive failures since the last successful open.
    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts
    }

    /// Close the underlying connection; the stream then ends.
    pub fn close(&mut self) {
        self.event_source.close();
    }
}

impl Stream for MessageStream {
    type Item = Result<Envelope, DaemonError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.event_source).poll_next(cx) {
                Poll::Ready(Some(Ok(Event::Open))) => {
                    debug!("SSE connection opened");
                    self.reconnect_attempts = 0;
                }
                Poll::Ready(Some(Ok(Event::Message(msg)))) => {
                    // The "receive" event type contains message data
                    if msg.event != "receive" {
                        debug!("Ignoring SSE event type: {}", msg.event);
                        continue;
                    }
                    match serde_json::from_str::<ReceiveEvent>(&msg.data) {
                        Ok(event) => return Poll::Ready(Some(Ok(event.envelope))),
                        Err(e) => {
                            warn!("Failed to parse SSE event data: {}", e);
                            debug!("Raw data: {}", msg.data);
                        }
                    }
                }
                Poll::Ready(Some(Err(e))) => {
                    self.reconnect_attempts += 1;
                    warn!(
                        attempts = self.reconnect_attempts,
                        "SSE error: {}", e
                    );
                    return Poll::Ready(Some(Err(DaemonError::Sse(e.to_string()))));
                }
                Poll::Ready(None) => {
                    info!("SSE stream ended");
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Create a message stream from a SignalClient with default reconnection.
pub fn subscribe(client: &SignalClient) -> Result<MessageStream, DaemonError> {
    MessageStream::connect(client, ReconnectConfig::default())
}

/// Create a message stream with custom reconnection configuration.
pub fn subscribe_with_reconnect(
    client: &SignalClient,
    reconnect_config: ReconnectConfig,
) -> Result<MessageStream, DaemonError> {
    MessageStream::connect(client, reconnect_config)
}
