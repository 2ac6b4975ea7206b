//! Recording chat transport for tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chat_core::{async_trait, ChatTransport, GroupDescriptor, ImageRef, MessageRef, TransportError};
use tokio::time::Instant;

/// A message the transport was asked to send.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub group_id: String,
    pub text: String,
    pub reply_to: Option<MessageRef>,
    /// Tokio clock reading at send time (honours paused time).
    pub at: Instant,
}

/// A composing-indicator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndicatorEvent {
    Composing(String),
    Stopped(String),
}

#[derive(Debug, Default)]
struct Log {
    sent: Vec<SentMessage>,
    indicators: Vec<(IndicatorEvent, Instant)>,
    downloads: Vec<ImageRef>,
    groups: Vec<GroupDescriptor>,
    image_bytes: Vec<u8>,
}

/// A [`ChatTransport`] that records every call instead of talking to a backend.
///
/// Failures can be switched on per operation. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    log: Arc<Mutex<Log>>,
    fail_sends: Arc<AtomicBool>,
    fail_indicators: Arc<AtomicBool>,
    fail_downloads: Arc<AtomicBool>,
}

impl RecordingTransport {
    /// Create an empty transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups returned by `list_groups_by_recent_activity`.
    pub fn with_groups(self, groups: Vec<GroupDescriptor>) -> Self {
        if let Ok(mut log) = self.log.lock() {
            log.groups = groups;
        }
        self
    }

    /// Bytes returned by `download_image`.
    pub fn with_image_bytes(self, bytes: Vec<u8>) -> Self {
        if let Ok(mut log) = self.log.lock() {
            log.image_bytes = bytes;
        }
        self
    }

    /// Make `send_message` fail.
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Make the composing indicator calls fail.
    pub fn fail_indicators(&self, fail: bool) {
        self.fail_indicators.store(fail, Ordering::SeqCst);
    }

    /// Make `download_image` fail.
    pub fn fail_downloads(&self, fail: bool) {
        self.fail_downloads.store(fail, Ordering::SeqCst);
    }

    /// Messages sent so far.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.log.lock().map(|l| l.sent.clone()).unwrap_or_default()
    }

    /// Indicator calls so far, in order.
    pub fn indicator_events(&self) -> Vec<IndicatorEvent> {
        self.log
            .lock()
            .map(|l| l.indicators.iter().map(|(e, _)| e.clone()).collect())
            .unwrap_or_default()
    }

    /// Times at which the composing indicator was (re)sent.
    pub fn composing_times(&self) -> Vec<Instant> {
        self.log
            .lock()
            .map(|l| {
                l.indicators
                    .iter()
                    .filter(|(e, _)| matches!(e, IndicatorEvent::Composing(_)))
                    .map(|(_, at)| *at)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Images requested so far.
    pub fn downloads(&self) -> Vec<ImageRef> {
        self.log.lock().map(|l| l.downloads.clone()).unwrap_or_default()
    }

    fn record_indicator(&self, event: IndicatorEvent) -> Result<(), TransportError> {
        if let Ok(mut log) = self.log.lock() {
            log.indicators.push((event, Instant::now()));
        }
        if self.fail_indicators.load(Ordering::SeqCst) {
            return Err(TransportError::Indicator("mock indicator failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_message(
        &self,
        group_id: &str,
        text: &str,
        reply_to: Option<&MessageRef>,
    ) -> Result<(), TransportError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(TransportError::SendFailed("mock send failure".to_string()));
        }
        if let Ok(mut log) = self.log.lock() {
            log.sent.push(SentMessage {
                group_id: group_id.to_string(),
                text: text.to_string(),
                reply_to: reply_to.cloned(),
                at: Instant::now(),
            });
        }
        Ok(())
    }

    async fn send_composing_indicator(&self, group_id: &str) -> Result<(), TransportError> {
        self.record_indicator(IndicatorEvent::Composing(group_id.to_string()))
    }

    async fn stop_composing_indicator(&self, group_id: &str) -> Result<(), TransportError> {
        self.record_indicator(IndicatorEvent::Stopped(group_id.to_string()))
    }

    async fn download_image(
        &self,
        _group_id: &str,
        image: &ImageRef,
    ) -> Result<Vec<u8>, TransportError> {
        let mut log = self
            .log
            .lock()
            .map_err(|_| TransportError::Download("log poisoned".to_string()))?;
        log.downloads.push(image.clone());
        if self.fail_downloads.load(Ordering::SeqCst) {
            return Err(TransportError::Download("mock download failure".to_string()));
        }
        Ok(log.image_bytes.clone())
    }

    async fn list_groups_by_recent_activity(
        &self,
        _window: Duration,
    ) -> Result<Vec<GroupDescriptor>, TransportError> {
        Ok(self.log.lock().map(|l| l.groups.clone()).unwrap_or_default())
    }
}
