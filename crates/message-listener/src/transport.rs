//! [`ChatTransport`] implementation over the signal-cli daemon.

use std::time::Duration;

use chat_core::{async_trait, ChatTransport, GroupDescriptor, ImageRef, MessageRef, TransportError};
use chrono::Utc;
use signal_daemon::SignalClient;
use tracing::debug;

use crate::activity::ActivityTracker;

/// Sends, indicates and downloads through a [`SignalClient`].
#[derive(Debug, Clone)]
pub struct SignalTransport {
    client: SignalClient,
    activity: ActivityTracker,
}

impl SignalTransport {
    /// Create a transport sharing `activity` with the listener.
    pub fn new(client: SignalClient, activity: ActivityTracker) -> Self {
        Self { client, activity }
    }

    pub fn client(&self) -> &SignalClient {
        &self.client
    }

    pub fn activity(&self) -> &ActivityTracker {
        &self.activity
    }
}

#[async_trait]
impl ChatTransport for SignalTransport {
    async fn send_message(
        &self,
        group_id: &str,
        text: &str,
        reply_to: Option<&MessageRef>,
    ) -> Result<(), TransportError> {
        let quote = reply_to.map(|r| (r.message_id, r.author.as_str()));
        let result = self
            .client
            .send_to_group(group_id, text, quote)
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;

        debug!("Sent message to {} (ts={})", group_id, result.timestamp);
        self.activity.record(group_id, Utc::now());
        Ok(())
    }

    async fn send_composing_indicator(&self, group_id: &str) -> Result<(), TransportError> {
        self.client
            .send_typing_to_group(group_id, true)
            .await
            .map_err(|e| TransportError::Indicator(e.to_string()))
    }

    async fn stop_composing_indicator(&self, group_id: &str) -> Result<(), TransportError> {
        self.client
            .send_typing_to_group(group_id, false)
            .await
            .map_err(|e| TransportError::Indicator(e.to_string()))
    }

    async fn download_image(
        &self,
        group_id: &str,
        image: &ImageRef,
    ) -> Result<Vec<u8>, TransportError> {
        self.client
            .get_attachment(&image.attachment_id, Some(group_id))
            .await
            .map_err(|e| TransportError::Download(e.to_string()))
    }

    async fn list_groups_by_recent_activity(
        &self,
        window: Duration,
    ) -> Result<Vec<GroupDescriptor>, TransportError> {
        let groups = self
            .client
            .list_groups()
            .await
            .map_err(|e| TransportError::Listing(e.to_string()))?;

        let descriptors = groups
            .into_iter()
            .filter(|g| g.is_active())
            .map(|g| GroupDescriptor {
                member_count: Some(g.members.len()),
                id: g.id,
                name: g.name,
                last_activity: None,
            })
            .collect();

        Ok(self.activity.rank(descriptors, window, Utc::now()))
    }
}
