//! Chat transport trait.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::message::{GroupDescriptor, ImageRef, MessageRef};

/// Outbound side of the chat backend.
///
/// Abstracted so the core can run against Signal, tests, or anything else.
/// Authentication and session handling belong to the implementation.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a text message to a group.
    ///
    /// # Arguments
    /// * `group_id` - Group to post in
    /// * `text` - Message content
    /// * `reply_to` - Message to quote, if any
    async fn send_message(
        &self,
        group_id: &str,
        text: &str,
        reply_to: Option<&MessageRef>,
    ) -> Result<(), TransportError>;

    /// Show the "composing" indicator in a group.
    ///
    /// Backends expire the indicator after a few seconds, so callers refresh it.
    async fn send_composing_indicator(&self, group_id: &str) -> Result<(), TransportError>;

    /// Clear the "composing" indicator.
    ///
    /// Default implementation does nothing.
    async fn stop_composing_indicator(&self, group_id: &str) -> Result<(), TransportError> {
        let _ = group_id;
        Ok(())
    }

    /// Download an attached image.
    async fn download_image(
        &self,
        group_id: &str,
        image: &ImageRef,
    ) -> Result<Vec<u8>, TransportError>;

    /// List groups with activity inside `window`, most recent first.
    async fn list_groups_by_recent_activity(
        &self,
        window: Duration,
    ) -> Result<Vec<GroupDescriptor>, TransportError>;
}
