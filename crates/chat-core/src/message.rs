//! Message types shared between the transport, the core, and the AI backend.

use chrono::{DateTime, Utc};

/// Identifies a message in a group so it can be quoted.
///
/// On Signal a message is addressed by its author and sent timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    /// Sent timestamp (milliseconds since epoch) used as the message id.
    pub message_id: u64,
    /// Author identifier (phone number or UUID).
    pub author: String,
}

impl MessageRef {
    /// Create a new message reference.
    pub fn new(message_id: u64, author: impl Into<String>) -> Self {
        Self {
            message_id,
            author: author.into(),
        }
    }
}

/// The message an inbound message replies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyRef {
    /// The quoted message.
    pub message: MessageRef,
    /// Display name of the quoted author, if known.
    pub author_name: Option<String>,
    /// Quoted text, if the transport carried it.
    pub text: Option<String>,
    /// Whether the quoted message was written by the persona.
    pub to_self: bool,
}

/// Reference to an image attached to an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Transport-specific attachment id.
    pub attachment_id: String,
    /// MIME type (e.g. "image/jpeg").
    pub content_type: String,
}

/// Downloaded image bytes ready to be passed to the AI backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    /// MIME type of the image.
    pub mime_type: String,
    /// Raw image bytes.
    pub data: Vec<u8>,
}

impl ImagePayload {
    /// Create a new image payload.
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }
}

/// An inbound message from the monitored group.
#[derive(Debug, Clone)]
pub struct ChatEvent {
    /// Group the message was posted in.
    pub group_id: String,
    /// Human-readable group name, if known.
    pub group_name: Option<String>,
    /// Transport message id (Signal: sent timestamp).
    pub message_id: u64,
    /// Sender identifier.
    pub sender_id: String,
    /// Sender display name.
    pub sender_name: String,
    /// Whether the sender is a known automated account.
    pub sender_is_bot: bool,
    /// Message text (may be empty for image-only posts).
    pub text: String,
    /// When the message was sent.
    pub timestamp: DateTime<Utc>,
    /// The message this one replies to, if any.
    pub reply_to: Option<ReplyRef>,
    /// Attached image, if any.
    pub image: Option<ImageRef>,
    /// Whether the message explicitly mentions the persona account.
    pub mentions_self: bool,
}

impl ChatEvent {
    /// Create a plain text event with the sender id doubling as display name.
    pub fn new(
        group_id: impl Into<String>,
        sender_id: impl Into<String>,
        text: impl Into<String>,
        message_id: u64,
    ) -> Self {
        let sender_id = sender_id.into();
        Self {
            group_id: group_id.into(),
            group_name: None,
            message_id,
            sender_name: sender_id.clone(),
            sender_id,
            sender_is_bot: false,
            text: text.into(),
            timestamp: DateTime::<Utc>::from_timestamp_millis(message_id as i64)
                .unwrap_or_else(Utc::now),
            reply_to: None,
            image: None,
            mentions_self: false,
        }
    }

    /// Set the sender display name.
    pub fn with_sender_name(mut self, name: impl Into<String>) -> Self {
        self.sender_name = name.into();
        self
    }

    /// Set the group name.
    pub fn with_group_name(mut self, name: impl Into<String>) -> Self {
        self.group_name = Some(name.into());
        self
    }

    /// Mark this event as a reply.
    pub fn with_reply(mut self, reply: ReplyRef) -> Self {
        self.reply_to = Some(reply);
        self
    }

    /// Attach an image reference.
    pub fn with_image(mut self, image: ImageRef) -> Self {
        self.image = Some(image);
        self
    }

    /// Mark the event as mentioning the persona.
    pub fn mentioning_self(mut self) -> Self {
        self.mentions_self = true;
        self
    }

    /// Mark the sender as an automated account.
    pub fn from_bot(mut self) -> Self {
        self.sender_is_bot = true;
        self
    }

    /// Reference used to quote this message in a reply.
    pub fn message_ref(&self) -> MessageRef {
        MessageRef::new(self.message_id, self.sender_id.clone())
    }

    /// Whether an image is attached.
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Whether the message has neither meaningful text nor an image.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty() && self.image.is_none()
    }

    /// Whether this message quotes one of the persona's own messages.
    pub fn is_reply_to_self(&self) -> bool {
        self.reply_to.as_ref().is_some_and(|reply| reply.to_self)
    }
}

/// One entry of a group's rolling context window.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextEntry {
    /// Sender identifier.
    pub sender_id: String,
    /// Sender display name.
    pub sender_name: String,
    /// Message text.
    pub text: String,
    /// When the message was sent.
    pub timestamp: DateTime<Utc>,
    /// The message this one replies to, if any.
    pub reply_to: Option<ReplyRef>,
    /// Whether the message carried an image.
    pub has_image: bool,
    /// Whether the persona wrote this message.
    pub from_self: bool,
}

impl ContextEntry {
    /// Build a context entry from an inbound event.
    pub fn from_event(event: &ChatEvent) -> Self {
        Self {
            sender_id: event.sender_id.clone(),
            sender_name: event.sender_name.clone(),
            text: event.text.clone(),
            timestamp: event.timestamp,
            reply_to: event.reply_to.clone(),
            has_image: event.has_image(),
            from_self: false,
        }
    }

    /// Build a context entry for a message the persona sent.
    pub fn own(
        persona_id: impl Into<String>,
        persona_name: impl Into<String>,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            sender_id: persona_id.into(),
            sender_name: persona_name.into(),
            text: text.into(),
            timestamp,
            reply_to: None,
            has_image: false,
            from_self: true,
        }
    }
}

/// A group the persona belongs to, as listed by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDescriptor {
    /// Group identifier.
    pub id: String,
    /// Group name.
    pub name: String,
    /// Number of members, if known.
    pub member_count: Option<usize>,
    /// Last observed activity, if any was seen.
    pub last_activity: Option<DateTime<Utc>>,
}

/// Everything the AI backend needs to write one reply.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Personality description of the persona.
    pub persona: String,
    /// Name of the group being answered.
    pub group_name: String,
    /// Bounded context window; the last entry is the message being answered.
    pub context: Vec<ContextEntry>,
    /// Image attached to the message being answered, if downloaded.
    pub image: Option<ImagePayload>,
}

impl CompletionRequest {
    /// The message being answered.
    pub fn latest(&self) -> Option<&ContextEntry> {
        self.context.last()
    }

    /// Entries before the message being answered.
    pub fn history(&self) -> &[ContextEntry] {
        match self.context.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }
}
