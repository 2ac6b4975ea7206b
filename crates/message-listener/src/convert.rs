//! Conversion from signal-daemon envelopes to chat events.

use chat_core::{ChatEvent, ImageRef, MessageRef, ReplyRef};
use chrono::{DateTime, Utc};
use signal_daemon::{DataMessage, Envelope, Mention};

use crate::config::ListenerConfig;

/// Placeholder Signal puts in the text where a mention goes.
const MENTION_PLACEHOLDER: char = '\u{FFFC}';

/// Extension trait for converting envelopes to [`ChatEvent`]s.
pub trait EnvelopeExt {
    /// Convert a group data message into a [`ChatEvent`].
    ///
    /// Returns `None` if:
    /// - No data_message is present
    /// - The message was not posted in a group
    /// - The persona account sent it
    fn to_chat_event(&self, config: &ListenerConfig) -> Option<ChatEvent>;
}

impl EnvelopeExt for Envelope {
    fn to_chat_event(&self, config: &ListenerConfig) -> Option<ChatEvent> {
        let data_message = self.data_message.as_ref()?;
        let group = data_message.group_info.as_ref()?;
        if self.is_from(&config.account, config.uuid()) {
            return None;
        }

        let sender_id = self
            .source_number
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.source.clone());
        let sender_name = self
            .source_name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| sender_id.clone());
        let message_id = if data_message.timestamp > 0 {
            data_message.timestamp
        } else {
            self.timestamp
        };

        let text = render_mentions(
            data_message.message.as_deref().unwrap_or_default(),
            &data_message.mentions,
        );

        let addresses = [
            Some(self.source.as_str()),
            self.source_number.as_deref(),
            self.source_uuid.as_deref(),
        ];

        Some(ChatEvent {
            group_id: group.group_id.clone(),
            group_name: group.group_name.clone(),
            message_id,
            sender_id,
            sender_name,
            sender_is_bot: config.is_known_bot(addresses.into_iter().flatten()),
            text,
            timestamp: DateTime::<Utc>::from_timestamp_millis(self.timestamp as i64)
                .unwrap_or_else(Utc::now),
            reply_to: reply_ref(data_message, config),
            image: image_ref(data_message),
            mentions_self: data_message.mentions_account(&config.account, config.uuid()),
        })
    }
}

fn reply_ref(data_message: &DataMessage, config: &ListenerConfig) -> Option<ReplyRef> {
    let quote = data_message.quote.as_ref()?;
    let author = quote
        .author_number
        .clone()
        .or_else(|| quote.author.clone())
        .or_else(|| quote.author_uuid.clone())
        .unwrap_or_default();

    Some(ReplyRef {
        message: MessageRef::new(quote.id, author),
        author_name: quote.author.clone(),
        text: quote.text.clone(),
        to_self: quote.is_by(&config.account, config.uuid()),
    })
}

fn image_ref(data_message: &DataMessage) -> Option<ImageRef> {
    let attachment = data_message.first_image()?;
    Some(ImageRef {
        attachment_id: attachment.id.clone()?,
        content_type: attachment.content_type.clone(),
    })
}

/// Replace mention placeholders with `@name`, in order of appearance.
fn render_mentions(text: &str, mentions: &[Mention]) -> String {
    if mentions.is_empty() || !text.contains(MENTION_PLACEHOLDER) {
        return text.to_string();
    }

    let mut ordered: Vec<&Mention> = mentions.iter().collect();
    ordered.sort_by_key(|m| m.start);
    let mut names = ordered.into_iter().map(|m| {
        m.name
            .clone()
            .or_else(|| m.number.clone())
            .unwrap_or_default()
    });

    text.chars()
        .map(|c| {
            if c == MENTION_PLACEHOLDER {
                match names.next() {
                    Some(name) => format!("@{}", name),
                    None => String::new(),
                }
            } else {
                c.to_string()
            }
        })
        .collect()
}
