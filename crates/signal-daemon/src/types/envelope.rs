//! Envelope and message types from signal-cli daemon.

use serde::{Deserialize, Serialize};

/// A message envelope received from Signal.
///
/// Receipts, typing and sync payloads are not modelled; serde skips them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Source address (phone number, or UUID when the number is hidden).
    #[serde(default)]
    pub source: String,

    /// Source phone number.
    #[serde(default)]
    pub source_number: Option<String>,

    /// Source UUID.
    #[serde(default)]
    pub source_uuid: Option<String>,

    /// Contact name if available.
    #[serde(default)]
    pub source_name: Option<String>,

    /// Message timestamp (milliseconds since epoch).
    #[serde(default)]
    pub timestamp: u64,

    /// Data message content (regular message).
    #[serde(default)]
    pub data_message: Option<DataMessage>,
}

impl Envelope {
    /// Message text, if this is a data message with text.
    pub fn text(&self) -> Option<&str> {
        self.data_message.as_ref()?.message.as_deref()
    }

    /// Group ID, if this is a group data message.
    pub fn group_id(&self) -> Option<&str> {
        self.data_message
            .as_ref()?
            .group_info
            .as_ref()
            .map(|g| g.group_id.as_str())
    }

    /// Whether the envelope was sent by the given account.
    pub fn is_from(&self, number: &str, uuid: Option<&str>) -> bool {
        self.source == number
            || self.source_number.as_deref() == Some(number)
            || uuid.is_some_and(|u| self.source_uuid.as_deref() == Some(u) || self.source == u)
    }
}

/// A data message containing the actual message content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataMessage {
    /// Message timestamp.
    #[serde(default)]
    pub timestamp: u64,

    /// The text message content.
    #[serde(default)]
    pub message: Option<String>,

    /// Group information if this is a group message.
    #[serde(default)]
    pub group_info: Option<GroupInfo>,

    /// Attachments included with the message.
    #[serde(default)]
    pub attachments: Vec<Attachment>,

    /// Quote/reply to another message.
    #[serde(default)]
    pub quote: Option<Quote>,

    /// Mentions in the message.
    #[serde(default)]
    pub mentions: Vec<Mention>,
}

impl DataMessage {
    /// First image attachment, if any.
    pub fn first_image(&self) -> Option<&Attachment> {
        self.attachments.iter().find(|a| a.is_image())
    }

    /// Whether any mention targets the given account.
    pub fn mentions_account(&self, number: &str, uuid: Option<&str>) -> bool {
        self.mentions.iter().any(|m| m.targets(number, uuid))
    }
}

/// Information about a group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupInfo {
    /// Group ID (base64 encoded).
    #[serde(default)]
    pub group_id: String,

    /// Group name, when the daemon includes it.
    #[serde(default)]
    pub group_name: Option<String>,

    /// Group info type ("DELIVER", "UPDATE", ...).
    #[serde(default)]
    pub r#type: Option<String>,
}

/// An attachment in a message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Content type (MIME type).
    #[serde(default)]
    pub content_type: String,

    /// Original filename.
    #[serde(default)]
    pub filename: Option<String>,

    /// Attachment ID, used with `getAttachment`.
    #[serde(default)]
    pub id: Option<String>,

    /// Size in bytes.
    #[serde(default)]
    pub size: Option<u64>,
}

impl Attachment {
    /// Whether this attachment is an image.
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

/// Quote/reply to another message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Original message timestamp.
    #[serde(default)]
    pub id: u64,

    /// Author of the quoted message.
    #[serde(default)]
    pub author: Option<String>,

    /// Author phone number.
    #[serde(default)]
    pub author_number: Option<String>,

    /// Author UUID.
    #[serde(default)]
    pub author_uuid: Option<String>,

    /// Quoted text.
    #[serde(default)]
    pub text: Option<String>,
}

impl Quote {
    /// Whether the quoted message was written by the given account.
    pub fn is_by(&self, number: &str, uuid: Option<&str>) -> bool {
        let matches = |value: &Option<String>| {
            value
                .as_deref()
                .is_some_and(|v| v == number || uuid.is_some_and(|u| v == u))
        };
        matches(&self.author) || matches(&self.author_number) || matches(&self.author_uuid)
    }
}

/// A mention in a message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mention {
    /// Display name of the mentioned user.
    #[serde(default)]
    pub name: Option<String>,

    /// Start position in the message.
    #[serde(default)]
    pub start: u32,

    /// Length of the mention.
    #[serde(default)]
    pub length: u32,

    /// UUID of the mentioned user.
    #[serde(default)]
    pub uuid: Option<String>,

    /// Phone number of the mentioned user.
    #[serde(default)]
    pub number: Option<String>,
}

impl Mention {
    /// Whether this mention targets the given account.
    pub fn targets(&self, number: &str, uuid: Option<&str>) -> bool {
        self.number.as_deref() == Some(number)
            || uuid.is_some_and(|u| self.uuid.as_deref() == Some(u))
    }
}

/// Wrapper for SSE event data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiveEvent {
    /// The message envelope.
    pub envelope: Envelope,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SELF_NUMBER: &str = "+15550000000";
    const SELF_UUID: &str = "aaaaaaaa-0000-0000-0000-000000000000";

    #[test]
    fn test_receive_event_deserialization() {
        let raw = r#"{
            "envelope": {
                "source": "+15551234567",
                "sourceNumber": "+15551234567",
                "sourceUuid": "bbbbbbbb-0000-0000-0000-000000000000",
                "sourceName": "Giulia",
                "sourceDevice": 1,
                "timestamp": 1700000000000,
                "dataMessage": {
                    "timestamp": 1700000000000,
                    "message": "ciao nonno",
                    "expiresInSeconds": 0,
                    "viewOnce": false,
                    "groupInfo": { "groupId": "Z3JvdXA=", "type": "DELIVER" },
                    "attachments": [
                        { "contentType": "image/jpeg", "id": "abc.jpg", "size": 1024 }
                    ],
                    "quote": {
                        "id": 1699999999000,
                        "author": "+15550000000",
                        "authorNumber": "+15550000000",
                        "text": "buongiorno"
                    },
                    "mentions": [
                        { "name": "Nonno", "number": "+15550000000", "start": 0, "length": 1 }
                    ]
                }
            },
            "account": "+15550000000"
        }"#;

        let event: ReceiveEvent = serde_json::from_str(raw).unwrap();
        let envelope = event.envelope;
        assert_eq!(envelope.source_name.as_deref(), Some("Giulia"));
        assert_eq!(envelope.text(), Some("ciao nonno"));
        assert_eq!(envelope.group_id(), Some("Z3JvdXA="));

        let data = envelope.data_message.as_ref().unwrap();
        assert_eq!(data.first_image().and_then(|a| a.id.as_deref()), Some("abc.jpg"));
        assert!(data.quote.as_ref().unwrap().is_by(SELF_NUMBER, None));
        assert!(data.mentions_account(SELF_NUMBER, None));
    }

    #[test]
    fn test_envelope_without_data_message() {
        let raw = r#"{"source":"+15551234567","timestamp":1,"receiptMessage":{"isRead":true}}"#;
        let envelope: Envelope = serde_json::from_str(raw).unwrap();
        assert!(envelope.data_message.is_none());
        assert!(envelope.text().is_none());
        assert!(envelope.group_id().is_none());
    }

    #[test]
    fn test_is_from_matches_number_or_uuid() {
        let envelope = Envelope {
            source: SELF_UUID.to_string(),
            source_uuid: Some(SELF_UUID.to_string()),
            ..Default::default()
        };
        assert!(envelope.is_from(SELF_NUMBER, Some(SELF_UUID)));
        assert!(!envelope.is_from(SELF_NUMBER, None));
    }

    #[test]
    fn test_quote_and_mention_matching_by_uuid() {
        let quote = Quote {
            author_uuid: Some(SELF_UUID.to_string()),
            ..Default::default()
        };
        assert!(quote.is_by(SELF_NUMBER, Some(SELF_UUID)));
        assert!(!quote.is_by(SELF_NUMBER, None));

        let mention = Mention {
            uuid: Some(SELF_UUID.to_string()),
            ..Default::default()
        };
        assert!(mention.targets(SELF_NUMBER, Some(SELF_UUID)));
        assert!(!mention.targets("+15551111111", None));
    }

    #[test]
    fn test_attachment_is_image() {
        let image = Attachment {
            content_type: "image/png".to_string(),
            ..Default::default()
        };
        let voice = Attachment {
            content_type: "audio/aac".to_string(),
            ..Default::default()
        };
        assert!(image.is_image());
        assert!(!voice.is_image());
    }
}
