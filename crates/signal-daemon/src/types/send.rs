//! Parameter and result types for outbound RPC calls.

use serde::{Deserialize, Serialize};

/// Parameters for the `send` method.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendParams {
    /// Group IDs to send to.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub group_id: Vec<String>,

    /// The message text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Account to send from (multi-account mode).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    /// Timestamp of the quoted message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_timestamp: Option<u64>,

    /// Author of the quoted message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_author: Option<String>,
}

impl SendParams {
    /// Create new send params for a text message to a group.
    pub fn group(group_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            group_id: vec![group_id.into()],
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Set the account for multi-account mode.
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Quote a previous message.
    pub fn with_quote(mut self, timestamp: u64, author: impl Into<String>) -> Self {
        self.quote_timestamp = Some(timestamp);
        self.quote_author = Some(author.into());
        self
    }
}

/// Parameters for the `sendTyping` method.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingParams {
    /// Account to send from (multi-account mode).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    /// Group to show the indicator in.
    pub group_id: String,

    /// true sends "stopped typing".
    pub stop: bool,
}

/// Parameters for the `getAttachment` method.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentParams {
    /// Account (multi-account mode).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    /// Attachment ID from the envelope.
    pub id: String,

    /// Group the attachment was posted in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

/// Result of `getAttachment`: base64-encoded file content.
#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentData {
    /// Base64 payload.
    pub data: String,
}

/// Result of sending a message.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResult {
    /// Timestamp of the sent message.
    pub timestamp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_params_serialization() {
        let params = SendParams::group("Z3JvdXA=", "ciao a tutti")
            .with_account("+15551234567")
            .with_quote(1_700_000_000_000, "+15559876543");

        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["groupId"][0], "Z3JvdXA=");
        assert_eq!(json["message"], "ciao a tutti");
        assert_eq!(json["account"], "+15551234567");
        assert_eq!(json["quoteTimestamp"], 1_700_000_000_000u64);
        assert_eq!(json["quoteAuthor"], "+15559876543");
    }

    #[test]
    fn test_group_params_omit_empty_fields() {
        let json = serde_json::to_value(SendParams::group("g", "hi")).unwrap();
        let object = json.as_object().unwrap();
        assert!(!object.contains_key("account"));
        assert!(!object.contains_key("quoteTimestamp"));
        assert!(!object.contains_key("quoteAuthor"));
    }

    #[test]
    fn test_typing_params_serialization() {
        let params = TypingParams {
            account: None,
            group_id: "g".to_string(),
            stop: true,
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["groupId"], "g");
        assert_eq!(json["stop"], true);
        assert!(json.get("account").is_none());
    }
}
