//! Group listing types.

use serde::Deserialize;

/// A group as returned by the `listGroups` RPC method.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDetails {
    /// Group ID (base64 encoded).
    #[serde(default)]
    pub id: String,

    /// Group name.
    #[serde(default)]
    pub name: String,

    /// Group description.
    #[serde(default)]
    pub description: Option<String>,

    /// Whether the account is still a member.
    #[serde(default)]
    pub is_member: bool,

    /// Whether the account blocked the group.
    #[serde(default)]
    pub is_blocked: bool,

    /// Current members.
    #[serde(default)]
    pub members: Vec<GroupMember>,
}

impl GroupDetails {
    /// Whether messages can be exchanged in this group.
    pub fn is_active(&self) -> bool {
        self.is_member && !self.is_blocked
    }
}

/// A group member address.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    /// Phone number, if visible.
    #[serde(default)]
    pub number: Option<String>,

    /// Account UUID.
    #[serde(default)]
    pub uuid: Option<String>,
}
