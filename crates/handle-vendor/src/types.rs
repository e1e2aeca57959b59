//! Vendor wire types.

use serde::{Deserialize, Serialize};

/// Reference to a room inside an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRef {
    pub uuid: String,
}

/// Body of the vendor write endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub body: String,
    pub nickname: String,
    pub email: String,
    pub phone_number: String,
    pub room: RoomRef,
}

/// Message as stored by the vendor.
///
/// `support_answer` is empty (or absent) until the vendor has generated a
/// reply; it only ever transitions from empty to populated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default)]
    pub support_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations: Option<String>,
}

impl MessageRecord {
    /// The trimmed answer, or `None` while the vendor is still working.
    pub fn answer(&self) -> Option<&str> {
        self.support_answer
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }
}

/// Whether `id` can be used as a single path segment of a vendor URL.
///
/// Vendor ids are UUIDs in practice. Only ASCII letters, digits, `-` and `_`
/// are accepted, up to 64 characters.
pub fn is_plain_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Conversation context created once per client session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeting_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}
