//! Message model for conversation chat

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Server-assigned identifier of a durably accepted message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfirmedId(pub String);

impl ConfirmedId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Client-generated identifier correlating an optimistic message with its confirmation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PendingId(pub String);

impl PendingId {
    /// Generate a fresh pending id for a locally created message
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfirmedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for PendingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A chat message as accumulated by a session.
///
/// Either identifier may be absent; an empty string counts as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_id: Option<ConfirmedId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_id: Option<PendingId>,
    pub sender_id: UserId,
    pub body: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read_flag: bool,
}

impl MessageRecord {
    /// Create an optimistic record for a message the local user just sent
    pub fn optimistic(pending_id: PendingId, sender_id: UserId, body: String) -> Self {
        Self {
            confirmed_id: None,
            pending_id: Some(pending_id),
            sender_id,
            body,
            created_at: Utc::now(),
            read_flag: false,
        }
    }

    /// Create a record the server has already accepted
    pub fn confirmed(
        confirmed_id: ConfirmedId,
        sender_id: UserId,
        body: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            confirmed_id: Some(confirmed_id),
            pending_id: None,
            sender_id,
            body,
            created_at,
            read_flag: false,
        }
    }

    /// The server echo of this record, keeping its pending id
    pub fn confirm(mut self, confirmed_id: ConfirmedId) -> Self {
        self.confirmed_id = Some(confirmed_id);
        self
    }

    pub fn confirmed_key(&self) -> Option<&str> {
        self.confirmed_id
            .as_ref()
            .map(ConfirmedId::as_str)
            .filter(|id| !id.is_empty())
    }

    pub fn pending_key(&self) -> Option<&str> {
        self.pending_id
            .as_ref()
            .map(PendingId::as_str)
            .filter(|id| !id.is_empty())
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed_key().is_some()
    }

    /// Neither identifier is usable
    pub fn is_malformed(&self) -> bool {
        self.confirmed_key().is_none() && self.pending_key().is_none()
    }

    pub fn format_timestamp(&self, format: &str) -> String {
        self.created_at.format(format).to_string()
    }
}

/// Identity of an entry in a reconciled transcript
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageKey {
    Confirmed(ConfirmedId),
    Pending(PendingId),
    /// Record without identifiers, keyed by its position in the raw input
    Fallback(usize),
}

impl MessageKey {
    /// Key for the record found at `position` in the raw input
    pub fn for_record(record: &MessageRecord, position: usize) -> Self {
        if let Some(id) = record.confirmed_key() {
            MessageKey::Confirmed(ConfirmedId::new(id))
        } else if let Some(id) = record.pending_key() {
            MessageKey::Pending(PendingId::new(id))
        } else {
            MessageKey::Fallback(position)
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKey::Confirmed(id) => write!(f, "c:{}", id),
            MessageKey::Pending(id) => write!(f, "p:{}", id),
            MessageKey::Fallback(position) => write!(f, "fallback:{}", position),
        }
    }
}

/// A reconciled message ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewEntry {
    pub key: MessageKey,
    pub record: MessageRecord,
    /// First message of a consecutive run by the same sender
    pub show_sender_header: bool,
}
