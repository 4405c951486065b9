//! Push channel message types
//!
//! All messages are JSON-serialized and length-prefixed on the wire.

use serde::{Deserialize, Serialize};
use spaceroom_core::{MessageRecord, Presence, UserId, UserProfile};

/// Push channel messages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PushEvent {
    /// Client subscribes to a conversation
    Subscribe {
        conversation_id: String,
        user_id: UserId,
    },

    /// A page of message history
    History {
        conversation_id: String,
        messages: Vec<MessageRecord>,
    },

    /// A live message, either new or the echo of one the client sent
    Message {
        conversation_id: String,
        message: MessageRecord,
    },

    /// Directory update for a user
    Profile(UserProfile),

    /// Presence change for a user already known to the directory
    Presence { user_id: UserId, presence: Presence },

    /// Ping to keep connection alive
    Ping,

    /// Pong response to ping
    Pong,
}

impl PushEvent {
    /// Serialize event to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize event from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Conversation the event belongs to, if it is conversation-scoped
    pub fn conversation_id(&self) -> Option<&str> {
        match self {
            PushEvent::Subscribe {
                conversation_id, ..
            }
            | PushEvent::History {
                conversation_id, ..
            }
            | PushEvent::Message {
                conversation_id, ..
            } => Some(conversation_id),
            PushEvent::Profile(_)
            | PushEvent::Presence { .. }
            | PushEvent::Ping
            | PushEvent::Pong => None,
        }
    }
}
