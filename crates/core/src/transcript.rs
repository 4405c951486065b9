//! Transcript presentation
//!
//! Joins reconciled entries with directory metadata for rendering.

use crate::config::TranscriptConfig;
use crate::directory::{Avatar, UserDirectory};
use crate::models::{Presence, UserId, UserRole, ViewEntry};
use crate::session::ConversationKind;

/// Who is looking at the transcript
#[derive(Debug, Clone)]
pub struct TranscriptContext {
    pub current_user: UserId,
    pub kind: ConversationKind,
}

/// One rendered line of a chat transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub key: String,
    /// Sender name, only set on the first line of a run
    pub sender_label: Option<String>,
    pub avatar: Avatar,
    pub role: Option<UserRole>,
    pub presence: Presence,
    pub body: String,
    pub time: String,
    pub is_own: bool,
    /// Not yet confirmed by the server
    pub is_pending: bool,
    /// Read receipt for own messages in direct conversations
    pub read: Option<bool>,
}

/// Build display lines for a reconciled transcript
pub fn build_transcript<D: UserDirectory + ?Sized>(
    entries: &[ViewEntry],
    directory: &D,
    ctx: &TranscriptContext,
    config: &TranscriptConfig,
) -> Vec<TranscriptLine> {
    let mut lines = Vec::with_capacity(entries.len());

    for entry in entries {
        let record = &entry.record;
        let profile = directory.lookup(&record.sender_id);
        let is_own = record.sender_id == ctx.current_user;

        let sender_label = entry.show_sender_header.then(|| {
            profile
                .as_ref()
                .map(|p| p.display_name.clone())
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| config.unknown_sender_label.clone())
        });

        let read = (is_own && ctx.kind == ConversationKind::Direct).then_some(record.read_flag);

        lines.push(TranscriptLine {
            key: entry.key.to_string(),
            sender_label,
            avatar: Avatar::resolve(profile.as_ref(), config.placeholder_glyph),
            role: profile.as_ref().map(|p| p.role),
            presence: profile.as_ref().map(|p| p.presence).unwrap_or_default(),
            body: record.body.clone(),
            time: record.format_timestamp(&config.time_format),
            is_own,
            is_pending: !record.is_confirmed(),
            read,
        });
    }

    lines
}
