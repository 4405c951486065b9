//! Chat session buffer
//!
//! A session owns the raw message buffer of one open conversation. Every
//! event appends to the buffer and re-runs the reconciler over all of it;
//! the resulting transcript is kept as an immutable snapshot until the next
//! event replaces it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::invariants::assert_optimistic_record;
use crate::models::{MessageRecord, PendingId, UserId, ViewEntry};
use crate::reconcile::reconcile;
use crate::transcript::TranscriptContext;

/// Kind of conversation a session displays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationKind {
    /// One-to-one conversation, read receipts apply
    Direct,
    #[default]
    Group,
}

/// Raw buffer and current transcript snapshot for one conversation
pub struct ChatSession {
    conversation_id: String,
    kind: ConversationKind,
    current_user: UserId,
    config: SessionConfig,
    raw: Vec<MessageRecord>,
    snapshot: Arc<[ViewEntry]>,
}

impl ChatSession {
    pub fn new(
        conversation_id: impl Into<String>,
        kind: ConversationKind,
        current_user: UserId,
        config: SessionConfig,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            kind,
            current_user,
            config,
            raw: Vec::new(),
            snapshot: Arc::from(Vec::new()),
        }
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Viewer context for building a transcript from this session
    pub fn context(&self) -> TranscriptContext {
        TranscriptContext {
            current_user: self.current_user.clone(),
            kind: self.kind,
        }
    }

    /// Append a fetched history page.
    ///
    /// Only the newest `history_limit` records of the page are kept.
    pub fn load_history(&mut self, mut batch: Vec<MessageRecord>) -> Arc<[ViewEntry]> {
        let limit = self.config.history_limit;
        if batch.len() > limit {
            let dropped = batch.len() - limit;
            batch.drain(..dropped);
            debug!(
                conversation_id = %self.conversation_id,
                dropped,
                limit,
                "History page truncated"
            );
        }

        info!(
            conversation_id = %self.conversation_id,
            count = batch.len(),
            "History loaded"
        );
        self.raw.extend(batch);
        self.refresh()
    }

    /// Append a record delivered by the push channel
    pub fn receive(&mut self, record: MessageRecord) -> Arc<[ViewEntry]> {
        debug!(
            conversation_id = %self.conversation_id,
            confirmed_id = record.confirmed_key().unwrap_or("-"),
            pending_id = record.pending_key().unwrap_or("-"),
            "Message received"
        );
        self.raw.push(record);
        self.refresh()
    }

    /// Append an optimistic record for a message the current user sends.
    ///
    /// Returns the pending id the server echo will carry, along with the
    /// record to submit to the backend.
    pub fn send_local(&mut self, body: &str) -> Result<(PendingId, MessageRecord)> {
        let body = body.trim();
        if body.is_empty() {
            return Err(Error::InvalidOperation(
                "Cannot send an empty message".to_string(),
            ));
        }

        let pending_id = PendingId::generate();
        let record = MessageRecord::optimistic(
            pending_id.clone(),
            self.current_user.clone(),
            body.to_string(),
        );
        assert_optimistic_record(&record);

        debug!(
            conversation_id = %self.conversation_id,
            pending_id = %pending_id,
            "Optimistic message added"
        );
        self.raw.push(record.clone());
        self.refresh();
        Ok((pending_id, record))
    }

    /// Current reconciled transcript
    pub fn snapshot(&self) -> Arc<[ViewEntry]> {
        self.snapshot.clone()
    }

    /// Number of records accumulated so far, duplicates included
    pub fn raw_len(&self) -> usize {
        self.raw.len()
    }

    /// Number of shown messages still awaiting confirmation
    pub fn pending_count(&self) -> usize {
        self.snapshot
            .iter()
            .filter(|entry| !entry.record.is_confirmed() && !entry.record.is_malformed())
            .count()
    }

    fn refresh(&mut self) -> Arc<[ViewEntry]> {
        self.snapshot = Arc::from(reconcile(&self.raw));
        self.snapshot.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConfirmedId;
    use chrono::Utc;

    fn session() -> ChatSession {
        ChatSession::new(
            "course-42",
            ConversationKind::Group,
            UserId::from("me"),
            SessionConfig::default(),
        )
    }

    fn confirmed(id: &str, sender: &str) -> MessageRecord {
        MessageRecord::confirmed(
            ConfirmedId::new(id),
            UserId::from(sender),
            format!("message {}", id),
            Utc::now(),
        )
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = session();
        assert_eq!(session.conversation_id(), "course-42");
        assert!(session.snapshot().is_empty());
        assert_eq!(session.raw_len(), 0);
        assert_eq!(session.pending_count(), 0);
    }

    #[test]
    fn test_send_then_echo() {
        let mut session = session();
        session.load_history(vec![confirmed("c1", "prof")]);

        let (pending_id, record) = session.send_local("  on my way  ").unwrap();
        assert_eq!(record.body, "on my way");
        assert_eq!(session.pending_count(), 1);
        assert_eq!(session.snapshot().len(), 2);

        let echo = record.confirm(ConfirmedId::new("c2"));
        let snapshot = session.receive(echo);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[1].record.confirmed_key(), Some("c2"));
        assert_eq!(snapshot[1].record.pending_key(), Some(pending_id.as_str()));
        assert_eq!(session.pending_count(), 0);
        assert_eq!(session.raw_len(), 3);
    }

    #[test]
    fn test_empty_message_rejected() {
        let mut session = session();
        assert!(matches!(
            session.send_local("   "),
            Err(Error::InvalidOperation(_))
        ));
        assert_eq!(session.raw_len(), 0);
    }

    #[test]
    fn test_history_page_truncated_to_newest() {
        let mut session = ChatSession::new(
            "course-42",
            ConversationKind::Group,
            UserId::from("me"),
            SessionConfig { history_limit: 2 },
        );

        let snapshot = session.load_history(vec![
            confirmed("c1", "a"),
            confirmed("c2", "a"),
            confirmed("c3", "b"),
        ]);

        let ids: Vec<_> = snapshot
            .iter()
            .filter_map(|e| e.record.confirmed_key())
            .collect();
        assert_eq!(ids, vec!["c2", "c3"]);
    }

    #[test]
    fn test_redundant_push_and_fetch() {
        let mut session = session();
        session.receive(confirmed("c1", "prof"));
        session.load_history(vec![confirmed("c1", "prof"), confirmed("c2", "me")]);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(session.raw_len(), 3);
    }

    #[test]
    fn test_snapshots_are_immutable() {
        let mut session = session();
        let before = session.receive(confirmed("c1", "prof"));
        session.receive(confirmed("c2", "prof"));
        assert_eq!(before.len(), 1);
        assert_eq!(session.snapshot().len(), 2);
    }
}
