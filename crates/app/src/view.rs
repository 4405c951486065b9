//! Chat view state
//!
//! Owns the session buffer and the directory cache for the open
//! conversation and turns source events into fresh transcripts.

use std::sync::Arc;

use spaceroom_core::{
    build_transcript, ChatSession, Config, ConversationKind, InMemoryDirectory, MessageRecord,
    Result, TranscriptConfig, TranscriptLine, UserDirectory, UserId, ViewEntry,
};
use spaceroom_net::SourceEvent;
use tracing::debug;

pub struct ChatView {
    session: ChatSession,
    directory: InMemoryDirectory,
    transcript: TranscriptConfig,
}

impl ChatView {
    pub fn new(
        conversation_id: &str,
        kind: ConversationKind,
        current_user: UserId,
        config: &Config,
    ) -> Self {
        Self {
            session: ChatSession::new(
                conversation_id,
                kind,
                current_user,
                config.session.clone(),
            ),
            directory: InMemoryDirectory::new(),
            transcript: config.transcript.clone(),
        }
    }

    pub fn conversation_id(&self) -> &str {
        self.session.conversation_id()
    }

    /// Apply a source event. Returns false once the source has disconnected.
    pub fn apply(&mut self, event: SourceEvent) -> bool {
        match event {
            SourceEvent::History(batch) => {
                self.session.load_history(batch);
            }
            SourceEvent::Message(record) => {
                self.session.receive(record);
            }
            SourceEvent::Profile(profile) => {
                self.directory.upsert(profile);
                debug!(known = self.directory.len(), "Directory updated");
            }
            SourceEvent::Presence { user_id, presence } => {
                if !self.directory.set_presence(&user_id, presence) {
                    debug!(user_id = %user_id, "Presence for unknown user ignored");
                }
            }
            SourceEvent::Disconnected => {
                debug!("Source disconnected");
                return false;
            }
        }
        true
    }

    /// Add an optimistic message, returning the record to submit
    pub fn send(&mut self, body: &str) -> Result<MessageRecord> {
        let (_, record) = self.session.send_local(body)?;
        Ok(record)
    }

    pub fn snapshot(&self) -> Arc<[ViewEntry]> {
        self.session.snapshot()
    }

    pub fn pending_count(&self) -> usize {
        self.session.pending_count()
    }

    pub fn directory(&self) -> &dyn UserDirectory {
        &self.directory
    }

    pub fn transcript_config(&self) -> &TranscriptConfig {
        &self.transcript
    }

    /// Transcript lines for the current snapshot
    pub fn lines(&self) -> Vec<TranscriptLine> {
        build_transcript(
            &self.snapshot(),
            self.directory(),
            &self.session.context(),
            &self.transcript,
        )
    }
}
