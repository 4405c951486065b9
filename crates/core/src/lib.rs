//! SpaceRoom Core Library
//!
//! Chat message models, the optimistic/confirmed message reconciler, the
//! user directory lookup, transcript presentation and session buffering.

pub mod config;
pub mod directory;
pub mod error;
pub mod invariants;
pub mod models;
pub mod reconcile;
pub mod session;
pub mod transcript;

pub use config::{Config, LoggingConfig, SessionConfig, TranscriptConfig};
pub use directory::{Avatar, InMemoryDirectory, UserDirectory};
pub use error::{Error, Result};
pub use models::*;
pub use reconcile::{mark_sender_headers, reconcile};
pub use session::{ChatSession, ConversationKind};
pub use transcript::{build_transcript, TranscriptContext, TranscriptLine};
