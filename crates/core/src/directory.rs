//! User directory lookup
//!
//! The directory cache is filled by whoever owns the push channel. Rendering
//! only ever reads it through [`UserDirectory`].

use std::collections::HashMap;

use tracing::trace;

use crate::models::{Presence, UserId, UserProfile};

/// Read-only lookup of sender display metadata
pub trait UserDirectory {
    /// Find the cached profile for a user
    fn lookup(&self, id: &UserId) -> Option<UserProfile>;
}

/// Avatar to show next to a sender
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Avatar {
    /// Profile picture URL
    Image(String),
    /// First letter of the display name
    Initial(char),
    /// Generic placeholder when nothing is known about the sender
    Glyph(char),
}

impl Avatar {
    /// Resolve the avatar for a possibly missing profile
    pub fn resolve(profile: Option<&UserProfile>, placeholder: char) -> Self {
        match profile {
            Some(UserProfile {
                avatar_url: Some(url),
                ..
            }) if !url.trim().is_empty() => Avatar::Image(url.clone()),
            Some(profile) => profile
                .initial()
                .map(Avatar::Initial)
                .unwrap_or(Avatar::Glyph(placeholder)),
            None => Avatar::Glyph(placeholder),
        }
    }
}

/// In-memory directory cache
#[derive(Debug, Default, Clone)]
pub struct InMemoryDirectory {
    profiles: HashMap<UserId, UserProfile>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a profile
    pub fn upsert(&mut self, profile: UserProfile) {
        trace!(user_id = %profile.id, "Directory profile updated");
        self.profiles.insert(profile.id.clone(), profile);
    }

    /// Update presence for a cached user. Returns false if the user is unknown.
    pub fn set_presence(&mut self, id: &UserId, presence: Presence) -> bool {
        match self.profiles.get_mut(id) {
            Some(profile) => {
                profile.presence = presence;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl UserDirectory for InMemoryDirectory {
    fn lookup(&self, id: &UserId) -> Option<UserProfile> {
        self.profiles.get(id).cloned()
    }
}

impl<D: UserDirectory + ?Sized> UserDirectory for &D {
    fn lookup(&self, id: &UserId) -> Option<UserProfile> {
        (**self).lookup(id)
    }
}
