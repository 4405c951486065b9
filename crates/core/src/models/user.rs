//! User model

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a platform user, as issued by the backend
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Platform roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Instructor,
    Admin,
}

impl UserRole {
    pub fn display_name(&self) -> &'static str {
        match self {
            UserRole::Student => "Student",
            UserRole::Instructor => "Instructor",
            UserRole::Admin => "Admin",
        }
    }

    /// Instructors and admins get a badge next to their name
    pub fn is_staff(&self) -> bool {
        matches!(self, UserRole::Instructor | UserRole::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Presence status as reported by the push channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Online,
    Away,
    #[default]
    Offline,
}

impl Presence {
    pub fn is_online(&self) -> bool {
        matches!(self, Presence::Online)
    }
}

/// Display metadata for a user, as cached by the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub display_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub role: UserRole,
    #[serde(default)]
    pub presence: Presence,
}

impl UserProfile {
    pub fn new(id: UserId, display_name: impl Into<String>, role: UserRole) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            avatar_url: None,
            role,
            presence: Presence::Offline,
        }
    }

    pub fn with_avatar(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }

    /// Uppercased first character of the display name
    pub fn initial(&self) -> Option<char> {
        self.display_name
            .trim()
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
    }
}
