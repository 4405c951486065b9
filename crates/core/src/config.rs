//! Client configuration
//!
//! Loaded from `spaceroom.toml`. Every field has a default, so a missing
//! file or an empty section is valid.
//!
//! ```toml
//! [session]
//! history_limit = 500
//!
//! [transcript]
//! time_format = "%H:%M"
//! placeholder_glyph = "?"
//!
//! [logging]
//! filter = "spaceroom_core=debug,info"
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "SPACEROOM_CONFIG";

const CONFIG_FILE: &str = "spaceroom.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub session: SessionConfig,
    pub transcript: TranscriptConfig,
    pub logging: LoggingConfig,
}

/// Chat session buffering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Newest records kept from a single history fetch
    pub history_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { history_limit: 500 }
    }
}

/// Transcript presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptConfig {
    /// chrono format string for message times
    pub time_format: String,
    /// Avatar glyph for senders missing from the directory
    pub placeholder_glyph: char,
    /// Sender label for senders missing from the directory
    pub unknown_sender_label: String,
    /// Text shown for a conversation without messages
    pub empty_state: String,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            time_format: "%H:%M".to_string(),
            placeholder_glyph: '?',
            unknown_sender_label: "Unknown user".to_string(),
            empty_state: "No messages yet. Say hello!".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive, `RUST_LOG` takes precedence
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Parse config from TOML text
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|source| Error::Config {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load config from a file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text, path)?;
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Load from `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Config path from `SPACEROOM_CONFIG`, else the platform config directory
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }

        let dirs = ProjectDirs::from("org", "spaceroom", "spaceroom")
            .ok_or(Error::ConfigDirUnavailable)?;
        Ok(dirs.config_dir().join(CONFIG_FILE))
    }
}
