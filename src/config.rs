//! Server configuration, read from a RON file.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Knobs owned by the surrounding server rather than the engine itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Battle log lines kept server-side after each command.
    pub log_retention: usize,
    /// Battle log lines included in a snapshot sent to the client.
    pub client_log_window: usize,
    /// Append a "Rejected: ..." line to the battle log for rejected commands.
    pub record_rejections: bool,
    /// Tracing filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_retention: 50,
            client_log_window: 8,
            record_rejections: true,
            log_filter: "info".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path)?;
        Self::from_ron_str(&source)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }
}
