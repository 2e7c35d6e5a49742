//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/calgrid/config.toml` by default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Configuration for the calgrid client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug mode.
    pub debug: bool,

    /// Display settings.
    pub display: DisplaySettings,

    /// Server/connection settings.
    pub server: ServerSettings,
}

/// Display settings for grid rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Events shown per day cell before overflowing; server default when unset.
    pub display_limit: Option<usize>,

    /// Color assigned to new events when `--color` is not given.
    pub default_color: Option<String>,
}

/// Server/connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Path to the server socket; the daemon default when unset.
    pub socket_path: Option<PathBuf>,

    /// Connection timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            socket_path: None,
            timeout_secs: 5,
        }
    }
}

impl ClientConfig {
    /// Returns the default configuration file path.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("calgrid").join("config.toml"))
    }

    /// Loads the configuration from the default path.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the file exists but cannot be
    /// read or parsed.
    pub fn load() -> ClientResult<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Loads the configuration from a specific path.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ClientError::config(format!("cannot read {}: {e}", path.display())))?;
        toml::from_str(&contents)
            .map_err(|e| ClientError::config(format!("cannot parse {}: {e}", path.display())))
    }
}
