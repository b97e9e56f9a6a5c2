//! Configuration file support.
//!
//! Berth reads a single user-wide file, `<home>/config.toml`:
//!
//! ```toml
//! [core]
//! non_interactive = true
//!
//! [cache]
//! folder = "/data/berth-cache"
//!
//! [[remotes]]
//! name = "center"
//! url = "https://example.com/index.json"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::util::context::{RemoteEntry, RemoteList};

/// Berth configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub core: CoreConfig,

    pub cache: CacheConfig,

    /// Configured remote indexes, in declaration order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remotes: Vec<RemoteEntry>,
}

/// General behaviour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Never prompt; destructive commands proceed without confirmation
    pub non_interactive: bool,
}

/// Local cache settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Override for the package folder (default: `<home>/p`)
    pub folder: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing
    /// or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create config directory: {}", parent.display())
            })?;
        }

        let contents =
            toml::to_string_pretty(self).with_context(|| "failed to serialize config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// The configured remotes.
    pub fn remote_list(&self) -> RemoteList {
        RemoteList::from_entries(self.remotes.clone())
    }
}
