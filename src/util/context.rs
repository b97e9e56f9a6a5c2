//! Process context for berth operations.
//!
//! Holds the home folder, the cache folder, and the configured remotes.
//! It is built once by the binary and handed to every operation; nothing
//! reads it from a global.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::util::config::Config;

/// Environment variable overriding the home folder.
pub const HOME_ENV: &str = "BERTH_HOME";

/// Label used for the local cache in multi-source results.
pub const LOCAL_CACHE: &str = "Local Cache";

/// A configured remote index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    /// Remote name, used with `--remote`
    pub name: String,

    /// Location of the remote index document
    pub url: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl RemoteEntry {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        RemoteEntry {
            name: name.into(),
            url: url.into(),
            enabled: true,
        }
    }

    /// Disable this remote.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Configured remotes, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct RemoteList {
    remotes: Vec<RemoteEntry>,
}

impl RemoteList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(remotes: Vec<RemoteEntry>) -> Self {
        RemoteList { remotes }
    }

    /// Add a remote, replacing one with the same name.
    pub fn add(&mut self, entry: RemoteEntry) {
        match self.remotes.iter_mut().find(|r| r.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.remotes.push(entry),
        }
    }

    /// Enabled remotes in declaration order.
    pub fn enabled(&self) -> impl Iterator<Item = &RemoteEntry> {
        self.remotes.iter().filter(|r| r.enabled)
    }

    pub fn by_name(&self, name: &str) -> Option<&RemoteEntry> {
        self.remotes.iter().find(|r| r.name == name)
    }

    /// Find a remote by name, failing if it is not configured.
    pub fn get(&self, name: &str) -> Result<&RemoteEntry> {
        match self.by_name(name) {
            Some(remote) => Ok(remote),
            None => bail!("remote '{}' not found", name),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.remotes.is_empty()
    }
}

/// The process context.
#[derive(Debug, Clone)]
pub struct BerthContext {
    /// Home folder (`$BERTH_HOME`, else `~/.berth`)
    home: PathBuf,

    /// Package folder, holding the metadata store
    cache_folder: PathBuf,

    config: Config,

    remotes: RemoteList,
}

impl BerthContext {
    /// Build the context from the environment and `<home>/config.toml`.
    pub fn new() -> Result<Self> {
        let home = match std::env::var_os(HOME_ENV) {
            Some(home) if !home.is_empty() => PathBuf::from(home),
            _ => directories::BaseDirs::new()
                .map(|b| b.home_dir().join(".berth"))
                .context("could not determine the home directory; set BERTH_HOME")?,
        };

        Ok(Self::with_home(home))
    }

    /// Build the context for an explicit home folder.
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let config = Config::load_or_default(&home.join("config.toml"));

        let cache_folder = match &config.cache.folder {
            Some(folder) if folder.is_absolute() => folder.clone(),
            Some(folder) => home.join(folder),
            None => home.join("p"),
        };
        let remotes = config.remote_list();

        tracing::debug!(
            home = %home.display(),
            cache = %cache_folder.display(),
            "berth context"
        );

        BerthContext {
            home,
            cache_folder,
            config,
            remotes,
        }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Folder holding recipe and package layouts.
    pub fn cache_folder(&self) -> &Path {
        &self.cache_folder
    }

    /// Path of the cache metadata store.
    pub fn metadata_path(&self) -> PathBuf {
        self.cache_folder.join("metadata.json")
    }

    /// Path of the configuration file.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn remotes(&self) -> &RemoteList {
        &self.remotes
    }

    pub fn non_interactive(&self) -> bool {
        self.config.core.non_interactive
    }
}
