//! YAML configuration for dlookup.
//!
//! The file lives at `~/.config/dlookup/config.yaml` on most platforms and is
//! created with defaults on first launch. `DLOOKUP_CONFIG_PATH` overrides the
//! location. Every section is optional; missing fields take their defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::expand_tilde;
use crate::path_processing::app_config_dir;

/// Environment variable allowing callers to override the config file path.
pub const CONFIG_PATH_ENV: &str = "DLOOKUP_CONFIG_PATH";

/// Default filename for the YAML payload.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Error surfaced when reading or writing the configuration fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a configuration directory")]
    NoConfigDir,
    #[error("config I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error parsing config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("error serializing config: {0}")]
    Serialize(#[source] serde_yaml::Error),
}

/// Configurable key actions, written as `[modifier+]key` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Keybindings {
    pub quit: String,
    pub new_tab: String,
    pub close_tab: String,
    pub next_tab: String,
    pub prev_tab: String,
    /// Leave the current view (results, list, interval prompt).
    pub back: String,
    pub confirm: String,
    /// Open the watch interval prompt from a result view.
    pub watch_toggle: String,
}

impl Default for Keybindings {
    fn default() -> Self {
        Self {
            quit: "ctrl+c".into(),
            new_tab: "ctrl+n".into(),
            close_tab: "ctrl+w".into(),
            next_tab: "ctrl+right".into(),
            prev_tab: "ctrl+left".into(),
            back: "esc".into(),
            confirm: "enter".into(),
            watch_toggle: "w".into(),
        }
    }
}

/// Comprehensive report tuning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Per-provider timeout in seconds; `None` waits for every provider.
    pub provider_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchSettings {
    /// Value pre-filled in the interval prompt.
    pub default_interval_secs: u64,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self { default_interval_secs: 5 }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub keybindings: Keybindings,
    pub report: ReportSettings,
    pub watch: WatchSettings,
}

impl AppConfig {
    /// Resolve the config path: the env override first, then the platform default.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Ok(expand_tilde(trimmed));
            }
        }
        app_config_dir()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load the config at `path`, writing defaults when the file does not exist.
    ///
    /// Failing to write the default file is logged and otherwise ignored.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(data) => serde_yaml::from_str(&data).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                match config.save(path) {
                    Ok(()) => info!(path = %path.display(), "wrote default config"),
                    Err(error) => warn!(path = %path.display(), error = %error, "could not save default config"),
                }
                Ok(config)
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let data = serde_yaml::to_string(self).map_err(ConfigError::Serialize)?;
        fs::write(path, data).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
