//! Global Explorer configuration.

use std::path::{Path, PathBuf};

use config::File;
use serde::{Deserialize, Serialize};

use crate::error::{ExplorerError, ExplorerResult};
use crate::mirror::remote::Remote;
use crate::notify::DEFAULT_NOTIFICATION_TITLE;

static DEFAULT_DATA_PATH: &str = "~/.local/share/explorer";

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "EXPLORER_CONFIG";

/// Log filter for the explorer binaries (`tracing_subscriber::EnvFilter` syntax).
pub const LOG_ENV: &str = "EXPLORER_LOG";

fn default_data_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_PATH)
}

fn default_notification_title() -> String {
    DEFAULT_NOTIFICATION_TITLE.to_string()
}

/// Where reminders are mirrored to.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MirrorConfig {
    /// Destination list id; when absent a list is picked per reminder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<String>,
    #[serde(flatten)]
    pub remote: Remote,
}

/// Configuration at ~/.config/explorer/config.toml
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_data_path")]
    pub data_dir: PathBuf,

    #[serde(default = "default_notification_title")]
    pub notification_title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror: Option<MirrorConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: default_data_path(),
            notification_title: default_notification_title(),
            mirror: None,
        }
    }
}

impl Config {
    pub fn config_path() -> ExplorerResult<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_dir = dirs::config_dir()
            .ok_or_else(|| ExplorerError::Config("Could not determine config directory".into()))?
            .join("explorer");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config, writing a commented-out default file on first use.
    pub fn load() -> ExplorerResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> ExplorerResult<Self> {
        config::Config::builder()
            .add_source(File::from(path).required(false))
            .build()
            .map_err(|e| ExplorerError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ExplorerError::Config(e.to_string()))
    }

    /// The data directory with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();
        PathBuf::from(full_path_str)
    }

    pub fn reminders_path(&self) -> PathBuf {
        self.data_path().join("reminders")
    }

    pub fn notifications_path(&self) -> PathBuf {
        self.data_path().join("notifications.toml")
    }

    pub fn pending_sync_path(&self) -> PathBuf {
        self.data_path().join("pending-sync.toml")
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> ExplorerResult<()> {
        let contents = format!(
            "\
# Explorer configuration

# Where reminders are stored:
# data_dir = \"{DEFAULT_DATA_PATH}\"

# Title shown on reminder notifications:
# notification_title = \"{DEFAULT_NOTIFICATION_TITLE}\"

# Mirror reminders into an external task list:
# [mirror]
# provider = \"ics\"
# ics_dir = \"~/Reminders\"
# list = \"inbox\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ExplorerError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| ExplorerError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
