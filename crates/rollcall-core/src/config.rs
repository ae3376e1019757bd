//! Configuration loading and typed config structures.
//!
//! Configuration lives in `rollcall-config.yaml` next to the binary's
//! working directory. Every field has a default, so a missing file or an
//! empty one is valid. Environment variables override file values:
//!
//! - `CHAT_ID` overrides `chat.chat_id`
//! - `STATE_FILE` overrides `storage.state_file`
//! - `MESSAGES_DIR` overrides `storage.messages_dir`
//! - `COOLDOWN_SECS` overrides `rate_limit.cooldown_secs`
//! - `LOG_LEVEL` overrides `logging.level`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value is present but unusable.
    #[error("invalid value for {field}: {reason}")]
    Invalid {
        /// The offending setting.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level bot configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RollcallConfig {
    /// Destination chat settings.
    #[serde(default)]
    pub chat: ChatConfig,

    /// State file and catalog locations.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Emission cooldown.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RollcallConfig {
    /// Load configuration from a YAML file and apply environment overrides.
    ///
    /// A missing file is not an error: defaults are used instead.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Self::parse_yaml(&contents)?
        } else {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string, without env overrides.
    pub fn parse_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Override values from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Override values from any variable lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("CHAT_ID") {
            self.chat.chat_id = Some(val);
        }
        if let Some(val) = lookup("STATE_FILE") {
            self.storage.state_file = PathBuf::from(val);
        }
        if let Some(val) = lookup("MESSAGES_DIR") {
            self.storage.messages_dir = PathBuf::from(val);
        }
        if let Some(val) = lookup("COOLDOWN_SECS") {
            self.rate_limit.cooldown_secs =
                val.trim().parse().map_err(|e| ConfigError::Invalid {
                    field: "COOLDOWN_SECS",
                    reason: format!("{e}"),
                })?;
        }
        if let Some(val) = lookup("LOG_LEVEL") {
            self.logging.level = val;
        }
        Ok(())
    }

    /// The destination chat, which must be set and non-blank.
    pub fn require_chat_id(&self) -> Result<&str, ConfigError> {
        self.chat
            .chat_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ConfigError::Invalid {
                field: "chat.chat_id",
                reason: "a destination chat id is required (set CHAT_ID)".to_owned(),
            })
    }
}

/// Destination chat settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatConfig {
    /// Identifier of the chat emissions are delivered to.
    #[serde(default)]
    pub chat_id: Option<String>,
}

/// Where state and catalogs live.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Path of the JSON state file.
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    /// Directory holding `messages_<category>.json` files.
    #[serde(default = "default_messages_dir")]
    pub messages_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
            messages_dir: default_messages_dir(),
        }
    }
}

/// Emission cooldown settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RateLimitConfig {
    /// Minimum seconds between two emissions. Zero disables the gate.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

impl RateLimitConfig {
    /// The cooldown as a [`Duration`].
    pub const fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_state_file() -> PathBuf {
    PathBuf::from("state.json")
}

fn default_messages_dir() -> PathBuf {
    PathBuf::from("messages_lists")
}

const fn default_cooldown_secs() -> u64 {
    1_800
}

fn default_log_level() -> String {
    "info".to_owned()
}
