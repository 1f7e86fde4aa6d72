//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration comes from an optional TOML file. A missing file
//! is not an error: the service logs a warning and starts with compiled
//! defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "TRACKIT_ROOT_FOLDER";

/// Environment variable overriding the insight provider API key
pub const INSIGHT_API_KEY_ENV: &str = "TRACKIT_INSIGHT_API_KEY";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "trackit.db";

/// Bootstrap configuration loaded from TOML
///
/// These settings cannot change while the service is running.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Folder holding the database (optional, see [`resolve_root_folder`])
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Interface to bind the HTTP server to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub relay: RelayConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,

    #[serde(default)]
    pub insight: InsightConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            bind_addr: default_bind_addr(),
            port: default_port(),
            logging: LoggingConfig::default(),
            relay: RelayConfig::default(),
            notifications: NotificationConfig::default(),
            insight: InsightConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Real-time relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Frames buffered per connection before new frames are dropped
    #[serde(default = "default_outbox_capacity")]
    pub outbox_capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            outbox_capacity: default_outbox_capacity(),
        }
    }
}

/// Client notification cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Maximum notifications kept per session
    #[serde(default = "default_notification_capacity")]
    pub capacity: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            capacity: default_notification_capacity(),
        }
    }
}

/// Which insight provider backs the AI endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InsightProviderKind {
    /// Fixed analysis objects, no external calls
    #[default]
    Canned,
    /// OpenAI-style chat completion endpoint
    Completion,
}

/// Insight provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightConfig {
    #[serde(default)]
    pub provider: InsightProviderKind,

    /// Base URL of the completion API (e.g. `https://api.example.com/v1`)
    #[serde(default)]
    pub base_url: Option<String>,

    /// API key sent as a bearer token
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model name passed through to the completion API
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            provider: InsightProviderKind::default(),
            base_url: None,
            api_key: None,
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl InsightConfig {
    /// API key with the environment override applied
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var(INSIGHT_API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()))
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5730
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_outbox_capacity() -> usize {
    64
}

fn default_notification_capacity() -> usize {
    50
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Load TOML configuration
///
/// A missing file yields compiled defaults. A file that exists but cannot
/// be parsed is a configuration error. Does not log: callers run this
/// before their subscriber is installed and report the outcome afterwards.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    Ok(config)
}

/// Default configuration file path for the platform
///
/// `~/.config/trackit/config.toml` on Linux, the platform config dir
/// elsewhere.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("trackit").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("/etc/trackit/config.toml"))
}

/// Root folder resolution, highest priority first:
/// 1. Command-line argument
/// 2. Environment variable `TRACKIT_ROOT_FOLDER`
/// 3. TOML `root_folder`
/// 4. OS-dependent compiled default
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("trackit"))
        .unwrap_or_else(|| PathBuf::from("./trackit_data"))
}

/// Create the root folder if missing and return the database path inside it
pub fn prepare_root_folder(root_folder: &Path) -> Result<PathBuf> {
    if !root_folder.exists() {
        std::fs::create_dir_all(root_folder)?;
        info!("Created root folder: {}", root_folder.display());
    }
    Ok(root_folder.join(DATABASE_FILE))
}
