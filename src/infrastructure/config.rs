//! Configuration file management.
//!
//! Handles loading and saving TOML configuration files. The pager tunables
//! bound upstream load per call; they do not affect correctness.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{ExportError, Result};

/// Default configuration file content.
const DEFAULT_CONFIG: &str = r#"# wa-export Configuration
# Auto-generated - edit as needed

[pager]
# Maximum messages fetched per backward page
batch_size = 500

# Courtesy delay between page fetches in milliseconds
batch_delay_ms = 400

# Pause between chats in milliseconds
chat_delay_ms = 500

[output]
# Directory export files are written to
dir = "."

# Label used for messages sent by the account itself
self_label = "me"
"#;

/// Backward pager tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PagerConfig {
    /// Maximum messages fetched per page.
    pub batch_size: usize,
    /// Delay between successive page fetches, in milliseconds.
    pub batch_delay_ms: u64,
    /// Pause between chats, in milliseconds.
    pub chat_delay_ms: u64,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            batch_size: 500,
            batch_delay_ms: 400,
            chat_delay_ms: 500,
        }
    }
}

impl PagerConfig {
    /// Inter-batch courtesy delay.
    #[must_use]
    pub const fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    /// Inter-chat pause.
    #[must_use]
    pub const fn chat_delay(&self) -> Duration {
        Duration::from_millis(self.chat_delay_ms)
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory export files are written to.
    pub dir: PathBuf,
    /// Label used for self-sent messages.
    pub self_label: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            self_label: "me".into(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pager: PagerConfig,
    pub output: OutputConfig,
}

impl AppConfig {
    /// Default data directory (`~/.wa-export`).
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".wa-export")
    }
}

/// Load configuration from file or create default.
///
/// # Errors
/// Returns error if file exists but cannot be read or parsed.
pub fn load_config() -> Result<AppConfig> {
    let config_path = config_file_path();

    if config_path.exists() {
        load_config_from_file(&config_path)
    } else {
        Ok(AppConfig::default())
    }
}

/// Load configuration from a specific file.
///
/// # Errors
/// Returns error if file cannot be read or parsed.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| ExportError::io(format!("Failed to read config file: {}", path.display()), e))?;

    toml::from_str(&content).map_err(|e| ExportError::Config {
        message: format!("Failed to parse config file: {e}"),
    })
}

/// Create default configuration file if it doesn't exist.
///
/// # Errors
/// Returns error if file cannot be created.
pub fn ensure_config_exists() -> Result<()> {
    let config_path = config_file_path();

    if !config_path.exists() {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ExportError::io("Failed to create config directory", e))?;
        }

        fs::write(&config_path, DEFAULT_CONFIG)
            .map_err(|e| ExportError::io("Failed to create default config", e))?;

        tracing::info!(path = %config_path.display(), "Created default configuration");
    }

    Ok(())
}

/// Get the path to the configuration file.
#[must_use]
pub fn config_file_path() -> PathBuf {
    AppConfig::default_data_dir().join("config.toml")
}
