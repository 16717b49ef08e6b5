//! Bot configuration.
//!
//! Configuration lives as JSON under the user config directory
//! (`~/.dripbot/config.json`). Every field has a default so a missing file
//! is not an error; secrets fall back to environment variables.

use crate::error::{ConfigError, ConfigResult};
use crate::faucet::LEARNWEB3_API_URL;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Top-level bot configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Faucet API settings.
    pub faucet: FaucetConfig,
    /// Cache settings.
    pub cache: CacheConfig,
}

/// Faucet API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FaucetConfig {
    /// API base URL.
    pub base_url: String,
    /// API key. When absent, the `LEARNWEB3_API_KEY` environment variable
    /// is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for FaucetConfig {
    fn default() -> Self {
        Self {
            base_url: LEARNWEB3_API_URL.to_string(),
            api_key: None,
        }
    }
}

impl FaucetConfig {
    /// Resolve the API key from config or environment.
    #[must_use]
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("LEARNWEB3_API_KEY").ok())
    }
}

/// Cache configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory for the file cache. When absent, an in-memory cache is
    /// used and nothing persists across restarts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// Path to the configuration file.
#[must_use]
pub fn config_path() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".dripbot")
        .join("config.json")
}

/// Load configuration from the default path.
pub async fn load_config() -> ConfigResult<BotConfig> {
    load_config_from(&config_path()).await
}

/// Load configuration from a specific path.
pub async fn load_config_from(path: &PathBuf) -> ConfigResult<BotConfig> {
    let content = tokio::fs::read_to_string(path).await?;
    let config: BotConfig = serde_json::from_str(&content)?;
    debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}

/// Save configuration to the default path, creating directories as needed.
pub async fn save_config(config: &BotConfig) -> ConfigResult<()> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let content = serde_json::to_string_pretty(config)?;
    tokio::fs::write(&path, content).await?;
    debug!(path = %path.display(), "configuration saved");
    Ok(())
}

/// Write a default configuration file if none exists.
pub async fn init_config() -> ConfigResult<()> {
    let path = config_path();
    if path.exists() {
        return Err(ConfigError::Invalid(format!(
            "configuration already exists at {}",
            path.display()
        )));
    }
    save_config(&BotConfig::default()).await
}
