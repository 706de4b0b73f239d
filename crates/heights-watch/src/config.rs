//! Application configuration.

use crate::error::{AppError, AppResult};
use heights_hub::HubConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Watcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Symbols to watch.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
    /// Interval for the connection state summary line (seconds).
    #[serde(default = "default_status_interval_secs")]
    pub status_interval_secs: u64,
    /// Hub settings (feed URL, reconnect policy, REST fallback).
    #[serde(default)]
    pub hub: HubConfig,
}

fn default_symbols() -> Vec<String> {
    vec!["BTC".to_string(), "ETH".to_string(), "SOL".to_string()]
}

fn default_status_interval_secs() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            status_interval_secs: default_status_interval_secs(),
            hub: HubConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file.
    pub fn load() -> AppResult<Self> {
        let config_path =
            std::env::var("HEIGHTS_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }
}
