//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the gateway base URL and the last used login email.
//!
//! Configuration is stored at `~/.config/careview/config.json`. The gateway
//! URL can be overridden per-run with the `CAREVIEW_API_BASE_URL` environment
//! variable (also honored from a `.env` file). An explicitly empty base URL
//! means requests go out with their relative path as-is, for use behind an
//! external reverse proxy.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "careview";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the gateway base URL
const BASE_URL_ENV: &str = "CAREVIEW_API_BASE_URL";

/// Default gateway address when nothing is configured
const DEFAULT_GATEWAY_URL: &str = "http://localhost:4004";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// The gateway base URL: env var wins, then the config file, then the
    /// default local gateway.
    pub fn gateway_url(&self) -> String {
        std::env::var(BASE_URL_ENV)
            .ok()
            .or_else(|| self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string())
    }
}
