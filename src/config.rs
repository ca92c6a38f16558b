//! Configuration handling for the authentication exchange

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub exchange: ExchangeSettings,
    pub prompt: PromptSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExchangeSettings {
    /// Abort the session when a form sits unanswered this long.
    /// Zero waits forever.
    pub answer_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSettings {
    /// Heading shown above each form on the terminal
    pub title: String,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            title: "VPN authentication".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).expect("Failed to serialize config");
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from the default locations, falling back to defaults
    ///
    /// Tries `oc-auth.toml` in the current directory first, then
    /// `oc-auth/config.toml` under the user's config directory.
    pub fn discover() -> Self {
        let local_config = PathBuf::from("oc-auth.toml");
        if local_config.exists() {
            if let Ok(config) = Self::load(&local_config) {
                return config;
            }
        }

        if let Some(dir) = dirs::config_dir() {
            let user_config = dir.join("oc-auth").join("config.toml");
            if user_config.exists() {
                if let Ok(config) = Self::load(&user_config) {
                    return config;
                }
            }
        }

        info!("No config file found, using defaults");
        Self::default()
    }

    /// The configured answer timeout, if bounded.
    pub fn answer_timeout(&self) -> Option<Duration> {
        match self.exchange.answer_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
