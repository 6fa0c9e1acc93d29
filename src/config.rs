//! Global CLI configuration management
//!
//! Stores the backend URL and local data directory in ~/.effectif/config.json

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use effectif_proto::DEFAULT_API_URL;

/// Global CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectifConfig {
    /// Backend origin used when --api-url is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Local data directory used when --data-dir is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl EffectifConfig {
    /// Backend URL: command line first, then the config file, then the default
    pub fn resolve_api_url(&self, flag: Option<String>) -> String {
        flag.or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Local data directory, if local mode is selected
    pub fn resolve_data_dir(&self, flag: Option<PathBuf>) -> Option<PathBuf> {
        flag.or_else(|| self.data_dir.clone())
    }
}

/// Configuration manager
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Manager for ~/.effectif/config.json
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: Self::get_config_path()?,
        })
    }

    /// Manager for a custom file (for testing)
    #[cfg(test)]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Get the config file path
    fn get_config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home.join(".effectif").join("config.json"))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load the configuration from disk
    pub fn load(&self) -> Result<EffectifConfig> {
        // Return default config if file doesn't exist
        if !self.path.exists() {
            return Ok(EffectifConfig::default());
        }

        let json = fs::read_to_string(&self.path)
            .context(format!("Failed to read config file: {:?}", self.path))?;

        let config: EffectifConfig = serde_json::from_str(&json)
            .context(format!("Failed to parse config file: {:?}", self.path))?;

        Ok(config)
    }

    /// Save the configuration to disk
    pub fn save(&self, config: &EffectifConfig) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create config directory: {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(config).context("Failed to serialize config")?;

        fs::write(&self.path, json)
            .context(format!("Failed to write config file: {:?}", self.path))?;

        Ok(())
    }

    pub fn set_api_url(&self, url: String) -> Result<()> {
        let mut config = self.load()?;
        config.api_url = Some(url);
        self.save(&config)
    }

    pub fn set_data_dir(&self, dir: PathBuf) -> Result<()> {
        let mut config = self.load()?;
        config.data_dir = Some(dir);
        self.save(&config)
    }

    /// Reset every setting
    pub fn clear(&self) -> Result<()> {
        self.save(&EffectifConfig::default())
    }
}
