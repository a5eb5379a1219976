//! CLI configuration.
//!
//! Stored as TOML:
//! - Linux: `~/.config/bagport/config.toml`
//! - Windows: `%APPDATA%/bagport/config.toml`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service base URL.
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_host() -> String {
    bagport_api::DEFAULT_HOST.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
        }
    }
}

impl Config {
    /// Loads configuration from disk, or creates a default if not found.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path()?)
    }

    fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}

fn config_path() -> anyhow::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("no config directory"))?;
    Ok(base.join("bagport").join("config.toml"))
}
