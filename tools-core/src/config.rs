use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::ToolError;

pub const DEFAULT_GEOCODE_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_USER_AGENT: &str = "assistant-tools/1.0";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// geocode_url = "https://nominatim.openstreetmap.org/search"
/// forecast_url = "https://api.open-meteo.com/v1/forecast"
/// user_agent = "assistant-tools/1.0"
/// timeout_secs = 10
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Place-search endpoint (Nominatim compatible).
    pub geocode_url: String,

    /// Hourly forecast endpoint (Open-Meteo compatible).
    pub forecast_url: String,

    /// Client label sent as `User-Agent` to the geocoder.
    pub user_agent: String,

    /// Request timeout; `None` keeps the HTTP client default.
    pub timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geocode_url: DEFAULT_GEOCODE_URL.to_string(),
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: None,
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self, ToolError> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ToolError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            ToolError::Config(format!("Failed to read config file {}: {e}", path.display()))
        })?;

        toml::from_str(&contents).map_err(|e| {
            ToolError::Config(format!("Failed to parse config file {}: {e}", path.display()))
        })
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf, ToolError> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ToolError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ToolError::Config(format!(
                    "Failed to create config directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let toml = toml::to_string_pretty(self)
            .map_err(|e| ToolError::Config(format!("Failed to serialize configuration: {e}")))?;

        fs::write(path, toml).map_err(|e| {
            ToolError::Config(format!("Failed to write config file {}: {e}", path.display()))
        })
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf, ToolError> {
        let dirs = ProjectDirs::from("dev", "assistant-tools", "assistant-tools").ok_or_else(
            || ToolError::Config("Could not determine platform config directory".to_string()),
        )?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
