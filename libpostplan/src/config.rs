//! Configuration management for Postplan

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::platform::{PlatformRegistry, PlatformSpec};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    /// Extra platforms (or overrides of the built-ins), keyed by platform
    /// name: `[platforms.mastodon] display_name = "Mastodon",
    /// max_content_length = 500`.
    #[serde(default)]
    pub platforms: BTreeMap<String, PlatformSpec>,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CalendarConfig {
    /// Owner-local UTC offset used for day bucketing, in minutes.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Platform assumed when a command does not name one.
    pub platform: String,
    /// Owner id assumed when a command does not name one.
    pub owner: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            platform: "linkedin".to_string(),
            owner: "default".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration, falling back to defaults when no file exists yet
    pub fn load_or_default() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Ok(Self::default_config())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            database: DatabaseConfig {
                path: "~/.local/share/postplan/posts.db".to_string(),
            },
            platforms: BTreeMap::new(),
            calendar: CalendarConfig::default(),
            defaults: DefaultsConfig::default(),
        }
    }

    /// The platform table: built-ins merged with config entries.
    pub fn platform_registry(&self) -> PlatformRegistry {
        PlatformRegistry::with_overrides(&self.platforms)
    }

    /// Owner-local offset for calendar day bucketing.
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.calendar.utc_offset_minutes * 60).unwrap_or(Utc.fix())
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("POSTPLAN_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("postplan").join("config.toml"))
}

/// Resolve the data directory path following XDG Base Directory spec
pub fn resolve_data_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| ConfigError::MissingField("data directory".to_string()))?;

    Ok(data_dir.join("postplan"))
}
