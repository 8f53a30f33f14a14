use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{
    device::{
        DEFAULT_IP_URL, FixedPositionService, IpPositionService, PermissionGate, PermissionPolicy,
        PermissionPrompt,
    },
    location::PositionService,
    model::{Coordinate, Units},
    provider::openweather::{DEFAULT_BASE_URL, DEFAULT_GEO_URL},
};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "WEATHER_API_KEY";

/// Where "use my location" gets its position from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Pinned position; when absent the position is looked up by IP.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub ip_url: Option<String>,
}

impl DeviceConfig {
    pub fn pinned(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
            _ => None,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = "metric"
/// location_permission = "ask"
///
/// [device]
/// latitude = 60.17
/// longitude = 24.94
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub api_key: Option<String>,

    #[serde(default)]
    pub units: Units,

    pub base_url: Option<String>,
    pub geo_url: Option<String>,

    #[serde(default)]
    pub location_permission: PermissionPolicy,

    #[serde(default)]
    pub device: DeviceConfig,
}

impl Config {
    /// Load config from disk (or defaults on first run) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            cfg.apply_api_key_override(Some(key));
        }

        Ok(cfg)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Non-empty override wins over the stored key.
    pub fn apply_api_key_override(&mut self, key: Option<String>) {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn api_key(&self) -> Option<String> {
        self.api_key.clone().filter(|k| !k.trim().is_empty())
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn geo_url(&self) -> &str {
        self.geo_url.as_deref().unwrap_or(DEFAULT_GEO_URL)
    }

    pub fn ip_url(&self) -> &str {
        self.device.ip_url.as_deref().unwrap_or(DEFAULT_IP_URL)
    }

    /// Position service for "use my location": pinned coordinates if configured, else IP lookup.
    pub fn position_service(
        &self,
        prompt: Option<Box<dyn PermissionPrompt>>,
    ) -> Box<dyn PositionService> {
        let gate = PermissionGate::new(self.location_permission, prompt);
        match self.device.pinned() {
            Some(at) => Box::new(FixedPositionService::new(gate, Some(at))),
            None => Box::new(IpPositionService::new(gate, self.ip_url())),
        }
    }
}
