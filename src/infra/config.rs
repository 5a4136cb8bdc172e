//! Configuration loading from TOML files
//!
//! Config file is selected via:
//! 1. --config <path> command line argument
//! 2. CONFIG_FILE environment variable
//! 3. Default: config/dev.toml

use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_settings_file")]
    pub settings_file: String,
    #[serde(default = "default_contacts_file")]
    pub contacts_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { settings_file: default_settings_file(), contacts_file: default_contacts_file() }
    }
}

fn default_settings_file() -> String {
    "data/settings.json".to_string()
}

fn default_contacts_file() -> String {
    "data/contacts.json".to_string()
}

/// Optional fixed coordinate for hosts without a live geolocation capability
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LocationConfig {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct TomlConfig {
    #[serde(default)]
    storage: StorageConfig,
    #[serde(default)]
    location: LocationConfig,
}

/// Main configuration struct used by the binary
#[derive(Debug, Clone)]
pub struct Config {
    settings_file: String,
    contacts_file: String,
    fixed_location: Option<(f64, f64)>,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        let storage = StorageConfig::default();
        Self {
            settings_file: storage.settings_file,
            contacts_file: storage.contacts_file,
            fixed_location: None,
            config_file: "default".to_string(),
        }
    }
}

impl Config {
    /// Determine config file path from the environment
    pub fn resolve_config_path() -> String {
        if let Ok(path) = env::var("CONFIG_FILE") {
            return path;
        }
        "config/dev.toml".to_string()
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        let fixed_location = match (toml_config.location.lat, toml_config.location.lng) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        };

        Ok(Self {
            settings_file: toml_config.storage.settings_file,
            contacts_file: toml_config.storage.contacts_file,
            fixed_location,
            config_file: path.display().to_string(),
        })
    }

    /// Load configuration - tries the TOML file first, falls back to defaults
    pub fn load_from_path(path: &str) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    pub fn settings_file(&self) -> &str {
        &self.settings_file
    }

    pub fn contacts_file(&self) -> &str {
        &self.contacts_file
    }

    pub fn fixed_location(&self) -> Option<(f64, f64)> {
        self.fixed_location
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }
}
