//! Configuration loading for GreenLoop
//!
//! Each setting resolves with ENV -> TOML -> compiled default
//! priority. The two external API keys are optional: a missing key
//! disables the feature that needs it rather than failing startup.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// Default listen port
pub const DEFAULT_PORT: u16 = 5680;

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen port
    pub port: u16,
    /// SQLite database file path
    pub database_path: PathBuf,
    /// Generative classification service API key (verification
    /// endpoint returns 503 when absent)
    pub classifier_api_key: Option<String>,
    /// Place-search service API key (place search returns 503 when
    /// absent)
    pub places_api_key: Option<String>,
}

/// On-disk TOML configuration (all fields optional)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub port: Option<u16>,
    pub database_path: Option<String>,
    pub classifier_api_key: Option<String>,
    pub places_api_key: Option<String>,
}

impl TomlConfig {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }
}

impl Config {
    /// Load configuration from environment variables and the optional
    /// TOML file at `~/.config/greenloop/config.toml`.
    pub fn load() -> Result<Self> {
        let toml_config = match config_file_path() {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(&path)
                    .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
                info!("Loaded config file: {}", path.display());
                TomlConfig::parse(&content)?
            }
            _ => TomlConfig::default(),
        };

        Ok(Self::from_sources(&toml_config))
    }

    /// Merge environment variables over a parsed TOML config.
    /// Split out from `load` so tests can drive it without touching
    /// the process environment.
    pub fn from_sources(toml_config: &TomlConfig) -> Self {
        let port = std::env::var("GREENLOOP_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .or(toml_config.port)
            .unwrap_or(DEFAULT_PORT);

        let database_path = std::env::var("GREENLOOP_DATABASE_PATH")
            .ok()
            .map(PathBuf::from)
            .or_else(|| toml_config.database_path.as_ref().map(PathBuf::from))
            .unwrap_or_else(default_database_path);

        let classifier_api_key = resolve_key(
            "GREENLOOP_CLASSIFIER_API_KEY",
            toml_config.classifier_api_key.as_deref(),
        );
        let places_api_key = resolve_key(
            "GREENLOOP_PLACES_API_KEY",
            toml_config.places_api_key.as_deref(),
        );

        Config {
            port,
            database_path,
            classifier_api_key,
            places_api_key,
        }
    }

    /// Log which secrets are configured. Never logs key material.
    pub fn log_key_status(&self) {
        match &self.classifier_api_key {
            Some(_) => info!("Classification API key configured"),
            None => warn!(
                "Classification API key not configured \
                 (GREENLOOP_CLASSIFIER_API_KEY) - waste verification disabled"
            ),
        }
        match &self.places_api_key {
            Some(_) => info!("Places API key configured"),
            None => warn!(
                "Places API key not configured \
                 (GREENLOOP_PLACES_API_KEY) - location search disabled"
            ),
        }
    }
}

/// Resolve one API key with ENV -> TOML priority, discarding blank
/// values from either source.
fn resolve_key(env_var: &str, toml_value: Option<&str>) -> Option<String> {
    if let Ok(key) = std::env::var(env_var) {
        if is_valid_key(&key) {
            return Some(key.trim().to_string());
        }
    }

    match toml_value {
        Some(key) if is_valid_key(key) => Some(key.trim().to_string()),
        _ => None,
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Config file path: `~/.config/greenloop/config.toml`
fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("greenloop").join("config.toml"))
}

/// Default database location: `~/.local/share/greenloop/greenloop.db`
/// (platform equivalent), falling back to the working directory.
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("greenloop").join("greenloop.db"))
        .unwrap_or_else(|| PathBuf::from("greenloop.db"))
}
