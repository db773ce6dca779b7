//! Persisted client configuration.
//!
//! Stores connection defaults and launcher preferences as versioned JSON in
//! the platform config directory. Missing files fall back to defaults;
//! corrupted files surface as errors rather than being silently replaced.

use crate::channel::{ConnectionConfig, SecurityMode};
use crate::error::config::ConfigError;
use crate::{DEFAULT_SERVICE_PORT, READER_SERVICE_HOSTNAME};

use common::ErrorLocation;

use std::panic::Location;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_DIR_NAME: &str = "absorbance96-client";
const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionDefaults {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub insecure: bool,
    /// Pinned self-signed certificate, if the service's was saved.
    pub trusted_cert: Option<PathBuf>,
}

impl Default for ConnectionDefaults {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            insecure: false,
            trusted_cert: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LauncherPreferences {
    /// Launch the vendor application automatically when none is running.
    #[serde(default)]
    pub auto_launch: bool,
    #[serde(default)]
    pub headless: bool,
    /// Explicit application path for installs outside the usual locations.
    pub app_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub connection: ConnectionDefaults,

    #[serde(default)]
    pub launcher: LauncherPreferences,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            connection: ConnectionDefaults::default(),
            launcher: LauncherPreferences::default(),
        }
    }
}

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_host() -> String {
    READER_SERVICE_HOSTNAME.to_string()
}
fn default_port() -> u16 {
    DEFAULT_SERVICE_PORT
}

/// Platform config directory for this client.
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME))
        .ok_or_else(|| ConfigError::DirectoryNotFound {
            location: ErrorLocation::from(Location::caller()),
        })
}

impl ClientConfig {
    /// Load config from {config_dir}/config.json.
    ///
    /// Returns defaults if the file is missing; a file that exists but
    /// cannot be read or parsed is an error.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).map_err(|e| ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            })?;

        let config: ClientConfig =
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to {config_dir}/config.json using atomic write
    /// (temp file + rename).
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{CONFIG_FILE_NAME}.tmp"));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid version: {} (expected 1-{CONFIG_VERSION})",
                    self.version
                ),
            });
        }

        if self.connection.host.is_empty() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: String::from("Connection host cannot be empty"),
            });
        }

        Ok(())
    }

    /// Build channel settings from the stored connection defaults.
    pub fn connection_config(&self) -> ConnectionConfig {
        let security = if self.connection.insecure {
            SecurityMode::Insecure
        } else {
            SecurityMode::SelfSigned {
                trusted_cert: self.connection.trusted_cert.clone(),
            }
        };

        ConnectionConfig {
            host: self.connection.host.clone(),
            port: self.connection.port,
            security,
            ..ConnectionConfig::default()
        }
    }
}
