use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::settings::{IMPORTED_NAMES, NAME_CREATURES, REMEMBER_NAMES};

/// Top-level configuration structure that mirrors the YAML configuration
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// General application configuration
    #[serde(default)]
    pub general: GeneralConfig,
    /// Automatic naming behaviour
    #[serde(default)]
    pub naming: NamingConfig,
    /// Seed names imported on first run
    #[serde(default)]
    pub seed: SeedConfig,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.general.data_dir.as_os_str().is_empty() {
            return Err(ValidationError::InvalidGeneral(
                "data_dir cannot be empty".to_string(),
            ));
        }

        if self.naming.update_interval.is_zero() {
            return Err(ValidationError::InvalidNaming(
                "update_interval must be greater than zero".to_string(),
            ));
        }

        if self.naming.remember_interval < self.naming.update_interval {
            return Err(ValidationError::InvalidNaming(format!(
                "remember_interval ({:?}) cannot be shorter than update_interval ({:?})",
                self.naming.remember_interval,
                self.naming.update_interval,
            )));
        }

        if let Some(path) = &self.seed.path {
            if path.as_os_str().is_empty() {
                return Err(ValidationError::InvalidSeed(
                    "seed path cannot be empty when given".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// General configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory holding the name and settings collections
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// (Optional) Default log filter when RUST_LOG is unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

/// Defaults for the naming settings and the host polling cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Give unnamed creatures a name from the registry
    #[serde(default = "default_true")]
    pub name_creatures: bool,
    /// Periodically re-apply names so creatures keep remembering them
    #[serde(default)]
    pub make_creatures_remember_their_name: bool,
    /// How often the host is polled (e.g., "15s")
    #[serde(default = "default_update_interval", with = "humantime_serde")]
    pub update_interval: Duration,
    /// How often names are re-applied (e.g., "90s")
    #[serde(default = "default_remember_interval", with = "humantime_serde")]
    pub remember_interval: Duration,
}

impl NamingConfig {
    /// Number of updates between two name refreshes
    pub fn remember_every(&self) -> u64 {
        let update = self.update_interval.as_millis().max(1);
        (self.remember_interval.as_millis() / update).max(1) as u64
    }

    /// Default values registered with the settings table
    pub fn setting_defaults(&self) -> HashMap<String, Value> {
        HashMap::from([
            (IMPORTED_NAMES.to_string(), Value::Bool(false)),
            (NAME_CREATURES.to_string(), Value::Bool(self.name_creatures)),
            (
                REMEMBER_NAMES.to_string(),
                Value::Bool(self.make_creatures_remember_their_name),
            ),
        ])
    }
}

/// Seed name source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedConfig {
    /// (Optional) YAML file with `male`/`female` generation lists; the
    /// built-in lists are used when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Validation errors for configuration
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid naming configuration: {0}")]
    InvalidNaming(String),
    #[error("Invalid seed configuration: {0}")]
    InvalidSeed(String),
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("albian_data")
}

fn default_true() -> bool {
    true
}

fn default_update_interval() -> Duration {
    Duration::from_secs(15)
}

fn default_remember_interval() -> Duration {
    Duration::from_secs(90)
}

/// Default implementation for GeneralConfig
impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: Some("info".to_string()),
        }
    }
}

/// Default implementation for NamingConfig
impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            name_creatures: true,
            make_creatures_remember_their_name: false,
            update_interval: default_update_interval(),
            remember_interval: default_remember_interval(),
        }
    }
}
