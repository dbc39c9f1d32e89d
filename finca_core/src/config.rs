//! Configuration file support for Finca.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/finca/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub farm: FarmConfig,

    #[serde(default)]
    pub reminders: RemindersConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Farm identity; `operator` is recorded as the actor on audit events.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FarmConfig {
    #[serde(default = "default_farm_name")]
    pub name: String,

    #[serde(default = "default_operator")]
    pub operator: String,
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            name: default_farm_name(),
            operator: default_operator(),
        }
    }
}

/// Reminder window parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RemindersConfig {
    #[serde(default = "default_lookahead_days")]
    pub lookahead_days: i64,

    #[serde(default = "default_issuance_interval_months")]
    pub issuance_interval_months: u32,
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            lookahead_days: default_lookahead_days(),
            issuance_interval_months: default_issuance_interval_months(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("finca")
}

fn default_farm_name() -> String {
    "La Matutina".into()
}

fn default_operator() -> String {
    std::env::var("USER").unwrap_or_else(|_| "operator".into())
}

fn default_lookahead_days() -> i64 {
    crate::reminders::DEFAULT_LOOKAHEAD_DAYS
}

fn default_issuance_interval_months() -> u32 {
    crate::reminders::DEFAULT_ISSUANCE_INTERVAL_MONTHS
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        if config.reminders.lookahead_days < 0 {
            return Err(Error::Config(
                "reminders.lookahead_days must not be negative".into(),
            ));
        }
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("finca").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
