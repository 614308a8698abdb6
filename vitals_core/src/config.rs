//! Configuration file support for Vitals.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/vitals/config.toml`.

use crate::permissions::PermissionRequest;
use crate::record::RecordType;
use crate::time::ZoneOffset;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub permissions: PermissionsConfig,

    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub records: RecordsConfig,
}

/// Local store configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Origin stamped on records written through the local store
    #[serde(default = "default_data_origin")]
    pub data_origin: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            data_origin: default_data_origin(),
        }
    }
}

/// Record types to ask read and write access for
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PermissionsConfig {
    #[serde(default = "default_permission_types")]
    pub read: Vec<String>,

    #[serde(default = "default_permission_types")]
    pub write: Vec<String>,
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        Self {
            read: default_permission_types(),
            write: default_permission_types(),
        }
    }
}

impl PermissionsConfig {
    /// The configured sets as a permission request
    pub fn to_request(&self) -> Result<PermissionRequest> {
        Ok(PermissionRequest::new(
            parse_types(&self.read)?,
            parse_types(&self.write)?,
        ))
    }
}

/// Read query defaults
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct QueryConfig {
    /// Page size for reads that don't set one; the store's default otherwise
    #[serde(default)]
    pub page_size: Option<u32>,
}

/// Defaults for records created from the command line
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct RecordsConfig {
    #[serde(default)]
    pub zone_offset: Option<String>,
}

impl RecordsConfig {
    pub fn zone_offset(&self) -> Result<Option<ZoneOffset>> {
        self.zone_offset
            .as_deref()
            .map(|s| {
                s.parse()
                    .map_err(|e| Error::Config(format!("records.zone_offset: {}", e)))
            })
            .transpose()
    }
}

fn parse_types(names: &[String]) -> Result<Vec<RecordType>> {
    names
        .iter()
        .map(|n| {
            n.parse()
                .map_err(|e| Error::Config(format!("permissions: {}", e)))
        })
        .collect()
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("vitals")
}

fn default_data_origin() -> String {
    "vitals".into()
}

fn default_permission_types() -> Vec<String> {
    vec!["Weight".into(), "Steps".into()]
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
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Check values serde alone cannot
    pub fn validate(&self) -> Result<()> {
        self.permissions.to_request()?;
        self.records.zone_offset()?;
        if self.query.page_size == Some(0) {
            return Err(Error::Config("query.page_size must be positive".into()));
        }
        if self.data.data_origin.trim().is_empty() {
            return Err(Error::Config("data.data_origin must not be blank".into()));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("vitals").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
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
