//! Server configuration
//!
//! Defaults, then an optional TOML file named by `CATALOG_CONFIG`, then
//! individual environment overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_PATH_VAR: &str = "CATALOG_CONFIG";
pub const ADDR_VAR: &str = "CATALOG_ADDR";
pub const DATA_PATH_VAR: &str = "CATALOG_DATA_PATH";
pub const INVALIDATE_VAR: &str = "CATALOG_INVALIDATE_STATS_ON_WRITE";

/// Address the server binds when nothing else is configured
pub const DEFAULT_ADDR: &str = "127.0.0.1:3001";

/// Runtime settings for the catalog server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind_addr: String,
    /// JSON file holding the item collection
    pub data_path: PathBuf,
    /// Drop the cached stats after every successful create
    pub invalidate_stats_on_write: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_ADDR.to_string(),
            data_path: default_data_path(),
            invalidate_stats_on_write: false,
        }
    }
}

/// `data/items.json` inside this crate's directory
pub fn default_data_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join("items.json")
}

/// Configuration loading error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },
}

impl ServerConfig {
    /// Load from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the environment
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup(CONFIG_PATH_VAR) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };

        if let Some(addr) = lookup(ADDR_VAR) {
            config.bind_addr = addr;
        }
        if let Some(path) = lookup(DATA_PATH_VAR) {
            config.data_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup(INVALIDATE_VAR) {
            config.invalidate_stats_on_write = parse_flag(&raw).ok_or(ConfigError::InvalidEnv {
                key: INVALIDATE_VAR,
                value: raw,
            })?;
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
