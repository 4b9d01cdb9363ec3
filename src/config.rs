//! Configuration management
//!
//! Zero-config by default: every setting has a built-in value and an
//! optional TOML file overrides the lot. The file is only read when the
//! user passes `--config`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{econai, files, hdx};
use crate::errors::{ConfigError, ConfigResult};

/// Unified application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Download service settings
    pub econai: EconaiConfig,
    /// Catalog settings
    pub hdx: HdxConfig,
    /// Local path settings
    pub paths: PathsConfig,
}

/// Download service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconaiConfig {
    /// Download API base URL
    pub base_url: String,
    /// Listing path relative to the base URL
    pub latest_path: String,
}

impl Default for EconaiConfig {
    fn default() -> Self {
        Self {
            base_url: econai::BASE_URL.to_string(),
            latest_path: econai::LATEST_PATH.to_string(),
        }
    }
}

/// Catalog settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HdxConfig {
    /// HDX site to publish to
    pub site_url: String,
    /// Static dataset metadata merged before submission
    pub static_metadata: PathBuf,
}

impl Default for HdxConfig {
    fn default() -> Self {
        Self {
            site_url: hdx::SITE_URL.to_string(),
            static_metadata: PathBuf::from(files::STATIC_METADATA_FILE),
        }
    }
}

/// Local path settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Saved-data directory for --save / --use-saved runs
    pub saved_dir: PathBuf,
    /// Watermark state file; defaults to the user config directory
    pub state_file: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            saved_dir: PathBuf::from(files::SAVED_DATA_DIR),
            state_file: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration, using defaults when no file is given
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}
