use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::error::ConfigError;

pub const SETTINGS_FILE_NAME: &str = ".fleetfix.yml";

/// Settings consulted by fixers, with per-repository overrides on top of defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub defaults: BTreeMap<String, String>,
    #[serde(default)]
    pub repos: BTreeMap<String, BTreeMap<String, String>>,
}

impl Settings {
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(SETTINGS_FILE_NAME))
    }

    /// Loads settings from `path`. A missing file yields empty settings.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Settings::default());
        }
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Malformed {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn get(&self, full_name: &str, key: &str) -> Option<&str> {
        self.repos
            .get(full_name)
            .and_then(|repo| repo.get(key))
            .or_else(|| self.defaults.get(key))
            .map(String::as_str)
    }
}
