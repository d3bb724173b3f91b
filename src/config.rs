// Config module for locating and reading the tool configuration

use crate::constants;
use crate::error::{FetchError, Result};
use crate::version::Edition;
use anyhow::Context;
use log::debug;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(constants::CONFIG_DIR_ENV) {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(constants::DEFAULT_CONFIG_DIR)
}

pub fn config_path() -> PathBuf {
    config_dir().join(constants::CONFIG_FILE)
}

/// Opaque key-value view over the JSON configuration document
#[derive(Debug, Clone, Default)]
pub struct Config {
    values: Map<String, Value>,
}

impl Config {
    /// Load from the default location. A missing file is an empty config.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let values: Map<String, Value> = serde_json::from_str(text)?;
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Custom repository entries in file order.
    ///
    /// Each entry is validated here; a missing key or wrong type fails the
    /// whole lookup.
    pub fn custom_binary_repositories(&self) -> Result<Vec<(String, RepositoryEntry)>> {
        let Some(section) = self.get(constants::CUSTOM_REPOSITORIES_KEY) else {
            return Ok(Vec::new());
        };
        let entries = match section {
            Value::Null => return Ok(Vec::new()),
            Value::Object(entries) => entries,
            _ => {
                return Err(FetchError::InvalidRepositoryConfig {
                    name: constants::CUSTOM_REPOSITORIES_KEY.to_string(),
                    reason: "expected an object mapping repository names to settings".to_string(),
                });
            }
        };

        entries
            .iter()
            .map(|(name, value)| {
                let entry = RepositoryEntry::deserialize(value).map_err(|e| {
                    FetchError::InvalidRepositoryConfig {
                        name: name.clone(),
                        reason: e.to_string(),
                    }
                })?;
                Ok((name.clone(), entry))
            })
            .collect()
    }
}

/// One `customBinaryRepositories` entry
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryEntry {
    #[serde(rename = "_type")]
    pub repo_type: Option<String>,
    pub url_template: String,
    pub supported_editions: Vec<Edition>,
    pub bucket_name: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub region: Option<String>,
    pub endpoint: Option<String>,
}

impl RepositoryEntry {
    pub fn is_object_storage(&self) -> bool {
        self.repo_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(constants::S3_REPOSITORY_TYPE))
    }
}
