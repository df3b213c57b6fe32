//! Game configuration: title, hub exclusion rules and starting variables.
//!
//! Read from `*.toml` or `*.json`. A session never fails to start over
//! configuration: [`GameConfig::load`] falls back to the defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use story_graph::HubConfig;

use crate::hubs::HubRegistry;
use crate::interpreter::VariableValue;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub title: String,
    pub version: String,

    /// Hub exclusion rules in the registry wire format.
    pub hubs: Vec<HubConfig>,

    /// Global values injected into the story at new game.
    pub variables: BTreeMap<String, VariableValue>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            title: "Untitled Story".to_string(),
            version: "0.1.0".to_string(),
            hubs: Vec::new(),
            variables: BTreeMap::new(),
        }
    }
}

impl GameConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Read a config file, choosing the format by extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    /// Like [`GameConfig::from_path`], but any failure yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::from_path(path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Using default config, could not read {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    pub fn with_hub(mut self, hub: HubConfig) -> Self {
        self.hubs.push(hub);
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<VariableValue>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn hub_registry(&self) -> HubRegistry {
        HubRegistry::build(&self.hubs)
    }
}
