use crate::errors::{AdapterError, AdapterResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "inspector.config.json";

/// Adapter configuration file format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterConfig {
    /// Panic on contract violations instead of returning an error
    #[serde(default = "default_strict_contracts")]
    pub strict_contracts: bool,

    /// Attach a content hash to opaque editors
    #[serde(default = "default_true")]
    pub hash_opaque_values: bool,

    /// Show "N elements" next to container labels
    #[serde(default = "default_true")]
    pub element_count_labels: bool,

    /// Trace every routed message
    #[serde(default)]
    pub log_messages: bool,
}

fn default_strict_contracts() -> bool {
    cfg!(debug_assertions)
}

fn default_true() -> bool {
    true
}

impl AdapterConfig {
    pub fn from_json_str(json: &str) -> AdapterResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load config from a directory, falling back to defaults when absent
    pub fn load(dir: impl AsRef<Path>) -> AdapterResult<Self> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| AdapterError::Config(format!("{}: {e}", config_path.display())))?;
            Self::from_json_str(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Same as the default, but contract violations are always returned.
    pub fn lenient() -> Self {
        Self {
            strict_contracts: false,
            ..Self::default()
        }
    }
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            strict_contracts: default_strict_contracts(),
            hash_opaque_values: true,
            element_count_labels: true,
            log_messages: false,
        }
    }
}
