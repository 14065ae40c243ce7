//! Configuration
//!
//! Loaded from a JSON file; every field has a default so an empty object (or no
//! file at all) is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{HealthLinkError, Result};

/// What `write` does when the store rejects a record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteFailurePolicy {
    /// Log the failure and report success
    #[default]
    Swallow,
    /// Return the store error to the caller
    Surface,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthLinkConfig {
    #[serde(default)]
    pub write_failures: WriteFailurePolicy,

    /// Default tracing level; RUST_LOG still wins
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for HealthLinkConfig {
    fn default() -> Self {
        Self {
            write_failures: WriteFailurePolicy::default(),
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl HealthLinkConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| HealthLinkError::Config(format!("invalid configuration: {e}")))
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }
}
