//! Error types for Health Link

use thiserror::Error;

use crate::store::StoreError;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, HealthLinkError>;

/// Errors surfaced by the facade, configuration loading and the CLI/FFI edges.
///
/// The codec layer itself never fails: an absent result means "nothing to do".
#[derive(Debug, Error)]
pub enum HealthLinkError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Health store error: {0}")]
    Store(#[from] StoreError),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
