//! Platform store boundary
//!
//! The native health stores live outside this crate. Bindings implement
//! [`HealthStore`] and exchange the platform-shaped queries and records the
//! codecs produce.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::adapters::PlatformRecord;
use crate::permissions::PermissionRequest;
use crate::query::PlatformQuery;
use crate::types::Platform;

/// Failure reported by a platform store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// SDK availability as reported by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    #[serde(rename = "SDK_AVAILABLE")]
    Available,
    #[serde(rename = "SDK_UNAVAILABLE")]
    Unavailable,
    #[serde(rename = "SDK_UNAVAILABLE_PROVIDER_UPDATE_REQUIRED")]
    ProviderUpdateRequired,
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Available => "SDK_AVAILABLE",
            Availability::Unavailable => "SDK_UNAVAILABLE",
            Availability::ProviderUpdateRequired => "SDK_UNAVAILABLE_PROVIDER_UPDATE_REQUIRED",
        }
    }
}

/// Raw read result: a bare list, or wrapped as `{records: [...]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRecords {
    Bare(Vec<Value>),
    Wrapped { records: Vec<Value> },
}

impl RawRecords {
    pub fn into_records(self) -> Vec<Value> {
        match self {
            RawRecords::Bare(records) | RawRecords::Wrapped { records } => records,
        }
    }
}

impl From<Vec<Value>> for RawRecords {
    fn from(records: Vec<Value>) -> Self {
        RawRecords::Bare(records)
    }
}

/// Native health store binding
#[async_trait]
pub trait HealthStore: Send + Sync {
    /// Platform this store speaks for
    fn platform(&self) -> Platform;

    async fn availability(&self) -> Result<Availability, StoreError>;

    /// One-time SDK setup; HealthKit has none
    async fn initialize(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn request_permissions(&self, request: &PermissionRequest) -> Result<(), StoreError>;

    /// Read raw records through `entry_point`: the HealthKit getter name on
    /// iOS, the record type on Android (see [`crate::registry::read_entry_point`])
    async fn read_records(
        &self,
        entry_point: &str,
        query: &PlatformQuery,
    ) -> Result<RawRecords, StoreError>;

    /// Insert one record through `entry_point` (see
    /// [`crate::registry::write_entry_point`])
    async fn insert_record(
        &self,
        entry_point: &str,
        record: &PlatformRecord,
    ) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_raw_records_accepts_both_shapes() {
        let bare: RawRecords = serde_json::from_value(json!([{"count": 1}])).unwrap();
        let wrapped: RawRecords =
            serde_json::from_value(json!({"records": [{"count": 1}]})).unwrap();
        assert_eq!(bare.into_records(), wrapped.into_records());
    }

    #[test]
    fn test_availability_names() {
        let availability: Availability =
            serde_json::from_value(json!("SDK_UNAVAILABLE_PROVIDER_UPDATE_REQUIRED")).unwrap();
        assert_eq!(availability, Availability::ProviderUpdateRequired);
        assert!(!availability.is_available());
        assert!(Availability::Available.is_available());
        assert_eq!(Availability::Unavailable.as_str(), "SDK_UNAVAILABLE");
    }
}
