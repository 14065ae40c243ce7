//! Permission mapping
//!
//! Callers ask for read/write access per [`HealthMetric`]; each store wants the
//! request in its own vocabulary.

use serde::{Deserialize, Serialize};

use crate::registry;
use crate::types::{HealthMetric, Platform};

/// Metrics the app wants to read and write
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthPermissions {
    #[serde(default)]
    pub read: Vec<HealthMetric>,
    #[serde(default)]
    pub write: Vec<HealthMetric>,
}

/// HealthKit permission names, as passed to `initHealthKit`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthKitPermissionSet {
    pub read: Vec<String>,
    pub write: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthKitPermissions {
    pub permissions: HealthKitPermissionSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    Read,
    Write,
}

/// One Health Connect permission entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthConnectPermission {
    pub access_type: AccessType,
    pub record_type: String,
}

/// Permission request in a store's own shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermissionRequest {
    HealthKit(HealthKitPermissions),
    HealthConnect(Vec<HealthConnectPermission>),
}

impl HealthPermissions {
    pub fn new(read: Vec<HealthMetric>, write: Vec<HealthMetric>) -> Self {
        Self { read, write }
    }

    /// Map for `platform`
    pub fn for_platform(&self, platform: Platform) -> PermissionRequest {
        match platform {
            Platform::Ios => PermissionRequest::HealthKit(self.to_healthkit()),
            Platform::Android => PermissionRequest::HealthConnect(self.to_health_connect()),
        }
    }

    /// HealthKit has no compound blood pressure permission; it is granted as
    /// its two components.
    pub fn to_healthkit(&self) -> HealthKitPermissions {
        HealthKitPermissions {
            permissions: HealthKitPermissionSet {
                read: healthkit_names(&self.read),
                write: healthkit_names(&self.write),
            },
        }
    }

    pub fn to_health_connect(&self) -> Vec<HealthConnectPermission> {
        let entries = |metrics: &[HealthMetric], access_type: AccessType| {
            metrics
                .iter()
                .map(move |metric| HealthConnectPermission {
                    access_type,
                    record_type: registry::record_type(Platform::Android, *metric).to_string(),
                })
                .collect::<Vec<_>>()
        };

        let mut permissions = entries(&self.read, AccessType::Read);
        permissions.extend(entries(&self.write, AccessType::Write));
        permissions
    }
}

fn healthkit_names(metrics: &[HealthMetric]) -> Vec<String> {
    metrics
        .iter()
        .flat_map(|metric| match metric {
            HealthMetric::BloodPressure => vec![
                "BloodPressureDiastolic".to_string(),
                "BloodPressureSystolic".to_string(),
            ],
            other => vec![registry::record_type(Platform::Ios, *other).to_string()],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_healthkit_expands_blood_pressure() {
        let permissions = HealthPermissions::new(
            vec![HealthMetric::Steps, HealthMetric::BloodPressure],
            vec![HealthMetric::Weight],
        );

        assert_eq!(
            serde_json::to_value(permissions.to_healthkit()).unwrap(),
            json!({
                "permissions": {
                    "read": ["Steps", "BloodPressureDiastolic", "BloodPressureSystolic"],
                    "write": ["Weight"]
                }
            })
        );
    }

    #[test]
    fn test_health_connect_uses_record_types() {
        let permissions = HealthPermissions::new(
            vec![HealthMetric::ActiveEnergyBurned],
            vec![HealthMetric::BasalEnergyBurned],
        );

        assert_eq!(
            serde_json::to_value(permissions.to_health_connect()).unwrap(),
            json!([
                {"accessType": "read", "recordType": "ActiveCaloriesBurned"},
                {"accessType": "write", "recordType": "BasalMetabolicRate"}
            ])
        );
    }

    #[test]
    fn test_platform_dispatch() {
        let permissions = HealthPermissions::new(vec![HealthMetric::HeartRate], Vec::new());
        assert!(matches!(
            permissions.for_platform(Platform::Ios),
            PermissionRequest::HealthKit(_)
        ));
        assert!(matches!(
            permissions.for_platform(Platform::Android),
            PermissionRequest::HealthConnect(entries) if entries.len() == 1
        ));
    }

    #[test]
    fn test_parse_from_metric_names() {
        let permissions: HealthPermissions =
            serde_json::from_str(r#"{"read": ["Height", "OxygenSaturation"]}"#).unwrap();
        assert_eq!(
            permissions.read,
            vec![HealthMetric::Height, HealthMetric::OxygenSaturation]
        );
        assert!(permissions.write.is_empty());
    }
}
