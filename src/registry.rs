//! Data-type registry
//!
//! Static mapping from [`HealthMetric`] to each platform's record-type
//! identifier, the HealthKit bridge entry points, and the set of metrics that
//! can be written.

use crate::types::{HealthMetric, Platform};

/// Metrics either platform accepts for insertion; everything else is read-only
pub const WRITABLE_METRICS: [HealthMetric; 7] = [
    HealthMetric::BloodGlucose,
    HealthMetric::Height,
    HealthMetric::Weight,
    HealthMetric::HeartRate,
    HealthMetric::Steps,
    HealthMetric::ActiveEnergyBurned,
    HealthMetric::BasalEnergyBurned,
];

/// Record-type identifier a platform store uses for `metric`.
///
/// Total over the closed metric set. HealthKit keeps the metric name; Health
/// Connect renames the two energy metrics.
pub fn record_type(platform: Platform, metric: HealthMetric) -> &'static str {
    match (platform, metric) {
        (Platform::Android, HealthMetric::ActiveEnergyBurned) => "ActiveCaloriesBurned",
        (Platform::Android, HealthMetric::BasalEnergyBurned) => "BasalMetabolicRate",
        (_, metric) => metric.as_str(),
    }
}

/// Reverse lookup of [`record_type`]; `None` for identifiers outside the registry
pub fn metric_for_record_type(platform: Platform, record_type_id: &str) -> Option<HealthMetric> {
    HealthMetric::ALL
        .iter()
        .copied()
        .find(|m| record_type(platform, *m) == record_type_id)
}

/// Whether `metric` can be written
pub fn is_writable(metric: HealthMetric) -> bool {
    WRITABLE_METRICS.contains(&metric)
}

/// HealthKit bridge function that reads samples for `metric`
pub fn healthkit_read_method(metric: HealthMetric) -> &'static str {
    match metric {
        HealthMetric::BloodGlucose => "getBloodGlucoseSamples",
        HealthMetric::Height => "getHeightSamples",
        HealthMetric::Weight => "getWeightSamples",
        HealthMetric::HeartRate => "getHeartRateSamples",
        HealthMetric::RestingHeartRate => "getRestingHeartRateSamples",
        HealthMetric::BloodPressure => "getBloodPressureSamples",
        HealthMetric::OxygenSaturation => "getOxygenSaturationSamples",
        HealthMetric::Steps => "getDailyStepCountSamples",
        HealthMetric::ActiveEnergyBurned => "getActiveEnergyBurned",
        HealthMetric::BasalEnergyBurned => "getBasalEnergyBurned",
    }
}

/// HealthKit bridge function that saves a sample for `metric`, if writable
pub fn healthkit_write_method(metric: HealthMetric) -> Option<&'static str> {
    let method = match metric {
        HealthMetric::BloodGlucose => "saveBloodGlucoseSample",
        HealthMetric::Height => "saveHeight",
        HealthMetric::Weight => "saveWeight",
        HealthMetric::HeartRate => "saveHeartRateSample",
        HealthMetric::Steps => "saveSteps",
        HealthMetric::ActiveEnergyBurned => "saveActiveEnergyBurned",
        HealthMetric::BasalEnergyBurned => "saveBasalEnergyBurned",
        HealthMetric::RestingHeartRate
        | HealthMetric::BloodPressure
        | HealthMetric::OxygenSaturation => return None,
    };
    Some(method)
}

/// Store entry point for reading `metric`: the bridge getter on HealthKit, the
/// record type on Health Connect
pub fn read_entry_point(platform: Platform, metric: HealthMetric) -> &'static str {
    match platform {
        Platform::Ios => healthkit_read_method(metric),
        Platform::Android => record_type(platform, metric),
    }
}

/// Store entry point for writing `metric`, if writable
pub fn write_entry_point(platform: Platform, metric: HealthMetric) -> Option<&'static str> {
    match platform {
        Platform::Ios => healthkit_write_method(metric),
        Platform::Android => is_writable(metric).then(|| record_type(platform, metric)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_metrics_are_renamed_on_android() {
        assert_eq!(
            record_type(Platform::Android, HealthMetric::ActiveEnergyBurned),
            "ActiveCaloriesBurned"
        );
        assert_eq!(
            record_type(Platform::Android, HealthMetric::BasalEnergyBurned),
            "BasalMetabolicRate"
        );
        assert_eq!(
            record_type(Platform::Ios, HealthMetric::ActiveEnergyBurned),
            "ActiveEnergyBurned"
        );
        assert_eq!(record_type(Platform::Android, HealthMetric::Steps), "Steps");
    }

    #[test]
    fn test_reverse_lookup_round_trips() {
        for platform in [Platform::Ios, Platform::Android] {
            for metric in HealthMetric::ALL {
                let id = record_type(platform, metric);
                assert_eq!(metric_for_record_type(platform, id), Some(metric));
            }
        }
        assert_eq!(metric_for_record_type(Platform::Android, "SleepSession"), None);
        assert_eq!(metric_for_record_type(Platform::Ios, "ActiveCaloriesBurned"), None);
    }

    #[test]
    fn test_write_set_matches_healthkit_entry_points() {
        for metric in HealthMetric::ALL {
            assert_eq!(is_writable(metric), healthkit_write_method(metric).is_some());
        }
        assert!(!is_writable(HealthMetric::BloodPressure));
        assert_eq!(healthkit_read_method(HealthMetric::Steps), "getDailyStepCountSamples");
    }

    #[test]
    fn test_entry_points_per_platform() {
        assert_eq!(read_entry_point(Platform::Ios, HealthMetric::Weight), "getWeightSamples");
        assert_eq!(read_entry_point(Platform::Android, HealthMetric::Weight), "Weight");
        assert_eq!(write_entry_point(Platform::Ios, HealthMetric::Weight), Some("saveWeight"));
        assert_eq!(
            write_entry_point(Platform::Android, HealthMetric::ActiveEnergyBurned),
            Some("ActiveCaloriesBurned")
        );
        assert_eq!(write_entry_point(Platform::Android, HealthMetric::BloodPressure), None);
    }
}
