//! HealthKit codec
//!
//! HealthKit takes a flat `{value, unit}` option object per sample and reports
//! samples back as flat `{value, startDate, ...}` objects. Mass is stored in
//! grams and length in meters, so kilograms and centimeters are rescaled on the
//! way in and back out.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::query::{self, PlatformQuery};
use crate::registry;
use crate::types::{
    BloodPressureValue, HealthMetric, MetricValue, NormalizedResult, Platform, ReadQuery,
    ResultMetadata, WriteRequest,
};
use crate::units::{self, Unit};

use super::{PlatformCodec, PlatformRecord};

/// HealthKit codec
pub struct HealthKitCodec;

impl PlatformCodec for HealthKitCodec {
    fn platform(&self) -> Platform {
        Platform::Ios
    }

    fn serialize(&self, metric: HealthMetric, request: &WriteRequest) -> Option<PlatformRecord> {
        if !registry::is_writable(metric) {
            return None;
        }
        // No unit means no safe label to hand HealthKit
        let unit = request.unit.filter(|u| units::accepts(metric, *u))?;
        let value = request.scalar_value(metric)?;
        let native = units::healthkit_native(unit);

        let start_date = request.start_date.clone().or_else(|| request.time.clone());
        let end_date = request.end_date.clone().or_else(|| start_date.clone());

        Some(PlatformRecord::HealthKit(HealthKitWriteOptions {
            value: units::convert(metric, value, unit, Some(native)),
            unit: units::healthkit_label(unit).to_string(),
            start_date,
            end_date,
            metadata: request.metadata.clone(),
        }))
    }

    fn deserialize(
        &self,
        metric: HealthMetric,
        query: &ReadQuery,
        raw: &Value,
    ) -> Option<NormalizedResult> {
        let sample = HealthKitSample::deserialize(raw).ok()?;
        let time = sample.start_date.clone()?;

        let value = match metric {
            HealthMetric::BloodPressure => MetricValue::BloodPressure(BloodPressureValue {
                systolic: sample.blood_pressure_systolic_value?,
                diastolic: sample.blood_pressure_diastolic_value?,
            }),
            // HealthKit reports a 0-1 fraction
            HealthMetric::OxygenSaturation => MetricValue::Scalar(sample.value? * 100.0),
            HealthMetric::Height
            | HealthMetric::Weight
            | HealthMetric::BloodGlucose
            | HealthMetric::ActiveEnergyBurned
            | HealthMetric::BasalEnergyBurned => {
                let target = units::resolve(metric, query.unit)?;
                let native = sample
                    .unit
                    .as_deref()
                    .and_then(Unit::from_healthkit_label)
                    .unwrap_or_else(|| units::healthkit_native(target));
                MetricValue::Scalar(units::convert(metric, sample.value?, native, Some(target)))
            }
            HealthMetric::HeartRate | HealthMetric::RestingHeartRate | HealthMetric::Steps => {
                MetricValue::Scalar(sample.value?)
            }
        };

        Some(NormalizedResult {
            value,
            id: sample.id,
            time,
            metadata: ResultMetadata {
                source: sample.source_id,
                extra: sample.metadata.unwrap_or_default(),
            },
        })
    }

    fn translate_query(&self, metric: HealthMetric, query: &ReadQuery) -> PlatformQuery {
        PlatformQuery::HealthKit(query::to_healthkit(metric, query))
    }
}

/// Options object passed to a HealthKit save function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthKitWriteOptions {
    pub value: f64,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

/// Sample as returned by the HealthKit sample getters
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthKitSample {
    pub id: Option<String>,
    pub value: Option<f64>,
    /// Unit label, when the bridge reports one
    pub unit: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub source_id: Option<String>,
    pub metadata: Option<Map<String, Value>>,
    pub blood_pressure_systolic_value: Option<f64>,
    pub blood_pressure_diastolic_value: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn write(metric: HealthMetric, request: WriteRequest) -> Option<HealthKitWriteOptions> {
        match HealthKitCodec.serialize(metric, &request) {
            Some(PlatformRecord::HealthKit(options)) => Some(options),
            Some(other) => panic!("unexpected record {other:?}"),
            None => None,
        }
    }

    fn read(metric: HealthMetric, query: ReadQuery, raw: Value) -> Option<NormalizedResult> {
        HealthKitCodec.deserialize(metric, &query, &raw)
    }

    #[test]
    fn test_missing_unit_is_nothing_to_write() {
        assert!(write(HealthMetric::Weight, WriteRequest::scalar(70.0, None)).is_none());
    }

    #[test]
    fn test_unit_from_another_family_is_nothing_to_write() {
        assert!(write(HealthMetric::Weight, WriteRequest::scalar(70.0, Some(Unit::Cm))).is_none());
    }

    #[test]
    fn test_kilograms_are_written_as_grams() {
        let options = write(HealthMetric::Weight, WriteRequest::scalar(70.0, Some(Unit::Kg)))
            .expect("weight options");
        assert_eq!(options.value, 70_000.0);
        assert_eq!(options.unit, "gram");
    }

    #[test]
    fn test_centimeters_are_written_as_meters() {
        let options = write(HealthMetric::Height, WriteRequest::scalar(175.0, Some(Unit::Cm)))
            .expect("height options");
        assert_eq!(options.value, 1.75);
        assert_eq!(options.unit, "meter");
    }

    #[test]
    fn test_other_units_pass_through() {
        let options = write(HealthMetric::Weight, WriteRequest::scalar(154.0, Some(Unit::Pounds)))
            .expect("weight options");
        assert_eq!(options.value, 154.0);
        assert_eq!(options.unit, "pound");

        let options = write(
            HealthMetric::BloodGlucose,
            WriteRequest::scalar(100.0, Some(Unit::MgPerdL)),
        )
        .expect("glucose options");
        assert_eq!(options.value, 100.0);
        assert_eq!(options.unit, "mgPerdL");
    }

    #[test]
    fn test_steps_window_is_forwarded() {
        let mut request = WriteRequest::steps(1000.0, "2023-01-01", "2023-01-02");
        request.unit = Some(Unit::Count);
        let options = write(HealthMetric::Steps, request).expect("steps options");
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({"value": 1000.0, "unit": "count", "startDate": "2023-01-01", "endDate": "2023-01-02"})
        );
    }

    #[test]
    fn test_single_instant_fills_both_dates() {
        let request = WriteRequest::scalar(72.0, Some(Unit::Bpm)).at("2023-01-01T10:00:00.000Z");
        let options = write(HealthMetric::HeartRate, request).expect("heart rate options");
        assert_eq!(options.start_date.as_deref(), Some("2023-01-01T10:00:00.000Z"));
        assert_eq!(options.end_date.as_deref(), Some("2023-01-01T10:00:00.000Z"));
    }

    #[test]
    fn test_read_only_metrics_are_not_written() {
        let request = WriteRequest {
            value: Some(MetricValue::BloodPressure(BloodPressureValue {
                systolic: 120.0,
                diastolic: 80.0,
            })),
            ..WriteRequest::default()
        };
        assert!(write(HealthMetric::BloodPressure, request).is_none());
        assert!(write(
            HealthMetric::OxygenSaturation,
            WriteRequest::scalar(98.0, Some(Unit::Percent))
        )
        .is_none());
    }

    #[test]
    fn test_blood_pressure_sample_is_compound() {
        let result = read(
            HealthMetric::BloodPressure,
            ReadQuery::default(),
            json!({
                "bloodPressureSystolicValue": 120,
                "bloodPressureDiastolicValue": 80,
                "startDate": "2023-01-01",
                "endDate": "2023-01-01",
                "id": "bp-1",
                "sourceId": "test-source"
            }),
        )
        .expect("blood pressure sample");

        assert_eq!(
            result.value,
            MetricValue::BloodPressure(BloodPressureValue {
                systolic: 120.0,
                diastolic: 80.0
            })
        );
        assert_eq!(result.id.as_deref(), Some("bp-1"));
        assert_eq!(result.metadata.source.as_deref(), Some("test-source"));
    }

    #[test]
    fn test_sample_reporting_its_own_unit_is_converted() {
        let result = read(
            HealthMetric::Height,
            ReadQuery::default().with_unit(Unit::Cm),
            json!({"value": 1.75, "unit": "m", "startDate": "2023-01-01"}),
        )
        .expect("height sample");
        assert_eq!(result.value.as_scalar(), Some(175.0));

        let result = read(
            HealthMetric::BloodGlucose,
            ReadQuery::default().with_unit(Unit::MgPerdL),
            json!({"value": 100, "unit": "mg/dL", "startDate": "2023-01-01", "id": "bg-1"}),
        )
        .expect("glucose sample");
        assert_eq!(result.value.as_scalar(), Some(100.0));
    }

    #[test]
    fn test_scalar_metrics_pass_through() {
        let result = read(
            HealthMetric::HeartRate,
            ReadQuery::default(),
            json!({"value": 72, "startDate": "2023-01-01T10:00:00.000Z"}),
        )
        .expect("heart rate sample");
        assert_eq!(result.value.as_scalar(), Some(72.0));
        assert_eq!(result.time, "2023-01-01T10:00:00.000Z");
    }

    #[test]
    fn test_sample_metadata_is_preserved() {
        let result = read(
            HealthMetric::Steps,
            ReadQuery::default(),
            json!({
                "value": 8532,
                "startDate": "2023-01-01",
                "sourceId": "com.apple.health",
                "metadata": {"HKWasUserEntered": true}
            }),
        )
        .expect("steps sample");
        assert_eq!(result.metadata.source.as_deref(), Some("com.apple.health"));
        assert_eq!(result.metadata.extra.get("HKWasUserEntered"), Some(&json!(true)));
    }

    #[test]
    fn test_malformed_samples_yield_nothing() {
        assert!(read(HealthMetric::Steps, ReadQuery::default(), json!({"value": 10})).is_none());
        assert!(read(
            HealthMetric::Steps,
            ReadQuery::default(),
            json!({"startDate": "2023-01-01"})
        )
        .is_none());
        assert!(read(
            HealthMetric::BloodPressure,
            ReadQuery::default(),
            json!({"value": 120, "startDate": "2023-01-01"})
        )
        .is_none());
        assert!(read(HealthMetric::Steps, ReadQuery::default(), json!("garbage")).is_none());
    }
}
