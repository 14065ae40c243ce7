//! Platform-neutral types exchanged with callers
//!
//! Callers only ever see these shapes: a metric, a unit, a read query or a write
//! request going in, and normalized results coming out. Platform record shapes
//! live in [`crate::adapters`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::HealthLinkError;
use crate::units::Unit;

/// Health store platform the core is talking to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Record-store platform (HealthKit)
    Ios,
    /// Typed-record platform (Health Connect)
    Android,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = HealthLinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ios" | "healthkit" => Ok(Platform::Ios),
            "android" | "healthconnect" | "health_connect" => Ok(Platform::Android),
            _ => Err(HealthLinkError::UnknownPlatform(s.to_string())),
        }
    }
}

/// Semantic health quantity being read or written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthMetric {
    BloodGlucose,
    Height,
    Weight,
    HeartRate,
    RestingHeartRate,
    BloodPressure,
    OxygenSaturation,
    Steps,
    ActiveEnergyBurned,
    BasalEnergyBurned,
}

impl HealthMetric {
    /// Every supported metric, in declaration order
    pub const ALL: [HealthMetric; 10] = [
        HealthMetric::BloodGlucose,
        HealthMetric::Height,
        HealthMetric::Weight,
        HealthMetric::HeartRate,
        HealthMetric::RestingHeartRate,
        HealthMetric::BloodPressure,
        HealthMetric::OxygenSaturation,
        HealthMetric::Steps,
        HealthMetric::ActiveEnergyBurned,
        HealthMetric::BasalEnergyBurned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthMetric::BloodGlucose => "BloodGlucose",
            HealthMetric::Height => "Height",
            HealthMetric::Weight => "Weight",
            HealthMetric::HeartRate => "HeartRate",
            HealthMetric::RestingHeartRate => "RestingHeartRate",
            HealthMetric::BloodPressure => "BloodPressure",
            HealthMetric::OxygenSaturation => "OxygenSaturation",
            HealthMetric::Steps => "Steps",
            HealthMetric::ActiveEnergyBurned => "ActiveEnergyBurned",
            HealthMetric::BasalEnergyBurned => "BasalEnergyBurned",
        }
    }
}

impl fmt::Display for HealthMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HealthMetric {
    type Err = HealthLinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HealthMetric::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| HealthLinkError::UnknownMetric(s.to_string()))
    }
}

/// Systolic/diastolic pair in millimeters of mercury
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BloodPressureValue {
    pub systolic: f64,
    pub diastolic: f64,
}

/// Value carried by a normalized result: a scalar for every metric except
/// blood pressure, which is compound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Scalar(f64),
    BloodPressure(BloodPressureValue),
}

impl MetricValue {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            MetricValue::Scalar(v) => Some(*v),
            MetricValue::BloodPressure(_) => None,
        }
    }
}

/// Value supplied with a write request
pub type WriteValue = MetricValue;

/// Generic read filter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadQuery {
    /// Window start (ISO-8601, passed through unvalidated)
    #[serde(default, alias = "startTime", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// Window end (ISO-8601, passed through unvalidated)
    #[serde(default, alias = "endTime", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Oldest first when true; most recent first by default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ascending: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Unit the caller wants results expressed in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
}

impl ReadQuery {
    pub fn between(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start_date: Some(start.into()),
            end_date: Some(end.into()),
            ..Self::default()
        }
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }
}

/// Platform-neutral write request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<WriteValue>,
    /// Instant of the sample
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, alias = "startTime", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, alias = "endTime", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl WriteRequest {
    /// Scalar sample at an optional instant
    pub fn scalar(value: f64, unit: Option<Unit>) -> Self {
        Self {
            value: Some(MetricValue::Scalar(value)),
            unit,
            ..Self::default()
        }
    }

    /// Step count over a window; steps have no single-instant form
    pub fn steps(count: f64, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            value: Some(MetricValue::Scalar(count)),
            start_date: Some(start.into()),
            end_date: Some(end.into()),
            ..Self::default()
        }
    }

    pub fn at(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Scalar value to emit, with steps defaulting to zero
    pub(crate) fn scalar_value(&self, metric: HealthMetric) -> Option<f64> {
        match (&self.value, metric) {
            (Some(MetricValue::Scalar(v)), _) => Some(*v),
            (None, HealthMetric::Steps) => Some(0.0),
            _ => None,
        }
    }

    /// Metadata field lookup
    pub(crate) fn metadata_field(&self, key: &str) -> Option<&Value> {
        self.metadata.as_ref().and_then(|m| m.get(key))
    }
}

/// Metadata attached to a normalized result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultMetadata {
    /// Originating app or device
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Platform-specific extras, preserved as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One record normalized out of a platform read result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResult {
    pub value: MetricValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub time: String,
    pub metadata: ResultMetadata,
}
