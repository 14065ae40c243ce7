//! Health Connect codec
//!
//! Health Connect inserts typed records tagged by `recordType`, each metric with
//! its own field layout, and reads them back with every supported unit spelled
//! out (`inKilograms`, `inPounds`, ...). Instant records carry `time`; interval
//! records carry `startTime`/`endTime`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::query::{self, PlatformQuery};
use crate::registry;
use crate::types::{
    BloodPressureValue, HealthMetric, MetricValue, NormalizedResult, Platform, ReadQuery,
    ResultMetadata, WriteRequest,
};
use crate::units::{self, Unit};

use super::{now_iso, PlatformCodec, PlatformRecord};

/// Blood glucose metadata codes flattened onto the record, each defaulting to 0
const BLOOD_GLUCOSE_CODES: [&str; 3] = ["relationToMeal", "mealType", "specimenSource"];

/// Health Connect codec
pub struct HealthConnectCodec;

impl PlatformCodec for HealthConnectCodec {
    fn platform(&self) -> Platform {
        Platform::Android
    }

    fn serialize(&self, metric: HealthMetric, request: &WriteRequest) -> Option<PlatformRecord> {
        if !registry::is_writable(metric) {
            return None;
        }
        let value = request.scalar_value(metric)?;
        let unit = units::resolve(metric, request.unit);

        let now = now_iso();
        let time = request
            .time
            .clone()
            .or_else(|| request.start_date.clone())
            .unwrap_or_else(|| now.clone());
        let start_time = request
            .start_date
            .clone()
            .or_else(|| request.time.clone())
            .unwrap_or_else(|| now.clone());
        let end_time = request
            .end_date
            .clone()
            .or_else(|| request.time.clone())
            .unwrap_or(now);

        let record = match metric {
            HealthMetric::BloodGlucose => HealthConnectRecord::BloodGlucose(BloodGlucoseRecord {
                time,
                level: UnitValue::labelled(unit?, value)?,
                relation_to_meal: metadata_code(request, BLOOD_GLUCOSE_CODES[0]),
                meal_type: metadata_code(request, BLOOD_GLUCOSE_CODES[1]),
                specimen_source: metadata_code(request, BLOOD_GLUCOSE_CODES[2]),
            }),
            HealthMetric::Steps => HealthConnectRecord::Steps(StepsRecord {
                start_time,
                end_time,
                count: value.round() as i64,
            }),
            HealthMetric::Weight => HealthConnectRecord::Weight(WeightRecord {
                time,
                // Kilograms stay kilograms; Health Connect has a label for them
                weight: UnitValue::labelled(unit?, value)?,
            }),
            HealthMetric::Height => {
                let unit = unit?;
                let (unit, value) = if unit == Unit::Cm {
                    (
                        Unit::Meter,
                        units::convert(metric, value, Unit::Cm, Some(Unit::Meter)),
                    )
                } else {
                    (unit, value)
                };
                HealthConnectRecord::Height(HeightRecord {
                    time,
                    height: UnitValue::labelled(unit, value)?,
                })
            }
            HealthMetric::HeartRate => HealthConnectRecord::HeartRate(HeartRateRecord {
                start_time,
                end_time,
                samples: vec![HeartRateSample {
                    time,
                    beats_per_minute: value,
                }],
            }),
            HealthMetric::ActiveEnergyBurned => {
                HealthConnectRecord::ActiveCaloriesBurned(EnergyRecord {
                    start_time,
                    end_time,
                    energy: UnitValue::labelled(unit?, value)?,
                })
            }
            HealthMetric::BasalEnergyBurned => {
                let rate = match unit? {
                    Unit::Calories => UnitValue::new("kilocaloriesPerDay", value),
                    Unit::Joules => UnitValue::new("watts", units::joules_per_day_to_watts(value)),
                    _ => UnitValue::new("watts", units::kilojoules_per_day_to_watts(value)),
                };
                HealthConnectRecord::BasalMetabolicRate(BasalMetabolicRateRecord {
                    time,
                    basal_metabolic_rate: rate,
                })
            }
            HealthMetric::RestingHeartRate
            | HealthMetric::BloodPressure
            | HealthMetric::OxygenSaturation => return None,
        };

        Some(PlatformRecord::HealthConnect(record))
    }

    fn deserialize(
        &self,
        metric: HealthMetric,
        query: &ReadQuery,
        raw: &Value,
    ) -> Option<NormalizedResult> {
        if let Some(record_type) = raw.as_object()?.get("recordType") {
            if record_type.as_str() != Some(registry::record_type(Platform::Android, metric)) {
                return None;
            }
        }

        let envelope: RecordEnvelope = parse(raw)?;
        let mut time = envelope.time.or(envelope.start_time);
        let mut extra = envelope.metadata.unwrap_or_default();
        let source = extra.get("dataOrigin").and_then(data_origin_name);
        let id = extra.get("id").and_then(Value::as_str).map(str::to_string);

        let value = match metric {
            HealthMetric::BloodGlucose => {
                let record: BloodGlucoseResult = parse(raw)?;
                for (key, code) in BLOOD_GLUCOSE_CODES.iter().zip([
                    record.relation_to_meal,
                    record.meal_type,
                    record.specimen_source,
                ]) {
                    if let Some(code) = code {
                        extra.insert(key.to_string(), code);
                    }
                }
                pick(
                    metric,
                    &[
                        (Unit::MgPerdL, record.level.in_milligrams_per_deciliter),
                        (Unit::MmolPerL, record.level.in_millimoles_per_liter),
                    ],
                    query.unit,
                )
                .map(MetricValue::Scalar)?
            }
            HealthMetric::BloodPressure => {
                let record: BloodPressureResult = parse(raw)?;
                MetricValue::BloodPressure(BloodPressureValue {
                    systolic: record.systolic.in_millimeters_of_mercury,
                    diastolic: record.diastolic.in_millimeters_of_mercury,
                })
            }
            HealthMetric::Height => {
                let record: HeightResult = parse(raw)?;
                let length = record.height;
                pick(
                    metric,
                    &[
                        (Unit::Meter, length.in_meters),
                        (Unit::Foot, length.in_feet),
                        (Unit::Inch, length.in_inches),
                    ],
                    query.unit,
                )
                .map(MetricValue::Scalar)?
            }
            HealthMetric::Weight => {
                let record: WeightResult = parse(raw)?;
                let mass = record.weight;
                pick(
                    metric,
                    &[
                        (Unit::Kg, mass.in_kilograms),
                        (Unit::Gram, mass.in_grams),
                        (Unit::Pounds, mass.in_pounds),
                    ],
                    query.unit,
                )
                .map(MetricValue::Scalar)?
            }
            HealthMetric::HeartRate => {
                let record: HeartRateResult = parse(raw)?;
                let sample = record.samples.into_iter().next()?;
                time = sample.time.or(time);
                MetricValue::Scalar(sample.beats_per_minute)
            }
            HealthMetric::RestingHeartRate => {
                let record: RestingHeartRateResult = parse(raw)?;
                MetricValue::Scalar(record.beats_per_minute)
            }
            HealthMetric::OxygenSaturation => {
                let record: OxygenSaturationResult = parse(raw)?;
                MetricValue::Scalar(record.percentage.value())
            }
            HealthMetric::Steps => {
                let record: StepsResult = parse(raw)?;
                MetricValue::Scalar(record.count)
            }
            HealthMetric::ActiveEnergyBurned => {
                let record: ActiveCaloriesResult = parse(raw)?;
                let energy = record.energy;
                pick(
                    metric,
                    &[
                        (Unit::Calories, energy.in_kilocalories),
                        (Unit::Joules, energy.in_joules),
                        (Unit::Kilojoules, energy.in_kilojoules),
                        // `inCalories` counts small calories
                        (Unit::Calories, energy.in_calories.map(|c| c / 1_000.0)),
                    ],
                    query.unit,
                )
                .map(MetricValue::Scalar)?
            }
            HealthMetric::BasalEnergyBurned => {
                let record: BasalMetabolicRateResult = parse(raw)?;
                let rate = record.basal_metabolic_rate;
                pick(
                    metric,
                    &[
                        (Unit::Joules, rate.in_watts.map(units::watts_to_joules_per_day)),
                        (Unit::Calories, rate.in_kilocalories_per_day),
                    ],
                    query.unit,
                )
                .map(MetricValue::Scalar)?
            }
        };

        Some(NormalizedResult {
            value,
            id,
            time: time?,
            metadata: ResultMetadata { source, extra },
        })
    }

    fn translate_query(&self, _metric: HealthMetric, query: &ReadQuery) -> PlatformQuery {
        PlatformQuery::HealthConnect(query::to_health_connect(query))
    }
}

fn parse<T: DeserializeOwned>(raw: &Value) -> Option<T> {
    T::deserialize(raw).ok()
}

/// Integer code from the request metadata; fractional codes are truncated
fn metadata_code(request: &WriteRequest, key: &str) -> i64 {
    request
        .metadata_field(key)
        .and_then(|code| code.as_i64().or_else(|| code.as_f64().map(|c| c.trunc() as i64)))
        .unwrap_or(0)
}

/// `dataOrigin` is a package name, or an object wrapping one
fn data_origin_name(origin: &Value) -> Option<String> {
    match origin {
        Value::String(name) => Some(name.clone()),
        Value::Object(fields) => fields
            .get("packageName")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

/// Value in `target` (or the metric default), preferring the representation the
/// store already computed and converting from any other one otherwise.
fn pick(metric: HealthMetric, representations: &[(Unit, Option<f64>)], target: Option<Unit>) -> Option<f64> {
    let target = units::resolve(metric, target)?;
    representations
        .iter()
        .find(|(unit, _)| *unit == target)
        .and_then(|(_, value)| *value)
        .or_else(|| {
            representations
                .iter()
                .find_map(|(unit, value)| value.map(|v| units::convert(metric, v, *unit, Some(target))))
        })
}

// Records inserted into Health Connect

/// Record handed to `insertRecords`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "recordType")]
pub enum HealthConnectRecord {
    BloodGlucose(BloodGlucoseRecord),
    Steps(StepsRecord),
    Weight(WeightRecord),
    Height(HeightRecord),
    HeartRate(HeartRateRecord),
    ActiveCaloriesBurned(EnergyRecord),
    BasalMetabolicRate(BasalMetabolicRateRecord),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitValue {
    pub unit: String,
    pub value: f64,
}

impl UnitValue {
    fn new(unit: &str, value: f64) -> Self {
        Self {
            unit: unit.to_string(),
            value,
        }
    }

    fn labelled(unit: Unit, value: f64) -> Option<Self> {
        units::health_connect_label(unit).map(|label| Self::new(label, value))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodGlucoseRecord {
    pub time: String,
    pub level: UnitValue,
    pub relation_to_meal: i64,
    pub meal_type: i64,
    pub specimen_source: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepsRecord {
    pub start_time: String,
    pub end_time: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightRecord {
    pub time: String,
    pub weight: UnitValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightRecord {
    pub time: String,
    pub height: UnitValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartRateSample {
    pub time: String,
    pub beats_per_minute: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartRateRecord {
    pub start_time: String,
    pub end_time: String,
    pub samples: Vec<HeartRateSample>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyRecord {
    pub start_time: String,
    pub end_time: String,
    pub energy: UnitValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasalMetabolicRateRecord {
    pub time: String,
    pub basal_metabolic_rate: UnitValue,
}

// Records returned by readRecords

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordEnvelope {
    time: Option<String>,
    start_time: Option<String>,
    metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BloodGlucoseLevel {
    in_milligrams_per_deciliter: Option<f64>,
    in_millimoles_per_liter: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BloodGlucoseResult {
    level: BloodGlucoseLevel,
    relation_to_meal: Option<Value>,
    meal_type: Option<Value>,
    specimen_source: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pressure {
    in_millimeters_of_mercury: f64,
}

#[derive(Debug, Deserialize)]
struct BloodPressureResult {
    systolic: Pressure,
    diastolic: Pressure,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Length {
    in_meters: Option<f64>,
    in_feet: Option<f64>,
    in_inches: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct HeightResult {
    height: Length,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Mass {
    in_kilograms: Option<f64>,
    in_grams: Option<f64>,
    in_pounds: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WeightResult {
    weight: Mass,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HeartRateSampleResult {
    time: Option<String>,
    beats_per_minute: f64,
}

#[derive(Debug, Deserialize)]
struct HeartRateResult {
    samples: Vec<HeartRateSampleResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestingHeartRateResult {
    beats_per_minute: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Percentage {
    Bare(f64),
    Wrapped { value: f64 },
}

impl Percentage {
    fn value(&self) -> f64 {
        match self {
            Percentage::Bare(value) | Percentage::Wrapped { value } => *value,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OxygenSaturationResult {
    percentage: Percentage,
}

#[derive(Debug, Deserialize)]
struct StepsResult {
    count: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Energy {
    in_calories: Option<f64>,
    in_kilocalories: Option<f64>,
    in_joules: Option<f64>,
    in_kilojoules: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ActiveCaloriesResult {
    energy: Energy,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Power {
    in_kilocalories_per_day: Option<f64>,
    in_watts: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BasalMetabolicRateResult {
    basal_metabolic_rate: Power,
}
