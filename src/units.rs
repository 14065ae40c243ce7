//! Unit catalog
//!
//! Closed set of units per metric family, the factors between them, the default
//! unit for every metric, and the unit labels each platform store understands.
//! Everything here is pure lookup and arithmetic; nothing fails. A unit that does
//! not belong to a metric's family is replaced by that metric's default.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HealthLinkError;
use crate::types::HealthMetric;

/// Seconds in a day, the factor between watts and joules per day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Joules in one dietary calorie (kilocalorie)
pub const JOULES_PER_CALORIE: f64 = 4_184.0;

/// Grams in one avoirdupois pound
pub const GRAMS_PER_POUND: f64 = 453.592_37;

/// mg/dL per mmol/L of glucose (molar mass 180.156 g/mol)
pub const MG_PER_DL_PER_MMOL_PER_L: f64 = 18.015_6;

/// Caller-facing unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "kg")]
    Kg,
    #[serde(rename = "pounds")]
    Pounds,
    #[serde(rename = "gram")]
    Gram,
    #[serde(rename = "cm")]
    Cm,
    #[serde(rename = "meter")]
    Meter,
    #[serde(rename = "foot")]
    Foot,
    #[serde(rename = "inch")]
    Inch,
    #[serde(rename = "mgPerdL")]
    MgPerdL,
    #[serde(rename = "mmolPerL")]
    MmolPerL,
    #[serde(rename = "calories")]
    Calories,
    #[serde(rename = "joules")]
    Joules,
    #[serde(rename = "kilojoules")]
    Kilojoules,
    #[serde(rename = "bpm")]
    Bpm,
    #[serde(rename = "count")]
    Count,
    #[serde(rename = "percent")]
    Percent,
}

/// Physical dimension a unit measures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitFamily {
    Mass,
    Length,
    BloodGlucose,
    Energy,
    HeartRate,
    Count,
    Percentage,
}

impl Unit {
    pub const ALL: [Unit; 15] = [
        Unit::Kg,
        Unit::Pounds,
        Unit::Gram,
        Unit::Cm,
        Unit::Meter,
        Unit::Foot,
        Unit::Inch,
        Unit::MgPerdL,
        Unit::MmolPerL,
        Unit::Calories,
        Unit::Joules,
        Unit::Kilojoules,
        Unit::Bpm,
        Unit::Count,
        Unit::Percent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::Pounds => "pounds",
            Unit::Gram => "gram",
            Unit::Cm => "cm",
            Unit::Meter => "meter",
            Unit::Foot => "foot",
            Unit::Inch => "inch",
            Unit::MgPerdL => "mgPerdL",
            Unit::MmolPerL => "mmolPerL",
            Unit::Calories => "calories",
            Unit::Joules => "joules",
            Unit::Kilojoules => "kilojoules",
            Unit::Bpm => "bpm",
            Unit::Count => "count",
            Unit::Percent => "percent",
        }
    }

    pub fn family(&self) -> UnitFamily {
        match self {
            Unit::Kg | Unit::Pounds | Unit::Gram => UnitFamily::Mass,
            Unit::Cm | Unit::Meter | Unit::Foot | Unit::Inch => UnitFamily::Length,
            Unit::MgPerdL | Unit::MmolPerL => UnitFamily::BloodGlucose,
            Unit::Calories | Unit::Joules | Unit::Kilojoules => UnitFamily::Energy,
            Unit::Bpm => UnitFamily::HeartRate,
            Unit::Count => UnitFamily::Count,
            Unit::Percent => UnitFamily::Percentage,
        }
    }

    /// Size of the unit relative to the smallest unit of its family.
    ///
    /// Bases: gram, centimeter, mg/dL, joule. Conversions multiply by the source
    /// factor and divide by the target factor, so power-of-ten steps stay exact.
    fn factor(&self) -> f64 {
        match self {
            Unit::Gram => 1.0,
            Unit::Kg => 1_000.0,
            Unit::Pounds => GRAMS_PER_POUND,
            Unit::Cm => 1.0,
            Unit::Meter => 100.0,
            Unit::Inch => 2.54,
            Unit::Foot => 30.48,
            Unit::MgPerdL => 1.0,
            Unit::MmolPerL => MG_PER_DL_PER_MMOL_PER_L,
            Unit::Joules => 1.0,
            Unit::Kilojoules => 1_000.0,
            Unit::Calories => JOULES_PER_CALORIE,
            Unit::Bpm | Unit::Count | Unit::Percent => 1.0,
        }
    }

    /// Parse a unit label reported on a HealthKit sample.
    ///
    /// Accepts the HealthKit option names (`gram`, `pound`, `mgPerdL`, ...) as
    /// well as the display symbols samples tend to carry (`kg`, `lb`, `mg/dL`,
    /// `mmol<180.15...>/L`, `kcal`).
    pub fn from_healthkit_label(label: &str) -> Option<Unit> {
        let unit = match label {
            "g" | "gram" => Unit::Gram,
            "kg" | "kilogram" => Unit::Kg,
            "lb" | "pound" | "pounds" => Unit::Pounds,
            "cm" | "centimeter" => Unit::Cm,
            "m" | "meter" => Unit::Meter,
            "ft" | "foot" => Unit::Foot,
            "in" | "inch" => Unit::Inch,
            "mg/dL" | "mgPerdL" => Unit::MgPerdL,
            "kcal" | "kilocalorie" | "calories" => Unit::Calories,
            "J" | "joule" => Unit::Joules,
            "kJ" | "kilojoule" => Unit::Kilojoules,
            "bpm" | "count/min" => Unit::Bpm,
            "count" => Unit::Count,
            "%" | "percent" => Unit::Percent,
            other if other.starts_with("mmol") => Unit::MmolPerL,
            _ => return None,
        };
        Some(unit)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = HealthLinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::ALL
            .iter()
            .copied()
            .find(|u| u.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| HealthLinkError::UnknownUnit(s.to_string()))
    }
}

/// Unit family a metric is measured in; blood pressure is compound mmHg and
/// takes no unit.
pub fn family_for(metric: HealthMetric) -> Option<UnitFamily> {
    match metric {
        HealthMetric::Weight => Some(UnitFamily::Mass),
        HealthMetric::Height => Some(UnitFamily::Length),
        HealthMetric::BloodGlucose => Some(UnitFamily::BloodGlucose),
        HealthMetric::ActiveEnergyBurned | HealthMetric::BasalEnergyBurned => {
            Some(UnitFamily::Energy)
        }
        HealthMetric::HeartRate | HealthMetric::RestingHeartRate => Some(UnitFamily::HeartRate),
        HealthMetric::Steps => Some(UnitFamily::Count),
        HealthMetric::OxygenSaturation => Some(UnitFamily::Percentage),
        HealthMetric::BloodPressure => None,
    }
}

/// Unit used when the caller names none, or names one from the wrong family
pub fn default_unit(metric: HealthMetric) -> Option<Unit> {
    match metric {
        HealthMetric::Height => Some(Unit::Inch),
        HealthMetric::Weight => Some(Unit::Pounds),
        HealthMetric::BloodGlucose => Some(Unit::MmolPerL),
        HealthMetric::ActiveEnergyBurned | HealthMetric::BasalEnergyBurned => {
            Some(Unit::Kilojoules)
        }
        HealthMetric::HeartRate | HealthMetric::RestingHeartRate => Some(Unit::Bpm),
        HealthMetric::Steps => Some(Unit::Count),
        HealthMetric::OxygenSaturation => Some(Unit::Percent),
        HealthMetric::BloodPressure => None,
    }
}

/// Units accepted for a metric
pub fn units_for(metric: HealthMetric) -> Vec<Unit> {
    match family_for(metric) {
        Some(family) => Unit::ALL
            .iter()
            .copied()
            .filter(|u| u.family() == family)
            .collect(),
        None => Vec::new(),
    }
}

/// Whether `unit` measures what `metric` measures
pub fn accepts(metric: HealthMetric, unit: Unit) -> bool {
    family_for(metric) == Some(unit.family())
}

/// The requested unit when it fits the metric, otherwise the metric default
pub fn resolve(metric: HealthMetric, requested: Option<Unit>) -> Option<Unit> {
    match requested {
        Some(unit) if accepts(metric, unit) => Some(unit),
        _ => default_unit(metric),
    }
}

/// Convert `value` expressed in `from` into `target` (or the metric default).
///
/// Never fails: when `from` does not belong to the metric's family the value is
/// returned untouched.
pub fn convert(metric: HealthMetric, value: f64, from: Unit, target: Option<Unit>) -> f64 {
    let Some(to) = resolve(metric, target) else {
        return value;
    };
    if from == to || from.family() != to.family() {
        return value;
    }
    value * from.factor() / to.factor()
}

/// Watts to joules per day
pub fn watts_to_joules_per_day(watts: f64) -> f64 {
    watts * SECONDS_PER_DAY
}

/// Joules per day to watts
pub fn joules_per_day_to_watts(joules_per_day: f64) -> f64 {
    joules_per_day / SECONDS_PER_DAY
}

/// Kilojoules per day to watts (1 W = 86.4 kJ/day)
pub fn kilojoules_per_day_to_watts(kilojoules_per_day: f64) -> f64 {
    kilojoules_per_day / (SECONDS_PER_DAY / 1_000.0)
}

/// Unit label for a HealthKit write/query option
pub fn healthkit_label(unit: Unit) -> &'static str {
    match unit {
        // HealthKit stores mass in grams and length in meters
        Unit::Kg | Unit::Gram => "gram",
        Unit::Cm | Unit::Meter => "meter",
        Unit::Pounds => "pound",
        Unit::Foot => "foot",
        Unit::Inch => "inch",
        Unit::MgPerdL => "mgPerdL",
        Unit::MmolPerL => "mmolPerL",
        Unit::Calories => "kilocalorie",
        Unit::Joules => "joule",
        Unit::Kilojoules => "kilojoule",
        Unit::Bpm => "bpm",
        Unit::Count => "count",
        Unit::Percent => "percent",
    }
}

/// Unit HealthKit actually stores for a caller unit
pub fn healthkit_native(unit: Unit) -> Unit {
    match unit {
        Unit::Kg => Unit::Gram,
        Unit::Cm => Unit::Meter,
        other => other,
    }
}

/// Unit label for a Health Connect mass/length/energy/glucose field.
///
/// Centimeters have no Health Connect label; callers convert them to meters
/// first.
pub fn health_connect_label(unit: Unit) -> Option<&'static str> {
    let label = match unit {
        Unit::Kg => "kilograms",
        Unit::Gram => "grams",
        Unit::Pounds => "pounds",
        Unit::Meter => "meters",
        Unit::Foot => "feet",
        Unit::Inch => "inches",
        Unit::MgPerdL => "milligramsPerDeciliter",
        Unit::MmolPerL => "millimolesPerLiter",
        // Health Connect "calories" are small calories
        Unit::Calories => "kilocalories",
        Unit::Joules => "joules",
        Unit::Kilojoules => "kilojoules",
        Unit::Cm | Unit::Bpm | Unit::Count | Unit::Percent => return None,
    };
    Some(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_weight_conversions() {
        assert_eq!(convert(HealthMetric::Weight, 70.0, Unit::Kg, Some(Unit::Gram)), 70_000.0);
        assert_eq!(convert(HealthMetric::Weight, 70_000.0, Unit::Gram, Some(Unit::Kg)), 70.0);
        assert_close(
            convert(HealthMetric::Weight, 1.0, Unit::Kg, Some(Unit::Pounds)),
            2.204_622_621_848_776,
        );
    }

    #[test]
    fn test_height_conversions() {
        assert_eq!(convert(HealthMetric::Height, 175.0, Unit::Cm, Some(Unit::Meter)), 1.75);
        assert_eq!(convert(HealthMetric::Height, 180.0, Unit::Cm, Some(Unit::Meter)), 1.8);
        assert_eq!(convert(HealthMetric::Height, 1.75, Unit::Meter, Some(Unit::Cm)), 175.0);
        assert_close(convert(HealthMetric::Height, 1.0, Unit::Foot, Some(Unit::Inch)), 12.0);
    }

    #[test]
    fn test_unrecognized_target_falls_back_to_default() {
        // Height defaults to inches, weight to pounds
        assert_close(convert(HealthMetric::Height, 2.54, Unit::Cm, None), 1.0);
        assert_close(
            convert(HealthMetric::Height, 2.54, Unit::Cm, Some(Unit::Kg)),
            1.0,
        );
        assert_close(
            convert(HealthMetric::Weight, 453.592_37, Unit::Gram, Some(Unit::Calories)),
            1.0,
        );
    }

    #[test]
    fn test_blood_glucose_conversion() {
        assert_close(
            convert(HealthMetric::BloodGlucose, 5.0, Unit::MmolPerL, Some(Unit::MgPerdL)),
            90.078,
        );
        assert_close(
            convert(HealthMetric::BloodGlucose, 90.078, Unit::MgPerdL, Some(Unit::MmolPerL)),
            5.0,
        );
    }

    #[test]
    fn test_energy_conversions() {
        assert_eq!(
            convert(HealthMetric::ActiveEnergyBurned, 1.0, Unit::Kilojoules, Some(Unit::Joules)),
            1_000.0
        );
        assert_eq!(
            convert(HealthMetric::ActiveEnergyBurned, 245.0, Unit::Calories, Some(Unit::Joules)),
            1_025_080.0
        );
        assert_close(watts_to_joules_per_day(1.0), 86_400.0);
        assert_close(joules_per_day_to_watts(86_400.0), 1.0);
        assert_close(kilojoules_per_day_to_watts(86.4), 1.0);
    }

    #[test]
    fn test_mismatched_source_unit_is_untouched() {
        assert_eq!(convert(HealthMetric::Weight, 42.0, Unit::Cm, Some(Unit::Kg)), 42.0);
        assert_eq!(convert(HealthMetric::BloodPressure, 120.0, Unit::Count, None), 120.0);
    }

    #[test]
    fn test_every_unit_bearing_metric_has_a_default() {
        for metric in HealthMetric::ALL {
            match family_for(metric) {
                Some(family) => {
                    let unit = default_unit(metric).expect("default unit");
                    assert_eq!(unit.family(), family);
                    assert!(units_for(metric).contains(&unit));
                }
                None => assert!(default_unit(metric).is_none()),
            }
        }
    }

    #[test]
    fn test_healthkit_labels() {
        assert_eq!(healthkit_label(Unit::Kg), "gram");
        assert_eq!(healthkit_native(Unit::Kg), Unit::Gram);
        assert_eq!(healthkit_label(Unit::Cm), "meter");
        assert_eq!(Unit::from_healthkit_label("mmol<180.1558800000541>/L"), Some(Unit::MmolPerL));
        assert_eq!(Unit::from_healthkit_label("lb"), Some(Unit::Pounds));
        assert_eq!(Unit::from_healthkit_label("furlong"), None);
    }

    #[test]
    fn test_unit_serde_names() {
        assert_eq!(serde_json::to_string(&Unit::MgPerdL).unwrap(), "\"mgPerdL\"");
        assert_eq!("KG".parse::<Unit>().unwrap(), Unit::Kg);
        let unit: Unit = serde_json::from_str("\"kilojoules\"").unwrap();
        assert_eq!(unit, Unit::Kilojoules);
    }
}
