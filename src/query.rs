//! Time-range option translation
//!
//! Turns a generic [`ReadQuery`] into the query shape each platform store expects.
//! Date strings are passed through untouched; the store rejects malformed ones.

use serde::{Deserialize, Serialize};

use crate::types::{HealthMetric, ReadQuery};
use crate::units;

/// Health Connect time-range filter, tagged by its range operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operator", rename_all = "lowercase")]
pub enum TimeRangeFilter {
    /// Open-ended; the store reads up to `endTime`, or up to now without one
    Before {
        #[serde(rename = "endTime", default, skip_serializing_if = "Option::is_none")]
        end_time: Option<String>,
    },
    After {
        #[serde(rename = "startTime")]
        start_time: String,
    },
    Between {
        #[serde(rename = "startTime")]
        start_time: String,
        #[serde(rename = "endTime")]
        end_time: String,
    },
}

impl TimeRangeFilter {
    /// Select the range operator from which bounds are present
    pub fn from_query(query: &ReadQuery) -> Self {
        match (&query.start_date, &query.end_date) {
            (Some(start), Some(end)) => TimeRangeFilter::Between {
                start_time: start.clone(),
                end_time: end.clone(),
            },
            (Some(start), None) => TimeRangeFilter::After {
                start_time: start.clone(),
            },
            (None, end) => TimeRangeFilter::Before {
                end_time: end.clone(),
            },
        }
    }

    pub fn operator(&self) -> &'static str {
        match self {
            TimeRangeFilter::Before { .. } => "before",
            TimeRangeFilter::After { .. } => "after",
            TimeRangeFilter::Between { .. } => "between",
        }
    }
}

/// Read options for Health Connect `readRecords`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthConnectQuery {
    pub time_range_filter: TimeRangeFilter,
    pub ascending_order: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// Read options for the HealthKit sample getters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthKitQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub ascending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// HealthKit unit label samples should be reported in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Query handed to a platform store's read entry point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlatformQuery {
    HealthConnect(HealthConnectQuery),
    HealthKit(HealthKitQuery),
}

/// Build the Health Connect query for `query`
pub fn to_health_connect(query: &ReadQuery) -> HealthConnectQuery {
    HealthConnectQuery {
        time_range_filter: TimeRangeFilter::from_query(query),
        ascending_order: query.ascending.unwrap_or(false),
        page_size: query.limit,
    }
}

/// Build the HealthKit query for `query`.
///
/// The unit label is the one HealthKit stores natively for the requested unit,
/// so the deserializer knows which unit samples come back in.
pub fn to_healthkit(metric: HealthMetric, query: &ReadQuery) -> HealthKitQuery {
    HealthKitQuery {
        start_date: query.start_date.clone(),
        end_date: query.end_date.clone(),
        ascending: query.ascending.unwrap_or(false),
        limit: query.limit,
        unit: units::resolve(metric, query.unit).map(|u| units::healthkit_label(u).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Unit;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_both_bounds_select_between() {
        let query = ReadQuery::between("2023-01-01", "2023-01-02");
        let filter = TimeRangeFilter::from_query(&query);
        assert_eq!(filter.operator(), "between");
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({"operator": "between", "startTime": "2023-01-01", "endTime": "2023-01-02"})
        );
    }

    #[test]
    fn test_start_only_selects_after() {
        let query = ReadQuery {
            start_date: Some("2023-01-01".to_string()),
            ..ReadQuery::default()
        };
        assert_eq!(TimeRangeFilter::from_query(&query).operator(), "after");
    }

    #[test]
    fn test_no_bounds_select_before() {
        let filter = TimeRangeFilter::from_query(&ReadQuery::default());
        assert_eq!(filter, TimeRangeFilter::Before { end_time: None });
        assert_eq!(serde_json::to_value(&filter).unwrap(), json!({"operator": "before"}));

        let end_only = ReadQuery {
            end_date: Some("2023-01-02".to_string()),
            ..ReadQuery::default()
        };
        assert_eq!(TimeRangeFilter::from_query(&end_only).operator(), "before");
    }

    #[test]
    fn test_health_connect_query_defaults_to_most_recent_first() {
        let mut query = ReadQuery::between("2023-01-01", "2023-01-02");
        query.limit = Some(25);

        let translated = to_health_connect(&query);
        assert!(!translated.ascending_order);
        assert_eq!(translated.page_size, Some(25));

        query.ascending = Some(true);
        assert!(to_health_connect(&query).ascending_order);
    }

    #[test]
    fn test_dates_are_not_validated() {
        let query = ReadQuery::between("not-a-date", "also-not-a-date");
        let translated = to_health_connect(&query);
        assert_eq!(
            translated.time_range_filter,
            TimeRangeFilter::Between {
                start_time: "not-a-date".to_string(),
                end_time: "also-not-a-date".to_string(),
            }
        );
    }

    #[test]
    fn test_healthkit_query_uses_native_unit_label() {
        let query = ReadQuery::between("2023-01-01", "2023-01-02").with_unit(Unit::Kg);
        let translated = to_healthkit(HealthMetric::Weight, &query);
        assert_eq!(translated.unit.as_deref(), Some("gram"));
        assert!(!translated.ascending);

        let defaulted = to_healthkit(HealthMetric::Height, &ReadQuery::default());
        assert_eq!(defaulted.unit.as_deref(), Some("inch"));

        let compound = to_healthkit(HealthMetric::BloodPressure, &ReadQuery::default());
        assert_eq!(compound.unit, None);
    }
}
