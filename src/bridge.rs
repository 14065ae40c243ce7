//! JSON string bridge
//!
//! String-in/string-out entry points over the codecs, shared by the FFI layer
//! and the `healthlink` CLI. Platforms, metrics and units are given by name.

use serde_json::Value;

use crate::adapters::codec_for;
use crate::error::Result;
use crate::permissions::HealthPermissions;
use crate::store::RawRecords;
use crate::types::{HealthMetric, Platform, ReadQuery, WriteRequest};

fn parse_target(platform: &str, metric: &str) -> Result<(Platform, HealthMetric)> {
    Ok((platform.parse()?, metric.parse()?))
}

/// Parse a read query, treating an empty string as the default query
fn parse_query(query_json: &str) -> Result<ReadQuery> {
    if query_json.trim().is_empty() {
        return Ok(ReadQuery::default());
    }
    Ok(serde_json::from_str(query_json)?)
}

/// Serialize a write request into the platform record to insert.
///
/// # Arguments
/// * `platform` - `ios` or `android`
/// * `metric` - Metric name, e.g. `Weight`
/// * `request_json` - Write request JSON (`{value, unit, time, ...}`)
///
/// # Returns
/// Record JSON, or `null` when there is nothing to write
pub fn serialize_write(platform: &str, metric: &str, request_json: &str) -> Result<String> {
    let (platform, metric) = parse_target(platform, metric)?;
    let request: WriteRequest = serde_json::from_str(request_json)?;
    let record = codec_for(platform).serialize(metric, &request);
    Ok(serde_json::to_string(&record)?)
}

/// Normalize raw platform records.
///
/// `records_json` may be a bare array or a `{records: [...]}` wrapper; a single
/// record object is accepted as a batch of one. Records that do not normalize
/// are dropped.
pub fn deserialize_read(
    platform: &str,
    metric: &str,
    query_json: &str,
    records_json: &str,
) -> Result<String> {
    let (platform, metric) = parse_target(platform, metric)?;
    let query = parse_query(query_json)?;
    let raw: Value = serde_json::from_str(records_json)?;
    let records = match serde_json::from_value::<RawRecords>(raw.clone()) {
        Ok(batch) => batch.into_records(),
        Err(_) => vec![raw],
    };
    let results = codec_for(platform).deserialize_many(metric, &query, &records);
    Ok(serde_json::to_string(&results)?)
}

/// Translate a read query into the platform's query shape
pub fn translate_query(platform: &str, metric: &str, query_json: &str) -> Result<String> {
    let (platform, metric) = parse_target(platform, metric)?;
    let query = parse_query(query_json)?;
    let translated = codec_for(platform).translate_query(metric, &query);
    Ok(serde_json::to_string(&translated)?)
}

/// Map `{read, write}` metric lists to the platform's permission request
pub fn map_permissions(platform: &str, permissions_json: &str) -> Result<String> {
    let platform: Platform = platform.parse()?;
    let permissions: HealthPermissions = serde_json::from_str(permissions_json)?;
    Ok(serde_json::to_string(&permissions.for_platform(platform))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HealthLinkError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn parsed(s: String) -> Value {
        serde_json::from_str(&s).unwrap()
    }

    #[test]
    fn test_serialize_write() {
        let record = serialize_write(
            "android",
            "Height",
            r#"{"value": 175, "unit": "cm", "time": "2023-01-01T10:00:00.000Z"}"#,
        )
        .unwrap();
        assert_eq!(
            parsed(record),
            json!({
                "recordType": "Height",
                "time": "2023-01-01T10:00:00.000Z",
                "height": {"unit": "meters", "value": 1.75}
            })
        );

        let nothing = serialize_write("ios", "Weight", r#"{"value": 70}"#).unwrap();
        assert_eq!(nothing, "null");
    }

    #[test]
    fn test_deserialize_read_shapes() {
        let wrapped = deserialize_read(
            "android",
            "RestingHeartRate",
            "",
            r#"{"records": [{"recordType": "RestingHeartRate", "beatsPerMinute": 55, "time": "t"}]}"#,
        )
        .unwrap();
        assert_eq!(parsed(wrapped)[0]["value"], json!(55.0));

        let single = deserialize_read(
            "ios",
            "OxygenSaturation",
            "{}",
            r#"{"value": 0.5, "startDate": "t"}"#,
        )
        .unwrap();
        assert_eq!(parsed(single)[0]["value"], json!(50.0));
    }

    #[test]
    fn test_translate_query() {
        let query = translate_query(
            "android",
            "Steps",
            r#"{"startDate": "2023-01-01", "endDate": "2023-01-02", "limit": 10}"#,
        )
        .unwrap();
        assert_eq!(
            parsed(query),
            json!({
                "timeRangeFilter": {"operator": "between", "startTime": "2023-01-01", "endTime": "2023-01-02"},
                "ascendingOrder": false,
                "pageSize": 10
            })
        );
    }

    #[test]
    fn test_map_permissions() {
        let mapped = map_permissions("ios", r#"{"read": ["BloodPressure"], "write": []}"#).unwrap();
        assert_eq!(
            parsed(mapped),
            json!({"permissions": {"read": ["BloodPressureDiastolic", "BloodPressureSystolic"], "write": []}})
        );
    }

    #[test]
    fn test_unknown_names_are_errors() {
        assert!(matches!(
            serialize_write("web", "Weight", "{}"),
            Err(HealthLinkError::UnknownPlatform(_))
        ));
        assert!(matches!(
            translate_query("ios", "Mood", "{}"),
            Err(HealthLinkError::UnknownMetric(_))
        ));
        assert!(matches!(
            serialize_write("ios", "Weight", "not json"),
            Err(HealthLinkError::Json(_))
        ));
    }
}
