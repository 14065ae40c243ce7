//! Platform codecs
//!
//! Each codec serializes platform-neutral write requests into the record shape
//! its store inserts, and deserializes the store's raw read results into
//! [`NormalizedResult`]s. Codecs are stateless and never fail: an absent result
//! means "nothing to write" or "malformed record".

mod health_connect;
mod healthkit;

pub use health_connect::{
    BasalMetabolicRateRecord, BloodGlucoseRecord, EnergyRecord, HealthConnectCodec,
    HealthConnectRecord, HeartRateRecord, HeartRateSample, HeightRecord, StepsRecord, UnitValue,
    WeightRecord,
};
pub use healthkit::{HealthKitCodec, HealthKitSample, HealthKitWriteOptions};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::query::PlatformQuery;
use crate::types::{HealthMetric, NormalizedResult, Platform, ReadQuery, WriteRequest};

/// Record handed to a platform store's write entry point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlatformRecord {
    HealthConnect(HealthConnectRecord),
    HealthKit(HealthKitWriteOptions),
}

/// Trait for platform codecs
pub trait PlatformCodec: Send + Sync {
    /// Platform this codec speaks for
    fn platform(&self) -> Platform;

    /// Build the record to insert, or `None` when there is nothing to write
    fn serialize(&self, metric: HealthMetric, request: &WriteRequest) -> Option<PlatformRecord>;

    /// Normalize one raw record, or `None` when it is malformed or foreign
    fn deserialize(
        &self,
        metric: HealthMetric,
        query: &ReadQuery,
        raw: &Value,
    ) -> Option<NormalizedResult>;

    /// Build the store query for a read
    fn translate_query(&self, metric: HealthMetric, query: &ReadQuery) -> PlatformQuery;

    /// Normalize a batch, dropping records that yield nothing and keeping order
    fn deserialize_many(
        &self,
        metric: HealthMetric,
        query: &ReadQuery,
        raw: &[Value],
    ) -> Vec<NormalizedResult> {
        raw.iter()
            .enumerate()
            .filter_map(|(index, record)| {
                let result = self.deserialize(metric, query, record);
                if result.is_none() {
                    tracing::debug!(
                        platform = %self.platform(),
                        %metric,
                        index,
                        "dropping record that did not deserialize"
                    );
                }
                result
            })
            .collect()
    }
}

/// Codec for `platform`
pub fn codec_for(platform: Platform) -> &'static dyn PlatformCodec {
    match platform {
        Platform::Ios => &HealthKitCodec,
        Platform::Android => &HealthConnectCodec,
    }
}

/// Current time as an ISO-8601 UTC string with millisecond precision
pub(crate) fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
