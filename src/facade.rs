//! Unified read/write surface
//!
//! [`HealthLink`] owns a platform store binding and routes every call through
//! the codec for that store's platform, so callers never see platform shapes.

use crate::adapters::{codec_for, PlatformCodec};
use crate::config::{HealthLinkConfig, WriteFailurePolicy};
use crate::error::Result;
use crate::permissions::HealthPermissions;
use crate::registry;
use crate::store::{Availability, HealthStore};
use crate::types::{HealthMetric, NormalizedResult, Platform, ReadQuery, WriteRequest};

/// Platform-dispatching health data client
pub struct HealthLink<S: HealthStore> {
    store: S,
    config: HealthLinkConfig,
}

impl<S: HealthStore> HealthLink<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, HealthLinkConfig::default())
    }

    pub fn with_config(store: S, config: HealthLinkConfig) -> Self {
        Self { store, config }
    }

    pub fn platform(&self) -> Platform {
        self.store.platform()
    }

    pub fn config(&self) -> &HealthLinkConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn codec(&self) -> &'static dyn PlatformCodec {
        codec_for(self.platform())
    }

    /// Whether the platform SDK can be used; store errors propagate
    pub async fn is_available(&self) -> Result<bool> {
        let availability = self.store.availability().await?;
        if !availability.is_available() {
            tracing::info!(
                platform = %self.platform(),
                status = availability.as_str(),
                "health store unavailable"
            );
        }
        Ok(availability == Availability::Available)
    }

    /// Set up the SDK and request `permissions`, in that order
    pub async fn initialize(&self, permissions: &HealthPermissions) -> Result<()> {
        let platform = self.platform();
        if platform == Platform::Android {
            self.store.initialize().await?;
        }
        self.store
            .request_permissions(&permissions.for_platform(platform))
            .await?;
        tracing::debug!(
            %platform,
            read = permissions.read.len(),
            write = permissions.write.len(),
            "permissions requested"
        );
        Ok(())
    }

    /// Read `metric` records matching `query`, normalized and in store order.
    ///
    /// Store failures propagate; individual malformed records are dropped.
    pub async fn read(
        &self,
        metric: HealthMetric,
        query: &ReadQuery,
    ) -> Result<Vec<NormalizedResult>> {
        let codec = self.codec();
        let platform_query = codec.translate_query(metric, query);
        let entry_point = registry::read_entry_point(self.platform(), metric);

        let raw = match self.store.read_records(entry_point, &platform_query).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(platform = %self.platform(), %metric, error = %e, "read failed");
                return Err(e.into());
            }
        };

        let records = raw.into_records();
        let results = codec.deserialize_many(metric, query, &records);
        tracing::debug!(
            %metric,
            received = records.len(),
            normalized = results.len(),
            "read complete"
        );
        Ok(results)
    }

    /// Write one `metric` sample.
    ///
    /// A request that serializes to nothing is skipped. A store rejection is
    /// logged and, under [`WriteFailurePolicy::Swallow`], reported as success.
    pub async fn write(&self, metric: HealthMetric, request: &WriteRequest) -> Result<()> {
        let (Some(record), Some(entry_point)) = (
            self.codec().serialize(metric, request),
            registry::write_entry_point(self.platform(), metric),
        ) else {
            tracing::debug!(platform = %self.platform(), %metric, "nothing to write");
            return Ok(());
        };

        match self.store.insert_record(entry_point, &record).await {
            Ok(()) => Ok(()),
            Err(e) => match self.config.write_failures {
                WriteFailurePolicy::Swallow => {
                    tracing::warn!(%metric, error = %e, "write failed; ignoring");
                    Ok(())
                }
                WriteFailurePolicy::Surface => {
                    tracing::error!(%metric, error = %e, "write failed");
                    Err(e.into())
                }
            },
        }
    }
}
