//! Health Link - one health data model over HealthKit and Health Connect
//!
//! Callers read and write a fixed set of health metrics in their own units;
//! Health Link translates queries, write requests and read results to and from
//! each platform store's shapes: unit catalog → record-type registry → query
//! translation → platform codec.
//!
//! ## Modules
//!
//! - **Codecs** ([`adapters`]): pure, synchronous platform translation
//! - **Facade** ([`HealthLink`]): async read/write over a [`HealthStore`] binding
//! - **Bridges** ([`bridge`], [`ffi`]): JSON string entry points for hosts

pub mod adapters;
pub mod bridge;
pub mod config;
pub mod error;
pub mod facade;
pub mod logging;
pub mod permissions;
pub mod query;
pub mod registry;
pub mod store;
pub mod types;
pub mod units;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use adapters::{codec_for, PlatformCodec, PlatformRecord};
pub use config::{HealthLinkConfig, WriteFailurePolicy};
pub use error::HealthLinkError;
pub use facade::HealthLink;
pub use permissions::HealthPermissions;
pub use store::{Availability, HealthStore, StoreError};
pub use types::{HealthMetric, MetricValue, NormalizedResult, Platform, ReadQuery, WriteRequest};
pub use units::Unit;

/// Health Link version
pub const HEALTH_LINK_VERSION: &str = env!("CARGO_PKG_VERSION");
