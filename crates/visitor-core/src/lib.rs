//! visitor-core: visitor enrichment (attribute record, category dispatch, enrichment sessions).
//!
//! Two domains share one engine: [`DeviceEnricher`] classifies user agents and [`GeoEnricher`]
//! looks IP addresses up in geo/network databases. Both delegate the heavy lifting to a trait
//! object ([`UserAgentClassifier`], [`GeoProvider`]); concrete providers live in
//! `visitor-providers`.

pub mod device;
pub mod dispatch;
pub mod geo;
pub mod record;
pub mod session;

mod error;
mod shared;

pub use error::VisitorError;
pub use shared::{
    CategoryRequest, EnrichmentConfig, GeoCategoryConfig, RequestContext, CLIENT_IP_VARS,
    LOOPBACK_ADDRESS, USER_AGENT_VAR,
};

// Record
pub use record::{AttributeKey, AttributeRecord, AttributeValue, JsonOptions, UNKNOWN};

// Engine
pub use dispatch::{canonical_category, CategoryTable, ExtractionResult, Handler};
pub use session::{enrich, EnrichmentDomain, EnrichmentSession};

// Domains
pub use device::{
    Classification, ClientInfo, DeviceEnricher, DeviceInfo, OsInfo, UserAgentClassifier,
    DEVICE_CATEGORIES,
};
pub use geo::{GeoEnricher, GeoProvider, GeoSource, GEO_CATEGORIES};
