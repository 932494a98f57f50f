//! visitor-providers: concrete delegates for visitor-core.
//!
//! [`UapClassifier`] (default) and [`WootheeClassifier`] classify user agents;
//! [`MaxMindProvider`] reads `.mmdb` files. [`Visitor`] wires them to the engine using an
//! [`EnrichmentConfig`].

mod maxmind;
mod uap;
mod user_agent;

pub use maxmind::MaxMindProvider;
pub use uap::UapClassifier;
pub use user_agent::WootheeClassifier;

use std::sync::Arc;

use visitor_core::{
    AttributeRecord, DeviceEnricher, EnrichmentConfig, GeoEnricher, RequestContext, VisitorError,
};

/// Device enricher backed by the shared [`UapClassifier`].
pub fn device_enricher() -> Result<DeviceEnricher, VisitorError> {
    Ok(DeviceEnricher::new(UapClassifier::shared()?))
}

/// Geo enricher backed by MaxMind DB files.
pub fn geo_enricher() -> GeoEnricher {
    GeoEnricher::new(Arc::new(MaxMindProvider::new()))
}

/// Both enrichers plus the categories to request from each.
#[derive(Clone)]
pub struct Visitor {
    config: EnrichmentConfig,
    device: DeviceEnricher,
    geo: GeoEnricher,
}

impl Visitor {
    pub fn new(config: EnrichmentConfig) -> Result<Self, VisitorError> {
        Ok(Self {
            config,
            device: device_enricher()?,
            geo: geo_enricher(),
        })
    }

    /// Builds a visitor from [`EnrichmentConfig::load`].
    pub fn from_env() -> Result<Self, VisitorError> {
        let config = EnrichmentConfig::load()?;
        tracing::info!(
            target: "visitor::session",
            device_categories = config.device_categories.len(),
            geo_categories = config.geo.len(),
            "visitor enrichment configured"
        );
        Self::new(config)
    }

    pub fn config(&self) -> &EnrichmentConfig {
        &self.config
    }

    /// Device record for `user_agent`, or the request's user agent when absent.
    pub fn device(
        &self,
        user_agent: Option<&str>,
        request: &RequestContext,
    ) -> Result<AttributeRecord, VisitorError> {
        self.device
            .enrich(user_agent, &self.config.device_requests(), request)
    }

    /// Geo record for `ip_address`, or the request's client address when absent.
    pub fn geo(
        &self,
        ip_address: Option<&str>,
        request: &RequestContext,
    ) -> Result<AttributeRecord, VisitorError> {
        self.geo.enrich(ip_address, &self.config.geo_requests(), request)
    }
}
