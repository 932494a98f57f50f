//! Device/browser/OS enrichment from a user-agent string.
//!
//! Classification itself is delegated to a [`UserAgentClassifier`]; this module only maps its
//! result onto the device vocabulary.

pub mod keys;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::dispatch::{CategoryTable, ExtractionResult, Handler};
use crate::error::VisitorError;
use crate::record::{AttributeKey, AttributeRecord, AttributeValue};
use crate::session::{enrich, EnrichmentDomain};
use crate::shared::{CategoryRequest, RequestContext};
use keys::*;

/// Hardware identification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Form factor (`smartphone`, `desktop`, ...).
    pub kind: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
}

/// Browser (client) identification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub version: Option<String>,
    pub engine: Option<String>,
    pub engine_version: Option<String>,
}

/// Operating-system identification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsInfo {
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub version: Option<String>,
    /// CPU architecture, e.g. `x64`, `ARM`.
    pub platform: Option<String>,
}

/// Everything a classifier knows about one user agent. `None` means undetermined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub device: DeviceInfo,
    pub client: ClientInfo,
    pub os: OsInfo,
}

/// External user-agent classifier.
///
/// Implementations must not filter bots: crawler traffic is classified like any other client.
pub trait UserAgentClassifier: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    fn classify(&self, user_agent: &str) -> Result<Classification, VisitorError>;
}

fn extract_device(c: &Classification, _: Option<&str>) -> Result<ExtractionResult, VisitorError> {
    Ok(vec![
        (DEVICE_TYPE, c.device.kind.clone().into()),
        (DEVICE_BRAND, c.device.brand.clone().into()),
        (DEVICE_MODEL, c.device.model.clone().into()),
    ])
}

fn extract_browser(c: &Classification, _: Option<&str>) -> Result<ExtractionResult, VisitorError> {
    Ok(vec![
        (BROWSER_NAME, c.client.name.clone().into()),
        (BROWSER_SHORT_NAME, c.client.short_name.clone().into()),
        (BROWSER_VERSION, c.client.version.clone().into()),
        (BROWSER_ENGINE, c.client.engine.clone().into()),
        (BROWSER_ENGINE_VERSION, c.client.engine_version.clone().into()),
    ])
}

fn extract_os(c: &Classification, _: Option<&str>) -> Result<ExtractionResult, VisitorError> {
    Ok(vec![
        (OS_NAME, c.os.name.clone().into()),
        (OS_SHORT_NAME, c.os.short_name.clone().into()),
        (OS_VERSION, c.os.version.clone().into()),
        (OS_PLATFORM, c.os.platform.clone().into()),
    ])
}

const DEVICE_HANDLERS: &[(&str, Handler<Classification>)] = &[
    ("Device", extract_device),
    ("Browser", extract_browser),
    ("Os", extract_os),
];

/// Device-domain categories: `Device`, `Browser`, `Os`.
pub static DEVICE_CATEGORIES: CategoryTable<Classification> =
    CategoryTable::new("device", DEVICE_HANDLERS);

/// Enriches user agents with a shared classifier.
#[derive(Clone)]
pub struct DeviceEnricher {
    classifier: Arc<dyn UserAgentClassifier>,
}

impl DeviceEnricher {
    pub fn new(classifier: Arc<dyn UserAgentClassifier>) -> Self {
        Self { classifier }
    }

    /// Enriches `user_agent` (or the request's `HTTP_USER_AGENT` when absent or empty).
    pub fn enrich(
        &self,
        user_agent: Option<&str>,
        requests: &[CategoryRequest],
        request: &RequestContext,
    ) -> Result<AttributeRecord, VisitorError> {
        enrich(self, user_agent, requests, request)
    }
}

impl EnrichmentDomain for DeviceEnricher {
    type Source = Classification;

    fn input_key(&self) -> AttributeKey {
        USER_AGENT
    }

    fn resolve_input(
        &self,
        supplied: Option<&str>,
        request: &RequestContext,
    ) -> Result<String, VisitorError> {
        supplied
            .filter(|ua| !AttributeValue::is_falsy_text(ua))
            .or_else(|| request.user_agent())
            .map(str::to_owned)
            .ok_or(VisitorError::MissingInput { input: "user agent" })
    }

    fn prepare(&self, user_agent: &str) -> Result<Classification, VisitorError> {
        let classification = self.classifier.classify(user_agent)?;
        tracing::debug!(
            target: "visitor::session",
            classifier = self.classifier.name(),
            device_type = classification.device.kind.as_deref().unwrap_or("-"),
            "classified user agent"
        );
        Ok(classification)
    }

    fn categories(&self) -> &'static CategoryTable<Classification> {
        &DEVICE_CATEGORIES
    }
}
