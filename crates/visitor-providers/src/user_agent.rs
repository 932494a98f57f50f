//! User-agent classification backed by `woothee`.

use visitor_core::{Classification, ClientInfo, DeviceInfo, OsInfo, UserAgentClassifier, VisitorError};
use woothee::parser::Parser;

/// Value woothee reports for anything it cannot determine.
const WOOTHEE_UNKNOWN: &str = "UNKNOWN";

/// Rule-based classifier. Crawlers come back with device kind `crawler`; nothing is filtered.
///
/// Woothee has no notion of device brand/model, rendering engine or CPU platform, so those
/// fields stay undetermined. [`UapClassifier`](crate::UapClassifier) fills them and uses this
/// classifier for the form factor only.
#[derive(Debug, Clone, Copy, Default)]
pub struct WootheeClassifier;

impl WootheeClassifier {
    pub fn new() -> Self {
        Self
    }
}

pub(crate) fn known(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value == WOOTHEE_UNKNOWN {
        None
    } else {
        Some(value.to_string())
    }
}

impl UserAgentClassifier for WootheeClassifier {
    fn name(&self) -> &str {
        "woothee"
    }

    fn classify(&self, user_agent: &str) -> Result<Classification, VisitorError> {
        let Some(result) = Parser::new().parse(user_agent) else {
            tracing::debug!(target: "visitor::session", "woothee could not classify user agent");
            return Ok(Classification::default());
        };

        Ok(Classification {
            device: DeviceInfo {
                kind: known(result.category),
                brand: None,
                model: None,
            },
            client: ClientInfo {
                name: known(result.name),
                short_name: None,
                version: known(result.version),
                engine: None,
                engine_version: None,
            },
            os: OsInfo {
                name: known(result.os),
                short_name: None,
                version: known(&result.os_version),
                platform: None,
            },
        })
    }
}
