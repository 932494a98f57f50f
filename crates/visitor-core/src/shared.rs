//! Request context, category requests, and configuration shared by both domains.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::VisitorError;

/// Address used when the request context carries no client address at all.
pub const LOOPBACK_ADDRESS: &str = "127.0.0.1";

/// Server variable holding the client's user agent.
pub const USER_AGENT_VAR: &str = "HTTP_USER_AGENT";

/// Server variables consulted, in order, for the client address. First present wins.
pub const CLIENT_IP_VARS: [&str; 6] = [
    "HTTP_CLIENT_IP",
    "HTTP_X_FORWARDED_FOR",
    "HTTP_X_FORWARDED",
    "HTTP_FORWARDED_FOR",
    "HTTP_FORWARDED",
    "REMOTE_ADDR",
];

/// Snapshot of the inbound request, expressed as CGI-style server variables.
///
/// Sessions read defaults from here instead of any process-global state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestContext {
    /// Optional correlation id for request tracing.
    #[serde(default)]
    pub correlation_id: Option<String>,
    #[serde(default)]
    server: HashMap<String, String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a context from HTTP header pairs (`X-Forwarded-For` becomes `HTTP_X_FORWARDED_FOR`).
    pub fn from_headers<I, K, V>(headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut ctx = Self::new();
        for (name, value) in headers {
            ctx.insert_var(header_var_name(name.as_ref()), value);
        }
        ctx
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_var(name, value);
        self
    }

    /// Sets `REMOTE_ADDR`, normally the peer address of the connection.
    pub fn with_remote_addr(self, addr: impl Into<String>) -> Self {
        self.with_var("REMOTE_ADDR", addr)
    }

    pub fn insert_var(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.server.insert(name.into(), value.into());
    }

    pub fn var(&self, name: &str) -> Option<&str> {
        self.server.get(name).map(String::as_str)
    }

    /// Value of the first variable in `names` that is present, even if empty.
    pub fn first_var(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|name| self.var(name))
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.var(USER_AGENT_VAR)
    }

    /// Client address per [`CLIENT_IP_VARS`], falling back to [`LOOPBACK_ADDRESS`].
    /// The value is not checked for being a well-formed address.
    pub fn client_ip(&self) -> &str {
        self.first_var(&CLIENT_IP_VARS).unwrap_or(LOOPBACK_ADDRESS)
    }

    /// Correlation id for log fields ("-" when unset).
    pub fn trace_id(&self) -> &str {
        self.correlation_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("-")
    }
}

fn header_var_name(header: &str) -> String {
    let name = header.trim().to_ascii_uppercase().replace('-', "_");
    if name.starts_with("HTTP_") {
        name
    } else {
        format!("HTTP_{}", name)
    }
}

/// One entry of an ordered category list, with an optional category-specific parameter
/// (the database path for geo categories).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRequest {
    pub category: String,
    #[serde(default)]
    pub parameter: Option<String>,
}

impl CategoryRequest {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            parameter: None,
        }
    }

    pub fn with_parameter(category: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            parameter: Some(parameter.into()),
        }
    }

    pub fn parameter(&self) -> Option<&str> {
        self.parameter.as_deref()
    }
}

impl From<&str> for CategoryRequest {
    fn from(category: &str) -> Self {
        Self::new(category)
    }
}

impl From<String> for CategoryRequest {
    fn from(category: String) -> Self {
        Self::new(category)
    }
}

impl<C: Into<String>, P: Into<String>> From<(C, P)> for CategoryRequest {
    fn from((category, parameter): (C, P)) -> Self {
        Self::with_parameter(category, parameter)
    }
}

/// Geo category paired with the database file it reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoCategoryConfig {
    pub category: String,
    pub database: String,
}

/// Which categories to extract. Load from TOML or env.
///
/// ```toml
/// device_categories = ["device", "browser", "os"]
///
/// [[geo]]
/// category = "city"
/// database = "/var/lib/geoip/GeoIP2-City.mmdb"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    #[serde(default = "default_device_categories")]
    pub device_categories: Vec<String>,
    #[serde(default)]
    pub geo: Vec<GeoCategoryConfig>,
}

fn default_device_categories() -> Vec<String> {
    ["device", "browser", "os"].map(String::from).to_vec()
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            device_categories: default_device_categories(),
            geo: Vec::new(),
        }
    }
}

impl EnrichmentConfig {
    /// Load config from file and environment. Precedence: env `VISITOR_CONFIG` path >
    /// `config/visitor` > defaults, then `VISITOR__*` variables on top.
    pub fn load() -> Result<Self, VisitorError> {
        let config_path =
            std::env::var("VISITOR_CONFIG").unwrap_or_else(|_| "config/visitor".to_string());
        let built = config::Config::builder()
            .add_source(config::File::with_name(&config_path).required(false))
            .add_source(config::Environment::with_prefix("VISITOR").separator("__"))
            .build()?;

        Ok(built.try_deserialize()?)
    }

    /// Load config from an explicit file (format chosen by extension).
    pub fn load_from(path: &Path) -> Result<Self, VisitorError> {
        let built = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?;

        Ok(built.try_deserialize()?)
    }

    pub fn device_requests(&self) -> Vec<CategoryRequest> {
        self.device_categories
            .iter()
            .map(|c| CategoryRequest::new(c.as_str()))
            .collect()
    }

    pub fn geo_requests(&self) -> Vec<CategoryRequest> {
        self.geo
            .iter()
            .map(|g| CategoryRequest::with_parameter(g.category.as_str(), g.database.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn client_ip_prefers_earlier_variables() {
        let ctx = RequestContext::new()
            .with_remote_addr("10.0.0.1")
            .with_var("HTTP_X_FORWARDED_FOR", "203.0.113.7");
        assert_eq!(ctx.client_ip(), "203.0.113.7");

        let ctx = ctx.with_var("HTTP_CLIENT_IP", "198.51.100.2");
        assert_eq!(ctx.client_ip(), "198.51.100.2");
    }

    #[test]
    fn client_ip_defaults_to_loopback() {
        assert_eq!(RequestContext::new().client_ip(), LOOPBACK_ADDRESS);
    }

    #[test]
    fn present_but_empty_variable_still_wins() {
        let ctx = RequestContext::new()
            .with_var("HTTP_FORWARDED", "")
            .with_remote_addr("10.0.0.1");
        assert_eq!(ctx.client_ip(), "");
    }

    #[test]
    fn headers_map_to_server_variables() {
        let ctx = RequestContext::from_headers([
            ("User-Agent", "curl/8.4.0"),
            ("x-forwarded-for", "192.0.2.10"),
        ]);
        assert_eq!(ctx.user_agent(), Some("curl/8.4.0"));
        assert_eq!(ctx.var("HTTP_X_FORWARDED_FOR"), Some("192.0.2.10"));
        assert_eq!(ctx.client_ip(), "192.0.2.10");
    }

    #[test]
    fn trace_id_falls_back_to_dash() {
        assert_eq!(RequestContext::new().trace_id(), "-");
        assert_eq!(RequestContext::new().with_correlation_id("req-1").trace_id(), "req-1");
    }

    #[test]
    fn category_requests_convert_from_tuples() {
        let plain = CategoryRequest::from("device");
        assert_eq!(plain.parameter(), None);
        let geo = CategoryRequest::from(("isp", "/tmp/isp.mmdb"));
        assert_eq!(geo.category, "isp");
        assert_eq!(geo.parameter(), Some("/tmp/isp.mmdb"));
    }

    #[test]
    fn config_loads_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
device_categories = ["device"]

[[geo]]
category = "city"
database = "/data/GeoIP2-City.mmdb"

[[geo]]
category = "connection-type"
database = "/data/GeoIP2-Connection-Type.mmdb"
"#
        )
        .unwrap();

        let config = EnrichmentConfig::load_from(file.path()).unwrap();
        assert_eq!(config.device_categories, vec!["device"]);
        assert_eq!(
            config.geo_requests(),
            vec![
                CategoryRequest::with_parameter("city", "/data/GeoIP2-City.mmdb"),
                CategoryRequest::with_parameter(
                    "connection-type",
                    "/data/GeoIP2-Connection-Type.mmdb"
                ),
            ]
        );
    }

    #[test]
    fn config_defaults_device_categories() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "geo = []").unwrap();
        let config = EnrichmentConfig::load_from(file.path()).unwrap();
        assert_eq!(config, EnrichmentConfig::default());
        assert_eq!(config.device_requests().len(), 3);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = EnrichmentConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, VisitorError::Config(_)));
    }
}
