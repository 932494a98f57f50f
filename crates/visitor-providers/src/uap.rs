//! User-agent classification backed by the ua-parser (`uaparser`) rule set.
//!
//! ua-parser identifies the client, the operating system and the hardware (brand and model).
//! It has no notion of form factor, so the device kind still comes from woothee; rendering
//! engine and CPU platform are read from well-known user-agent tokens.

use regex::Regex;
use std::sync::{Arc, OnceLock};
use uaparser::{Parser, UserAgentParser};
use visitor_core::{
    Classification, ClientInfo, DeviceInfo, OsInfo, UserAgentClassifier, VisitorError,
};

use crate::user_agent::{known, WootheeClassifier};

/// uap-core `regexes.yaml`, shipped with the crate (Apache-2.0, see `data/LICENSE-uap-core`).
const BUNDLED_REGEXES: &[u8] = include_bytes!("../data/regexes.yaml");

/// Family ua-parser reports when no rule matched.
const UAP_OTHER: &str = "Other";

/// First Chrome major version rendered by Blink instead of WebKit.
const FIRST_BLINK_CHROME: u32 = 28;

const CLIENT_SHORT_NAMES: &[(&str, &str)] = &[
    ("Chrome", "CH"),
    ("Chrome Mobile", "CM"),
    ("Chrome Mobile iOS", "CI"),
    ("Chrome Mobile WebView", "CV"),
    ("Chromium", "CR"),
    ("Edge", "PS"),
    ("Edge Mobile", "EM"),
    ("Firefox", "FF"),
    ("Firefox Mobile", "FM"),
    ("Firefox iOS", "FI"),
    ("IE", "IE"),
    ("IE Mobile", "IM"),
    ("Mobile Safari", "MF"),
    ("Opera", "OP"),
    ("Opera Mobile", "OM"),
    ("Safari", "SF"),
    ("Samsung Internet", "SB"),
    ("UC Browser", "UC"),
    ("Yandex Browser", "YA"),
];

const OS_SHORT_NAMES: &[(&str, &str)] = &[
    ("Android", "AND"),
    ("Chrome OS", "COS"),
    ("Debian", "DEB"),
    ("Fedora", "FED"),
    ("iOS", "IOS"),
    ("Linux", "LIN"),
    ("Mac OS X", "MAC"),
    ("Ubuntu", "UBT"),
    ("Windows", "WIN"),
];

fn short_name(table: &[(&str, &str)], name: Option<&str>) -> Option<String> {
    let name = name?;
    table
        .iter()
        .find(|(full, _)| *full == name)
        .map(|(_, short)| (*short).to_string())
}

/// ua-parser family, with the "no match" family treated as undetermined.
fn family(value: &str) -> Option<String> {
    known(value).filter(|v| v != UAP_OTHER)
}

/// Joins the version parts ua-parser found, stopping at the first missing one.
fn dotted(parts: &[Option<&str>]) -> Option<String> {
    let parts: Vec<&str> = parts
        .iter()
        .map_while(|part| *part)
        .filter(|part| !part.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join("."))
}

fn pattern(source: &str) -> Result<Regex, VisitorError> {
    Regex::new(source)
        .map_err(|e| VisitorError::Classification(format!("bad token rule {source:?}: {e}")))
}

/// Engine and platform token rules.
#[derive(Debug)]
struct TokenRules {
    trident: Regex,
    presto: Regex,
    edge_html: Regex,
    chrome: Regex,
    webkit: Regex,
    gecko: Regex,
    x64: Regex,
    arm: Regex,
    x86: Regex,
}

impl TokenRules {
    fn compile() -> Result<Self, VisitorError> {
        Ok(Self {
            trident: pattern(r"Trident/(\d+(?:\.\d+)*)")?,
            presto: pattern(r"Presto/(\d+(?:\.\d+)*)")?,
            edge_html: pattern(r"Edge/(\d+(?:\.\d+)*)")?,
            chrome: pattern(r"(?:Chrome|Chromium)/((\d+)(?:\.\d+)*)")?,
            webkit: pattern(r"AppleWebKit/(\d+(?:\.\d+)*)")?,
            gecko: pattern(r"rv:(\d+(?:\.\d+)*)\).*Gecko/")?,
            x64: pattern(r"(?i)\b(?:x86_64|x64|win64|wow64|amd64)\b")?,
            arm: pattern(r"(?i)\b(?:arm\w*|aarch64)\b")?,
            x86: pattern(r"(?i)\b(?:i[3-6]86|x86)\b")?,
        })
    }

    /// Rendering engine name and version.
    fn engine(&self, user_agent: &str) -> (Option<String>, Option<String>) {
        let version = |re: &Regex| {
            re.captures(user_agent)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        };

        for (name, re) in [
            ("Trident", &self.trident),
            ("Presto", &self.presto),
            ("EdgeHTML", &self.edge_html),
        ] {
            if let Some(v) = version(re) {
                return (Some(name.to_string()), Some(v));
            }
        }
        if let Some(caps) = self.chrome.captures(user_agent) {
            let major = caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok());
            if major.is_some_and(|m| m >= FIRST_BLINK_CHROME) {
                return (Some("Blink".into()), caps.get(1).map(|m| m.as_str().to_string()));
            }
        }
        for (name, re) in [("WebKit", &self.webkit), ("Gecko", &self.gecko)] {
            if let Some(v) = version(re) {
                return (Some(name.to_string()), Some(v));
            }
        }
        (None, None)
    }

    /// CPU architecture named in the user agent.
    fn platform(&self, user_agent: &str) -> Option<String> {
        [(&self.x64, "x64"), (&self.arm, "ARM"), (&self.x86, "x86")]
            .into_iter()
            .find(|(re, _)| re.is_match(user_agent))
            .map(|(_, platform)| platform.to_string())
    }
}

/// Default classifier: full brand, model, client, engine, OS and platform identification.
///
/// Crawlers are classified like any other client (ua-parser reports them with brand
/// `Spider`).
#[derive(Debug)]
pub struct UapClassifier {
    parser: UserAgentParser,
    tokens: TokenRules,
    form_factor: WootheeClassifier,
}

impl UapClassifier {
    /// Classifier over the bundled rule set.
    pub fn new() -> Result<Self, VisitorError> {
        Self::from_regexes(BUNDLED_REGEXES)
    }

    /// Classifier over a caller-supplied uap-core `regexes.yaml`.
    pub fn from_regexes(yaml: &[u8]) -> Result<Self, VisitorError> {
        let parser = UserAgentParser::from_bytes(yaml).map_err(|e| {
            VisitorError::Classification(format!("cannot load user-agent rules: {e}"))
        })?;
        Ok(Self {
            parser,
            tokens: TokenRules::compile()?,
            form_factor: WootheeClassifier::new(),
        })
    }

    /// Process-wide instance over the bundled rules; the rule set is compiled once.
    pub fn shared() -> Result<Arc<Self>, VisitorError> {
        static SHARED: OnceLock<Arc<UapClassifier>> = OnceLock::new();
        if let Some(classifier) = SHARED.get() {
            return Ok(Arc::clone(classifier));
        }
        let classifier = Arc::new(Self::new()?);
        tracing::debug!(target: "visitor::session", "compiled bundled user-agent rules");
        Ok(Arc::clone(SHARED.get_or_init(|| classifier)))
    }

    /// Woothee's category, with `pc` spelled `desktop` and iPads reported as tablets.
    fn device_kind(&self, user_agent: &str, model: Option<&str>) -> Result<Option<String>, VisitorError> {
        if model.is_some_and(|m| m.starts_with("iPad")) {
            return Ok(Some("tablet".into()));
        }
        let kind = self.form_factor.classify(user_agent)?.device.kind;
        Ok(kind.map(|k| if k == "pc" { "desktop".into() } else { k }))
    }
}

impl UserAgentClassifier for UapClassifier {
    fn name(&self) -> &str {
        "uap"
    }

    fn classify(&self, user_agent: &str) -> Result<Classification, VisitorError> {
        let parsed = self.parser.parse(user_agent);

        let brand = parsed
            .device
            .brand
            .as_deref()
            .and_then(family)
            .filter(|b| !b.starts_with("Generic"));
        let model = parsed.device.model.as_deref().and_then(known);
        let kind = self.device_kind(user_agent, model.as_deref())?;

        let ua = &parsed.user_agent;
        let client_name = family(&ua.family);
        let client_version = dotted(&[ua.major.as_deref(), ua.minor.as_deref(), ua.patch.as_deref()]);
        let (engine, engine_version) = self.tokens.engine(user_agent);

        let os = &parsed.os;
        let os_name = family(&os.family);
        let os_version = dotted(&[
            os.major.as_deref(),
            os.minor.as_deref(),
            os.patch.as_deref(),
            os.patch_minor.as_deref(),
        ]);

        Ok(Classification {
            device: DeviceInfo { kind, brand, model },
            client: ClientInfo {
                short_name: short_name(CLIENT_SHORT_NAMES, client_name.as_deref()),
                name: client_name,
                version: client_version,
                engine,
                engine_version,
            },
            os: OsInfo {
                short_name: short_name(OS_SHORT_NAMES, os_name.as_deref()),
                name: os_name,
                version: os_version,
                platform: self.tokens.platform(user_agent),
            },
        })
    }
}
