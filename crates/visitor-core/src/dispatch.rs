//! Category tables: map a requested category name to the handler that extracts it.

use crate::error::VisitorError;
use crate::record::{AttributeKey, AttributeValue};
use crate::shared::CategoryRequest;

/// Pairs produced by one category extraction, in the order they should be written.
pub type ExtractionResult = Vec<(AttributeKey, AttributeValue)>;

/// Extraction routine for one category. Receives the prepared source (raw input plus delegate
/// handle) and the request's parameter; it returns pairs and never writes to a record.
pub type Handler<S> = fn(&S, Option<&str>) -> Result<ExtractionResult, VisitorError>;

/// Canonical form of a category token: split on `-`, `_` and whitespace, upper-case the first
/// letter of each segment, concatenate. `connection_type` and `connection-type` both become
/// `ConnectionType`; the rest of each segment keeps its case (`connectionType` → `ConnectionType`).
pub fn canonical_category(name: &str) -> String {
    name.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Static table of the categories one domain supports.
pub struct CategoryTable<S: 'static> {
    domain: &'static str,
    handlers: &'static [(&'static str, Handler<S>)],
}

impl<S: 'static> CategoryTable<S> {
    pub const fn new(domain: &'static str, handlers: &'static [(&'static str, Handler<S>)]) -> Self {
        Self { domain, handlers }
    }

    pub fn domain(&self) -> &'static str {
        self.domain
    }

    /// Handler for `category` after canonicalization. Matching ignores ASCII case, so `CITY`
    /// and `city` both reach `City`.
    pub fn get(&self, category: &str) -> Option<Handler<S>> {
        let canonical = canonical_category(category);
        self.handlers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&canonical))
            .map(|(_, handler)| *handler)
    }

    pub fn supports(&self, category: &str) -> bool {
        self.get(category).is_some()
    }

    /// Canonical names of all registered categories, in table order.
    pub fn categories(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|(name, _)| *name).collect()
    }

    /// Runs the handler for `request`. Unregistered categories yield `Ok(None)`: callers may pass
    /// a superset of category names shared with other subsystems.
    pub fn dispatch(
        &self,
        source: &S,
        request: &CategoryRequest,
    ) -> Result<Option<ExtractionResult>, VisitorError> {
        let Some(handler) = self.get(&request.category) else {
            tracing::debug!(
                target: "visitor::dispatch",
                domain = self.domain,
                category = %request.category,
                "skipping unsupported category '{}'",
                request.category
            );
            return Ok(None);
        };

        let pairs = handler(source, request.parameter())?;
        tracing::debug!(
            target: "visitor::dispatch",
            domain = self.domain,
            category = %request.category,
            pairs = pairs.len(),
            "extracted {} attributes for '{}'",
            pairs.len(),
            request.category
        );
        Ok(Some(pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREETING: AttributeKey = AttributeKey::new("greeting");
    const SHOUT: AttributeKey = AttributeKey::new("shout");

    fn greet(source: &String, _: Option<&str>) -> Result<ExtractionResult, VisitorError> {
        Ok(vec![(GREETING, format!("hello {}", source).into())])
    }

    fn shout(source: &String, suffix: Option<&str>) -> Result<ExtractionResult, VisitorError> {
        Ok(vec![(SHOUT, format!("{}{}", source.to_uppercase(), suffix.unwrap_or("")).into())])
    }

    const HANDLERS: &[(&str, Handler<String>)] = &[("Greeting", greet), ("LoudShout", shout)];

    static TABLE: CategoryTable<String> = CategoryTable::new("test", HANDLERS);

    #[test]
    fn canonicalizes_separators_and_case() {
        assert_eq!(canonical_category("connection_type"), "ConnectionType");
        assert_eq!(canonical_category("connection-type"), "ConnectionType");
        assert_eq!(canonical_category("connectionType"), "ConnectionType");
        assert_eq!(canonical_category("city"), "City");
        assert_eq!(canonical_category("__isp--"), "Isp");
        assert_eq!(canonical_category(""), "");
    }

    #[test]
    fn lookup_uses_canonical_name() {
        assert!(TABLE.supports("greeting"));
        assert!(TABLE.supports("loud-shout"));
        assert!(TABLE.supports("loud_shout"));
        assert!(TABLE.supports("LOUD_SHOUT"));
        assert!(!TABLE.supports("loudshout-extra"));
        assert_eq!(TABLE.categories(), vec!["Greeting", "LoudShout"]);
    }

    #[test]
    fn dispatch_passes_parameter_and_source() {
        let source = "ada".to_string();
        let pairs = TABLE
            .dispatch(&source, &CategoryRequest::with_parameter("loud_shout", "!"))
            .unwrap()
            .unwrap();
        assert_eq!(pairs, vec![(SHOUT, AttributeValue::from("ADA!"))]);
    }

    #[test]
    fn unsupported_category_is_skipped() {
        let source = "ada".to_string();
        let out = TABLE.dispatch(&source, &CategoryRequest::new("bogus-category")).unwrap();
        assert!(out.is_none());
    }
}
