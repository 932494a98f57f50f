//! Enrichment sessions: resolve the raw input, run the requested categories, assemble the record.

use crate::dispatch::CategoryTable;
use crate::error::VisitorError;
use crate::record::{AttributeKey, AttributeRecord};
use crate::shared::{CategoryRequest, RequestContext};

/// One kind of enrichment (device classification, geo lookup).
///
/// The session drives every domain the same way; a domain only supplies its input key, its
/// defaulting rule, how to prepare the handler source, and its category table.
pub trait EnrichmentDomain {
    /// What handlers receive: the raw input together with the initialized delegate.
    type Source: 'static;

    /// Key the raw input is recorded under.
    fn input_key(&self) -> AttributeKey;

    /// Supplied input when non-empty, otherwise the request-context default.
    fn resolve_input(
        &self,
        supplied: Option<&str>,
        request: &RequestContext,
    ) -> Result<String, VisitorError>;

    /// Runs once per session, before any category, whichever categories were requested.
    fn prepare(&self, input: &str) -> Result<Self::Source, VisitorError>;

    fn categories(&self) -> &'static CategoryTable<Self::Source>;
}

/// Owns the record while a single request is enriched.
///
/// When [`run`](Self::run) fails, whatever was written before the failure stays readable
/// through [`record`](Self::record).
pub struct EnrichmentSession<'a, D: EnrichmentDomain> {
    domain: &'a D,
    record: AttributeRecord,
}

impl<'a, D: EnrichmentDomain> EnrichmentSession<'a, D> {
    pub fn new(domain: &'a D) -> Self {
        Self {
            domain,
            record: AttributeRecord::new(),
        }
    }

    /// Records the raw input, prepares the source, then dispatches `requests` in order.
    /// The first failing category aborts the rest.
    pub fn run(
        &mut self,
        input: Option<&str>,
        requests: &[CategoryRequest],
        request: &RequestContext,
    ) -> Result<(), VisitorError> {
        let table = self.domain.categories();
        let input = self.domain.resolve_input(input, request)?;
        self.record.set(self.domain.input_key(), input.as_str());

        tracing::debug!(
            target: "visitor::session",
            domain = table.domain(),
            trace_id = request.trace_id(),
            categories = requests.len(),
            "enriching {} ({} categories requested)",
            self.domain.input_key(),
            requests.len()
        );

        let source = self.domain.prepare(&input)?;
        for category in requests {
            if let Some(pairs) = table.dispatch(&source, category)? {
                self.record.set_many(pairs);
            }
        }

        tracing::debug!(
            target: "visitor::session",
            domain = table.domain(),
            trace_id = request.trace_id(),
            attributes = self.record.len(),
            "enrichment complete"
        );
        Ok(())
    }

    pub fn record(&self) -> &AttributeRecord {
        &self.record
    }

    pub fn into_record(self) -> AttributeRecord {
        self.record
    }
}

/// Runs a full session and hands the record to the caller.
pub fn enrich<D: EnrichmentDomain>(
    domain: &D,
    input: Option<&str>,
    requests: &[CategoryRequest],
    request: &RequestContext,
) -> Result<AttributeRecord, VisitorError> {
    let mut session = EnrichmentSession::new(domain);
    session.run(input, requests, request)?;
    Ok(session.into_record())
}
