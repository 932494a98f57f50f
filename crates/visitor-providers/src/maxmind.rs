//! MaxMind DB (`.mmdb`) lookups backed by `maxminddb`.
//!
//! Every lookup opens the file, reads one record and drops the reader before returning, so
//! no handle outlives the category that asked for it.

use maxminddb::Reader;
use serde::de::DeserializeOwned;
use std::net::IpAddr;
use std::path::Path;

use visitor_core::geo::records::{CityRecord, ConnectionTypeRecord, DomainRecord, IspRecord};
use visitor_core::{GeoProvider, VisitorError};

/// Reads GeoIP2/GeoLite2 City, Domain, ISP and Connection-Type databases.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxMindProvider;

impl MaxMindProvider {
    pub fn new() -> Self {
        Self
    }

    fn with_reader<T>(
        &self,
        database: &Path,
        read: impl FnOnce(&Reader<Vec<u8>>) -> Result<T, VisitorError>,
    ) -> Result<T, VisitorError> {
        let reader = Reader::open_readfile(database).map_err(|e| VisitorError::DatabaseOpen {
            path: database.to_path_buf(),
            reason: e.to_string(),
        })?;
        tracing::debug!(
            target: "visitor::geo",
            path = %database.display(),
            database_type = %reader.metadata.database_type,
            "opened database"
        );
        read(&reader)
    }

    fn lookup<T: DeserializeOwned>(&self, database: &Path, address: IpAddr) -> Result<T, VisitorError> {
        self.with_reader(database, |reader| {
            reader.lookup::<T>(address).map_err(|e| {
                tracing::warn!(
                    target: "visitor::geo",
                    path = %database.display(),
                    %address,
                    error = %e,
                    "lookup failed"
                );
                VisitorError::Lookup {
                    path: database.to_path_buf(),
                    address: address.to_string(),
                    reason: e.to_string(),
                }
            })
        })
    }
}

impl GeoProvider for MaxMindProvider {
    fn city(&self, database: &Path, address: IpAddr) -> Result<CityRecord, VisitorError> {
        self.lookup(database, address)
    }

    fn domain(&self, database: &Path, address: IpAddr) -> Result<DomainRecord, VisitorError> {
        self.lookup(database, address)
    }

    fn isp(&self, database: &Path, address: IpAddr) -> Result<IspRecord, VisitorError> {
        self.lookup(database, address)
    }

    fn connection_type(
        &self,
        database: &Path,
        address: IpAddr,
    ) -> Result<ConnectionTypeRecord, VisitorError> {
        self.lookup(database, address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;
    use visitor_core::{CategoryRequest, GeoEnricher, RequestContext, UNKNOWN};

    /// One-node GeoIP2-Enterprise database: every address in 0.0.0.0/1 maps to a London
    /// record, everything in 128.0.0.0/1 is absent. See `tests/data/README.md`.
    const FIXTURE: &str = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/data/GeoIP2-Enterprise-Test.mmdb"
    );

    #[test]
    fn city_lookup_decodes_the_record() {
        let record = MaxMindProvider
            .city(Path::new(FIXTURE), "81.2.69.160".parse().unwrap())
            .unwrap();
        assert_eq!(record.city.as_ref().and_then(|c| c.name()).as_deref(), Some("London"));
        assert_eq!(record.city.as_ref().and_then(|c| c.confidence), Some(50));
        assert_eq!(
            record.country.as_ref().and_then(|c| c.iso_code.as_deref()),
            Some("GB")
        );
        assert_eq!(
            record.most_specific_subdivision().and_then(|s| s.iso_code.as_deref()),
            Some("ENG")
        );
        let location = record.location.unwrap();
        assert_eq!(location.latitude, Some(51.5142));
        assert_eq!(location.population_density, Some(0));
        assert_eq!(record.postal.and_then(|p| p.code).as_deref(), Some("EC2V"));
    }

    #[test]
    fn network_lookups_share_one_enterprise_file() {
        let database = Path::new(FIXTURE);
        let address: IpAddr = "81.2.69.160".parse().unwrap();
        let isp = MaxMindProvider.isp(database, address).unwrap();
        assert_eq!(isp.autonomous_system_number, Some(20712));
        assert_eq!(isp.isp.as_deref(), Some("Andrews & Arnold Ltd"));
        let domain = MaxMindProvider.domain(database, address).unwrap();
        assert_eq!(domain.domain.as_deref(), Some("aaisp.net"));
        let connection = MaxMindProvider.connection_type(database, address).unwrap();
        assert_eq!(connection.connection_type.as_deref(), Some("Corporate"));
    }

    #[test]
    fn address_outside_the_database_is_a_lookup_error() {
        let err = MaxMindProvider
            .city(Path::new(FIXTURE), "203.0.113.1".parse().unwrap())
            .unwrap_err();
        match err {
            VisitorError::Lookup { address, path, .. } => {
                assert_eq!(address, "203.0.113.1");
                assert_eq!(path, Path::new(FIXTURE));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn loopback_enrichment_reads_every_category() {
        let enricher = GeoEnricher::new(Arc::new(MaxMindProvider));
        let requests: Vec<_> = ["city", "isp", "domain", "connection_type"]
            .into_iter()
            .map(|category| CategoryRequest::with_parameter(category, FIXTURE))
            .collect();
        let record = enricher.enrich(None, &requests, &RequestContext::new()).unwrap();

        assert_eq!(record.ip_address(), "127.0.0.1");
        assert_eq!(record.continent_iso_code(), "EU");
        assert_eq!(record.country_name(), "United Kingdom");
        assert_eq!(record.country_confidence().as_i64(), Some(99));
        assert_eq!(record.subdivision_name(), "England");
        assert_eq!(record.city_name(), "London");
        assert_eq!(record.longitude().as_f64(), Some(-0.0931));
        assert_eq!(record.population_density(), UNKNOWN);
        assert_eq!(record.metro_code(), UNKNOWN);
        assert_eq!(record.postal_confidence().as_i64(), Some(40));
        assert_eq!(record.company_number().as_i64(), Some(20712));
        assert_eq!(record.organization(), "STONEHOUSE office network");
        assert_eq!(record.domain(), "aaisp.net");
        assert_eq!(record.connection_type(), "Corporate");
    }

    #[test]
    fn missing_database_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("GeoIP2-ISP.mmdb");
        let err = MaxMindProvider
            .isp(&path, "8.8.8.8".parse().unwrap())
            .unwrap_err();
        match err {
            VisitorError::DatabaseOpen { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn corrupt_database_fails_to_open() {
        let mut file = tempfile::Builder::new().suffix(".mmdb").tempfile().unwrap();
        file.write_all(b"this is not a maxmind database").unwrap();
        let err = MaxMindProvider
            .city(file.path(), "8.8.8.8".parse().unwrap())
            .unwrap_err();
        assert!(matches!(err, VisitorError::DatabaseOpen { .. }));
    }

    #[test]
    fn enrichment_with_missing_isp_database_returns_no_record() {
        let dir = tempfile::tempdir().unwrap();
        let database = dir.path().join("missing-isp.mmdb");
        let enricher = GeoEnricher::new(Arc::new(MaxMindProvider));
        let result = enricher.enrich(
            Some("8.8.8.8"),
            &[CategoryRequest::with_parameter(
                "isp",
                database.to_string_lossy().into_owned(),
            )],
            &RequestContext::new(),
        );
        assert!(matches!(result, Err(VisitorError::DatabaseOpen { .. })));
    }
}
