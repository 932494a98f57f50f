//! Geolocation and network enrichment from an IP address.
//!
//! Each geo category reads its own database file, passed as the category parameter. The
//! provider opens that file for the one lookup and releases it afterwards.

pub mod keys;
pub mod records;

use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

use crate::dispatch::{CategoryTable, ExtractionResult, Handler};
use crate::error::VisitorError;
use crate::record::{AttributeKey, AttributeRecord, AttributeValue};
use crate::session::{enrich, EnrichmentDomain};
use crate::shared::{CategoryRequest, RequestContext};
use keys::*;
use records::{CityRecord, ConnectionTypeRecord, DomainRecord, IspRecord};

/// External geo/network database reader. One call per category; each call is expected to
/// open `database`, look `address` up, and close it again on every exit path.
pub trait GeoProvider: Send + Sync {
    fn city(&self, database: &Path, address: IpAddr) -> Result<CityRecord, VisitorError>;

    fn domain(&self, database: &Path, address: IpAddr) -> Result<DomainRecord, VisitorError>;

    fn isp(&self, database: &Path, address: IpAddr) -> Result<IspRecord, VisitorError>;

    fn connection_type(
        &self,
        database: &Path,
        address: IpAddr,
    ) -> Result<ConnectionTypeRecord, VisitorError>;
}

/// Handler source for geo categories: the resolved address and the provider.
pub struct GeoSource {
    address: String,
    provider: Arc<dyn GeoProvider>,
}

impl GeoSource {
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Database path and parsed address for one lookup.
    fn target<'a>(
        &self,
        category: &str,
        database: Option<&'a str>,
    ) -> Result<(&'a Path, IpAddr), VisitorError> {
        let database = database
            .filter(|d| !d.is_empty())
            .ok_or_else(|| VisitorError::MissingParameter {
                category: category.to_string(),
            })?;
        let address = self
            .address
            .trim()
            .parse::<IpAddr>()
            .map_err(|_| VisitorError::InvalidAddress {
                address: self.address.clone(),
            })?;
        Ok((Path::new(database), address))
    }
}

fn extract_city(source: &GeoSource, database: Option<&str>) -> Result<ExtractionResult, VisitorError> {
    let (database, address) = source.target("city", database)?;
    let record = source.provider.city(database, address)?;

    let subdivision = record.most_specific_subdivision().cloned().unwrap_or_default();
    let continent = record.continent.unwrap_or_default();
    let country = record.country.unwrap_or_default();
    let city = record.city.unwrap_or_default();
    let location = record.location.unwrap_or_default();
    let postal = record.postal.unwrap_or_default();

    Ok(vec![
        (CONTINENT_GEONAME_ID, continent.geoname_id.into()),
        (CONTINENT_ISO_CODE, continent.code.clone().into()),
        (CONTINENT_NAME, continent.name().into()),
        (COUNTRY_GEONAME_ID, country.geoname_id.into()),
        (COUNTRY_ISO_CODE, country.iso_code.clone().into()),
        (COUNTRY_CONFIDENCE, country.confidence.into()),
        (COUNTRY_NAME, country.name().into()),
        (SUBDIVISION_GEONAME_ID, subdivision.geoname_id.into()),
        (SUBDIVISION_ISO_CODE, subdivision.iso_code.clone().into()),
        (SUBDIVISION_CONFIDENCE, subdivision.confidence.into()),
        (SUBDIVISION_NAME, subdivision.name().into()),
        (CITY_GEONAME_ID, city.geoname_id.into()),
        (CITY_CONFIDENCE, city.confidence.into()),
        (CITY_NAME, city.name().into()),
        (AVERAGE_INCOME, location.average_income.into()),
        (ACCURACY_RADIUS, location.accuracy_radius.into()),
        (LATITUDE, location.latitude.into()),
        (LONGITUDE, location.longitude.into()),
        (METRO_CODE, location.metro_code.into()),
        (POPULATION_DENSITY, location.population_density.into()),
        (POSTAL_CODE, postal.code.into()),
        (POSTAL_CONFIDENCE, postal.confidence.into()),
    ])
}

fn extract_domain(source: &GeoSource, database: Option<&str>) -> Result<ExtractionResult, VisitorError> {
    let (database, address) = source.target("domain", database)?;
    let record = source.provider.domain(database, address)?;
    Ok(vec![(DOMAIN, record.domain.into())])
}

fn extract_isp(source: &GeoSource, database: Option<&str>) -> Result<ExtractionResult, VisitorError> {
    let (database, address) = source.target("isp", database)?;
    let record = source.provider.isp(database, address)?;
    Ok(vec![
        (ISP, record.isp.into()),
        (ORGANIZATION, record.organization.into()),
        (COMPANY_NUMBER, record.autonomous_system_number.into()),
        (COMPANY_ORGANIZATION, record.autonomous_system_organization.into()),
    ])
}

fn extract_connection_type(
    source: &GeoSource,
    database: Option<&str>,
) -> Result<ExtractionResult, VisitorError> {
    let (database, address) = source.target("connection_type", database)?;
    let record = source.provider.connection_type(database, address)?;
    Ok(vec![(CONNECTION_TYPE, record.connection_type.into())])
}

const GEO_HANDLERS: &[(&str, Handler<GeoSource>)] = &[
    ("City", extract_city),
    ("Domain", extract_domain),
    ("Isp", extract_isp),
    ("ConnectionType", extract_connection_type),
];

/// Geo-domain categories: `City`, `Domain`, `Isp`, `ConnectionType`.
pub static GEO_CATEGORIES: CategoryTable<GeoSource> = CategoryTable::new("geo", GEO_HANDLERS);

/// Enriches IP addresses with a shared provider.
#[derive(Clone)]
pub struct GeoEnricher {
    provider: Arc<dyn GeoProvider>,
}

impl GeoEnricher {
    pub fn new(provider: Arc<dyn GeoProvider>) -> Self {
        Self { provider }
    }

    /// Enriches `ip_address`, or the request's client address when absent or empty.
    /// Each request's parameter is the database path for that category.
    pub fn enrich(
        &self,
        ip_address: Option<&str>,
        requests: &[CategoryRequest],
        request: &RequestContext,
    ) -> Result<AttributeRecord, VisitorError> {
        enrich(self, ip_address, requests, request)
    }
}

impl EnrichmentDomain for GeoEnricher {
    type Source = GeoSource;

    fn input_key(&self) -> AttributeKey {
        IP_ADDRESS
    }

    fn resolve_input(
        &self,
        supplied: Option<&str>,
        request: &RequestContext,
    ) -> Result<String, VisitorError> {
        let address = supplied
            .filter(|ip| !AttributeValue::is_falsy_text(ip))
            .unwrap_or_else(|| request.client_ip());
        Ok(address.to_owned())
    }

    fn prepare(&self, address: &str) -> Result<GeoSource, VisitorError> {
        Ok(GeoSource {
            address: address.to_owned(),
            provider: Arc::clone(&self.provider),
        })
    }

    fn categories(&self) -> &'static CategoryTable<GeoSource> {
        &GEO_CATEGORIES
    }
}
