//! Geolocation and network attribute keys.

use crate::record::attribute_vocabulary;

attribute_vocabulary! {
    /// Address the record was built from.
    IP_ADDRESS => ip_address, set_ip_address;
    CONTINENT_GEONAME_ID => continent_geoname_id, set_continent_geoname_id;
    CONTINENT_ISO_CODE => continent_iso_code, set_continent_iso_code;
    CONTINENT_NAME => continent_name, set_continent_name;
    COUNTRY_GEONAME_ID => country_geoname_id, set_country_geoname_id;
    COUNTRY_ISO_CODE => country_iso_code, set_country_iso_code;
    COUNTRY_CONFIDENCE => country_confidence, set_country_confidence;
    COUNTRY_NAME => country_name, set_country_name;
    SUBDIVISION_GEONAME_ID => subdivision_geoname_id, set_subdivision_geoname_id;
    SUBDIVISION_ISO_CODE => subdivision_iso_code, set_subdivision_iso_code;
    SUBDIVISION_CONFIDENCE => subdivision_confidence, set_subdivision_confidence;
    SUBDIVISION_NAME => subdivision_name, set_subdivision_name;
    CITY_GEONAME_ID => city_geoname_id, set_city_geoname_id;
    CITY_CONFIDENCE => city_confidence, set_city_confidence;
    CITY_NAME => city_name, set_city_name;
    AVERAGE_INCOME => average_income, set_average_income;
    ACCURACY_RADIUS => accuracy_radius, set_accuracy_radius;
    LATITUDE => latitude, set_latitude;
    LONGITUDE => longitude, set_longitude;
    METRO_CODE => metro_code, set_metro_code;
    POPULATION_DENSITY => population_density, set_population_density;
    POSTAL_CODE => postal_code, set_postal_code;
    POSTAL_CONFIDENCE => postal_confidence, set_postal_confidence;
    DOMAIN => domain, set_domain;
    CONNECTION_TYPE => connection_type, set_connection_type;
    ISP => isp, set_isp;
    ORGANIZATION => organization, set_organization;
    /// Autonomous system number.
    COMPANY_NUMBER => company_number, set_company_number;
    /// Autonomous system organization.
    COMPANY_ORGANIZATION => company_organization, set_company_organization;
}
