//! Normalized attribute store produced by an enrichment session.
//!
//! Every access surface (string keys, vocabulary keys, the index operator, typed
//! accessors, iteration, JSON) goes through the same four primitives: [`AttributeRecord::get`],
//! [`AttributeRecord::set`], [`AttributeRecord::has`] and [`AttributeRecord::remove`].

mod value;

pub use value::{AttributeValue, UNKNOWN};

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::ops::{BitOr, BitOrAssign, Index};

use crate::error::VisitorError;
use value::UNKNOWN_VALUE;

/// Canonical identifier for an attribute.
///
/// Each domain declares its keys as constants; the record itself accepts any string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeKey {
    name: &'static str,
}

impl AttributeKey {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    pub const fn as_str(&self) -> &'static str {
        self.name
    }
}

impl AsRef<str> for AttributeKey {
    fn as_ref(&self) -> &str {
        self.name
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Encoder flags for [`AttributeRecord::to_json`].
///
/// Bits are passed through untouched; only [`JsonOptions::PRETTY_PRINT`] changes the output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct JsonOptions(u32);

impl JsonOptions {
    pub const NONE: Self = Self(0);
    pub const PRETTY_PRINT: Self = Self(128);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for JsonOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for JsonOptions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Insertion-ordered key/value record with an unknown fallback.
///
/// Overwriting a key keeps its original position; removing a key keeps the order of the
/// rest. The record does not restrict keys to any vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AttributeRecord {
    attributes: IndexMap<String, AttributeValue>,
}

impl AttributeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, or the unknown sentinel when `value` is falsy.
    pub fn set(&mut self, key: impl AsRef<str>, value: impl Into<AttributeValue>) -> &mut Self {
        let value = value.into().normalized();
        self.attributes.insert(key.as_ref().to_owned(), value);
        self
    }

    /// Applies [`set`](Self::set) to each pair in order; later pairs win on duplicate keys.
    pub fn set_many<I, K, V>(&mut self, pairs: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<AttributeValue>,
    {
        for (key, value) in pairs {
            self.set(key, value);
        }
        self
    }

    /// Stored value, or the unknown sentinel for a key that was never set.
    pub fn get(&self, key: impl AsRef<str>) -> &AttributeValue {
        self.attributes.get(key.as_ref()).unwrap_or(&UNKNOWN_VALUE)
    }

    pub fn has(&self, key: impl AsRef<str>) -> bool {
        self.attributes.contains_key(key.as_ref())
    }

    pub fn remove(&mut self, key: impl AsRef<str>) -> Option<AttributeValue> {
        self.attributes.shift_remove(key.as_ref())
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy of the current contents as a plain ordered map.
    pub fn to_map(&self) -> IndexMap<String, AttributeValue> {
        self.attributes.clone()
    }

    /// JSON object in insertion order; compact unless `options` asks for pretty printing.
    ///
    /// Every bit other than [`JsonOptions::PRETTY_PRINT`] is ignored.
    pub fn to_json(&self, options: JsonOptions) -> String {
        let encoded = if options.contains(JsonOptions::PRETTY_PRINT) {
            serde_json::to_string_pretty(&self.attributes)
        } else {
            serde_json::to_string(&self.attributes)
        };
        encoded.unwrap_or_default()
    }

    /// Parses a JSON object produced by [`to_json`](Self::to_json).
    ///
    /// Values pass through [`set`](Self::set), so `null` or empty entries come back as unknown.
    pub fn from_json(json: &str) -> Result<Self, VisitorError> {
        let attributes: IndexMap<String, AttributeValue> = serde_json::from_str(json)?;
        Ok(attributes.into_iter().collect())
    }
}

impl<K: AsRef<str>> Index<K> for AttributeRecord {
    type Output = AttributeValue;

    fn index(&self, key: K) -> &AttributeValue {
        self.get(key)
    }
}

impl fmt::Display for AttributeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json(JsonOptions::default()))
    }
}

impl<K: AsRef<str>, V: Into<AttributeValue>> Extend<(K, V)> for AttributeRecord {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.set_many(iter);
    }
}

impl<K: AsRef<str>, V: Into<AttributeValue>> FromIterator<(K, V)> for AttributeRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        record.set_many(iter);
        record
    }
}

impl IntoIterator for AttributeRecord {
    type Item = (String, AttributeValue);
    type IntoIter = indexmap::map::IntoIter<String, AttributeValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.into_iter()
    }
}

impl<'a> IntoIterator for &'a AttributeRecord {
    type Item = (&'a String, &'a AttributeValue);
    type IntoIter = indexmap::map::Iter<'a, String, AttributeValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.iter()
    }
}

/// Declares a domain's vocabulary: one [`AttributeKey`] constant per key, a `KEYS` list, and
/// typed getter/setter pairs on [`AttributeRecord`] named after the key.
macro_rules! attribute_vocabulary {
    ($( $(#[$doc:meta])* $konst:ident => $getter:ident, $setter:ident; )+) => {
        $(
            $(#[$doc])*
            pub const $konst: $crate::record::AttributeKey =
                $crate::record::AttributeKey::new(stringify!($getter));
        )+

        /// Every key of this vocabulary, in declaration order.
        pub const KEYS: &[$crate::record::AttributeKey] = &[$($konst),+];

        impl $crate::record::AttributeRecord {
            $(
                pub fn $getter(&self) -> &$crate::record::AttributeValue {
                    self.get($konst)
                }

                pub fn $setter(
                    &mut self,
                    value: impl Into<$crate::record::AttributeValue>,
                ) -> &mut Self {
                    self.set($konst, value)
                }
            )+
        }
    };
}

pub(crate) use attribute_vocabulary;

#[cfg(test)]
mod tests {
    use super::*;

    const CITY_NAME: AttributeKey = AttributeKey::new("city_name");

    #[test]
    fn unset_keys_read_as_unknown() {
        let record = AttributeRecord::new();
        assert_eq!(record.get("device_type"), UNKNOWN);
        assert_eq!(record["anything"], UNKNOWN);
        assert!(!record.has("device_type"));
    }

    #[test]
    fn falsy_writes_store_the_sentinel() {
        let mut record = AttributeRecord::new();
        record
            .set("a", "")
            .set("b", 0u32)
            .set("c", 0.0f64)
            .set("d", None::<String>)
            .set("e", "0");
        for key in ["a", "b", "c", "d", "e"] {
            assert!(record.has(key));
            assert_eq!(record.get(key), UNKNOWN);
        }
    }

    #[test]
    fn set_is_idempotent() {
        let mut once = AttributeRecord::new();
        once.set(CITY_NAME, "Jakarta");
        let mut twice = once.clone();
        twice.set(CITY_NAME, "Jakarta");
        assert_eq!(once, twice);
    }

    #[test]
    fn set_many_is_sequential_and_last_write_wins() {
        let pairs = [("x", "1"), ("y", "2"), ("x", "3")];
        let mut bulk = AttributeRecord::new();
        bulk.set_many(pairs);

        let mut sequential = AttributeRecord::new();
        for (k, v) in pairs {
            sequential.set(k, v);
        }

        assert_eq!(bulk, sequential);
        assert_eq!(bulk.get("x"), "3");
        assert_eq!(bulk.keys().collect::<Vec<_>>(), vec!["x", "y"]);
    }

    #[test]
    fn set_many_with_nothing_is_a_no_op() {
        let mut record = AttributeRecord::new();
        record.set_many(Vec::<(&str, &str)>::new());
        assert!(record.is_empty());
    }

    #[test]
    fn access_surfaces_agree() {
        let mut record = AttributeRecord::new();
        record.set(CITY_NAME, "Bandung");
        assert_eq!(record.get("city_name"), "Bandung");
        assert_eq!(record[CITY_NAME], "Bandung");
        assert_eq!(record["city_name"], "Bandung");
        assert_eq!(record.city_name(), "Bandung");

        record.set_city_name("");
        assert_eq!(record["city_name"], UNKNOWN);

        assert!(record.remove(CITY_NAME).is_some());
        assert!(!record.has("city_name"));
        assert_eq!(record.city_name(), UNKNOWN);
        assert!(record.remove("city_name").is_none());
    }

    #[test]
    fn undeclared_keys_are_allowed() {
        let mut record = AttributeRecord::new();
        record.set("favourite_colour", "teal");
        assert_eq!(record["favourite_colour"], "teal");
    }

    #[test]
    fn removal_keeps_remaining_order() {
        let mut record: AttributeRecord = [("a", "1"), ("b", "2"), ("c", "3")].into_iter().collect();
        record.remove("b");
        record.set("a", "4");
        assert_eq!(record.to_json(JsonOptions::NONE), r#"{"a":"4","c":"3"}"#);
    }

    #[test]
    fn json_follows_insertion_order_and_options() {
        let mut record = AttributeRecord::new();
        record.set("ip_address", "8.8.8.8").set("latitude", 37.751f64).set("metro_code", 0u16);

        let compact = record.to_json(JsonOptions::default());
        assert_eq!(
            compact,
            r#"{"ip_address":"8.8.8.8","latitude":37.751,"metro_code":"unknown"}"#
        );
        assert_eq!(record.to_string(), compact);

        let pretty = record.to_json(JsonOptions::PRETTY_PRINT);
        assert!(pretty.contains('\n'));
        assert_eq!(serde_json::from_str::<serde_json::Value>(&pretty).unwrap()["latitude"], 37.751);
    }

    #[test]
    fn json_round_trip_keeps_values_and_types() {
        let mut record = AttributeRecord::new();
        record
            .set("isp", "Google")
            .set("company_number", 15169u32)
            .set("longitude", -97.822f64)
            .set("domain", "");

        let restored = AttributeRecord::from_json(&record.to_json(JsonOptions::NONE)).unwrap();
        assert_eq!(restored, record);
        assert_eq!(restored["company_number"].as_i64(), Some(15169));
        assert_eq!(restored["longitude"].as_f64(), Some(-97.822));
    }

    #[test]
    fn from_json_normalizes_nulls() {
        let record = AttributeRecord::from_json(r#"{"city_name":null,"postal_code":""}"#).unwrap();
        assert_eq!(record["city_name"], UNKNOWN);
        assert_eq!(record["postal_code"], UNKNOWN);
        assert!(AttributeRecord::from_json("[1,2]").is_err());
    }

    #[test]
    fn json_options_combine_bits() {
        let options = JsonOptions::from_bits(64) | JsonOptions::PRETTY_PRINT;
        assert!(options.contains(JsonOptions::PRETTY_PRINT));
        assert_eq!(options.bits(), 192);
        assert!(!JsonOptions::NONE.contains(JsonOptions::PRETTY_PRINT));
    }

    #[test]
    fn json_ignores_flags_other_than_pretty_print() {
        let record: AttributeRecord = [("city_name", "London")].into_iter().collect();
        assert_eq!(
            record.to_json(JsonOptions::from_bits(64 | 256)),
            record.to_json(JsonOptions::NONE)
        );
    }

    #[test]
    fn non_finite_floats_survive_json_as_unknown() {
        let mut record = AttributeRecord::new();
        record.set("latitude", f64::NAN).set("longitude", f64::INFINITY);
        let json = record.to_json(JsonOptions::NONE);
        assert_eq!(json, r#"{"latitude":"unknown","longitude":"unknown"}"#);
        assert_eq!(AttributeRecord::from_json(&json).unwrap(), record);
    }
}
