use base64::prelude::*;
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Single key of the JSON object that carries a `Date` (RFC 3339 text).
pub const DATE_MARKER: &str = "$date";

/// Single key of the JSON object that carries `Data` (standard base64).
pub const DATA_MARKER: &str = "$data";

/// A plist dictionary: string keys mapped to nested values.
///
/// Sibling order is whatever the decoder inserted. Nothing in this crate depends on it.
pub type Dictionary = IndexMap<String, PlistValue>;

/// A decoded property-list value.
///
/// Produced by an external binary/XML decoder. Serializes to JSON so documents can be
/// stored as fixtures and loaded back without losing a variant:
///
/// - booleans, integers, reals, strings, arrays and dictionaries use their JSON shape
/// - `Date` becomes `{"$date": "2012-11-02T01:43:28.261762Z"}`
/// - `Data` becomes `{"$data": "<base64>"}`
///
/// A one-entry object keyed by a marker whose value is a string is always read back as
/// the marked variant; a malformed marker value is an error.
#[derive(Debug, Clone, PartialEq)]
pub enum PlistValue {
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Date(DateTime<Utc>),
    String(String),
    Array(Vec<PlistValue>),
    Dictionary(Dictionary),
    Data(Vec<u8>),
}

impl PlistValue {
    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            PlistValue::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[PlistValue]> {
        match self {
            PlistValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PlistValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PlistValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PlistValue::Real(f) => Some(*f),
            PlistValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PlistValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            PlistValue::Date(date) => Some(date),
            _ => None,
        }
    }

    pub fn as_data(&self) -> Option<&[u8]> {
        match self {
            PlistValue::Data(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn is_dictionary(&self) -> bool {
        matches!(self, PlistValue::Dictionary(_))
    }

    /// Short name of the value kind, used in log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            PlistValue::Boolean(_) => "boolean",
            PlistValue::Integer(_) => "integer",
            PlistValue::Real(_) => "real",
            PlistValue::Date(_) => "date",
            PlistValue::String(_) => "string",
            PlistValue::Array(_) => "array",
            PlistValue::Dictionary(_) => "dictionary",
            PlistValue::Data(_) => "data",
        }
    }
}

impl From<bool> for PlistValue {
    fn from(value: bool) -> Self {
        PlistValue::Boolean(value)
    }
}

impl From<i64> for PlistValue {
    fn from(value: i64) -> Self {
        PlistValue::Integer(value)
    }
}

impl From<i32> for PlistValue {
    fn from(value: i32) -> Self {
        PlistValue::Integer(i64::from(value))
    }
}

impl From<f64> for PlistValue {
    fn from(value: f64) -> Self {
        PlistValue::Real(value)
    }
}

impl From<&str> for PlistValue {
    fn from(value: &str) -> Self {
        PlistValue::String(value.to_string())
    }
}

impl From<String> for PlistValue {
    fn from(value: String) -> Self {
        PlistValue::String(value)
    }
}

impl From<DateTime<Utc>> for PlistValue {
    fn from(value: DateTime<Utc>) -> Self {
        PlistValue::Date(value)
    }
}

impl From<Dictionary> for PlistValue {
    fn from(value: Dictionary) -> Self {
        PlistValue::Dictionary(value)
    }
}

impl From<Vec<PlistValue>> for PlistValue {
    fn from(value: Vec<PlistValue>) -> Self {
        PlistValue::Array(value)
    }
}

impl Serialize for PlistValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            PlistValue::Boolean(b) => serializer.serialize_bool(*b),
            PlistValue::Integer(i) => serializer.serialize_i64(*i),
            PlistValue::Real(f) => serializer.serialize_f64(*f),
            PlistValue::Date(date) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(DATE_MARKER, &date.to_rfc3339_opts(SecondsFormat::AutoSi, true))?;
                map.end()
            }
            PlistValue::String(s) => serializer.serialize_str(s),
            PlistValue::Array(items) => items.serialize(serializer),
            PlistValue::Dictionary(dict) => dict.serialize(serializer),
            PlistValue::Data(bytes) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(DATA_MARKER, &BASE64_STANDARD.encode(bytes))?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for PlistValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PlistValueVisitor;

        impl<'de> Visitor<'de> for PlistValueVisitor {
            type Value = PlistValue;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a plist value")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Self::Value, E> {
                Ok(PlistValue::Boolean(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
                Ok(PlistValue::Integer(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
                i64::try_from(v)
                    .map(PlistValue::Integer)
                    .map_err(|_| E::custom(format!("integer {} is out of range for a plist integer", v)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Self::Value, E> {
                Ok(PlistValue::Real(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
                Ok(PlistValue::String(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Self::Value, E> {
                Ok(PlistValue::String(v))
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(PlistValue::Array(items))
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut dict = Dictionary::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, PlistValue>()? {
                    dict.insert(key, value);
                }
                unmark(dict)
            }
        }

        deserializer.deserialize_any(PlistValueVisitor)
    }
}

/// Turn a `{"$date": ..}` or `{"$data": ..}` object back into its variant.
fn unmark<E: de::Error>(dict: Dictionary) -> std::result::Result<PlistValue, E> {
    if dict.len() == 1
        && let Some((marker, PlistValue::String(text))) = dict.get_index(0)
    {
        if marker == DATE_MARKER {
            let date = DateTime::parse_from_rfc3339(text)
                .map_err(|e| E::custom(format!("invalid {} value '{}': {}", DATE_MARKER, text, e)))?;
            return Ok(PlistValue::Date(date.with_timezone(&Utc)));
        }
        if marker == DATA_MARKER {
            let bytes = BASE64_STANDARD
                .decode(text)
                .map_err(|e| E::custom(format!("invalid {} value: {}", DATA_MARKER, e)))?;
            return Ok(PlistValue::Data(bytes));
        }
    }

    Ok(PlistValue::Dictionary(dict))
}

/// A decoded plist paired with the name it was read from.
///
/// The filename may carry any casing and leading path components; plugins only test
/// whether it contains their path pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlistDocument {
    pub filename: String,
    pub top_level: Dictionary,
}

impl PlistDocument {
    pub fn new(filename: impl Into<String>, top_level: Dictionary) -> Self {
        Self {
            filename: filename.into(),
            top_level,
        }
    }

    /// Build a document from a JSON object, as produced by fixtures or upstream tooling.
    ///
    /// # Errors
    ///
    /// Returns `PlistSiftError::Serialization` if the JSON is malformed or its top level
    /// is not an object.
    pub fn from_json_slice(filename: impl Into<String>, json: &[u8]) -> crate::Result<Self> {
        let top_level: Dictionary = serde_json::from_slice(json)?;
        Ok(Self::new(filename, top_level))
    }
}

/// A timeline event extracted from a plist.
///
/// `root` is the slash-separated key path the event was found under, `key` the field
/// that held the timestamp, and `timestamp` microseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlistEvent {
    pub root: String,
    pub key: String,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PlistEvent {
    pub fn new(root: impl Into<String>, key: impl Into<String>, timestamp: i64) -> Self {
        Self {
            root: root.into(),
            key: key.into(),
            timestamp,
            description: None,
        }
    }

    pub fn from_date(root: impl Into<String>, key: impl Into<String>, date: &DateTime<Utc>) -> Self {
        Self::new(root, key, date.timestamp_micros())
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
