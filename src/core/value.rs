//! Dynamically typed field values.
//!
//! Rows, metadata, and action parameters all map string keys to [`Value`].
//! The set of shapes is closed: scalars, timestamps, raw bytes, and the two
//! containers.

use crate::core::Timestamp;
use base64::Engine;
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};

/// A single data row flowing through a transform.
pub type Row = IndexMap<String, Value>;

/// Key/value store used for plugin metadata and action parameters.
pub type Properties = HashMap<String, Value>;

/// A field value.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    /// Absent / null
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// Text
    Text(String),
    /// Point in time (UTC)
    Timestamp(Timestamp),
    /// Binary blob
    Bytes(Vec<u8>),
    /// Ordered sequence
    List(Vec<Value>),
    /// Nested mapping
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Whether the value is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow as text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Read as an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Read as a float. Integers widen.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Read as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Read a number, also accepting numeric text (`"2.5"`).
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Value::Text(s) => s.trim().parse().ok(),
            other => other.as_f64(),
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Timestamp(_) => "timestamp",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Timestamp> for Value {
    fn from(v: Timestamp) -> Self {
        Value::Timestamp(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

/// JSON has no timestamp or bytes type: timestamps become RFC 3339 text and
/// bytes become base64 text. Non-finite floats become `null`.
impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(i) => serde_json::Value::from(i),
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s),
            Value::Timestamp(ts) => serde_json::Value::String(ts.to_rfc3339()),
            Value::Bytes(bytes) => serde_json::Value::String(
                base64::engine::general_purpose::STANDARD.encode(bytes),
            ),
            Value::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
            Value::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            Value::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
            other => write!(f, "{}", serde_json::Value::from(other.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_accessors() {
        assert_eq!(Value::from("abc").as_str(), Some("abc"));
        assert_eq!(Value::from(3).as_i64(), Some(3));
        assert_eq!(Value::from(3).as_f64(), Some(3.0));
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert!(Value::default().is_null());
        assert_eq!(Value::from("2.5").to_number(), Some(2.5));
        assert_eq!(Value::from("n/a").to_number(), None);
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::json!({
            "name": "widget",
            "qty": 5,
            "price": 2.5,
            "tags": ["a", null],
        });
        let value = Value::from(json);

        let Value::Map(map) = value else {
            panic!("expected map");
        };
        assert_eq!(map["name"], Value::from("widget"));
        assert_eq!(map["qty"], Value::Int(5));
        assert_eq!(map["price"], Value::Float(2.5));
        assert_eq!(map["tags"], Value::List(vec![Value::from("a"), Value::Null]));
    }

    #[test]
    fn test_to_json_special_types() {
        let ts = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let json: serde_json::Value = Value::Timestamp(ts).into();
        assert_eq!(json, serde_json::json!("2024-01-02T03:04:05+00:00"));

        let json: serde_json::Value = Value::Bytes(b"hop".to_vec()).into();
        assert_eq!(json, serde_json::json!("aG9w"));

        let json: serde_json::Value = Value::Float(f64::NAN).into();
        assert!(json.is_null());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from("x").to_string(), "x");
        assert_eq!(Value::Bytes(vec![1, 2]).to_string(), "<2 bytes>");
        assert_eq!(
            Value::List(vec![Value::Int(1), Value::Bool(false)]).to_string(),
            "[1,false]"
        );
    }
}
