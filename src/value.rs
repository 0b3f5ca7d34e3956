//! Wire values
//!
//! The closed set of wire-representable, JSON-like values. Values are created
//! per request/response and discarded after encode/decode; nothing here holds
//! shared state.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

/// A wire-representable value
///
/// `Rec` keys are strings and insertion order is irrelevant; a `BTreeMap`
/// keeps the JSON rendering deterministic, which the state hash relies on.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Seq(Vec<Value>),
    Rec(BTreeMap<String, Value>),
}

impl Value {
    /// Build a record from field pairs
    pub fn record<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Value::Rec(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Variant name used in error messages and matching
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Seq(_) => "seq",
            Value::Rec(_) => "rec",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_rec(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Rec(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Render as JSON. Byte strings travel as base64 (the OpenAPI `byte`
    /// format); everything else maps directly.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Bytes(b) => serde_json::Value::String(BASE64.encode(b)),
            Value::Seq(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Rec(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    /// Parse from JSON. The reverse of [`Value::to_json`] except for bytes:
    /// with no type tag on the wire a base64 string stays a string until a
    /// descriptor says otherwise.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::Seq(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Rec(
                map.iter().map(|(k, v)| (k.clone(), Value::from_json(v))).collect(),
            ),
        }
    }

    /// Canonical JSON text, deterministic across rebuilds
    pub fn canonical_json(&self) -> String {
        self.to_json().to_string()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let v = Value::record([
            ("a", Value::from("x")),
            ("b", Value::Int(1)),
            ("c", Value::Seq(vec![Value::Bool(true), Value::Null])),
        ]);
        let back = Value::from_json(&v.to_json());
        assert_eq!(v, back);
    }

    #[test]
    fn test_bytes_render_as_base64() {
        let v = Value::Bytes(vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(v.to_json(), serde_json::json!("3q2+7w=="));
    }

    #[test]
    fn test_canonical_json_is_key_sorted() {
        let a = Value::record([("b", Value::Int(2)), ("a", Value::Int(1))]);
        let b = Value::record([("a", Value::Int(1)), ("b", Value::Int(2))]);
        assert_eq!(a.canonical_json(), b.canonical_json());
        assert_eq!(a.canonical_json(), r#"{"a":1,"b":2}"#);
    }

    #[test]
    fn test_int_and_float_stay_distinct() {
        assert_eq!(Value::from_json(&serde_json::json!(5)), Value::Int(5));
        assert_eq!(Value::from_json(&serde_json::json!(5.5)), Value::Float(5.5));
    }
}
