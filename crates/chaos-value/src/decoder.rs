//! JSON decoding for Values.
//!
//! Numbers are disambiguated three ways: an unsigned literal stays unsigned,
//! a signed literal goes through [`Value::from_i64`], and a float literal with
//! an integral value inside the `i64` range is also stored as an integer.
//! Only the remaining floats become `Number`, so `2.0` decodes as the integer
//! `2`.
//!
//! Strings carrying the `"b64."` prefix decode to `Bytes`; the exact strings
//! `"NaN"`, `"Infinity"` and `"-Infinity"` decode to non-finite `Number`s.
//!
//! Two entry points share these rules: the serde `Deserialize` impls, used
//! when a Value is nested inside a native type, and `from_json_node`, which
//! reports failures with their precise [`Error`] kind.

use std::fmt;

use base64::Engine;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::Value as Json;

use crate::encoder::BASE64_PREFIX;
use crate::error::{Error, Result};
use crate::object::Object;
use crate::registry::json_kind;
use crate::value::{Value, INFINITY_MARKER, NAN_MARKER, NEG_INFINITY_MARKER};
use crate::values::Values;

/// 2^63 as a float: the first value past `i64::MAX`.
const I64_END: f64 = 9_223_372_036_854_775_808.0;

/// Decodes the payload of a `"b64."` string (prefix already removed).
pub fn decode_base64(payload: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| Error::InvalidBase64(e.to_string()))
}

/// A float literal: integral values inside the `i64` range become integers.
fn classify_float(v: f64) -> Value {
    if v.fract() == 0.0 && v >= -I64_END && v < I64_END {
        Value::from_i64(v as i64)
    } else {
        Value::Number(v)
    }
}

fn classify_str(s: &str) -> Result<Value> {
    if let Some(payload) = s.strip_prefix(BASE64_PREFIX) {
        return decode_base64(payload).map(Value::Bytes);
    }
    Ok(match s {
        NAN_MARKER => Value::Number(f64::NAN),
        INFINITY_MARKER => Value::Number(f64::INFINITY),
        NEG_INFINITY_MARKER => Value::Number(f64::NEG_INFINITY),
        _ => Value::string(s),
    })
}

fn classify_number(n: &serde_json::Number) -> Result<Value> {
    if let Some(v) = n.as_u64() {
        Ok(Value::Positive(v))
    } else if let Some(v) = n.as_i64() {
        Ok(Value::from_i64(v))
    } else if let Some(v) = n.as_f64() {
        Ok(classify_float(v))
    } else {
        Err(Error::MalformedNumber(n.to_string()))
    }
}

impl Value {
    /// Decodes a parsed JSON node. The first failing element aborts decoding.
    pub fn from_json_node(node: &Json) -> Result<Value> {
        match node {
            Json::Null => Ok(Value::Null),
            Json::Bool(b) => Ok(Value::Bool(*b)),
            Json::Number(n) => classify_number(n),
            Json::String(s) => classify_str(s),
            Json::Array(items) => items
                .iter()
                .map(Value::from_json_node)
                .collect::<Result<Values>>()
                .map(Value::Array),
            Json::Object(members) => {
                let mut obj = Object::new();
                for (k, v) in members {
                    obj.set_value(k.as_str(), Value::from_json_node(v)?);
                }
                Ok(Value::Object(obj))
            }
        }
    }
}

impl Object {
    /// Decodes a JSON object node. `null` decodes to an empty Object.
    pub fn from_json_node(node: &Json) -> Result<Object> {
        match node {
            Json::Null => Ok(Object::new()),
            Json::Object(_) => match Value::from_json_node(node)? {
                Value::Object(obj) => Ok(obj),
                other => Err(Error::unexpected("JSON object", other.kind())),
            },
            other => Err(Error::unexpected("JSON object", json_kind(other))),
        }
    }
}

impl Values {
    /// Decodes a JSON array node. `null` decodes to an empty list.
    pub fn from_json_node(node: &Json) -> Result<Values> {
        match node {
            Json::Null => Ok(Values::new()),
            Json::Array(items) => items.iter().map(Value::from_json_node).collect(),
            other => Err(Error::unexpected("JSON array", json_kind(other))),
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E>(self, v: bool) -> std::result::Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> std::result::Result<Value, E> {
        Ok(Value::from_i64(v))
    }

    fn visit_u64<E>(self, v: u64) -> std::result::Result<Value, E> {
        Ok(Value::Positive(v))
    }

    fn visit_f64<E>(self, v: f64) -> std::result::Result<Value, E> {
        Ok(classify_float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Value, E> {
        classify_str(v).map_err(E::custom)
    }

    fn visit_bytes<E>(self, v: &[u8]) -> std::result::Result<Value, E> {
        Ok(Value::bytes(v))
    }

    fn visit_byte_buf<E>(self, v: Vec<u8>) -> std::result::Result<Value, E> {
        Ok(Value::Bytes(v))
    }

    fn visit_none<E>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_unit<E>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> std::result::Result<Value, D::Error> {
        Value::deserialize(d)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Value, A::Error> {
        let mut vals = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(v) = seq.next_element::<Value>()? {
            vals.push(v);
        }
        Ok(Value::Array(Values::from(vals)))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Value, A::Error> {
        let mut obj = Object::new();
        while let Some((k, v)) = map.next_entry::<String, Value>()? {
            obj.set_value(k, v);
        }
        Ok(Value::Object(obj))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Value, D::Error> {
        d.deserialize_any(ValueVisitor)
    }
}

impl<'de> Deserialize<'de> for Object {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Object, D::Error> {
        match Value::deserialize(d)? {
            Value::Object(obj) => Ok(obj),
            Value::Null => Ok(Object::new()),
            other => Err(de::Error::custom(Error::unexpected(
                "JSON object",
                other.kind(),
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Values {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Values, D::Error> {
        match Value::deserialize(d)? {
            Value::Array(vals) => Ok(vals),
            Value::Null => Ok(Values::new()),
            other => Err(de::Error::custom(Error::unexpected(
                "JSON array",
                other.kind(),
            ))),
        }
    }
}
