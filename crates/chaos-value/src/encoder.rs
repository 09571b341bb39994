//! JSON encoding for Values.
//!
//! The wire form is plain JSON with two conventions:
//!
//! - binary data is written as a string: `"b64."` followed by standard base64
//! - non-finite floats are written as the strings `"NaN"`, `"Infinity"` and
//!   `"-Infinity"`
//!
//! Object keys are written in sorted order, so encoding is deterministic.
//!
//! # Example
//! ```
//! use chaos_value::{Value, Values};
//!
//! let mut vals = Values::new();
//! vals.push(true).push("foo").push(18i8).push(f64::NAN);
//! assert_eq!(Value::from(vals).to_string(), r#"[true,"foo",18,"NaN"]"#);
//! ```

use std::fmt;

use base64::Engine;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{Error, Result};
use crate::object::Object;
use crate::value::{non_finite_marker, Value};
use crate::values::Values;

/// Prefix marking a base64 payload on the wire.
pub const BASE64_PREFIX: &str = "b64.";

/// Encodes `bytes` as `"b64."` + standard base64.
pub fn encode_base64(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(BASE64_PREFIX.len() + bytes.len().div_ceil(3) * 4);
    out.push_str(BASE64_PREFIX);
    base64::engine::general_purpose::STANDARD.encode_string(bytes, &mut out);
    out
}

/// An append-only JSON output buffer handed to custom type encoders.
#[derive(Debug, Default)]
pub struct JsonStream {
    buf: Vec<u8>,
}

impl JsonStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `value` using the Value wire conventions.
    pub fn write_value(&mut self, value: &Value) -> Result<()> {
        self.write(value)
    }

    /// Writes any serializable value as compact JSON.
    pub fn write<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer(&mut self.buf, value)?;
        Ok(())
    }

    /// Writes a JSON string literal, escaped.
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        self.write(s)
    }

    /// Appends pre-encoded JSON text verbatim.
    pub fn write_raw(&mut self, json: &str) {
        self.buf.extend_from_slice(json.as_bytes());
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_string(self) -> Result<String> {
        String::from_utf8(self.buf).map_err(|e| Error::invalid_utf8(format!("JSON output: {e}")))
    }
}

// Human-readable serializers (JSON) get the wire markers; the in-memory
// converter gets raw floats and bytes.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Positive(v) => serializer.serialize_u64(*v),
            Value::Negative(_) => serializer.serialize_i64(self.get_i64()),
            Value::Number(v) if !v.is_finite() && serializer.is_human_readable() => {
                serializer.serialize_str(non_finite_marker(*v))
            }
            Value::Number(v) => serializer.serialize_f64(*v),
            Value::String(s) => serializer.serialize_str(s),
            Value::Bytes(b) if serializer.is_human_readable() => {
                serializer.serialize_str(&encode_base64(b))
            }
            Value::Bytes(b) => serializer.serialize_bytes(b),
            Value::Object(o) => o.serialize(serializer),
            Value::Array(a) => a.serialize(serializer),
        }
    }
}

impl Serialize for Object {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl Serialize for Values {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

fn write_json<T: Serialize>(value: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let text = serde_json::to_string(value).map_err(|_| fmt::Error)?;
    f.write_str(&text)
}

/// Compact wire JSON.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_json(self, f)
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_json(self, f)
    }
}

impl fmt::Display for Values {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_json(self, f)
    }
}
