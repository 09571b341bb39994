//! The `Value` tagged union: construction, numeric policy and accessors.
//!
//! Integers are split by sign so that the full `u64` range and `i64::MIN` are
//! both representable without overflow:
//!
//! | native input                      | stored as                          |
//! |-----------------------------------|------------------------------------|
//! | `()` / `None`                     | `Null`                             |
//! | `bool`                            | `Bool`                             |
//! | `i8`..`i64`, `isize`              | `Positive` or `Negative(magnitude)`|
//! | `u8`..`u64`, `usize`              | `Positive`                         |
//! | `f32`, `f64`                      | `Number`                           |
//! | `&str`, `String`, `char`          | `String`                           |
//! | serde bytes                       | `Bytes`                            |
//! | maps with string keys, structs    | `Object`                           |
//! | sequences, tuples                 | `Array`                            |
//!
//! Every `get_*` accessor is total: a different active variant yields the zero
//! value of the requested type. Construction fails loudly, access fails quietly.

use std::fmt;

use crate::error::{Error, Result};
use crate::object::{Object, EMPTY_OBJECT};
use crate::values::{Values, EMPTY_VALUES};

/// Marker strings used on the wire for non-finite floats.
pub const NAN_MARKER: &str = "NaN";
pub const INFINITY_MARKER: &str = "Infinity";
pub const NEG_INFINITY_MARKER: &str = "-Infinity";

/// Magnitude of `i64::MIN`, which does not fit in a positive `i64`.
const I64_MIN_MAGNITUDE: u64 = 1 << 63;

static NULL: Value = Value::Null;

/// A JSON-compatible scalar or container.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    /// Any non-negative integer.
    Positive(u64),
    /// A negative integer stored as its magnitude; `1 << 63` is `i64::MIN`.
    Negative(u64),
    Number(f64),
    String(String),
    Bytes(Vec<u8>),
    Object(Object),
    Array(Values),
}

/// The kind of variant a [`Value`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Bytes,
    Object,
    Array,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Bytes => "bytes",
            ValueKind::Object => "object",
            ValueKind::Array => "array",
        };
        f.write_str(name)
    }
}

impl Value {
    /// Builds a Value from any serializable native input.
    ///
    /// Structs become Objects keyed by their serde field names. Use
    /// [`Object::from_record`] for the record bridge, which skips zero fields
    /// and honors registered codecs.
    pub fn from_native<T: serde::Serialize + ?Sized>(value: &T) -> Result<Value> {
        crate::convert::to_value(None, value)
    }

    pub const fn from_i64(v: i64) -> Value {
        if v >= 0 {
            Value::Positive(v as u64)
        } else {
            // unsigned_abs maps i64::MIN to 1 << 63 without overflowing.
            Value::Negative(v.unsigned_abs())
        }
    }

    pub const fn from_u64(v: u64) -> Value {
        Value::Positive(v)
    }

    /// Stores `v` as a float. Integers above 2^53 lose precision on this path.
    pub const fn from_f64(v: f64) -> Value {
        Value::Number(v)
    }

    pub fn string(v: impl Into<String>) -> Value {
        Value::String(v.into())
    }

    pub fn bytes(v: impl Into<Vec<u8>>) -> Value {
        Value::Bytes(v.into())
    }

    /// Builds a `String` Value from raw bytes, rejecting invalid UTF-8.
    pub fn from_utf8(v: &[u8]) -> Result<Value> {
        std::str::from_utf8(v)
            .map(Value::string)
            .map_err(|e| Error::invalid_utf8(format!("string: {e}")))
    }

    /// Builds an `Array` Value from anything convertible element by element.
    pub fn array<I, T>(items: I) -> Value
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    /// Returns `value` itself, or a shared `Null` when it is absent.
    pub fn or_null(value: Option<&Value>) -> &Value {
        value.unwrap_or(&NULL)
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Positive(_) | Value::Negative(_) => ValueKind::Integer,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Object(_) => ValueKind::Object,
            Value::Array(_) => ValueKind::Array,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this Value holds its kind's zero: null, false, 0, 0.0, or an
    /// empty string, byte sequence, object or array.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Positive(v) | Value::Negative(v) => *v == 0,
            Value::Number(v) => *v == 0.0,
            Value::String(s) => s.is_empty(),
            Value::Bytes(b) => b.is_empty(),
            Value::Object(o) => o.is_empty(),
            Value::Array(a) => a.is_empty(),
        }
    }

    pub fn get_bool(&self) -> bool {
        matches!(self, Value::Bool(true))
    }

    /// Reconstructs the signed value, including `i64::MIN` from magnitude `1 << 63`.
    ///
    /// `Positive` values above `i64::MAX` wrap, like an `as` cast. A
    /// `Negative` magnitude above `1 << 63` has no `i64` form and reads as 0;
    /// build negatives with [`Value::from_i64`] to stay in range.
    pub fn get_i64(&self) -> i64 {
        match self {
            Value::Positive(v) => *v as i64,
            Value::Negative(m) if *m == I64_MIN_MAGNITUDE => i64::MIN,
            Value::Negative(m) if *m > I64_MIN_MAGNITUDE => 0,
            Value::Negative(m) => -(*m as i64),
            _ => 0,
        }
    }

    pub fn get_i8(&self) -> i8 {
        self.get_i64() as i8
    }

    pub fn get_i16(&self) -> i16 {
        self.get_i64() as i16
    }

    pub fn get_i32(&self) -> i32 {
        self.get_i64() as i32
    }

    /// The unsigned value of a `Positive`; negative integers read as 0.
    pub fn get_u64(&self) -> u64 {
        match self {
            Value::Positive(v) => *v,
            _ => 0,
        }
    }

    pub fn get_u8(&self) -> u8 {
        self.get_u64() as u8
    }

    pub fn get_u16(&self) -> u16 {
        self.get_u64() as u16
    }

    pub fn get_u32(&self) -> u32 {
        self.get_u64() as u32
    }

    /// The float of a `Number`. Integer variants read as 0.0.
    pub fn get_f64(&self) -> f64 {
        match self {
            Value::Number(v) => *v,
            _ => 0.0,
        }
    }

    pub fn get_f32(&self) -> f32 {
        self.get_f64() as f32
    }

    pub fn get_str(&self) -> &str {
        match self {
            Value::String(s) => s,
            _ => "",
        }
    }

    pub fn get_bytes(&self) -> &[u8] {
        match self {
            Value::Bytes(b) => b,
            _ => &[],
        }
    }

    pub fn get_object(&self) -> &Object {
        match self {
            Value::Object(o) => o,
            _ => &EMPTY_OBJECT,
        }
    }

    pub fn get_values(&self) -> &Values {
        match self {
            Value::Array(a) => a,
            _ => &EMPTY_VALUES,
        }
    }

    pub fn get_array(&self) -> &[Value] {
        self.get_values().as_slice()
    }

    pub fn get_bool_array(&self) -> Vec<bool> {
        self.get_array().iter().map(Value::get_bool).collect()
    }

    pub fn get_i32_array(&self) -> Vec<i32> {
        self.get_array().iter().map(Value::get_i32).collect()
    }

    pub fn get_i64_array(&self) -> Vec<i64> {
        self.get_array().iter().map(Value::get_i64).collect()
    }

    pub fn get_u32_array(&self) -> Vec<u32> {
        self.get_array().iter().map(Value::get_u32).collect()
    }

    pub fn get_u64_array(&self) -> Vec<u64> {
        self.get_array().iter().map(Value::get_u64).collect()
    }

    pub fn get_f32_array(&self) -> Vec<f32> {
        self.get_array().iter().map(Value::get_f32).collect()
    }

    pub fn get_f64_array(&self) -> Vec<f64> {
        self.get_array().iter().map(Value::get_f64).collect()
    }

    pub fn get_string_array(&self) -> Vec<&str> {
        self.get_array().iter().map(Value::get_str).collect()
    }

    pub fn get_object_array(&self) -> Vec<&Object> {
        self.get_array().iter().map(Value::get_object).collect()
    }

    /// Converts this Value into a plain `serde_json::Value`.
    ///
    /// Plain `serde_json` encoding of the result produces the same text as the
    /// custom codec: non-finite floats become `"NaN"`, `"Infinity"` and
    /// `"-Infinity"`, and bytes become `b64.`-prefixed strings.
    pub fn as_interface(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Positive(v) => Json::from(*v),
            Value::Negative(_) => Json::from(self.get_i64()),
            Value::Number(v) => match serde_json::Number::from_f64(*v) {
                Some(n) => Json::Number(n),
                None => Json::String(non_finite_marker(*v).to_string()),
            },
            Value::String(s) => Json::String(s.clone()),
            Value::Bytes(b) => Json::String(crate::encoder::encode_base64(b)),
            Value::Object(o) => Json::Object(o.as_map()),
            Value::Array(a) => Json::Array(a.to_interface()),
        }
    }
}

/// The wire marker for a non-finite float. Only meaningful when `!v.is_finite()`.
pub(crate) fn non_finite_marker(v: f64) -> &'static str {
    if v == f64::INFINITY {
        INFINITY_MARKER
    } else if v == f64::NEG_INFINITY {
        NEG_INFINITY_MARKER
    } else {
        NAN_MARKER
    }
}

/// Absent-safe access for optional Values.
pub trait OptionValueExt {
    /// The contained Value, or `Null` when absent.
    fn or_null(&self) -> &Value;
}

impl OptionValueExt for Option<&Value> {
    fn or_null(&self) -> &Value {
        Value::or_null(*self)
    }
}

impl OptionValueExt for Option<Value> {
    fn or_null(&self) -> &Value {
        Value::or_null(self.as_ref())
    }
}

macro_rules! from_signed {
    ($($t:ty),*) => {$(
        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::from_i64(v as i64)
            }
        }
    )*};
}

macro_rules! from_unsigned {
    ($($t:ty),*) => {$(
        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::from_u64(v as u64)
            }
        }
    )*};
}

from_signed!(i8, i16, i32, i64, isize);
from_unsigned!(u8, u16, u32, u64, usize);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Number(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Value::Object(v)
    }
}

impl From<Values> for Value {
    fn from(v: Values) -> Self {
        Value::Array(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::array(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
