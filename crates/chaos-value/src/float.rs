//! Serde helper for float fields that can hold NaN or an infinity:
//! `#[serde(with = "chaos_value::float")]`.
//!
//! JSON gets `"NaN"`, `"Infinity"` or `"-Infinity"` for non-finite values and
//! a plain number otherwise; the in-memory converter gets the raw float.
//! Decoding accepts numbers and the three marker strings.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Serialize, Serializer};

use crate::value::{non_finite_marker, INFINITY_MARKER, NAN_MARKER, NEG_INFINITY_MARKER};

/// A float width the helper can carry.
pub trait Float: Copy + Serialize {
    fn to_f64(self) -> f64;
    fn from_f64(v: f64) -> Self;
}

impl Float for f32 {
    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(v: f64) -> Self {
        v as f32
    }
}

impl Float for f64 {
    fn to_f64(self) -> f64 {
        self
    }

    fn from_f64(v: f64) -> Self {
        v
    }
}

pub fn serialize<T: Float, S: Serializer>(v: &T, serializer: S) -> Result<S::Ok, S::Error> {
    let wide = v.to_f64();
    if !wide.is_finite() && serializer.is_human_readable() {
        serializer.serialize_str(non_finite_marker(wide))
    } else {
        v.serialize(serializer)
    }
}

pub fn deserialize<'de, T: Float, D: Deserializer<'de>>(deserializer: D) -> Result<T, D::Error> {
    deserializer.deserialize_any(FloatVisitor).map(T::from_f64)
}

struct FloatVisitor;

impl<'de> Visitor<'de> for FloatVisitor {
    type Value = f64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or one of \"NaN\", \"Infinity\", \"-Infinity\"")
    }

    fn visit_f64<E>(self, v: f64) -> Result<f64, E> {
        Ok(v)
    }

    fn visit_i64<E>(self, v: i64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_u64<E>(self, v: u64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
        match v {
            NAN_MARKER => Ok(f64::NAN),
            INFINITY_MARKER => Ok(f64::INFINITY),
            NEG_INFINITY_MARKER => Ok(f64::NEG_INFINITY),
            _ => Err(E::invalid_value(de::Unexpected::Str(v), &self)),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug)]
    struct Sample {
        #[serde(with = "crate::float")]
        wide: f64,
        #[serde(with = "crate::float")]
        narrow: f32,
    }

    #[test]
    fn json_uses_markers_for_non_finite_values() {
        let sample = Sample {
            wide: f64::NEG_INFINITY,
            narrow: f32::NAN,
        };
        let text = serde_json::to_string(&sample).unwrap();
        assert_eq!(text, r#"{"wide":"-Infinity","narrow":"NaN"}"#);

        let back: Sample = serde_json::from_str(&text).unwrap();
        assert_eq!(back.wide, f64::NEG_INFINITY);
        assert!(back.narrow.is_nan());
    }

    #[test]
    fn finite_values_stay_numbers() {
        let sample = Sample {
            wide: 2.5,
            narrow: 0.5,
        };
        assert_eq!(
            serde_json::to_string(&sample).unwrap(),
            r#"{"wide":2.5,"narrow":0.5}"#
        );
        let back: Sample = serde_json::from_str(r#"{"wide":3,"narrow":-1}"#).unwrap();
        assert_eq!(back.wide, 3.0);
        assert_eq!(back.narrow, -1.0);
        assert!(serde_json::from_str::<Sample>(r#"{"wide":"nan","narrow":0}"#).is_err());
    }
}
