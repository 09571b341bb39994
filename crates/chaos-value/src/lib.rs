//! # chaos-value
//!
//! A dynamically-typed **Value / Object / Values** tree with a lossless JSON
//! codec and per-type codec overrides.
//!
//! A [`Value`] holds one JSON-compatible scalar or container. Integers are
//! split by sign, so the whole `u64` range and `i64::MIN` survive a round trip.
//! Binary data travels as `"b64."`-prefixed base64, and non-finite floats as
//! the strings `"NaN"`, `"Infinity"` and `"-Infinity"`.
//!
//! ## Quick start
//!
//! ```rust
//! use chaos_value::{codec, CodecRegistry, Object, Value};
//!
//! let registry = CodecRegistry::with_defaults();
//!
//! let mut obj = Object::new();
//! obj.set_str("name", "apple").set_i64("age", 20).set_bytes("raw", vec![1u8, 2]);
//!
//! let json = codec::to_string(&registry, &obj).unwrap();
//! assert_eq!(json, r#"{"age":20,"name":"apple","raw":"b64.AQI="}"#);
//!
//! let back: Object = codec::from_str(&registry, &json).unwrap();
//! assert_eq!(back, obj);
//! assert_eq!(back.get("missing").get_i64(), 0);
//! assert_eq!(Value::from(i64::MIN).to_string(), "-9223372036854775808");
//! ```
//!
//! ## Modules
//!
//! - [`value`]: the `Value` union, numeric policy and total accessors
//! - [`object`]: string-keyed `Object` and the record bridge
//! - [`values`]: ordered `Values` list
//! - [`boxed`]: transparent wrapper types (`BoolValue`, `StringValues`, `StringsMap`, ...)
//! - [`registry`]: `CodecRegistry` and the built-in codecs
//! - [`codec`]: registry-aware `to_string` / `from_str` / `is_empty`
//! - [`encoder`] / [`decoder`]: the JSON wire rules
//! - [`b64`]: serde helper for binary fields
//! - [`float`]: serde helper for float fields carrying NaN and infinities
//! - [`error`]: error types

pub mod b64;
pub mod boxed;
pub mod codec;
mod convert;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod float;
mod node;
pub mod object;
pub mod registry;
pub mod value;
pub mod values;

pub use boxed::{
    BoolValue, BoolValues, BytesValue, Float32Value, Float32Values, Float64Value, Float64Values,
    Int32Value, Int32Values, Int64Value, Int64Values, StringMap, StringValue, StringValues,
    StringsMap, Uint32Value, Uint32Values, Uint64Value, Uint64Values,
};
pub use codec::{EmptyChecker, Merge};
pub use encoder::JsonStream;
pub use error::{Error, ErrorKind, Result};
pub use object::Object;
pub use registry::{
    type_key, CodecRegistry, ListCodec, ObjectCodec, TypeDecoder, TypeEncoder, ValueCodec,
    ValuesCodec,
};
pub use value::{OptionValueExt, Value, ValueKind};
pub use values::Values;
