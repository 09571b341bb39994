//! Per-type and per-field JSON codec overrides.
//!
//! A [`CodecRegistry`] maps a type key (see [`type_key`]) to a custom
//! encoder and/or decoder. Field-level codecs are stored under
//! `"<type key>.<field>"`, where `field` is the serialized field name (after
//! any serde `rename`).
//!
//! Encoders start from the default [`Value`] rendering of a native value and
//! write the custom wire form. Decoders run the other way on parsed JSON:
//! they rewrite a custom wire node back into the default shape before serde
//! deserializes it. Both apply at every depth, and a registration for `T`
//! also covers `&T`, `Box<T>`, `Rc<T>` and `Arc<T>`.
//!
//! ```
//! use chaos_value::{registry::type_key, CodecRegistry, Object, ObjectCodec};
//!
//! let mut registry = CodecRegistry::new();
//! registry.register::<Object>(ObjectCodec);
//! assert!(registry.type_encoder(type_key::<Object>()).is_some());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use heck::ToLowerCamelCase;
use serde_json::Value as Json;

use crate::boxed::{
    BoolValues, Float32Values, Float64Values, Int32Values, Int64Values, StringValues,
    Uint32Values, Uint64Values,
};
use crate::encoder::JsonStream;
use crate::error::{Error, Result};
use crate::object::Object;
use crate::value::Value;
use crate::values::Values;

/// The registry key of `T`: its fully-qualified type name.
pub fn type_key<T: ?Sized>() -> &'static str {
    std::any::type_name::<T>()
}

/// Writes the custom wire form of a type.
pub trait TypeEncoder: Send + Sync {
    /// Writes `value`, the default rendering of a native value, to `stream`.
    fn encode(&self, value: &Value, stream: &mut JsonStream) -> Result<()>;

    /// Whether `value` counts as empty for this type.
    fn is_empty(&self, value: &Value) -> bool {
        value.is_zero()
    }

    /// The Value this encoder puts on the wire for `value`.
    ///
    /// Encodes to JSON and decodes the bytes back. Codecs whose wire form is
    /// the default rendering can return `value` unchanged.
    fn rewrite(&self, value: Value) -> Result<Value> {
        let mut stream = JsonStream::new();
        self.encode(&value, &mut stream)?;
        Ok(serde_json::from_slice(stream.as_bytes())?)
    }
}

/// Reads the custom wire form of a type.
pub trait TypeDecoder: Send + Sync {
    /// Rewrites a parsed custom wire node into the default wire shape.
    fn decode(&self, node: Json) -> Result<Json>;
}

/// Codec overrides keyed by type key and by `"<type key>.<field>"`.
///
/// Registration needs `&mut self`; lookups need `&self`. Build the registry
/// once, then share it read-only (wrap it in an `Arc` to share across
/// threads). The last registration for a key wins.
#[derive(Default)]
pub struct CodecRegistry {
    type_encoders: HashMap<String, Arc<dyn TypeEncoder>>,
    type_decoders: HashMap<String, Arc<dyn TypeDecoder>>,
    field_encoders: HashMap<String, Arc<dyn TypeEncoder>>,
    field_decoders: HashMap<String, Arc<dyn TypeDecoder>>,
}

fn field_key(type_key: &str, field: &str) -> String {
    format!("{type_key}.{field}")
}

impl CodecRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the Value, Object and Values codecs and the list
    /// wrapper codecs installed.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .register::<Value>(ValueCodec)
            .register::<Object>(ObjectCodec)
            .register::<Values>(ValuesCodec)
            .register::<BoolValues>(ListCodec)
            .register::<Int32Values>(ListCodec)
            .register::<Int64Values>(ListCodec)
            .register::<Uint32Values>(ListCodec)
            .register::<Uint64Values>(ListCodec)
            .register::<Float32Values>(ListCodec)
            .register::<Float64Values>(ListCodec)
            .register::<StringValues>(ListCodec);
        registry
    }

    /// Registers `codec` as both encoder and decoder for `T`.
    pub fn register<T: ?Sized>(
        &mut self,
        codec: impl TypeEncoder + TypeDecoder + 'static,
    ) -> &mut Self {
        let codec = Arc::new(codec);
        let key = type_key::<T>();
        tracing::debug!(type_key = key, "registering type codec");
        self.type_encoders.insert(key.to_string(), codec.clone());
        self.type_decoders.insert(key.to_string(), codec);
        self
    }

    pub fn register_type_encoder(
        &mut self,
        key: impl Into<String>,
        encoder: impl TypeEncoder + 'static,
    ) -> &mut Self {
        let key = key.into();
        tracing::debug!(type_key = %key, "registering type encoder");
        self.type_encoders.insert(key, Arc::new(encoder));
        self
    }

    pub fn register_type_decoder(
        &mut self,
        key: impl Into<String>,
        decoder: impl TypeDecoder + 'static,
    ) -> &mut Self {
        let key = key.into();
        tracing::debug!(type_key = %key, "registering type decoder");
        self.type_decoders.insert(key, Arc::new(decoder));
        self
    }

    pub fn register_field_encoder(
        &mut self,
        type_key: &str,
        field: &str,
        encoder: impl TypeEncoder + 'static,
    ) -> &mut Self {
        let key = field_key(type_key, field);
        tracing::debug!(field_key = %key, "registering field encoder");
        self.field_encoders.insert(key, Arc::new(encoder));
        self
    }

    pub fn register_field_decoder(
        &mut self,
        type_key: &str,
        field: &str,
        decoder: impl TypeDecoder + 'static,
    ) -> &mut Self {
        let key = field_key(type_key, field);
        tracing::debug!(field_key = %key, "registering field decoder");
        self.field_decoders.insert(key, Arc::new(decoder));
        self
    }

    pub fn type_encoder(&self, key: &str) -> Option<&dyn TypeEncoder> {
        self.type_encoders.get(key).map(|e| e.as_ref())
    }

    pub fn type_decoder(&self, key: &str) -> Option<&dyn TypeDecoder> {
        self.type_decoders.get(key).map(|d| d.as_ref())
    }

    /// Looks up a field encoder by its full `"<type key>.<field>"` key.
    pub fn field_encoder(&self, key: &str) -> Option<&dyn TypeEncoder> {
        self.field_encoders.get(key).map(|e| e.as_ref())
    }

    pub fn field_decoder(&self, key: &str) -> Option<&dyn TypeDecoder> {
        self.field_decoders.get(key).map(|d| d.as_ref())
    }

    /// Applies the type decoder registered for `key` to `node`.
    ///
    /// Keys of `&T`, `Box<T>`, `Rc<T>`, `Arc<T>` and `Option<T>` fall back to
    /// the decoder of `T`. A `null` behind an `Option` is left untouched.
    pub(crate) fn decode_type(&self, key: &str, node: Json) -> Result<Json> {
        let mut key = key;
        loop {
            if let Some(decoder) = self.type_decoder(key) {
                return decoder.decode(node);
            }
            let inner = pointee_key(key);
            if inner != key {
                key = inner;
                continue;
            }
            match strip_wrapper(key, &[OPTION_WRAPPER]) {
                Some(_) if node.is_null() => return Ok(node),
                Some(inner) => key = inner,
                None => return Ok(node),
            }
        }
    }

    /// The field decoder for `member` of the type keyed `type_key`.
    ///
    /// `member` is the key found on the wire: it matches a registered field
    /// name or that name's lowerCamelCase form.
    pub(crate) fn member_decoder(&self, type_key: &str, member: &str) -> Option<&dyn TypeDecoder> {
        if self.field_decoders.is_empty() {
            return None;
        }
        if let Some(decoder) = self.field_decoder(&field_key(type_key, member)) {
            return Some(decoder);
        }
        let prefix = format!("{type_key}.");
        self.field_decoders.iter().find_map(|(key, decoder)| {
            let field = key.strip_prefix(&prefix)?;
            (field.to_lower_camel_case() == member).then(|| decoder.as_ref())
        })
    }
}

const POINTER_WRAPPERS: [&str; 3] = ["alloc::boxed::Box<", "alloc::rc::Rc<", "alloc::sync::Arc<"];
const OPTION_WRAPPER: &str = "core::option::Option<";

fn strip_wrapper<'k>(key: &'k str, wrappers: &[&str]) -> Option<&'k str> {
    wrappers
        .iter()
        .find_map(|wrapper| key.strip_prefix(*wrapper)?.strip_suffix('>'))
}

/// Strips `&`, `&mut`, `Box`, `Rc` and `Arc` from a type key. Their serde
/// impls forward to the pointee, so they share its codecs.
pub(crate) fn pointee_key(key: &str) -> &str {
    let mut key = key;
    loop {
        let inner = key
            .strip_prefix("&mut ")
            .or_else(|| key.strip_prefix('&'))
            .or_else(|| strip_wrapper(key, &POINTER_WRAPPERS));
        match inner {
            Some(inner) => key = inner,
            None => return key,
        }
    }
}

/// Like [`pointee_key`], also looking through `Option`.
pub(crate) fn base_key(key: &str) -> &str {
    let mut key = pointee_key(key);
    while let Some(inner) = strip_wrapper(key, &[OPTION_WRAPPER]) {
        key = pointee_key(inner);
    }
    key
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut type_encoders: Vec<_> = self.type_encoders.keys().collect();
        let mut type_decoders: Vec<_> = self.type_decoders.keys().collect();
        let mut field_encoders: Vec<_> = self.field_encoders.keys().collect();
        let mut field_decoders: Vec<_> = self.field_decoders.keys().collect();
        type_encoders.sort();
        type_decoders.sort();
        field_encoders.sort();
        field_decoders.sort();
        f.debug_struct("CodecRegistry")
            .field("type_encoders", &type_encoders)
            .field("type_decoders", &type_decoders)
            .field("field_encoders", &field_encoders)
            .field("field_decoders", &field_decoders)
            .finish()
    }
}

// ============================================================================
// Built-in codecs
// ============================================================================

/// Codec for [`Value`]: the default rendering, with `b64.` bytes and
/// non-finite float markers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueCodec;

impl TypeEncoder for ValueCodec {
    fn encode(&self, value: &Value, stream: &mut JsonStream) -> Result<()> {
        stream.write_value(value)
    }

    /// A present Value is never empty, even when it holds `Null`.
    fn is_empty(&self, _value: &Value) -> bool {
        false
    }

    fn rewrite(&self, value: Value) -> Result<Value> {
        Ok(value)
    }
}

impl TypeDecoder for ValueCodec {
    fn decode(&self, node: Json) -> Result<Json> {
        Ok(node)
    }
}

/// Codec for [`Object`]. Decoding accepts a JSON object or `null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectCodec;

impl TypeEncoder for ObjectCodec {
    fn encode(&self, value: &Value, stream: &mut JsonStream) -> Result<()> {
        stream.write_value(value)
    }

    fn is_empty(&self, value: &Value) -> bool {
        match value {
            Value::Object(o) => o.is_empty(),
            Value::Null => true,
            _ => false,
        }
    }

    fn rewrite(&self, value: Value) -> Result<Value> {
        Ok(value)
    }
}

impl TypeDecoder for ObjectCodec {
    fn decode(&self, node: Json) -> Result<Json> {
        match node {
            Json::Null => Ok(Json::Object(serde_json::Map::new())),
            Json::Object(_) => Ok(node),
            other => Err(Error::unexpected("JSON object", json_kind(&other))),
        }
    }
}

/// Codec for [`Values`]. Decoding accepts a JSON array or `null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValuesCodec;

impl TypeEncoder for ValuesCodec {
    fn encode(&self, value: &Value, stream: &mut JsonStream) -> Result<()> {
        stream.write_value(value)
    }

    fn is_empty(&self, value: &Value) -> bool {
        match value {
            Value::Array(a) => a.is_empty(),
            Value::Null => true,
            _ => false,
        }
    }

    fn rewrite(&self, value: Value) -> Result<Value> {
        Ok(value)
    }
}

impl TypeDecoder for ValuesCodec {
    fn decode(&self, node: Json) -> Result<Json> {
        decode_array(node)
    }
}

/// Codec shared by the list wrappers ([`BoolValues`] .. [`StringValues`]).
#[derive(Debug, Clone, Copy, Default)]
pub struct ListCodec;

impl TypeEncoder for ListCodec {
    fn encode(&self, value: &Value, stream: &mut JsonStream) -> Result<()> {
        stream.write_value(value)
    }

    fn is_empty(&self, value: &Value) -> bool {
        value.get_values().is_empty()
    }

    fn rewrite(&self, value: Value) -> Result<Value> {
        Ok(value)
    }
}

impl TypeDecoder for ListCodec {
    fn decode(&self, node: Json) -> Result<Json> {
        decode_array(node)
    }
}

fn decode_array(node: Json) -> Result<Json> {
    match node {
        Json::Null => Ok(Json::Array(Vec::new())),
        Json::Array(_) => Ok(node),
        other => Err(Error::unexpected("JSON array", json_kind(&other))),
    }
}

pub(crate) fn json_kind(node: &Json) -> &'static str {
    match node {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
