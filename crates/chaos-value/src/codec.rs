//! Registry-aware encode/decode entry points.
//!
//! These functions behave like their `serde_json` namesakes, except that the
//! codecs held by a [`CodecRegistry`] are applied and Values follow the wire
//! conventions (`"b64."` binary, non-finite float markers, sorted keys).

use std::collections::{BTreeMap, HashMap};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::boxed::{
    BoolValues, Float32Values, Float64Values, Int32Values, Int64Values, StringMap, StringValues,
    StringsMap, Uint32Values, Uint64Values,
};
use crate::convert;
use crate::encoder::JsonStream;
use crate::error::Result;
use crate::node;
use crate::object::Object;
use crate::registry::{pointee_key, type_key, CodecRegistry};
use crate::value::Value;
use crate::values::Values;

/// Converts `value` into a Value, applying registered type and field
/// encoders at every depth.
pub fn to_value<T: Serialize + ?Sized>(registry: &CodecRegistry, value: &T) -> Result<Value> {
    convert::to_value(Some(registry), value)
}

/// Encodes `value` as compact JSON.
pub fn to_string<T: Serialize + ?Sized>(registry: &CodecRegistry, value: &T) -> Result<String> {
    let mut stream = JsonStream::new();
    stream.write_value(&to_value(registry, value)?)?;
    stream.into_string()
}

/// Encodes `value` as indented JSON.
pub fn to_string_pretty<T: Serialize + ?Sized>(
    registry: &CodecRegistry,
    value: &T,
) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_value(registry, value)?)?)
}

/// Decodes `T` from JSON text. Registered type and field decoders rewrite
/// each node before serde sees it, at every depth.
pub fn from_str<T: DeserializeOwned>(registry: &CodecRegistry, s: &str) -> Result<T> {
    let parsed: serde_json::Value = serde_json::from_str(s)?;
    node::from_node(registry, parsed)
}

/// Decodes `T` from JSON text and merges it into `target`.
pub fn from_str_into<T>(registry: &CodecRegistry, s: &str, target: &mut T) -> Result<()>
where
    T: DeserializeOwned + Merge,
{
    let decoded: T = from_str(registry, s)?;
    target.merge_from(decoded);
    Ok(())
}

/// Whether `value` counts as empty.
///
/// A type encoder registered for `T` decides from the default Value
/// rendering; otherwise `T`'s [`EmptyChecker`] impl does.
pub fn is_empty<T>(registry: &CodecRegistry, value: &T) -> bool
where
    T: Serialize + EmptyChecker + ?Sized,
{
    match registry.type_encoder(pointee_key(type_key::<T>())) {
        Some(encoder) => match convert::to_value(None, value) {
            Ok(rendered) => encoder.is_empty(&rendered),
            Err(_) => value.is_empty_value(),
        },
        None => value.is_empty_value(),
    }
}

/// Folds a freshly decoded value into an existing one.
pub trait Merge {
    fn merge_from(&mut self, other: Self);
}

impl Merge for Object {
    fn merge_from(&mut self, other: Self) {
        self.merge(other);
    }
}

impl Merge for Values {
    fn merge_from(&mut self, other: Self) {
        self.extend(other);
    }
}

impl Merge for StringMap {
    fn merge_from(&mut self, other: Self) {
        self.vals.extend(other.vals);
    }
}

impl Merge for StringsMap {
    fn merge_from(&mut self, other: Self) {
        self.vals.extend(other.vals);
    }
}

impl<K: Ord, V> Merge for BTreeMap<K, V> {
    fn merge_from(&mut self, other: Self) {
        self.extend(other);
    }
}

/// Emptiness as seen by the codec layer.
pub trait EmptyChecker {
    fn is_empty_value(&self) -> bool;
}

/// A present Value is never empty, even when it holds `Null`.
impl EmptyChecker for Value {
    fn is_empty_value(&self) -> bool {
        false
    }
}

impl EmptyChecker for Object {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl EmptyChecker for Values {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T> EmptyChecker for Option<T> {
    fn is_empty_value(&self) -> bool {
        self.is_none()
    }
}

impl<T> EmptyChecker for Vec<T> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T> EmptyChecker for [T] {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl EmptyChecker for str {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl EmptyChecker for String {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V> EmptyChecker for BTreeMap<K, V> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V, S> EmptyChecker for HashMap<K, V, S> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl EmptyChecker for StringMap {
    fn is_empty_value(&self) -> bool {
        self.vals.is_empty()
    }
}

impl EmptyChecker for StringsMap {
    fn is_empty_value(&self) -> bool {
        self.vals.values().all(StringValues::is_empty)
    }
}

macro_rules! list_empty {
    ($($t:ty),*) => {$(
        impl EmptyChecker for $t {
            fn is_empty_value(&self) -> bool {
                self.vals.is_empty()
            }
        }
    )*};
}

list_empty!(
    BoolValues,
    Int32Values,
    Int64Values,
    Uint32Values,
    Uint64Values,
    Float32Values,
    Float64Values,
    StringValues
);
