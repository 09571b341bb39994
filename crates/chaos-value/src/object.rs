//! `Object`: a string-keyed map of [`Value`]s, plus the bridge between native
//! records and Objects.
//!
//! Keys are unique and kept sorted, so iteration order and encoded JSON are
//! deterministic.
//!
//! # Record bridge
//!
//! [`Object::from_record`] converts a serializable record into Object entries:
//! fields whose Value is zero are skipped and keys take the lowerCamelCase
//! form of the Rust field name. [`Object::to_record`] goes the other way by
//! decoding the Object's JSON form, so records should carry
//! `#[serde(rename_all = "camelCase")]`.
//!
//! ```
//! use chaos_value::{CodecRegistry, Object};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq, Default)]
//! #[serde(rename_all = "camelCase", default)]
//! struct Fruit {
//!     display_name: String,
//!     weight_grams: u32,
//! }
//!
//! let registry = CodecRegistry::with_defaults();
//! let fruit = Fruit { display_name: "apple".into(), weight_grams: 0 };
//!
//! let mut obj = Object::new();
//! obj.from_record(&registry, &fruit).unwrap();
//! assert_eq!(obj.to_string(), r#"{"displayName":"apple"}"#);
//! assert_eq!(obj.to_record::<Fruit>(&registry).unwrap(), fruit);
//! ```

use std::collections::btree_map::{self, BTreeMap};

use heck::{ToLowerCamelCase, ToSnakeCase};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::convert;
use crate::error::{Error, Result};
use crate::node;
use crate::registry::CodecRegistry;
use crate::value::Value;
use crate::values::Values;

pub(crate) static EMPTY_OBJECT: Object = Object::new();

/// A string-keyed collection of Values with unique, sorted keys.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Object {
    vals: BTreeMap<String, Value>,
}

macro_rules! scalar_accessors {
    ($($set:ident, $get:ident: $t:ty;)*) => {$(
        pub fn $set(&mut self, key: impl Into<String>, value: $t) -> &mut Self {
            self.set_value(key, value)
        }

        pub fn $get(&self, key: &str) -> $t {
            self.get(key).$get()
        }
    )*};
}

macro_rules! array_accessors {
    ($($set:ident, $get:ident: $t:ty;)*) => {$(
        pub fn $set<I>(&mut self, key: impl Into<String>, vals: I) -> &mut Self
        where
            I: IntoIterator<Item = $t>,
        {
            self.set_value(key, Value::array(vals))
        }

        pub fn $get(&self, key: &str) -> Vec<$t> {
            self.get(key).$get()
        }
    )*};
}

impl Object {
    pub const fn new() -> Self {
        Object {
            vals: BTreeMap::new(),
        }
    }

    /// Wraps an existing map without copying it.
    pub fn from_values(vals: BTreeMap<String, Value>) -> Self {
        Object { vals }
    }

    /// Builds an Object from `(key, value)` pairs.
    ///
    /// Keys are raw bytes and must be valid UTF-8. Each value goes through
    /// [`Value::from_native`]; the first failure aborts.
    pub fn from_map<I, K, V>(entries: I) -> Result<Object>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<[u8]>,
        V: Serialize,
    {
        let mut obj = Object::new();
        for (k, v) in entries {
            let key = std::str::from_utf8(k.as_ref())
                .map_err(|e| Error::invalid_utf8(format!("object key: {e}")))?;
            obj.set_value(key, Value::from_native(&v)?);
        }
        Ok(obj)
    }

    /// Builds an Object from a flattened `[k1, v1, k2, v2, ..]` list.
    pub fn from_key_vals<I>(items: I) -> Result<Object>
    where
        I: IntoIterator<Item = Value>,
    {
        let mut obj = Object::new();
        let mut items = items.into_iter();
        while let Some(key) = items.next() {
            let key = match key {
                Value::String(key) => key,
                other => {
                    return Err(Error::KeyValueArityMismatch(format!(
                        "key must be a string, found {}",
                        other.kind()
                    )))
                }
            };
            let value = items.next().ok_or_else(|| {
                Error::KeyValueArityMismatch(format!("key {key:?} has no value"))
            })?;
            obj.set_value(key, value);
        }
        Ok(obj)
    }

    /// Converts a record (or map) into a new Object without any codec
    /// overrides. See [`Object::from_record`].
    pub fn from_native<T: Serialize + ?Sized>(value: &T) -> Result<Object> {
        let mut obj = Object::new();
        obj.absorb(convert::to_record_value(None, value)?)?;
        Ok(obj)
    }

    /// Merges the entries of a converted record into this Object.
    ///
    /// Null input is a no-op. Scalars and arrays are rejected with
    /// `UnsupportedType`. Struct fields honor the field and type encoders in
    /// `registry`; zero-valued fields are skipped.
    pub fn from_record<T: Serialize + ?Sized>(
        &mut self,
        registry: &CodecRegistry,
        value: &T,
    ) -> Result<()> {
        self.absorb(convert::to_record_value(Some(registry), value)?)
    }

    fn absorb(&mut self, value: Value) -> Result<()> {
        match value {
            Value::Null => Ok(()),
            Value::Object(obj) => {
                self.merge(obj);
                Ok(())
            }
            Value::Array(_) => Err(Error::UnsupportedType(
                "invalid array object format".into(),
            )),
            _ => Err(Error::UnsupportedType(
                "invalid basic object format".into(),
            )),
        }
    }

    /// Decodes this Object's JSON form into `T`, applying the type and field
    /// decoders `registry` holds at every depth.
    pub fn to_record<T: DeserializeOwned>(&self, registry: &CodecRegistry) -> Result<T> {
        node::from_node(registry, serde_json::to_value(self)?)
    }

    pub fn len(&self) -> usize {
        self.vals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vals.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.vals.contains_key(key)
    }

    /// The Value under `key`, or `Null` when absent.
    pub fn get(&self, key: &str) -> &Value {
        Value::or_null(self.vals.get(key))
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.vals.get_mut(key)
    }

    pub fn set_value(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.vals.insert(key.into(), value.into());
        self
    }

    scalar_accessors! {
        set_bool, get_bool: bool;
        set_i8, get_i8: i8;
        set_i16, get_i16: i16;
        set_i32, get_i32: i32;
        set_i64, get_i64: i64;
        set_u8, get_u8: u8;
        set_u16, get_u16: u16;
        set_u32, get_u32: u32;
        set_u64, get_u64: u64;
        set_f32, get_f32: f32;
        set_f64, get_f64: f64;
    }

    pub fn set_str(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.set_value(key, Value::String(value.into()))
    }

    pub fn get_str(&self, key: &str) -> &str {
        self.get(key).get_str()
    }

    pub fn set_bytes(&mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> &mut Self {
        self.set_value(key, Value::Bytes(value.into()))
    }

    pub fn get_bytes(&self, key: &str) -> &[u8] {
        self.get(key).get_bytes()
    }

    pub fn set_object(&mut self, key: impl Into<String>, value: Object) -> &mut Self {
        self.set_value(key, Value::Object(value))
    }

    pub fn get_object(&self, key: &str) -> &Object {
        self.get(key).get_object()
    }

    pub fn set_array(&mut self, key: impl Into<String>, value: Values) -> &mut Self {
        self.set_value(key, Value::Array(value))
    }

    pub fn get_values(&self, key: &str) -> &Values {
        self.get(key).get_values()
    }

    pub fn get_array(&self, key: &str) -> &[Value] {
        self.get(key).get_array()
    }

    array_accessors! {
        set_bool_array, get_bool_array: bool;
        set_i32_array, get_i32_array: i32;
        set_i64_array, get_i64_array: i64;
        set_u32_array, get_u32_array: u32;
        set_u64_array, get_u64_array: u64;
        set_f32_array, get_f32_array: f32;
        set_f64_array, get_f64_array: f64;
    }

    pub fn set_string_array<I>(&mut self, key: impl Into<String>, vals: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.set_value(key, Value::array(vals.into_iter().map(Into::<String>::into)))
    }

    pub fn get_string_array(&self, key: &str) -> Vec<&str> {
        self.get(key).get_string_array()
    }

    pub fn set_object_array<I>(&mut self, key: impl Into<String>, vals: I) -> &mut Self
    where
        I: IntoIterator<Item = Object>,
    {
        self.set_value(key, Value::array(vals))
    }

    pub fn get_object_array(&self, key: &str) -> Vec<&Object> {
        self.get(key).get_object_array()
    }

    /// Removes `key`, returning its Value if it was present.
    pub fn delete(&mut self, key: &str) -> Option<Value> {
        self.vals.remove(key)
    }

    /// Copies every entry of `other` into this Object. On a shared key the
    /// entry from `other` wins.
    pub fn merge(&mut self, other: Object) -> &mut Self {
        self.vals.extend(other.vals);
        self
    }

    /// Merges `objects` left to right into a new Object.
    pub fn merge_objects<I>(objects: I) -> Object
    where
        I: IntoIterator<Item = Object>,
    {
        let mut merged = Object::new();
        for obj in objects {
            merged.merge(obj);
        }
        merged
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.vals.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.vals.keys().map(String::as_str)
    }

    /// A copy with every top-level key in lowerCamelCase. Colliding keys keep
    /// the entry that sorts last.
    pub fn to_lower_camel_keys(&self) -> Object {
        self.rekey(|k| k.to_lower_camel_case())
    }

    /// A copy with every top-level key in snake_case. Colliding keys keep the
    /// entry that sorts last.
    pub fn to_snake_keys(&self) -> Object {
        self.rekey(|k| k.to_snake_case())
    }

    fn rekey(&self, f: impl Fn(&str) -> String) -> Object {
        self.vals
            .iter()
            .map(|(k, v)| (f(k), v.clone()))
            .collect()
    }

    /// Converts each entry with [`Value::as_interface`].
    pub fn as_map(&self) -> serde_json::Map<String, serde_json::Value> {
        self.vals
            .iter()
            .map(|(k, v)| (k.clone(), v.as_interface()))
            .collect()
    }

    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.vals
    }
}

impl From<BTreeMap<String, Value>> for Object {
    fn from(vals: BTreeMap<String, Value>) -> Self {
        Object::from_values(vals)
    }
}

impl FromIterator<(String, Value)> for Object {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Object {
            vals: iter.into_iter().collect(),
        }
    }
}

impl Extend<(String, Value)> for Object {
    fn extend<I: IntoIterator<Item = (String, Value)>>(&mut self, iter: I) {
        self.vals.extend(iter);
    }
}

impl IntoIterator for Object {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.vals.into_iter()
    }
}

impl<'a> IntoIterator for &'a Object {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.vals.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_set_delete() {
        let mut obj = Object::new();
        assert!(obj.is_empty());
        obj.set_str("name", "apple");
        assert_eq!(obj.len(), 1);
        assert_eq!(obj.delete("name"), Some(Value::string("apple")));
        assert!(obj.is_empty());
        assert_eq!(obj.delete("name"), None);
    }

    #[test]
    fn from_map_as_map() {
        let obj = Object::from_map([("name", Value::from("apple")), ("age", Value::from(20))])
            .unwrap();
        assert_eq!(
            serde_json::Value::Object(obj.as_map()),
            json!({"name": "apple", "age": 20})
        );
    }

    #[test]
    fn from_map_rejects_invalid_utf8_keys() {
        let err = Object::from_map([(vec![0xffu8, 0xfe], 1)]).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidUtf8);
    }

    #[test]
    fn from_key_vals_pairs_up() {
        let obj = Object::from_key_vals(vec![
            Value::from("a"),
            Value::from(1),
            Value::from("b"),
            Value::from(true),
        ])
        .unwrap();
        assert_eq!(obj.get_i64("a"), 1);
        assert!(obj.get_bool("b"));

        let err = Object::from_key_vals(vec![Value::from("a")]).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::KeyValueArityMismatch);
        let err = Object::from_key_vals(vec![Value::from(1), Value::from(2)]).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::KeyValueArityMismatch);
    }

    #[test]
    fn merge_is_right_biased() {
        let mut a = Object::new();
        a.set_i32("shared", 1).set_i32("left", 1);
        let mut b = Object::new();
        b.set_i32("shared", 2).set_i32("right", 2);

        let merged = Object::merge_objects([a, b]);
        assert_eq!(merged.get_i32("shared"), 2);
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn absent_keys_read_as_zero() {
        let obj = Object::new();
        assert!(obj.get("missing").is_null());
        assert_eq!(obj.get_str("missing"), "");
        assert_eq!(obj.get_f64("missing"), 0.0);
        assert!(obj.get_object("missing").is_empty());
        assert!(obj.get_array("missing").is_empty());
    }

    #[test]
    fn key_case_transforms() {
        let mut obj = Object::new();
        obj.set_i32("user_id", 1).set_i32("displayName", 2);
        let camel = obj.to_lower_camel_keys();
        assert_eq!(camel.keys().collect::<Vec<_>>(), vec!["displayName", "userId"]);
        let snake = obj.to_snake_keys();
        assert_eq!(snake.keys().collect::<Vec<_>>(), vec!["display_name", "user_id"]);
    }

    #[test]
    fn from_native_rejects_scalars_and_arrays() {
        let err = Object::from_native(&5).unwrap_err();
        assert_eq!(err.to_string(), "unsupported type: invalid basic object format");
        let err = Object::from_native(&vec![1, 2]).unwrap_err();
        assert_eq!(err.to_string(), "unsupported type: invalid array object format");
        assert!(Object::from_native(&()).unwrap().is_empty());
    }
}
