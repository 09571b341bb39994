//! Native data → [`Value`] conversion, driven by serde.
//!
//! `ValueSerializer` is a `serde::Serializer` whose output is a Value tree.
//! Every nested value is converted through [`convert`], which knows the
//! nested value's type key and can therefore apply a registered type encoder
//! at any depth. References and `Box`/`Rc`/`Arc` serialize as their pointee,
//! so they are looked up under the pointee's key. Struct fields additionally
//! consult field encoders registered under `"<type key>.<field>"`.
//!
//! The serializer reports `is_human_readable() == false`, so the Value types'
//! own `Serialize` impls hand over raw floats and bytes instead of their wire
//! markers, which keeps Value → Value conversion lossless.

use heck::ToLowerCamelCase;
use serde::ser::{self, Serialize};

use crate::error::{Error, Result};
use crate::object::Object;
use crate::registry::{pointee_key, type_key, CodecRegistry};
use crate::value::Value;
use crate::values::Values;

/// How struct fields are turned into Object entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldPolicy {
    /// Keep every field under its serde name.
    Plain,
    /// Skip zero-valued fields and key by lowerCamelCase name.
    Record,
}

pub(crate) fn to_value<T>(registry: Option<&CodecRegistry>, value: &T) -> Result<Value>
where
    T: Serialize + ?Sized,
{
    convert(registry, value, FieldPolicy::Plain)
}

pub(crate) fn to_record_value<T>(registry: Option<&CodecRegistry>, value: &T) -> Result<Value>
where
    T: Serialize + ?Sized,
{
    convert(registry, value, FieldPolicy::Record)
}

fn convert<T>(registry: Option<&CodecRegistry>, value: &T, policy: FieldPolicy) -> Result<Value>
where
    T: Serialize + ?Sized,
{
    let full = type_key::<T>();
    let key = pointee_key(full);
    let encoder = registry.and_then(|r| r.type_encoder(full).or_else(|| r.type_encoder(key)));
    if let Some(encoder) = encoder {
        let plain = value.serialize(ValueSerializer {
            registry,
            type_key: key,
            policy: FieldPolicy::Plain,
        })?;
        return encoder.rewrite(plain);
    }
    value.serialize(ValueSerializer {
        registry,
        type_key: key,
        policy,
    })
}

struct ValueSerializer<'r> {
    registry: Option<&'r CodecRegistry>,
    type_key: &'static str,
    policy: FieldPolicy,
}

impl<'r> ValueSerializer<'r> {
    fn nested<T: Serialize + ?Sized>(&self, value: &T) -> Result<Value> {
        convert(self.registry, value, FieldPolicy::Plain)
    }
}

fn int128(v: i128) -> Result<Value> {
    if let Ok(v) = i64::try_from(v) {
        Ok(Value::from_i64(v))
    } else if let Ok(v) = u64::try_from(v) {
        Ok(Value::Positive(v))
    } else {
        Err(Error::MalformedNumber(format!("{v} is outside the 64-bit range")))
    }
}

impl<'r> ser::Serializer for ValueSerializer<'r> {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SeqBuilder<'r>;
    type SerializeTuple = SeqBuilder<'r>;
    type SerializeTupleStruct = SeqBuilder<'r>;
    type SerializeTupleVariant = TupleVariantBuilder<'r>;
    type SerializeMap = MapBuilder<'r>;
    type SerializeStruct = StructBuilder<'r>;
    type SerializeStructVariant = StructVariantBuilder<'r>;

    fn is_human_readable(&self) -> bool {
        false
    }

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::from_i64(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        int128(v)
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::Positive(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        u64::try_from(v)
            .map(Value::Positive)
            .map_err(|_| Error::MalformedNumber(format!("{v} is outside the 64-bit range")))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::Number(v as f64))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::Number(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::string(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::bytes(v))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Value> {
        convert(self.registry, value, self.policy)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::string(variant))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value> {
        convert(self.registry, value, self.policy)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value> {
        let mut obj = Object::new();
        obj.set_value(variant, self.nested(value)?);
        Ok(Value::Object(obj))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder<'r>> {
        Ok(SeqBuilder {
            registry: self.registry,
            vals: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqBuilder<'r>> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SeqBuilder<'r>> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<TupleVariantBuilder<'r>> {
        Ok(TupleVariantBuilder {
            variant,
            seq: SeqBuilder {
                registry: self.registry,
                vals: Vec::with_capacity(len),
            },
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapBuilder<'r>> {
        Ok(MapBuilder {
            registry: self.registry,
            obj: Object::new(),
            pending_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<StructBuilder<'r>> {
        Ok(StructBuilder {
            registry: self.registry,
            type_key: self.type_key,
            policy: self.policy,
            obj: Object::new(),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<StructVariantBuilder<'r>> {
        Ok(StructVariantBuilder {
            variant,
            inner: StructBuilder {
                registry: self.registry,
                type_key: self.type_key,
                policy: FieldPolicy::Plain,
                obj: Object::new(),
            },
        })
    }
}

pub(crate) struct SeqBuilder<'r> {
    registry: Option<&'r CodecRegistry>,
    vals: Vec<Value>,
}

impl SeqBuilder<'_> {
    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.vals.push(convert(self.registry, value, FieldPolicy::Plain)?);
        Ok(())
    }

    fn finish(self) -> Value {
        Value::Array(Values::from(self.vals))
    }
}

impl ser::SerializeSeq for SeqBuilder<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SeqBuilder<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SeqBuilder<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

pub(crate) struct TupleVariantBuilder<'r> {
    variant: &'static str,
    seq: SeqBuilder<'r>,
}

impl ser::SerializeTupleVariant for TupleVariantBuilder<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.seq.push(value)
    }

    fn end(self) -> Result<Value> {
        let mut obj = Object::new();
        obj.set_value(self.variant, self.seq.finish());
        Ok(Value::Object(obj))
    }
}

pub(crate) struct MapBuilder<'r> {
    registry: Option<&'r CodecRegistry>,
    obj: Object,
    pending_key: Option<String>,
}

impl ser::SerializeMap for MapBuilder<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<()> {
        self.pending_key = Some(key.serialize(MapKeySerializer)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| Error::Message("map value serialized before its key".into()))?;
        let value = convert(self.registry, value, FieldPolicy::Plain)?;
        self.obj.set_value(key, value);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Object(self.obj))
    }
}

pub(crate) struct StructBuilder<'r> {
    registry: Option<&'r CodecRegistry>,
    type_key: &'static str,
    policy: FieldPolicy,
    obj: Object,
}

impl ser::SerializeStruct for StructBuilder<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        field: &'static str,
        value: &T,
    ) -> Result<()> {
        let plain = convert(self.registry, value, FieldPolicy::Plain)?;
        if self.policy == FieldPolicy::Record && plain.is_zero() {
            return Ok(());
        }

        let field_key = format!("{}.{}", self.type_key, field);
        let value = match self.registry.and_then(|r| r.field_encoder(&field_key)) {
            Some(encoder) => encoder.rewrite(plain)?,
            None => plain,
        };

        match self.policy {
            FieldPolicy::Plain => self.obj.set_value(field, value),
            FieldPolicy::Record => self.obj.set_value(field.to_lower_camel_case(), value),
        };
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Object(self.obj))
    }
}

pub(crate) struct StructVariantBuilder<'r> {
    variant: &'static str,
    inner: StructBuilder<'r>,
}

impl ser::SerializeStructVariant for StructVariantBuilder<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        field: &'static str,
        value: &T,
    ) -> Result<()> {
        ser::SerializeStruct::serialize_field(&mut self.inner, field, value)
    }

    fn end(self) -> Result<Value> {
        let mut obj = Object::new();
        obj.set_value(self.variant, Value::Object(self.inner.obj));
        Ok(Value::Object(obj))
    }
}

/// Accepts only string-like map keys.
struct MapKeySerializer;

fn key_must_be_string(found: &str) -> Error {
    Error::UnsupportedType(format!("object key must be a string, found {found}"))
}

macro_rules! reject_key {
    ($($method:ident($($arg:ty),*) => $found:literal;)*) => {$(
        fn $method(self, $(_: $arg),*) -> Result<String> {
            Err(key_must_be_string($found))
        }
    )*};
}

impl ser::Serializer for MapKeySerializer {
    type Ok = String;
    type Error = Error;

    type SerializeSeq = ser::Impossible<String, Error>;
    type SerializeTuple = ser::Impossible<String, Error>;
    type SerializeTupleStruct = ser::Impossible<String, Error>;
    type SerializeTupleVariant = ser::Impossible<String, Error>;
    type SerializeMap = ser::Impossible<String, Error>;
    type SerializeStruct = ser::Impossible<String, Error>;
    type SerializeStructVariant = ser::Impossible<String, Error>;

    fn serialize_str(self, v: &str) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_char(self, v: char) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<String> {
        std::str::from_utf8(v)
            .map(str::to_string)
            .map_err(|e| Error::invalid_utf8(format!("object key: {e}")))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<String> {
        value.serialize(self)
    }

    reject_key! {
        serialize_bool(bool) => "bool";
        serialize_i8(i8) => "i8";
        serialize_i16(i16) => "i16";
        serialize_i32(i32) => "i32";
        serialize_i64(i64) => "i64";
        serialize_u8(u8) => "u8";
        serialize_u16(u16) => "u16";
        serialize_u32(u32) => "u32";
        serialize_u64(u64) => "u64";
        serialize_f32(f32) => "f32";
        serialize_f64(f64) => "f64";
        serialize_none() => "none";
        serialize_unit() => "unit";
        serialize_unit_struct(&'static str) => "unit struct";
    }

    fn serialize_some<T: Serialize + ?Sized>(self, _value: &T) -> Result<String> {
        Err(key_must_be_string("option"))
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String> {
        Err(key_must_be_string("enum variant"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(key_must_be_string("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(key_must_be_string("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(key_must_be_string("tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(key_must_be_string("enum variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(key_must_be_string("map"))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(key_must_be_string("struct"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(key_must_be_string("enum variant"))
    }
}
