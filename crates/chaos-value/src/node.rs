//! Parsed JSON node → native data, driven by serde.
//!
//! `NodeDeserializer` is the decode-side mirror of the converter. It walks a
//! `serde_json::Value`, and whenever serde asks for a nested value of type `V`
//! (a struct member, a sequence element, a map value or an enum payload) the
//! node is rewritten first: by the field decoder registered for
//! `"<parent type key>.<member>"`, then by the type decoder registered for
//! `V`. Serde requests nested values through `PhantomData<V>` seeds, which is
//! where the type key comes from.
//!
//! Float targets also accept the `"NaN"`, `"Infinity"` and `"-Infinity"`
//! markers.

use serde::de::value::{StrDeserializer, StringDeserializer};
use serde::de::{
    self, DeserializeOwned, DeserializeSeed, Deserializer, EnumAccess, MapAccess, SeqAccess,
    VariantAccess, Visitor,
};
use serde_json::Value as Json;

use crate::error::{Error, Result};
use crate::registry::{base_key, json_kind, type_key, CodecRegistry};
use crate::value::{INFINITY_MARKER, NAN_MARKER, NEG_INFINITY_MARKER};

/// Decodes `T` from a parsed node, applying the registry's decoders at every
/// depth.
pub(crate) fn from_node<T: DeserializeOwned>(registry: &CodecRegistry, node: Json) -> Result<T> {
    let key = type_key::<T>();
    let node = registry.decode_type(key, node)?;
    T::deserialize(NodeDeserializer {
        registry,
        type_key: base_key(key),
        node,
    })
}

/// The type key of the value a seed produces.
fn seed_type_key<S>() -> &'static str {
    let name = type_key::<S>();
    name.strip_prefix("core::marker::PhantomData<")
        .and_then(|inner| inner.strip_suffix('>'))
        .unwrap_or(name)
}

fn decode_seed<'de, S>(
    registry: &CodecRegistry,
    seed: S,
    node: Json,
    member: Option<(&str, &str)>,
) -> Result<S::Value>
where
    S: DeserializeSeed<'de>,
{
    let node = match member.and_then(|(parent, name)| registry.member_decoder(parent, name)) {
        Some(decoder) => decoder.decode(node)?,
        None => node,
    };
    let key = seed_type_key::<S>();
    let node = registry.decode_type(key, node)?;
    seed.deserialize(NodeDeserializer {
        registry,
        type_key: base_key(key),
        node,
    })
}

fn marker_float(node: &Json) -> Option<f64> {
    match node.as_str()? {
        NAN_MARKER => Some(f64::NAN),
        INFINITY_MARKER => Some(f64::INFINITY),
        NEG_INFINITY_MARKER => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

struct NodeDeserializer<'r> {
    registry: &'r CodecRegistry,
    /// Key of the type being produced; members look up field decoders under it.
    type_key: &'static str,
    node: Json,
}

impl<'de> Deserializer<'de> for NodeDeserializer<'_> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let NodeDeserializer {
            registry,
            type_key,
            node,
        } = self;
        match node {
            Json::Null => visitor.visit_unit(),
            Json::Bool(b) => visitor.visit_bool(b),
            Json::Number(n) => {
                if let Some(v) = n.as_u64() {
                    visitor.visit_u64(v)
                } else if let Some(v) = n.as_i64() {
                    visitor.visit_i64(v)
                } else if let Some(v) = n.as_f64() {
                    visitor.visit_f64(v)
                } else {
                    Err(Error::MalformedNumber(n.to_string()))
                }
            }
            Json::String(s) => visitor.visit_string(s),
            Json::Array(items) => {
                let len = items.len();
                let mut seq = SeqNode {
                    registry,
                    items: items.into_iter(),
                };
                let out = visitor.visit_seq(&mut seq)?;
                if seq.items.len() == 0 {
                    Ok(out)
                } else {
                    Err(de::Error::invalid_length(len, &"fewer elements in array"))
                }
            }
            Json::Object(members) => visitor.visit_map(MapNode {
                registry,
                parent: type_key,
                members: members.into_iter(),
                pending: None,
            }),
        }
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_f64(visitor)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match marker_float(&self.node) {
            Some(v) => visitor.visit_f64(v),
            None => self.deserialize_any(visitor),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        if self.node.is_null() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        let NodeDeserializer {
            registry,
            type_key,
            node,
        } = self;
        match node {
            Json::String(variant) => visitor.visit_enum(StringDeserializer::<Error>::new(variant)),
            Json::Object(members) => {
                let mut entries = members.into_iter();
                match (entries.next(), entries.next()) {
                    (Some((variant, value)), None) => visitor.visit_enum(EnumNode {
                        registry,
                        type_key,
                        variant,
                        value,
                    }),
                    _ => Err(Error::unexpected("single-key object for an enum", "object")),
                }
            }
            other => Err(Error::unexpected(
                "string or object for an enum",
                json_kind(&other),
            )),
        }
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

struct SeqNode<'r> {
    registry: &'r CodecRegistry,
    items: std::vec::IntoIter<Json>,
}

impl<'de> SeqAccess<'de> for SeqNode<'_> {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        match self.items.next() {
            Some(item) => decode_seed(self.registry, seed, item, None).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

struct MapNode<'r> {
    registry: &'r CodecRegistry,
    parent: &'static str,
    members: serde_json::map::IntoIter,
    pending: Option<(String, Json)>,
}

impl<'de> MapAccess<'de> for MapNode<'_> {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        match self.members.next() {
            Some((key, value)) => {
                let out = seed.deserialize(StrDeserializer::<Error>::new(&key))?;
                self.pending = Some((key, value));
                Ok(Some(out))
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        let (key, value) = self
            .pending
            .take()
            .ok_or_else(|| Error::Message("map value requested before its key".into()))?;
        decode_seed(self.registry, seed, value, Some((self.parent, &key)))
    }

    fn size_hint(&self) -> Option<usize> {
        match self.members.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct EnumNode<'r> {
    registry: &'r CodecRegistry,
    type_key: &'static str,
    variant: String,
    value: Json,
}

impl<'de, 'r> EnumAccess<'de> for EnumNode<'r> {
    type Error = Error;
    type Variant = NodeDeserializer<'r>;

    fn variant_seed<V: DeserializeSeed<'de>>(
        self,
        seed: V,
    ) -> Result<(V::Value, NodeDeserializer<'r>)> {
        let variant = seed.deserialize(StringDeserializer::<Error>::new(self.variant))?;
        Ok((
            variant,
            NodeDeserializer {
                registry: self.registry,
                type_key: self.type_key,
                node: self.value,
            },
        ))
    }
}

impl<'de> VariantAccess<'de> for NodeDeserializer<'_> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        Ok(())
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        decode_seed(self.registry, seed, self.node, None)
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        self.deserialize_any(visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_any(visitor)
    }
}
