use chaos_value::{
    codec, type_key, CodecRegistry, ErrorKind, JsonStream, Object, OptionValueExt, TypeDecoder,
    TypeEncoder, Value, ValueKind, Values,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Serialize, Deserialize, Debug, PartialEq, Default, Clone, Copy)]
struct Millis(i64);

#[derive(Serialize, Deserialize, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
struct Order {
    order_id: String,
    quantity: u32,
    unit_price: f64,
    paid: bool,
    #[serde(with = "chaos_value::b64")]
    signature: Vec<u8>,
    tags: Vec<String>,
    created_at: Millis,
}

fn sample_order() -> Order {
    Order {
        order_id: "a-1".into(),
        quantity: 3,
        unit_price: 2.5,
        paid: false,
        signature: vec![0xde, 0xad],
        tags: vec!["fresh".into()],
        created_at: Millis(1_700_000_000_000),
    }
}

/// Writes `Millis` as `"ms:<n>"`.
struct MillisCodec;

impl TypeEncoder for MillisCodec {
    fn encode(&self, value: &Value, stream: &mut JsonStream) -> chaos_value::Result<()> {
        stream.write_str(&format!("ms:{}", value.get_i64()))
    }
}

impl TypeDecoder for MillisCodec {
    fn decode(&self, node: serde_json::Value) -> chaos_value::Result<serde_json::Value> {
        let ms = node
            .as_str()
            .and_then(|s| s.strip_prefix("ms:"))
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or_default();
        Ok(json!(ms))
    }
}

struct Upper;

impl TypeEncoder for Upper {
    fn encode(&self, value: &Value, stream: &mut JsonStream) -> chaos_value::Result<()> {
        stream.write_str(&value.get_str().to_uppercase())
    }
}

// ============================================================================
// Object basics
// ============================================================================

#[test]
fn empty_then_set_then_delete() {
    let mut obj = Object::new();
    assert!(obj.is_empty());
    obj.set_value("k", Value::Null);
    assert!(!obj.is_empty());
    obj.delete("k");
    assert!(obj.is_empty());
}

#[test]
fn from_map_round_trips_through_as_map() {
    let obj = Object::from_map([("name", json!("apple")), ("age", json!(20))]).unwrap();
    assert_eq!(
        serde_json::Value::Object(obj.as_map()),
        json!({"name": "apple", "age": 20})
    );
}

#[test]
fn from_map_invalid_utf8_key() {
    let err = Object::from_map([(b"\xc3\x28".to_vec(), 1)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidUtf8);
    assert_eq!(err.code(), chaos_value::error::INVALID_ARGUMENT);
}

#[test]
fn merge_keeps_right_hand_value() {
    let a = Object::from_map([("k", 1), ("only_a", 1)]).unwrap();
    let b = Object::from_map([("k", 2), ("only_b", 2)]).unwrap();
    let merged = Object::merge_objects([a, b]);
    assert_eq!(merged.get_i64("k"), 2);
    assert_eq!(merged.keys().collect::<Vec<_>>(), vec!["k", "only_a", "only_b"]);
}

#[test]
fn clone_is_independent() {
    let mut original = Object::new();
    original.set_object("inner", Object::from_map([("x", 1)]).unwrap());
    let mut copy = original.clone();
    if let Some(v) = copy.get_mut("inner") {
        *v = Value::from("replaced");
    }
    assert_eq!(original.get_object("inner").get_i64("x"), 1);
    assert_eq!(copy.get_str("inner"), "replaced");
}

#[test]
fn zero_reads_everywhere() {
    let obj = Object::new();
    let absent: Option<&Value> = None;
    assert!(absent.or_null().is_null());
    assert_eq!(obj.get_bytes("nope"), b"");
    assert_eq!(obj.get_values("nope").len(), 0);
    assert_eq!(Values::new().get(3).get_u32(), 0);
}

#[test]
fn typed_array_accessors() {
    let mut obj = Object::new();
    obj.set_bool_array("flags", [true, false])
        .set_i32_array("deltas", [-1, 2])
        .set_i64_array("offsets", vec![i64::MIN, 7])
        .set_u32_array("ports", [80, 443])
        .set_u64_array("ids", [u64::MAX])
        .set_f32_array("weights", [0.5f32])
        .set_f64_array("ratios", [1.25, f64::INFINITY])
        .set_string_array("tags", ["a", "b"])
        .set_object_array("rows", [Object::from_map([("x", 1)]).unwrap()]);

    assert_eq!(obj.get_bool_array("flags"), vec![true, false]);
    assert_eq!(obj.get_i32_array("deltas"), vec![-1, 2]);
    assert_eq!(obj.get_i64_array("offsets"), vec![i64::MIN, 7]);
    assert_eq!(obj.get_u32_array("ports"), vec![80, 443]);
    assert_eq!(obj.get_u64_array("ids"), vec![u64::MAX]);
    assert_eq!(obj.get_f32_array("weights"), vec![0.5]);
    assert_eq!(obj.get_f64_array("ratios"), vec![1.25, f64::INFINITY]);
    assert_eq!(obj.get_string_array("tags"), vec!["a", "b"]);
    assert_eq!(obj.get_object_array("rows")[0].get_i64("x"), 1);
    assert_eq!(obj.get("tags").kind(), ValueKind::Array);

    assert!(obj.get_string_array("missing").is_empty());
    assert!(obj.get_i64_array("flags").iter().all(|v| *v == 0));
}

// ============================================================================
// Record bridge
// ============================================================================

#[test]
fn from_record_skips_zero_fields_and_camel_cases_keys() {
    let registry = CodecRegistry::with_defaults();
    let mut obj = Object::new();
    obj.from_record(&registry, &sample_order()).unwrap();

    assert!(!obj.contains_key("paid"));
    assert_eq!(obj.get_str("orderId"), "a-1");
    assert_eq!(obj.get_u32("quantity"), 3);
    assert_eq!(obj.get_f64("unitPrice"), 2.5);
    assert_eq!(obj.get_bytes("signature"), &[0xde, 0xad]);
    assert_eq!(obj.get("tags").get_string_array(), vec!["fresh"]);
    assert_eq!(obj.get_i64("createdAt"), 1_700_000_000_000);
}

#[test]
fn from_record_merges_into_existing_entries() {
    let registry = CodecRegistry::new();
    let mut obj = Object::new();
    obj.set_str("orderId", "old").set_str("extra", "kept");
    obj.from_record(&registry, &sample_order()).unwrap();
    assert_eq!(obj.get_str("orderId"), "a-1");
    assert_eq!(obj.get_str("extra"), "kept");
}

#[test]
fn from_record_rejects_scalars_and_arrays() {
    let registry = CodecRegistry::new();
    let mut obj = Object::new();

    let err = obj.from_record(&registry, "text").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedType);
    assert!(err.to_string().contains("invalid basic object format"));

    let err = obj.from_record(&registry, &[1, 2, 3]).unwrap_err();
    assert!(err.to_string().contains("invalid array object format"));

    obj.from_record(&registry, &None::<Order>).unwrap();
    assert!(obj.is_empty());
}

#[test]
fn from_record_accepts_objects_and_maps() {
    let registry = CodecRegistry::with_defaults();
    let mut obj = Object::new();
    obj.from_record(&registry, &Value::from(Object::from_map([("a", 1)]).unwrap()))
        .unwrap();
    obj.from_record(&registry, &std::collections::BTreeMap::from([("snake_key", 2)]))
        .unwrap();
    assert_eq!(obj.get_i64("a"), 1);
    assert_eq!(obj.get_i64("snake_key"), 2);
}

#[test]
fn to_record_round_trip() {
    let registry = CodecRegistry::with_defaults();
    let order = sample_order();
    let mut obj = Object::new();
    obj.from_record(&registry, &order).unwrap();
    let back: Order = obj.to_record(&registry).unwrap();
    assert_eq!(back, order);
}

#[test]
fn to_record_wrong_field_type_fails() {
    let registry = CodecRegistry::new();
    let obj = Object::from_map([("quantity", "three")]).unwrap();
    let err = obj.to_record::<Order>(&registry).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

// ============================================================================
// Registry overrides
// ============================================================================

#[test]
fn type_encoder_applies_to_nested_fields() {
    let mut registry = CodecRegistry::with_defaults();
    registry.register_type_encoder(type_key::<Millis>(), MillisCodec);

    let mut obj = Object::new();
    obj.from_record(&registry, &sample_order()).unwrap();
    assert_eq!(obj.get_str("createdAt"), "ms:1700000000000");

    let list = codec::to_value(&registry, &vec![Millis(1), Millis(2)]).unwrap();
    assert_eq!(list.get_string_array(), vec!["ms:1", "ms:2"]);
}

#[test]
fn field_decoder_restores_custom_wire_form() {
    let mut registry = CodecRegistry::with_defaults();
    registry
        .register_type_encoder(type_key::<Millis>(), MillisCodec)
        .register_field_decoder(type_key::<Order>(), "createdAt", MillisCodec);

    let order = sample_order();
    let json = codec::to_string(&registry, &order).unwrap();
    assert!(json.contains(r#""createdAt":"ms:1700000000000""#));

    let mut obj = Object::new();
    obj.from_record(&registry, &order).unwrap();
    let back: Order = obj.to_record(&registry).unwrap();
    assert_eq!(back.created_at, Millis(1_700_000_000_000));
}

#[test]
fn field_encoder_only_touches_its_field() {
    let mut registry = CodecRegistry::new();
    registry.register_field_encoder(type_key::<Order>(), "orderId", Upper);

    let mut obj = Object::new();
    obj.from_record(&registry, &sample_order()).unwrap();
    assert_eq!(obj.get_str("orderId"), "A-1");
    assert_eq!(obj.get("tags").get_string_array(), vec!["fresh"]);
}

#[test]
fn whole_type_encoder_replaces_struct_rendering() {
    struct AsPair;
    impl TypeEncoder for AsPair {
        fn encode(&self, value: &Value, stream: &mut JsonStream) -> chaos_value::Result<()> {
            let obj = value.get_object();
            stream.write(&json!({"id": obj.get_str("orderId"), "n": obj.get_u32("quantity")}))
        }
    }

    let mut registry = CodecRegistry::new();
    registry.register_type_encoder(type_key::<Order>(), AsPair);
    let obj = {
        let mut obj = Object::new();
        obj.from_record(&registry, &sample_order()).unwrap();
        obj
    };
    assert_eq!(obj.to_string(), r#"{"id":"a-1","n":3}"#);
}
