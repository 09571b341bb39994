use chaos_value::{
    codec, BoolValue, BytesValue, CodecRegistry, ErrorKind, Float32Value, Float64Value, Object,
    StringMap, StringValues, StringsMap, Value, ValueKind, Values,
};
use serde::{Deserialize, Serialize};

fn registry() -> CodecRegistry {
    CodecRegistry::with_defaults()
}

fn decode(json: &str) -> Value {
    codec::from_str(&registry(), json).expect("decode failed")
}

// ============================================================================
// Numbers
// ============================================================================

#[test]
fn unsigned_beyond_i64_stays_unsigned() {
    let v = decode("18446744073709551615");
    assert_eq!(v, Value::Positive(u64::MAX));
    assert_eq!(v.get_u64(), u64::MAX);
}

#[test]
fn negative_literals_use_magnitude() {
    assert_eq!(decode("-42"), Value::Negative(42));
    assert_eq!(decode("-9223372036854775808").get_i64(), i64::MIN);
}

#[test]
fn whole_floats_decode_as_integers() {
    assert_eq!(decode("3.0").kind(), ValueKind::Integer);
    assert_eq!(decode("3.0").get_i64(), 3);
    assert_eq!(decode("3.0").get_f64(), 0.0);
    assert_eq!(decode("3.25").get_f64(), 3.25);
}

#[test]
fn non_finite_markers() {
    assert!(decode(r#""NaN""#).get_f64().is_nan());
    assert_eq!(decode(r#""Infinity""#).get_f64(), f64::INFINITY);
    assert_eq!(decode(r#""-Infinity""#).get_f64(), f64::NEG_INFINITY);
}

// ============================================================================
// Strings and bytes
// ============================================================================

#[test]
fn plain_strings() {
    assert_eq!(decode(r#""apple""#), Value::string("apple"));
    assert_eq!(decode(r#""""#), Value::string(""));
}

#[test]
fn b64_strings_decode_to_bytes() {
    assert_eq!(decode(r#""b64.aGVsbG8=""#).get_bytes(), b"hello");
}

#[test]
fn bad_base64_is_reported() {
    let node = serde_json::json!({"raw": "b64.***"});
    let err = Value::from_json_node(&node).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidBase64);
    assert!(codec::from_str::<Value>(&registry(), r#"{"raw":"b64.***"}"#).is_err());
}

// ============================================================================
// Containers
// ============================================================================

#[test]
fn values_list() {
    let vals: Values = codec::from_str(&registry(), r#"[true,"foo",18]"#).unwrap();
    assert_eq!(vals.len(), 3);
    assert!(vals.get(0).get_bool());
    assert_eq!(vals.get(1).get_str(), "foo");
    assert_eq!(vals.get(2).get_i8(), 18);
}

#[test]
fn object_from_wrong_shape_fails() {
    let err = codec::from_str::<Object>(&registry(), "[1,2]").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedShape);
    let err = codec::from_str::<Values>(&registry(), r#"{"a":1}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedShape);
}

#[test]
fn null_object_is_empty() {
    let obj: Object = codec::from_str(&registry(), "null").unwrap();
    assert!(obj.is_empty());
}

#[test]
fn invalid_json_is_a_json_error() {
    let err = codec::from_str::<Value>(&registry(), "{").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Json);
    assert_eq!(err.code(), chaos_value::error::MALFORMED_SYNTAX);
}

#[test]
fn nested_object() {
    let obj: Object =
        codec::from_str(&registry(), r#"{"a":{"b":[1,{"c":null}]},"d":-0.5}"#).unwrap();
    let list = obj.get_object("a").get_array("b");
    assert_eq!(list[0].get_i64(), 1);
    assert!(list[1].get_object().get("c").is_null());
    assert!(list[1].get_object().contains_key("c"));
    assert_eq!(obj.get_f64("d"), -0.5);
}

// ============================================================================
// Boxed wrappers
// ============================================================================

#[test]
fn boxed_scalars() {
    let b: BoolValue = codec::from_str(&registry(), "true").unwrap();
    assert!(b.val);
    let raw: BytesValue = codec::from_str(&registry(), r#""b64.AQID""#).unwrap();
    assert_eq!(raw.val, vec![1, 2, 3]);
}

#[test]
fn boxed_floats_round_trip_non_finite_values() {
    let json = codec::to_string(&registry(), &Float64Value::new(f64::NAN)).unwrap();
    assert_eq!(json, r#""NaN""#);
    let back: Float64Value = codec::from_str(&registry(), &json).unwrap();
    assert!(back.val.is_nan());

    let json = serde_json::to_string(&Float32Value::new(f32::INFINITY)).unwrap();
    assert_eq!(json, r#""Infinity""#);
    let back: Float32Value = codec::from_str(&registry(), &json).unwrap();
    assert_eq!(back.val, f32::INFINITY);
}

#[test]
fn float_fields_round_trip_non_finite_values() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Limits {
        low: f64,
        #[serde(with = "chaos_value::float")]
        high: f32,
    }

    let limits = Limits {
        low: f64::NEG_INFINITY,
        high: f32::INFINITY,
    };
    let json = codec::to_string(&registry(), &limits).unwrap();
    assert_eq!(json, r#"{"high":"Infinity","low":"-Infinity"}"#);
    assert_eq!(codec::from_str::<Limits>(&registry(), &json).unwrap(), limits);

    let json = serde_json::to_string(&limits).unwrap();
    assert_eq!(json, r#"{"low":null,"high":"Infinity"}"#);
}

#[test]
fn string_values_null_is_empty() {
    let vals: StringValues = codec::from_str(&registry(), "null").unwrap();
    assert!(vals.is_empty());
}

#[test]
fn string_map() {
    let m: StringMap = codec::from_str(&registry(), r#"{"foo":"bar"}"#).unwrap();
    assert_eq!(m.get("foo"), "bar");
    assert_eq!(m.get("missing"), "");
}

#[test]
fn strings_map_merges_into_target() {
    let mut target = StringsMap::new();
    target.insert("keep", ["x"].into_iter().collect());
    target.insert("foo", ["old"].into_iter().collect());

    codec::from_str_into(&registry(), r#"{"foo":["bar","ping"]}"#, &mut target).unwrap();
    assert_eq!(target.get("keep").unwrap().vals, vec!["x"]);
    assert_eq!(target.get("foo").unwrap().vals, vec!["bar", "ping"]);
}

#[test]
fn object_merges_into_target() {
    let mut target = Object::new();
    target.set_i32("a", 1).set_i32("b", 1);
    codec::from_str_into(&registry(), r#"{"b":2,"c":3}"#, &mut target).unwrap();
    assert_eq!(target.get_i32("a"), 1);
    assert_eq!(target.get_i32("b"), 2);
    assert_eq!(target.get_i32("c"), 3);
}
