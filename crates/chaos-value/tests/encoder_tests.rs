use chaos_value::{codec, BoolValue, CodecRegistry, Object, StringMap, StringsMap, Value, Values};

fn encode<T: serde::Serialize + ?Sized>(value: &T) -> String {
    codec::to_string(&CodecRegistry::with_defaults(), value).expect("encode failed")
}

// ============================================================================
// Scalars
// ============================================================================

#[test]
fn null_and_bools() {
    assert_eq!(encode(&Value::Null), "null");
    assert_eq!(encode(&Value::from(true)), "true");
    assert_eq!(encode(&Value::from(false)), "false");
}

#[test]
fn integers_at_the_edges() {
    assert_eq!(encode(&Value::from(i64::MIN)), "-9223372036854775808");
    assert_eq!(encode(&Value::from(i64::MAX)), "9223372036854775807");
    assert_eq!(encode(&Value::from(u64::MAX)), "18446744073709551615");
    assert_eq!(encode(&Value::from(-1i8)), "-1");
}

#[test]
fn floats() {
    assert_eq!(encode(&Value::from(2.5)), "2.5");
    assert_eq!(encode(&Value::from(2.0)), "2.0");
    assert_eq!(encode(&Value::from(f64::NAN)), r#""NaN""#);
    assert_eq!(encode(&Value::from(f64::INFINITY)), r#""Infinity""#);
    assert_eq!(encode(&Value::from(f64::NEG_INFINITY)), r#""-Infinity""#);
}

#[test]
fn strings_are_escaped() {
    assert_eq!(encode(&Value::from("a\"b\n")), r#""a\"b\n""#);
}

#[test]
fn bytes_use_b64_prefix() {
    assert_eq!(encode(&Value::bytes(b"hello".to_vec())), r#""b64.aGVsbG8=""#);
    assert_eq!(encode(&Value::bytes(Vec::new())), r#""b64.""#);
}

// ============================================================================
// Containers
// ============================================================================

#[test]
fn values_mixed_list() {
    let mut vals = Values::new();
    vals.push(true).push("foo").push(18i8);
    assert_eq!(encode(&vals), r#"[true,"foo",18]"#);
}

#[test]
fn object_keys_sorted() {
    let mut obj = Object::new();
    obj.set_i32("b", 2).set_i32("a", 1).set_i32("c", 3);
    assert_eq!(encode(&obj), r#"{"a":1,"b":2,"c":3}"#);
}

#[test]
fn nested_containers() {
    let mut inner = Object::new();
    inner.set_f64("x", f64::NAN);
    let mut obj = Object::new();
    obj.set_object("inner", inner)
        .set_array("list", Values::from(vec![Value::Null, Value::from(-3)]));
    assert_eq!(encode(&obj), r#"{"inner":{"x":"NaN"},"list":[null,-3]}"#);
}

#[test]
fn pretty_output_is_indented() {
    let mut obj = Object::new();
    obj.set_str("k", "v");
    let pretty = codec::to_string_pretty(&CodecRegistry::new(), &obj).unwrap();
    assert_eq!(pretty, "{\n  \"k\": \"v\"\n}");
}

// ============================================================================
// Boxed wrappers
// ============================================================================

#[test]
fn bool_value() {
    assert_eq!(encode(&BoolValue::new(true)), "true");
}

#[test]
fn string_map() {
    let mut m = StringMap::new();
    m.insert("foo", "bar");
    assert_eq!(encode(&m), r#"{"foo":"bar"}"#);
}

#[test]
fn strings_map() {
    let mut m = StringsMap::new();
    m.insert("foo", ["bar", "ping"].into_iter().collect())
        .insert("none", Default::default());
    assert_eq!(encode(&m), r#"{"foo":["bar","ping"]}"#);
}

// ============================================================================
// Native data
// ============================================================================

#[test]
fn native_struct_keeps_field_names() {
    #[derive(serde::Serialize)]
    struct Point {
        x_pos: i32,
        y_pos: i32,
    }
    assert_eq!(encode(&Point { x_pos: 0, y_pos: -4 }), r#"{"x_pos":0,"y_pos":-4}"#);
}

#[test]
fn as_interface_matches_codec_output() {
    let mut obj = Object::new();
    obj.set_f64("inf", f64::INFINITY)
        .set_bytes("raw", vec![9u8, 8, 7])
        .set_i64("min", i64::MIN)
        .set_u64("max", u64::MAX);
    let plain = serde_json::to_string(&serde_json::Value::Object(obj.as_map())).unwrap();
    assert_eq!(plain, encode(&obj));
}
