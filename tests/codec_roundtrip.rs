//! End-to-end codec tests
//!
//! Round-trips application values through the wire representation, including
//! the JSON text a transport would actually carry.

use objwire::{decode, encode, matches, TypeDescriptor as T, Value, WireError};

/// Full transport cycle: encode, render to JSON text, parse back, decode.
fn wire_cycle(value: &Value, descriptor: &T) -> Value {
    let encoded = encode(value, descriptor).expect("encode");
    let text = encoded.canonical_json();
    let parsed = Value::from_json(&serde_json::from_str(&text).expect("json"));
    decode(&parsed, descriptor).expect("decode")
}

#[test]
fn record_round_trips_without_envelope() {
    // RecordOf("Ham", {a: string, b: int}) with {a:"x", b:1} encodes to the
    // same object, no envelope needed.
    let d = T::record_of("Ham", vec![("a", T::string()), ("b", T::int())]);
    let v = Value::record([("a", Value::from("x")), ("b", Value::Int(1))]);

    let encoded = encode(&v, &d).unwrap();
    assert_eq!(encoded, v);
    assert_eq!(wire_cycle(&v, &d), v);
}

#[test]
fn scalar_round_trips_through_envelope() {
    let d = T::int();
    let encoded = encode(&Value::Int(42), &d).unwrap();
    assert_eq!(encoded.canonical_json(), r#"{"value":42}"#);
    assert_eq!(wire_cycle(&Value::Int(42), &d), Value::Int(42));
}

#[test]
fn optional_none_round_trips_as_null() {
    // Optional(int) with no value must travel as null and come back as null,
    // never raising NoUnionVariantMatched.
    let d = T::optional(T::int());
    assert_eq!(wire_cycle(&Value::Null, &d), Value::Null);
    assert_eq!(wire_cycle(&Value::Int(7), &d), Value::Int(7));
}

#[test]
fn union_selects_variant_by_kind_not_by_order_alone() {
    // Union(string, int): the int 5 must come back as an int even though the
    // string variant is declared first.
    let d = T::union_of(vec![T::string(), T::int()]);
    assert_eq!(wire_cycle(&Value::Int(5), &d), Value::Int(5));
    assert_eq!(wire_cycle(&Value::from("5"), &d), Value::from("5"));
}

#[test]
fn union_of_records_disambiguated_structurally() {
    // No discriminant travels; the receiver re-derives the variant from the
    // field set alone.
    let cat = T::record_of("Cat", vec![("meows", T::boolean())]);
    let dog = T::record_of("Dog", vec![("barks", T::boolean())]);
    let d = T::union_of(vec![cat, dog]);

    let dog_value = Value::record([("barks", Value::Bool(true))]);
    assert_eq!(wire_cycle(&dog_value, &d), dog_value);
}

#[test]
fn enum_wire_form_is_underlying_scalar() {
    let d = T::enum_of("Color", vec![("red", Value::Int(0)), ("green", Value::Int(1))]);

    let encoded = encode(&Value::from("green"), &d).unwrap();
    assert_eq!(encoded.canonical_json(), r#"{"value":1}"#);
    assert_eq!(wire_cycle(&Value::from("green"), &d), Value::from("green"));
}

#[test]
fn nested_structures_round_trip() {
    let d = T::record_of(
        "Job",
        vec![
            ("id", T::string()),
            ("attempts", T::list_of(T::int())),
            ("labels", T::map_of(T::string())),
            ("window", T::tuple_of(vec![T::int(), T::int()])),
            ("parent", T::optional(T::string())),
        ],
    );
    let v = Value::record([
        ("id", Value::from("job-1")),
        ("attempts", Value::Seq(vec![Value::Int(1), Value::Int(2), Value::Int(3)])),
        ("labels", Value::record([("team", Value::from("infra"))])),
        ("window", Value::Seq(vec![Value::Int(0), Value::Int(60)])),
        ("parent", Value::Null),
    ]);

    assert_eq!(wire_cycle(&v, &d), v);
}

#[test]
fn streaming_frames_decode_independently() {
    // A streaming transport repeats the same per-item envelope per frame.
    let d = T::record_of("Tick", vec![("n", T::int())]);
    let frames: Vec<Value> = (0..3)
        .map(|n| encode(&Value::record([("n", Value::Int(n))]), &d).unwrap())
        .collect();

    for (n, frame) in frames.iter().enumerate() {
        let decoded = decode(frame, &d).unwrap();
        assert_eq!(decoded, Value::record([("n", Value::Int(n as i64))]));
    }
}

#[test]
fn decode_tolerates_additive_wire_fields() {
    // A newer peer may send fields this side has never heard of.
    let d = T::record_of("User", vec![("name", T::string())]);
    let wire = Value::record([
        ("name", Value::from("sam")),
        ("nickname", Value::from("s")),
    ]);

    assert!(matches(&wire, &d));
    assert_eq!(decode(&wire, &d).unwrap(), Value::record([("name", Value::from("sam"))]));
}

#[test]
fn decode_rejects_wrong_shapes() {
    let d = T::record_of("User", vec![("name", T::string())]);
    assert!(matches!(
        decode(&Value::record([("other", Value::Int(1))]), &d),
        Err(WireError::MissingField { .. })
    ));

    let tuple = T::tuple_of(vec![T::int(), T::int()]);
    assert!(matches!(
        decode(&Value::Seq(vec![Value::Int(1)]), &tuple),
        Err(WireError::ShapeMismatch(_))
    ));

    let union = T::union_of(vec![T::string(), T::int()]);
    assert!(matches!(
        decode(&Value::Bool(true), &union),
        Err(WireError::NoUnionVariantMatched(_))
    ));
}

#[test]
fn bytes_survive_the_value_layer() {
    let d = T::record_of("Blob", vec![("data", T::bytes())]);
    let v = Value::record([("data", Value::Bytes(vec![1, 2, 3]))]);

    // Bytes round-trip within the Value model; on the JSON text layer they
    // render as base64 strings.
    let encoded = encode(&v, &d).unwrap();
    assert_eq!(decode(&encoded, &d).unwrap(), v);
    assert_eq!(encoded.canonical_json(), r#"{"data":"AQID"}"#);
}

#[test]
fn failures_are_deterministic() {
    // Pure functions: the same bad input fails the same way every time.
    let d = T::union_of(vec![T::string(), T::int()]);
    let bad = Value::Bool(true);
    let first = encode(&bad, &d).unwrap_err().to_string();
    let second = encode(&bad, &d).unwrap_err().to_string();
    assert_eq!(first, second);
}
