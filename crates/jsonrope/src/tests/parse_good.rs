use rstest::rstest;

use crate::{Runtime, Value};

use super::util::{json, key, parse_str, s};

#[test]
fn object_with_array_property() {
    let rt = Runtime::new();
    let value = parse_str(&rt, r#"{"a":[1,2,3]}"#).unwrap();
    let Value::Object(obj) = &value else {
        panic!("expected object, got {value:?}")
    };
    let a = obj.borrow().get(&key(&rt, "a"));
    let Value::Array(items) = &a else {
        panic!("expected array, got {a:?}")
    };
    let items = items.borrow();
    assert_eq!(items.len(), 3);
    for (i, expected) in [1.0, 2.0, 3.0].iter().enumerate() {
        assert!(matches!(items[i], Value::Number(n) if n == *expected));
    }
}

#[test]
fn whitespace_is_tolerated_everywhere() {
    let rt = Runtime::new();
    let value = parse_str(&rt, " \t\r\n { \"a\" : [ 1 , true ] } \n").unwrap();
    assert_eq!(json(&rt, &value), r#"{"a":[1,true]}"#);
}

#[rstest]
#[case("true", "true")]
#[case("false", "false")]
#[case("null", "null")]
#[case("42", "42")]
#[case(r#""x""#, r#""x""#)]
#[case("[]", "[]")]
#[case("{}", "{}")]
fn scalar_roots_round_trip(#[case] input: &str, #[case] expected: &str) {
    let rt = Runtime::new();
    let value = parse_str(&rt, input).unwrap();
    assert_eq!(json(&rt, &value), expected);
}

#[rstest]
#[case("0", 0.0)]
#[case("-0", 0.0)]
#[case("0.5", 0.5)]
#[case("-12", -12.0)]
#[case("123456789", 123_456_789.0)]
#[case("1234567890", 1_234_567_890.0)]
#[case("1e10", 1e10)]
#[case("1.5e-3", 1.5e-3)]
#[case("1E+2", 100.0)]
#[case("12345678901234567890", 12_345_678_901_234_567_890.0)]
fn numbers_parse_to_expected_values(#[case] input: &str, #[case] expected: f64) {
    let rt = Runtime::new();
    let Value::Number(n) = parse_str(&rt, input).unwrap() else {
        panic!("expected number")
    };
    assert_eq!(n, expected, "{input}");
}

#[test]
fn negative_zero_keeps_its_sign() {
    let rt = Runtime::new();
    let Value::Number(n) = parse_str(&rt, "-0").unwrap() else {
        panic!("expected number")
    };
    assert!(n.is_sign_negative());
}

#[test]
fn escape_sequences_decode() {
    let rt = Runtime::new();
    let value = parse_str(&rt, r#""A\n\t\/\\\"""#).unwrap();
    let Value::String(text) = value else {
        panic!("expected string")
    };
    assert_eq!(text, s(&rt, "A\n\t/\\\""));
}

#[test]
fn lone_surrogate_escapes_are_raw_code_units() {
    let rt = Runtime::new();
    let Value::String(text) = parse_str(&rt, r#""\ud834""#).unwrap() else {
        panic!("expected string")
    };
    assert_eq!(text.len(), 1);
    assert_eq!(text.unit_at(0), 0xD834);
}

#[test]
fn surrogate_pair_escapes_stay_paired() {
    let rt = Runtime::new();
    let Value::String(text) = parse_str(&rt, r#""\ud834\udd1e""#).unwrap() else {
        panic!("expected string")
    };
    assert_eq!(text.to_string_lossy(), "\u{1d11e}");
}

#[test]
fn duplicate_keys_keep_first_position_last_value() {
    let rt = Runtime::new();
    let value = parse_str(&rt, r#"{"a":1,"b":2,"a":3}"#).unwrap();
    assert_eq!(json(&rt, &value), r#"{"a":3,"b":2}"#);
}

#[test]
fn numeric_looking_keys_store_as_indices_without_reordering_observably() {
    let rt = Runtime::new();
    let value = parse_str(&rt, r#"{"b":0,"2":0,"10":0,"a":0,"1":0}"#).unwrap();
    let Value::Object(obj) = &value else {
        panic!("expected object")
    };
    // Internal representation is integer keys; visible order is numeric
    // ascending first, then names in insertion order.
    let keys = obj.borrow().own_keys();
    assert_eq!(
        keys,
        vec![
            crate::PropKey::Index(1),
            crate::PropKey::Index(2),
            crate::PropKey::Index(10),
            key(&rt, "b"),
            key(&rt, "a"),
        ]
    );
}

#[test]
fn deeply_mixed_document() {
    let rt = Runtime::new();
    let input = r#"{"w":[{"x":null},{"y":[[]]},"z"],"n":-1.25e2}"#;
    let value = parse_str(&rt, input).unwrap();
    assert_eq!(json(&rt, &value), r#"{"w":[{"x":null},{"y":[[]]},"z"],"n":-125}"#);
}

#[test]
fn round_trip_compact_document() {
    let rt = Runtime::new();
    let input = r#"{"a":1,"b":[true,null,"x"]}"#;
    let value = parse_str(&rt, input).unwrap();
    assert_eq!(json(&rt, &value), input);
}
