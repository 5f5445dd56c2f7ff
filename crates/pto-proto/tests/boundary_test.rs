//! Boundary and rejection tests
//!
//! Every limit is exercised at its edge and one past it. Error messages are
//! pinned with inline snapshots since hosts surface them verbatim.

use insta::assert_snapshot;
use pto_proto::{
    CodecError, Field, Protocol, ScalarKind, Value, decode, encode,
    errors::Direction,
    limits::{MAX_ARRAY_LEN, MAX_DEPTH, MAX_INT_MAGNITUDE, MAX_STRING_LEN},
};

fn single(field: Field) -> Protocol {
    Protocol::new("test", vec![field])
}

fn with(name: &str, value: Value) -> Value {
    Value::record([(name, value)])
}

/// `levels` messages wrapped around one `Int` leaf.
fn nested_protocol(levels: usize) -> Protocol {
    let mut field = Field::scalar("leaf", ScalarKind::Int);
    for _ in 0..levels {
        field = Field::message("m", vec![field]);
    }
    single(field)
}

fn nested_value(levels: usize) -> Value {
    let mut value = with("leaf", Value::Integer(0));
    for _ in 0..levels {
        value = with("m", value);
    }
    value
}

#[test]
fn int_magnitude_limit() {
    let protocol = single(Field::scalar("n", ScalarKind::Int));
    let max = MAX_INT_MAGNITUDE as i64;

    for ok in [max, -max] {
        let bytes = encode(&protocol, &with("n", Value::Integer(ok))).unwrap();
        assert_eq!(bytes.len(), 8);
        assert_eq!(decode(&protocol, &bytes), Ok(with("n", Value::Integer(ok))));
    }

    let err = encode(&protocol, &with("n", Value::Integer(max + 1))).unwrap_err();
    assert!(matches!(
        err,
        CodecError::IntegerOutOfRange { value, .. } if value == i128::from(max + 1)
    ));
    assert_snapshot!(err, @"field:n int out of range, 72057594037927936");

    let err = encode(&protocol, &with("n", Value::Integer(-max - 1))).unwrap_err();
    assert!(matches!(err, CodecError::IntegerOutOfRange { .. }));
}

#[test]
fn int_array_element_out_of_range() {
    let protocol = single(Field::array("ns", ScalarKind::Int));
    let value = with("ns", Value::sequence([Value::Integer(1), Value::Integer(i64::MAX)]));

    let err = encode(&protocol, &value).unwrap_err();
    assert_snapshot!(err, @"field:ns array member int out of range, 9223372036854775807");
}

#[test]
fn short_range() {
    let protocol = single(Field::scalar("s", ScalarKind::Short));

    assert!(encode(&protocol, &with("s", Value::Integer(i64::from(i16::MAX)))).is_ok());
    assert!(encode(&protocol, &with("s", Value::Integer(i64::from(i16::MIN)))).is_ok());

    let err = encode(&protocol, &with("s", Value::Integer(40_000))).unwrap_err();
    assert_snapshot!(err, @"field:s int out of range, 40000");
}

#[test]
fn string_length_limit() {
    let protocol = single(Field::scalar("s", ScalarKind::String));

    let max = Value::text(vec![b'a'; MAX_STRING_LEN]);
    let bytes = encode(&protocol, &with("s", max)).unwrap();
    assert_eq!(bytes.len(), 2 + MAX_STRING_LEN);
    assert_eq!(&bytes[..2], [0xff, 0xff]);

    let over = Value::text(vec![b'a'; MAX_STRING_LEN + 1]);
    let err = encode(&protocol, &with("s", over)).unwrap_err();
    assert_eq!(err, CodecError::StringTooLong { field: "s".into(), len: 65_536 });
    assert_snapshot!(err, @"field:s string size more than 0xffff: 65536");
}

#[test]
fn array_length_limit() {
    let protocol = single(Field::array("bs", ScalarKind::Bool));

    let max = Value::Sequence(vec![Value::Bool(true); MAX_ARRAY_LEN]);
    let bytes = encode(&protocol, &with("bs", max.clone())).unwrap();
    assert_eq!(bytes.len(), 2 + MAX_ARRAY_LEN);
    assert_eq!(decode(&protocol, &bytes), Ok(with("bs", max)));

    let over = Value::Sequence(vec![Value::Bool(true); MAX_ARRAY_LEN + 1]);
    let err = encode(&protocol, &with("bs", over)).unwrap_err();
    assert_snapshot!(err, @"field:bs array size 65536 more than 0xffff");
}

#[test]
fn depth_limit_on_encode() {
    let protocol = nested_protocol(MAX_DEPTH);
    let bytes = encode(&protocol, &nested_value(MAX_DEPTH)).unwrap();
    assert_eq!(&bytes[..], [0x00]);

    let protocol = nested_protocol(MAX_DEPTH + 1);
    let err = encode(&protocol, &nested_value(MAX_DEPTH + 1)).unwrap_err();
    assert_eq!(err, CodecError::TooDeep { direction: Direction::Encode });
    assert_snapshot!(err, @"protocol encode nests deeper than 128 levels");
}

#[test]
fn depth_limit_on_decode() {
    assert_eq!(decode(&nested_protocol(MAX_DEPTH), &[0x00]), Ok(nested_value(MAX_DEPTH)));

    let err = decode(&nested_protocol(MAX_DEPTH + 1), &[0x00]).unwrap_err();
    assert_eq!(err, CodecError::TooDeep { direction: Direction::Decode });
}

#[test]
fn depth_counts_message_arrays() {
    let mut field = Field::scalar("leaf", ScalarKind::Bool);
    for _ in 0..=MAX_DEPTH {
        field = Field::message_array("ms", vec![field]);
    }
    let protocol = single(field);

    // Outermost array is empty, so the walk never descends
    assert!(decode(&protocol, &[0x00, 0x00]).is_ok());

    let mut deep = Vec::new();
    for _ in 0..=MAX_DEPTH {
        deep.extend_from_slice(&[0x01, 0x00]);
    }
    deep.push(0x01);
    let err = decode(&protocol, &deep).unwrap_err();
    assert_eq!(err, CodecError::TooDeep { direction: Direction::Decode });
}

#[test]
fn bool_given_string() {
    let protocol = single(Field::scalar("x", ScalarKind::Bool));
    let err = encode(&protocol, &with("x", Value::text("yes"))).unwrap_err();

    assert_eq!(err, CodecError::TypeMismatch {
        field: "x".into(),
        expected: "bool",
        found: "string",
        in_array: false,
    });
    assert_snapshot!(err, @"field:x expect bool, not string");
}

#[test]
fn mismatch_inside_array_is_flagged() {
    let protocol = single(Field::array("xs", ScalarKind::Double));
    let value = with("xs", Value::sequence([Value::Float(1.0), Value::Bool(false)]));

    let err = encode(&protocol, &value).unwrap_err();
    assert_snapshot!(err, @"field:xs array member expect double, not boolean");
}

#[test]
fn array_expected_but_scalar_given() {
    let protocol = single(Field::array("xs", ScalarKind::Int));
    let err = encode(&protocol, &with("xs", Value::Integer(1))).unwrap_err();
    assert_snapshot!(err, @"field:xs expect sequence, not integer");
}

#[test]
fn scalar_expected_but_array_given() {
    let protocol = single(Field::scalar("x", ScalarKind::Int));
    let err = encode(&protocol, &with("x", Value::sequence([1i64]))).unwrap_err();
    assert_snapshot!(err, @"field:x expect int, not sequence");
}

#[test]
fn missing_member_is_nil() {
    let protocol = single(Field::scalar("x", ScalarKind::String));
    let err = encode(&protocol, &Value::record::<&str, _>([])).unwrap_err();
    assert_snapshot!(err, @"field:x expect string, not nil");
}

#[test]
fn message_given_scalar() {
    let protocol = single(Field::message("m", vec![Field::scalar("b", ScalarKind::Bool)]));
    let err = encode(&protocol, &with("m", Value::Bool(true))).unwrap_err();
    assert_snapshot!(err, @"field:m expect record, not boolean");
}

#[test]
fn top_level_must_be_record() {
    let protocol = single(Field::scalar("x", ScalarKind::Bool));
    let err = encode(&protocol, &Value::Bool(true)).unwrap_err();
    assert_snapshot!(err, @"field:test expect record, not boolean");
}

#[test]
fn integral_floats_fill_integer_fields() {
    let protocol = single(Field::scalar("n", ScalarKind::Int));
    let bytes = encode(&protocol, &with("n", Value::Float(300.0))).unwrap();
    assert_eq!(decode(&protocol, &bytes), Ok(with("n", Value::Integer(300))));

    let err = encode(&protocol, &with("n", Value::Float(0.5))).unwrap_err();
    assert_snapshot!(err, @"field:n expect int, not float");
}

#[test]
fn integers_fill_float_fields() {
    let protocol = single(Field::scalar("d", ScalarKind::Double));
    let bytes = encode(&protocol, &with("d", Value::Integer(3))).unwrap();
    assert_eq!(decode(&protocol, &bytes), Ok(with("d", Value::Float(3.0))));
}
