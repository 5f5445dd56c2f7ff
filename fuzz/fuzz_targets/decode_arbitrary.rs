//! Fuzz target: decode raw bytes against a fixed nested schema.
//!
//! Every input must either fail with a checked error or decode to a value
//! that survives another encode/decode cycle. Panics are bugs.

#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use pto_harness::same_value;
use pto_proto::{Field, Protocol, ScalarKind, decode_bytes, encode};

fn schema() -> Protocol {
    Protocol::new("fuzz", vec![
        Field::scalar("id", ScalarKind::Int),
        Field::scalar("flag", ScalarKind::Bool),
        Field::scalar("level", ScalarKind::Short),
        Field::scalar("name", ScalarKind::String),
        Field::array("ratios", ScalarKind::Double),
        Field::message_array("children", vec![
            Field::scalar("id", ScalarKind::Int),
            Field::array("tags", ScalarKind::String),
            Field::message("inner", vec![Field::scalar("x", ScalarKind::Float)]),
        ]),
    ])
}

fuzz_target!(|data: &[u8]| {
    let protocol = schema();
    let input = Bytes::copy_from_slice(data);

    let Ok(value) = decode_bytes(&protocol, input) else {
        return;
    };

    // Varints may arrive padded, so the re-encoding can only be shorter
    let bytes = encode(&protocol, &value).expect("decoded value must re-encode");
    assert!(bytes.len() <= data.len());

    let again = decode_bytes(&protocol, bytes).expect("re-encoded value must decode");
    assert!(same_value(&again, &value), "{again:?} != {value:?}");
});
