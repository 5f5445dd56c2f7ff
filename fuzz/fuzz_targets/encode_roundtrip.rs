//! Fuzz target: arbitrary schema and value, encode then decode.
//!
//! Whatever encodes must decode back to the same value and to the size the
//! reference model predicts.

#![no_main]

use libfuzzer_sys::fuzz_target;
use pto_harness::{FuzzCase, predicted_len, same_value};
use pto_proto::{decode, encode};

fuzz_target!(|case: FuzzCase| {
    let Ok(bytes) = encode(&case.protocol, &case.value) else {
        return;
    };

    assert_eq!(Some(bytes.len()), predicted_len(&case.protocol, &case.value));

    let decoded = decode(&case.protocol, &bytes).expect("encoded bytes must decode");
    assert!(same_value(&decoded, &case.value), "{decoded:?} != {:?}", case.value);
});
