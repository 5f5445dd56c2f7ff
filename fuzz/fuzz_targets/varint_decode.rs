//! Fuzz target: varint decoding.
//!
//! Successful decodes must stay within the 56-bit magnitude and re-encode to
//! the bytes they consumed, unless the input used a non-minimal length.

#![no_main]

use bytes::{Buf, Bytes, BytesMut};
use libfuzzer_sys::fuzz_target;
use pto_proto::varint::{MAX_VARINT_MAGNITUDE, decode_varint, encode_varint, encoded_len};

fuzz_target!(|data: &[u8]| {
    let mut input = Bytes::copy_from_slice(data);
    let before = input.remaining();

    let Ok(value) = decode_varint(&mut input) else {
        return;
    };
    let consumed = before - input.remaining();

    assert!(value.unsigned_abs() <= MAX_VARINT_MAGNITUDE);
    assert!(consumed >= encoded_len(value));

    let mut out = BytesMut::new();
    let written = encode_varint(&mut out, value).expect("decoded value is in range");
    assert_eq!(written, encoded_len(value));
    if consumed == written && value != 0 {
        assert_eq!(&out[..], &data[..consumed]);
    }
});
