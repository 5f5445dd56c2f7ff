//! Varint property tests

use bytes::{Bytes, BytesMut};
use proptest::prelude::*;
use pto_proto::{
    CodecError,
    varint::{MAX_VARINT_MAGNITUDE, OutOfRange, decode_varint, encode_varint, encoded_len},
};

fn in_range() -> impl Strategy<Value = i64> {
    let max = MAX_VARINT_MAGNITUDE as i64;
    prop_oneof![
        -max..=max,
        // Bias towards the byte-width boundaries
        (0u32..56, any::<bool>()).prop_map(|(bits, neg)| {
            let v = (1i64 << bits) - 1;
            if neg { -v } else { v }
        }),
    ]
}

proptest! {
    #[test]
    fn prop_varint_symmetry(v in in_range()) {
        let mut buf = BytesMut::new();
        let written = encode_varint(&mut buf, v).unwrap();
        prop_assert_eq!(written, buf.len());
        prop_assert_eq!(written, encoded_len(v));

        let mut bytes = buf.freeze();
        prop_assert_eq!(decode_varint(&mut bytes), Ok(v));
        prop_assert!(bytes.is_empty());
    }

    #[test]
    fn prop_sign_does_not_change_width(v in in_range()) {
        prop_assert_eq!(encoded_len(v), encoded_len(-v));
    }

    #[test]
    fn prop_two_byte_payload(m in 0x100i64..=0xFFFF, neg in any::<bool>()) {
        let v = if neg { -m } else { m };
        let mut buf = BytesMut::new();
        encode_varint(&mut buf, v).unwrap();
        prop_assert_eq!(buf.len(), 3);
        prop_assert_eq!(buf[0] >> 1, 2);
    }

    #[test]
    fn prop_out_of_range_rejected(excess in 1i64..=(i64::MAX - MAX_VARINT_MAGNITUDE as i64)) {
        let v = MAX_VARINT_MAGNITUDE as i64 + excess;
        let mut buf = BytesMut::new();
        prop_assert_eq!(encode_varint(&mut buf, v), Err(OutOfRange(v)));
        prop_assert_eq!(encode_varint(&mut buf, -v), Err(OutOfRange(-v)));
        prop_assert!(buf.is_empty());
    }

    #[test]
    fn prop_decode_never_overreads(input in prop::collection::vec(any::<u8>(), 0..12)) {
        let mut bytes = Bytes::from(input.clone());
        match decode_varint(&mut bytes) {
            Ok(v) => {
                prop_assert!(v.unsigned_abs() <= MAX_VARINT_MAGNITUDE);
                prop_assert_eq!(input.len() - bytes.len(), 1 + usize::from(input[0] >> 1));
            },
            Err(CodecError::Truncated { .. } | CodecError::MalformedInteger { .. }) => {},
            Err(other) => prop_assert!(false, "unexpected error {other:?}"),
        }
    }
}

#[test]
fn zero_costs_one_byte() {
    let mut buf = BytesMut::new();
    assert_eq!(encode_varint(&mut buf, 0), Ok(1));
    assert_eq!(&buf[..], [0x00]);
}
