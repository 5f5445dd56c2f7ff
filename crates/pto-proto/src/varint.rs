//! Tagged signed integers.
//!
//! Not LEB128. A value is a tag byte followed by its magnitude:
//!
//! ```text
//! 0                  -> [0x00]
//! v != 0, m = |v|    -> [(n << 1) | (v > 0)] ++ m.to_le_bytes()[..n]
//! ```
//!
//! where `n` in `1..=7` is the fewest bytes holding `m`. Zero always costs one
//! byte and the cost of other values depends only on magnitude, not sign.

use bytes::{Buf, BufMut};
use thiserror::Error;

use crate::{errors::CodecError, limits::MAX_INT_MAGNITUDE};

/// Largest magnitude the format can carry (`2^56 - 1`).
pub const MAX_VARINT_MAGNITUDE: u64 = MAX_INT_MAGNITUDE;

/// Widest payload after the tag byte.
const MAX_PAYLOAD: usize = 7;

/// Value whose magnitude does not fit in seven bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("integer out of range: {0}")]
pub struct OutOfRange(pub i64);

/// Whether `value` can be encoded.
pub fn in_range(value: i64) -> bool {
    value.unsigned_abs() <= MAX_VARINT_MAGNITUDE
}

/// Payload bytes needed for a non-zero magnitude.
fn payload_len(magnitude: u64) -> usize {
    let bits = u64::BITS - magnitude.leading_zeros();
    bits.div_ceil(8) as usize
}

/// Total encoded size of `value`, tag included.
pub fn encoded_len(value: i64) -> usize {
    if value == 0 { 1 } else { 1 + payload_len(value.unsigned_abs()) }
}

/// Append `value` to `buf`, returning the number of bytes written.
pub fn encode_varint<B: BufMut>(buf: &mut B, value: i64) -> Result<usize, OutOfRange> {
    if value == 0 {
        buf.put_u8(0);
        return Ok(1);
    }

    let magnitude = value.unsigned_abs();
    if magnitude > MAX_VARINT_MAGNITUDE {
        return Err(OutOfRange(value));
    }

    let len = payload_len(magnitude);
    let sign = u8::from(value > 0);
    buf.put_u8(((len as u8) << 1) | sign);
    buf.put_slice(&magnitude.to_le_bytes()[..len]);
    Ok(1 + len)
}

/// Read one value from the front of `buf`.
///
/// Fails with [`CodecError::Truncated`] if the tag or payload is cut short and
/// [`CodecError::MalformedInteger`] if the tag claims more than seven payload
/// bytes. Nothing is read past the declared payload.
pub fn decode_varint<B: Buf>(buf: &mut B) -> Result<i64, CodecError> {
    if !buf.has_remaining() {
        return Err(CodecError::Truncated { needed: 1, remaining: 0 });
    }

    let tag = buf.get_u8();
    if tag == 0 {
        return Ok(0);
    }

    let len = usize::from(tag >> 1);
    if len > MAX_PAYLOAD {
        return Err(CodecError::MalformedInteger { tag });
    }
    if buf.remaining() < len {
        return Err(CodecError::Truncated { needed: len, remaining: buf.remaining() });
    }

    let mut acc = [0u8; 8];
    buf.copy_to_slice(&mut acc[..len]);

    // At most seven bytes, so the magnitude always fits in i64
    let magnitude = u64::from_le_bytes(acc) as i64;
    Ok(if tag & 1 == 1 { magnitude } else { -magnitude })
}

#[cfg(test)]
mod tests {
    use bytes::{Bytes, BytesMut};

    use super::*;

    fn encode(value: i64) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_varint(&mut buf, value).unwrap();
        buf.to_vec()
    }

    #[test]
    fn zero_is_one_byte() {
        assert_eq!(encode(0), [0x00]);
        assert_eq!(encoded_len(0), 1);
    }

    #[test]
    fn tag_carries_length_and_sign() {
        assert_eq!(encode(1), [0x03, 0x01]);
        assert_eq!(encode(-1), [0x02, 0x01]);
        assert_eq!(encode(300), [0x05, 0x2c, 0x01]);
        assert_eq!(encode(-300), [0x04, 0x2c, 0x01]);
        assert_eq!(encode(0xFF), [0x03, 0xFF]);
        assert_eq!(encode(0x100), [0x05, 0x00, 0x01]);
    }

    #[test]
    fn length_boundaries() {
        let cases: [(u64, usize); 7] = [
            (0xFF, 1),
            (0xFFFF, 2),
            (0xFF_FFFF, 3),
            (0xFFFF_FFFF, 4),
            (0xFF_FFFF_FFFF, 5),
            (0xFFFF_FFFF_FFFF, 6),
            (0xFF_FFFF_FFFF_FFFF, 7),
        ];
        for (max, len) in cases {
            let v = max as i64;
            assert_eq!(encoded_len(v), 1 + len, "max {max:#x}");
            assert_eq!(encoded_len(-v), 1 + len, "min -{max:#x}");
            if len < 7 {
                assert_eq!(encoded_len(v + 1), 2 + len, "past {max:#x}");
            }
        }
    }

    #[test]
    fn rejects_magnitude_past_56_bits() {
        let mut buf = BytesMut::new();
        let too_big = 1i64 << 56;
        assert_eq!(encode_varint(&mut buf, too_big), Err(OutOfRange(too_big)));
        assert_eq!(encode_varint(&mut buf, -too_big), Err(OutOfRange(-too_big)));
        assert_eq!(encode_varint(&mut buf, i64::MIN), Err(OutOfRange(i64::MIN)));
        assert!(buf.is_empty());
        assert!(in_range(too_big - 1));
        assert!(!in_range(too_big));
    }

    #[test]
    fn decodes_extremes() {
        for v in [0, 1, -1, 300, -300, MAX_VARINT_MAGNITUDE as i64, -(MAX_VARINT_MAGNITUDE as i64)]
        {
            let mut bytes = Bytes::from(encode(v));
            assert_eq!(decode_varint(&mut bytes), Ok(v));
            assert!(bytes.is_empty());
        }
    }

    #[test]
    fn decode_truncated_payload() {
        let mut bytes = Bytes::from_static(&[0x05, 0x2c]);
        let err = decode_varint(&mut bytes).unwrap_err();
        assert_eq!(err, CodecError::Truncated { needed: 2, remaining: 1 });

        let mut empty = Bytes::new();
        let err = decode_varint(&mut empty).unwrap_err();
        assert_eq!(err, CodecError::Truncated { needed: 1, remaining: 0 });
    }

    #[test]
    fn decode_rejects_oversized_tag() {
        let mut bytes = Bytes::from_static(&[0x11, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(decode_varint(&mut bytes), Err(CodecError::MalformedInteger { tag: 0x11 }));
    }

    #[test]
    fn zero_length_tag_is_zero() {
        let mut bytes = Bytes::from_static(&[0x01]);
        assert_eq!(decode_varint(&mut bytes), Ok(0));
    }
}
