//! Process-wide codec limits.
//!
//! These are fixed by the wire format (16-bit prefixes, 7-byte varint
//! payload) and are not configurable per call.

/// Maximum number of elements in an array field. Counts are `u16` on the wire.
pub const MAX_ARRAY_LEN: usize = 0xFFFF;

/// Maximum byte length of a string field. Lengths are `u16` on the wire.
pub const MAX_STRING_LEN: usize = 0xFFFF;

/// Maximum nesting of message fields, counted from the top-level record.
pub const MAX_DEPTH: usize = 128;

/// Largest magnitude an `Int` field can carry (`2^56 - 1`).
pub const MAX_INT_MAGNITUDE: u64 = 0x00FF_FFFF_FFFF_FFFF;

/// Initial capacity of the encoder's output buffer.
pub const INITIAL_BUFFER_CAPACITY: usize = 128;

/// Number of addressable protocol IDs (`0..=u16::MAX`).
pub const PROTOCOL_SLOTS: usize = 1 << 16;
