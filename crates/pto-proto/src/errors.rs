//! Error types.
//!
//! Import-time failures ([`SchemaError`]) mean the schema itself is wrong and
//! indicate a setup bug. Encode/decode failures ([`CodecError`]) mean the
//! traffic is wrong. Both abort the whole call; there are no partial results.

use std::fmt;

use thiserror::Error;

use crate::limits::MAX_DEPTH;

/// Result alias defaulting to the umbrella [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Errors raised while importing a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Protocol ID does not fit in 16 bits
    #[error("protocol id {id} out of range, must be within 0..=65535")]
    InvalidProtocolId {
        /// Rejected ID as supplied by the host
        id: i64,
    },

    /// Field descriptor carries a kind discriminant we don't know
    #[error("unknown field:{field}, type:{kind}")]
    UnknownFieldKind {
        /// Field name
        field: String,
        /// Raw discriminant
        kind: i64,
    },

    /// Descriptor tree nests deeper than the runtime limit
    #[error("field:{field} nests deeper than {max} levels", max = MAX_DEPTH)]
    TooDeep {
        /// Field at which the limit was crossed
        field: String,
    },

    /// Field descriptor with an empty name
    #[error("field name must not be empty")]
    EmptyFieldName,

    /// Descriptor document could not be parsed
    #[error("malformed schema document: {0}")]
    Document(String),
}

/// Direction of a codec call, used to label depth violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Value to bytes
    Encode,
    /// Bytes to value
    Decode,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode => f.write_str("encode"),
            Self::Decode => f.write_str("decode"),
        }
    }
}

fn array_member(in_array: &bool) -> &'static str {
    if *in_array { "array member " } else { "" }
}

/// Errors raised while encoding or decoding a message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// No protocol registered under this ID
    #[error("no such protocol: {id}")]
    UnknownProtocol {
        /// Requested ID
        id: u16,
    },

    /// Value kind disagrees with the schema
    #[error(
        "field:{field} {}expect {expected}, not {found}",
        array_member(.in_array)
    )]
    TypeMismatch {
        /// Offending field
        field: String,
        /// What the schema asks for
        expected: &'static str,
        /// What the value holds
        found: &'static str,
        /// Mismatch was on an array element rather than the field itself
        in_array: bool,
    },

    /// Array longer than a `u16` count can express
    #[error("field:{field} array size {len} more than 0xffff")]
    ArrayTooLarge {
        /// Offending field
        field: String,
        /// Actual element count
        len: usize,
    },

    /// String longer than a `u16` length can express
    #[error("field:{field} string size more than 0xffff: {len}")]
    StringTooLong {
        /// Offending field
        field: String,
        /// Actual byte length
        len: usize,
    },

    /// Integer does not fit the field's wire width
    #[error(
        "field:{field} {}int out of range, {value}",
        array_member(.in_array)
    )]
    IntegerOutOfRange {
        /// Offending field
        field: String,
        /// Rejected value
        value: i128,
        /// Failure was on an array element
        in_array: bool,
    },

    /// Message nesting exceeded [`MAX_DEPTH`]
    #[error("protocol {direction} nests deeper than {max} levels", max = MAX_DEPTH)]
    TooDeep {
        /// Whether this happened while encoding or decoding
        direction: Direction,
    },

    /// Read past the end of the input
    #[error("invalid message: need {needed} bytes, {remaining} remaining")]
    Truncated {
        /// Bytes the read required
        needed: usize,
        /// Bytes left in the input
        remaining: usize,
    },

    /// Decode finished without consuming exactly the whole input
    #[error("decode protocol:{protocol} error, consumed {consumed} of {len} bytes")]
    TrailingOrMissingData {
        /// Protocol name
        protocol: String,
        /// Bytes consumed by the schema walk
        consumed: usize,
        /// Input length
        len: usize,
    },

    /// Varint tag declares a payload wider than 7 bytes
    #[error("invalid message: malformed integer tag {tag:#04x}")]
    MalformedInteger {
        /// Offending tag byte
        tag: u8,
    },
}

/// Any error produced by this crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProtocolError {
    /// Schema import failed
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Encode or decode failed
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl ProtocolError {
    /// True for setup bugs (bad schema), false for bad traffic.
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Self::Schema(_))
    }
}
