//! Schema-driven wire format for numbered protocol messages.
//!
//! A protocol is an ordered list of named fields. Each field has a scalar
//! kind (bool, short, int, float, double, string or a nested message), may be
//! an array, and nested messages carry their own child fields. Encoding walks
//! the field tree against a dynamic [`Value`] and produces a compact byte
//! stream; decoding walks the same tree against the bytes and rebuilds the
//! value.
//!
//! The wire carries no type tags and no outer length. Both sides must hold
//! the same schema, registered under the same 16-bit ID in a [`Registry`].
//!
//! ```text
//! message  = field*                       (declared order)
//! field    = scalar | count:u16 scalar*   (arrays)
//! scalar   = bool:u8 | short:i16 | int:varint | float:f32 | double:f64
//!          | len:u16 bytes | message
//! ```
//!
//! All multi-byte quantities are little-endian.
//!
//! # Security
//!
//! Schemas are trusted. Byte streams are not: every read is bounds-checked,
//! nesting is capped at [`limits::MAX_DEPTH`], and a decode must consume the
//! input exactly. No decode path panics on malformed input.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

#[cfg(feature = "cbor")]
pub mod cbor;
pub mod decoder;
pub mod descriptor;
pub mod encoder;
pub mod errors;
pub mod field;
pub mod kind;
pub mod limits;
pub mod protocol;
pub mod registry;
pub mod value;
pub mod varint;

pub use decoder::{Decoder, decode, decode_bytes};
pub use descriptor::{FieldDescriptor, ProtocolDescriptor};
pub use encoder::{Encoder, encode};
pub use errors::{CodecError, ProtocolError, Result, SchemaError};
pub use field::Field;
pub use kind::ScalarKind;
pub use protocol::Protocol;
pub use registry::{ProtocolId, Registry};
pub use value::{Value, ValueKind};
#[cfg(feature = "cbor")]
pub use cbor::CborError;
