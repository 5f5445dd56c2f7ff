//! Decoder engine.
//!
//! Mirrors the encoder: walks the field tree and reads each field from a
//! cursor over the input. Every read is bounds-checked first, so malformed or
//! hostile input fails with [`CodecError::Truncated`] instead of over-reading.
//! The walk must consume the input exactly.
//!
//! Decoding is driven purely by the schema. Bytes produced under a different
//! schema decode to garbage or fail, but never read out of bounds.

use std::collections::BTreeMap;

use bytes::{Buf, Bytes};

use crate::{
    errors::{CodecError, Direction},
    field::Field,
    kind::ScalarKind,
    limits::MAX_DEPTH,
    protocol::Protocol,
    value::Value,
    varint,
};

/// Read cursor over one input message.
///
/// Strings are returned as slices of the input, so decoding from [`Bytes`]
/// does not copy string payloads.
#[derive(Debug)]
pub struct Decoder {
    buf: Bytes,
    len: usize,
}

impl Decoder {
    /// Cursor at the start of `input`.
    pub fn new(input: Bytes) -> Self {
        let len = input.len();
        Self { buf: input, len }
    }

    /// Total input length.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the input is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes consumed so far.
    pub fn consumed(&self) -> usize {
        self.len - self.buf.remaining()
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Decode one message of `protocol`, requiring the input to be consumed
    /// exactly.
    pub fn decode_protocol(&mut self, protocol: &Protocol) -> Result<Value, CodecError> {
        let record = self.decode_fields(protocol.fields(), 0)?;

        if self.consumed() != self.len {
            return Err(CodecError::TrailingOrMissingData {
                protocol: protocol.name().to_string(),
                consumed: self.consumed(),
                len: self.len,
            });
        }
        Ok(record)
    }

    fn decode_fields(&mut self, fields: &[Field], depth: usize) -> Result<Value, CodecError> {
        let mut members = BTreeMap::new();
        for field in fields {
            let value = self.decode_field(field, depth)?;
            members.insert(field.name().to_string(), value);
        }
        Ok(Value::Record(members))
    }

    fn decode_field(&mut self, field: &Field, depth: usize) -> Result<Value, CodecError> {
        if field.kind() == ScalarKind::Message && depth + 1 > MAX_DEPTH {
            return Err(CodecError::TooDeep { direction: Direction::Decode });
        }

        if !field.is_array() {
            return self.decode_scalar(field, depth);
        }

        let count = usize::from(self.read_u16()?);
        // Elements may be zero-width (empty messages), so only trust the
        // count as far as the input could plausibly back it
        let mut items = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            items.push(self.decode_scalar(field, depth)?);
        }
        Ok(Value::Sequence(items))
    }

    fn decode_scalar(&mut self, field: &Field, depth: usize) -> Result<Value, CodecError> {
        if let Some(width) = field.kind().fixed_width() {
            self.ensure(width)?;
        }

        let value = match field.kind() {
            ScalarKind::Bool => Value::Bool(self.buf.get_u8() != 0),
            ScalarKind::Short => Value::Integer(i64::from(self.buf.get_i16_le())),
            ScalarKind::Int => Value::Integer(varint::decode_varint(&mut self.buf)?),
            ScalarKind::Float => Value::Float(f64::from(self.buf.get_f32_le())),
            ScalarKind::Double => Value::Float(self.buf.get_f64_le()),
            ScalarKind::String => {
                let len = usize::from(self.read_u16()?);
                self.ensure(len)?;
                Value::Text(self.buf.split_to(len))
            },
            ScalarKind::Message => self.decode_fields(field.children(), depth + 1)?,
        };
        Ok(value)
    }

    fn ensure(&self, needed: usize) -> Result<(), CodecError> {
        let remaining = self.buf.remaining();
        if remaining < needed {
            return Err(CodecError::Truncated { needed, remaining });
        }
        Ok(())
    }

    fn read_u16(&mut self) -> Result<u16, CodecError> {
        self.ensure(2)?;
        Ok(self.buf.get_u16_le())
    }
}

/// Decode one message of `protocol` from a borrowed slice.
///
/// String payloads are copied out of `input` once, up front.
pub fn decode(protocol: &Protocol, input: &[u8]) -> Result<Value, CodecError> {
    decode_bytes(protocol, Bytes::copy_from_slice(input))
}

/// Decode one message of `protocol`, sharing string payloads with `input`.
pub fn decode_bytes(protocol: &Protocol, input: Bytes) -> Result<Value, CodecError> {
    let mut decoder = Decoder::new(input);
    match decoder.decode_protocol(protocol) {
        Ok(value) => {
            tracing::trace!(protocol = protocol.name(), bytes = decoder.len(), "decoded");
            Ok(value)
        },
        Err(e) => {
            tracing::debug!(
                protocol = protocol.name(),
                consumed = decoder.consumed(),
                error = %e,
                "decode failed"
            );
            Err(e)
        },
    }
}
