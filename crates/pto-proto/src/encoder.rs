//! Encoder engine.
//!
//! Walks a protocol's field tree against a [`Value`] record and appends each
//! field's encoding in declared order. Any failure aborts the whole call; the
//! partially written buffer is discarded with the encoder.

use bytes::{BufMut, Bytes, BytesMut};

use crate::{
    errors::{CodecError, Direction},
    field::Field,
    kind::ScalarKind,
    limits::{INITIAL_BUFFER_CAPACITY, MAX_ARRAY_LEN, MAX_DEPTH, MAX_STRING_LEN},
    protocol::Protocol,
    value::{Value, ValueKind},
    varint,
};

/// Growable output buffer for one encode call.
///
/// Capacity starts at [`INITIAL_BUFFER_CAPACITY`] and doubles whenever a
/// write would overflow it.
#[derive(Debug)]
pub struct Encoder {
    buf: BytesMut,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    /// Empty encoder with the default initial capacity.
    pub fn new() -> Self {
        Self { buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY) }
    }

    /// Bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Current buffer capacity.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Discard written bytes, keeping the allocation for reuse.
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Hand over the encoded bytes.
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }

    /// Encode `value` against every top-level field of `protocol`.
    ///
    /// `value` must be a record; members not named by the schema are ignored.
    pub fn encode_protocol(
        &mut self,
        protocol: &Protocol,
        value: &Value,
    ) -> Result<(), CodecError> {
        if !matches!(value, Value::Record(_)) {
            return Err(CodecError::TypeMismatch {
                field: protocol.name().to_string(),
                expected: "record",
                found: value.kind().name(),
                in_array: false,
            });
        }
        self.encode_fields(protocol.fields(), value, 0)
    }

    fn encode_fields(
        &mut self,
        fields: &[Field],
        record: &Value,
        depth: usize,
    ) -> Result<(), CodecError> {
        for field in fields {
            self.encode_field(field, record.get(field.name()), depth)?;
        }
        Ok(())
    }

    fn encode_field(
        &mut self,
        field: &Field,
        value: Option<&Value>,
        depth: usize,
    ) -> Result<(), CodecError> {
        if field.kind() == ScalarKind::Message && depth + 1 > MAX_DEPTH {
            return Err(CodecError::TooDeep { direction: Direction::Encode });
        }

        if !field.is_array() {
            return self.encode_scalar(field, value, false, depth);
        }

        let Some(Value::Sequence(items)) = value else {
            return Err(mismatch(field, "sequence", value, false));
        };
        if items.len() > MAX_ARRAY_LEN {
            return Err(CodecError::ArrayTooLarge {
                field: field.name().to_string(),
                len: items.len(),
            });
        }

        self.put_u16(items.len() as u16);
        for item in items {
            self.encode_scalar(field, Some(item), true, depth)?;
        }
        Ok(())
    }

    fn encode_scalar(
        &mut self,
        field: &Field,
        value: Option<&Value>,
        in_array: bool,
        depth: usize,
    ) -> Result<(), CodecError> {
        if let Some(width) = field.kind().fixed_width() {
            self.reserve(width);
        }

        match field.kind() {
            ScalarKind::Bool => match value {
                Some(Value::Bool(b)) => self.buf.put_u8(u8::from(*b)),
                other => return Err(mismatch(field, "bool", other, in_array)),
            },
            ScalarKind::Short => {
                let n = integer(field, value, in_array)?;
                let short =
                    i16::try_from(n).map_err(|_| out_of_range(field, i128::from(n), in_array))?;
                self.buf.put_i16_le(short);
            },
            ScalarKind::Int => {
                let n = integer(field, value, in_array)?;
                if !varint::in_range(n) {
                    return Err(out_of_range(field, i128::from(n), in_array));
                }
                self.reserve(varint::encoded_len(n));
                varint::encode_varint(&mut self.buf, n)
                    .map_err(|varint::OutOfRange(n)| out_of_range(field, i128::from(n), in_array))?;
            },
            ScalarKind::Float => {
                #[allow(clippy::cast_possible_truncation)]
                let f = number(field, value, in_array)? as f32;
                self.buf.put_f32_le(f);
            },
            ScalarKind::Double => {
                let f = number(field, value, in_array)?;
                self.buf.put_f64_le(f);
            },
            ScalarKind::String => {
                let Some(Value::Text(bytes)) = value else {
                    return Err(mismatch(field, "string", value, in_array));
                };
                if bytes.len() > MAX_STRING_LEN {
                    return Err(CodecError::StringTooLong {
                        field: field.name().to_string(),
                        len: bytes.len(),
                    });
                }
                self.put_u16(bytes.len() as u16);
                self.put_slice(bytes);
            },
            ScalarKind::Message => match value {
                Some(record @ Value::Record(_)) => {
                    self.encode_fields(field.children(), record, depth + 1)?;
                },
                other => return Err(mismatch(field, "record", other, in_array)),
            },
        }
        Ok(())
    }

    /// Make room for `additional` bytes, doubling capacity as needed.
    fn reserve(&mut self, additional: usize) {
        let needed = self.buf.len() + additional;
        let capacity = self.buf.capacity();
        if needed <= capacity {
            return;
        }

        let mut target = capacity.max(INITIAL_BUFFER_CAPACITY) * 2;
        while target < needed {
            target *= 2;
        }
        self.buf.reserve(target - self.buf.len());
    }

    fn put_u16(&mut self, v: u16) {
        self.reserve(2);
        self.buf.put_u16_le(v);
    }

    fn put_slice(&mut self, bytes: &[u8]) {
        self.reserve(bytes.len());
        self.buf.put_slice(bytes);
    }
}

fn mismatch(
    field: &Field,
    expected: &'static str,
    found: Option<&Value>,
    in_array: bool,
) -> CodecError {
    CodecError::TypeMismatch {
        field: field.name().to_string(),
        expected,
        found: ValueKind::of(found).name(),
        in_array,
    }
}

fn out_of_range(field: &Field, value: i128, in_array: bool) -> CodecError {
    CodecError::IntegerOutOfRange { field: field.name().to_string(), value, in_array }
}

/// Integer payload for `Short`/`Int` fields.
///
/// Floats are accepted only when they hold an exact integer.
#[allow(clippy::cast_possible_truncation)]
fn integer(field: &Field, value: Option<&Value>, in_array: bool) -> Result<i64, CodecError> {
    match value {
        Some(Value::Integer(n)) => Ok(*n),
        Some(Value::Float(f)) if f.is_finite() && f.fract() == 0.0 => {
            // 2^63 is exactly representable; anything at or above it overflows i64
            const LIMIT: f64 = 9_223_372_036_854_775_808.0;
            if *f >= -LIMIT && *f < LIMIT {
                Ok(*f as i64)
            } else {
                Err(out_of_range(field, *f as i128, in_array))
            }
        },
        other => Err(mismatch(field, field.kind().name(), other, in_array)),
    }
}

/// Numeric payload for `Float`/`Double` fields.
fn number(field: &Field, value: Option<&Value>, in_array: bool) -> Result<f64, CodecError> {
    value
        .and_then(Value::as_float)
        .ok_or_else(|| mismatch(field, field.kind().name(), value, in_array))
}

/// Encode `value` with `protocol`.
pub fn encode(protocol: &Protocol, value: &Value) -> Result<Bytes, CodecError> {
    let mut encoder = Encoder::new();
    match encoder.encode_protocol(protocol, value) {
        Ok(()) => {
            tracing::trace!(protocol = protocol.name(), bytes = encoder.len(), "encoded");
            Ok(encoder.finish())
        },
        Err(e) => {
            tracing::debug!(protocol = protocol.name(), error = %e, "encode failed");
            Err(e)
        },
    }
}
