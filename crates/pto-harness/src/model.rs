//! Reference model of the wire format.
//!
//! A second, deliberately plain rendition of the codec: `Vec<u8>` output,
//! slice cursors, no shared code with the real engines beyond the schema and
//! value types. Model-based tests drive both with the same operations and
//! require identical observable results.

use std::collections::{BTreeMap, HashMap};

use pto_proto::{
    Field, Protocol, ScalarKind, Value,
    limits::{MAX_ARRAY_LEN, MAX_DEPTH, MAX_INT_MAGNITUDE, MAX_STRING_LEN},
};

/// One step applied to both the model and the real registry.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Register `protocol` under `id`, replacing any previous one
    Import {
        /// Target ID
        id: u16,
        /// Schema to register
        protocol: Protocol,
    },
    /// Unregister `id`
    Remove {
        /// Target ID
        id: u16,
    },
    /// Encode `value` with the protocol at `id`
    Encode {
        /// Target ID
        id: u16,
        /// Value to encode
        value: Value,
    },
    /// Decode `bytes` with the protocol at `id`
    Decode {
        /// Target ID
        id: u16,
        /// Input bytes
        bytes: Vec<u8>,
    },
}

/// Observable outcome of an [`Operation`].
#[derive(Debug, Clone)]
pub enum OperationResult {
    /// Import or remove completed
    Ok,
    /// Encode produced these bytes
    Encoded(Vec<u8>),
    /// Decode produced this value
    Decoded(Value),
    /// Operation failed
    Error(OperationError),
}

/// Failure classes the model distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationError {
    /// Nothing registered at the ID
    UnknownProtocol,
    /// Registered protocol refused the value or bytes
    Rejected,
}

impl OperationResult {
    /// Whether the operation succeeded.
    pub fn is_ok(&self) -> bool {
        !matches!(self, Self::Error(_))
    }

    /// Outcome equality, with floats compared bit for bit (NaN included).
    pub fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Ok, Self::Ok) => true,
            (Self::Encoded(a), Self::Encoded(b)) => a == b,
            (Self::Decoded(a), Self::Decoded(b)) => same_value(a, b),
            (Self::Error(a), Self::Error(b)) => a == b,
            _ => false,
        }
    }
}

/// Structural equality that treats floats by bit pattern, NaNs as equal.
pub fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Float(x), Value::Float(y)) => {
            x.to_bits() == y.to_bits() || (x.is_nan() && y.is_nan())
        },
        (Value::Record(x), Value::Record(y)) => {
            x.len() == y.len()
                && x.iter().zip(y).all(|((kx, vx), (ky, vy))| kx == ky && same_value(vx, vy))
        },
        (Value::Sequence(x), Value::Sequence(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(vx, vy)| same_value(vx, vy))
        },
        _ => a == b,
    }
}

/// Registry model: a plain map from ID to protocol.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    protocols: HashMap<u16, Protocol>,
}

impl ModelRegistry {
    /// Empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered protocols.
    pub fn len(&self) -> usize {
        self.protocols.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.protocols.is_empty()
    }

    /// Apply one operation.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        match op {
            Operation::Import { id, protocol } => {
                self.protocols.insert(*id, protocol.clone());
                OperationResult::Ok
            },
            Operation::Remove { id } => {
                self.protocols.remove(id);
                OperationResult::Ok
            },
            Operation::Encode { id, value } => match self.protocols.get(id) {
                None => OperationResult::Error(OperationError::UnknownProtocol),
                Some(protocol) => match reference_encode(protocol, value) {
                    Some(out) => OperationResult::Encoded(out),
                    None => OperationResult::Error(OperationError::Rejected),
                },
            },
            Operation::Decode { id, bytes } => match self.protocols.get(id) {
                None => OperationResult::Error(OperationError::UnknownProtocol),
                Some(protocol) => match reference_decode(protocol, bytes) {
                    Some(out) => OperationResult::Decoded(out),
                    None => OperationResult::Error(OperationError::Rejected),
                },
            },
        }
    }
}

/// Encode straight from the wire grammar, or `None` if `value` does not fit
/// `protocol`.
pub fn reference_encode(protocol: &Protocol, value: &Value) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    write_record(&mut out, protocol.fields(), value, 0)?;
    Some(out)
}

/// Encoded size predicted from the schema and value alone.
pub fn predicted_len(protocol: &Protocol, value: &Value) -> Option<usize> {
    record_len(protocol.fields(), value, 0)
}

fn record_len(fields: &[Field], value: &Value, depth: usize) -> Option<usize> {
    let Value::Record(members) = value else { return None };
    fields.iter().try_fold(0, |acc, field| {
        let member = members.get(field.name())?;
        if field.kind() == ScalarKind::Message && depth >= MAX_DEPTH {
            return None;
        }
        let len = if field.is_array() {
            let Value::Sequence(items) = member else { return None };
            if items.len() > MAX_ARRAY_LEN {
                return None;
            }
            items.iter().try_fold(2, |acc, item| Some(acc + scalar_len(field, item, depth)?))?
        } else {
            scalar_len(field, member, depth)?
        };
        Some(acc + len)
    })
}

fn scalar_len(field: &Field, value: &Value, depth: usize) -> Option<usize> {
    match field.kind() {
        ScalarKind::Bool => matches!(value, Value::Bool(_)).then_some(1),
        ScalarKind::Short => short_of(value).map(|_| 2),
        ScalarKind::Int => {
            let m = int_of(value)?.unsigned_abs();
            Some(1 + (u64::BITS - m.leading_zeros()).div_ceil(8) as usize)
        },
        ScalarKind::Float => value.as_float().map(|_| 4),
        ScalarKind::Double => value.as_float().map(|_| 8),
        ScalarKind::String => {
            let bytes = value.as_bytes()?;
            (bytes.len() <= MAX_STRING_LEN).then_some(2 + bytes.len())
        },
        ScalarKind::Message => record_len(field.children(), value, depth + 1),
    }
}

fn write_record(out: &mut Vec<u8>, fields: &[Field], value: &Value, depth: usize) -> Option<()> {
    let Value::Record(members) = value else { return None };
    for field in fields {
        let member = members.get(field.name())?;
        if field.kind() == ScalarKind::Message && depth >= MAX_DEPTH {
            return None;
        }
        if field.is_array() {
            let Value::Sequence(items) = member else { return None };
            let count = u16::try_from(items.len()).ok()?;
            out.extend_from_slice(&count.to_le_bytes());
            for item in items {
                write_scalar(out, field, item, depth)?;
            }
        } else {
            write_scalar(out, field, member, depth)?;
        }
    }
    Some(())
}

fn write_scalar(out: &mut Vec<u8>, field: &Field, value: &Value, depth: usize) -> Option<()> {
    match field.kind() {
        ScalarKind::Bool => {
            let Value::Bool(b) = value else { return None };
            out.push(u8::from(*b));
        },
        ScalarKind::Short => out.extend_from_slice(&short_of(value)?.to_le_bytes()),
        ScalarKind::Int => {
            let v = int_of(value)?;
            if v == 0 {
                out.push(0);
            } else {
                let m = v.unsigned_abs();
                let n = (u64::BITS - m.leading_zeros()).div_ceil(8) as usize;
                out.push(((n as u8) << 1) | u8::from(v > 0));
                out.extend_from_slice(&m.to_le_bytes()[..n]);
            }
        },
        ScalarKind::Float => out.extend_from_slice(&(value.as_float()? as f32).to_le_bytes()),
        ScalarKind::Double => out.extend_from_slice(&value.as_float()?.to_le_bytes()),
        ScalarKind::String => {
            let bytes = value.as_bytes()?;
            let len = u16::try_from(bytes.len()).ok()?;
            out.extend_from_slice(&len.to_le_bytes());
            out.extend_from_slice(bytes);
        },
        ScalarKind::Message => write_record(out, field.children(), value, depth + 1)?,
    }
    Some(())
}

fn int_of(value: &Value) -> Option<i64> {
    let v = match value {
        Value::Integer(v) => *v,
        Value::Float(f) if f.fract() == 0.0 && f.abs() < 9.3e18 => *f as i64,
        _ => return None,
    };
    (v.unsigned_abs() <= MAX_INT_MAGNITUDE).then_some(v)
}

fn short_of(value: &Value) -> Option<i16> {
    match value {
        Value::Integer(v) => i16::try_from(*v).ok(),
        Value::Float(f) if f.fract() == 0.0 && f.abs() <= 32_768.0 => {
            i16::try_from(*f as i64).ok()
        },
        _ => None,
    }
}

/// Decode with a plain slice cursor, or `None` on any failure.
pub fn reference_decode(protocol: &Protocol, bytes: &[u8]) -> Option<Value> {
    let mut input = bytes;
    let value = read_record(&mut input, protocol.fields(), 0)?;
    input.is_empty().then_some(value)
}

fn take<'a>(input: &mut &'a [u8], n: usize) -> Option<&'a [u8]> {
    if input.len() < n {
        return None;
    }
    let (head, tail) = input.split_at(n);
    *input = tail;
    Some(head)
}

fn take_array<const N: usize>(input: &mut &[u8]) -> Option<[u8; N]> {
    take(input, N)?.try_into().ok()
}

fn read_record(input: &mut &[u8], fields: &[Field], depth: usize) -> Option<Value> {
    let mut members = BTreeMap::new();
    for field in fields {
        if field.kind() == ScalarKind::Message && depth >= MAX_DEPTH {
            return None;
        }
        let value = if field.is_array() {
            let count = u16::from_le_bytes(take_array(input)?);
            let mut items = Vec::new();
            for _ in 0..count {
                items.push(read_scalar(input, field, depth)?);
            }
            Value::Sequence(items)
        } else {
            read_scalar(input, field, depth)?
        };
        members.insert(field.name().to_string(), value);
    }
    Some(Value::Record(members))
}

fn read_scalar(input: &mut &[u8], field: &Field, depth: usize) -> Option<Value> {
    let value = match field.kind() {
        ScalarKind::Bool => Value::Bool(take(input, 1)?[0] != 0),
        ScalarKind::Short => Value::from(i16::from_le_bytes(take_array(input)?)),
        ScalarKind::Int => {
            let tag = take(input, 1)?[0];
            let n = usize::from(tag >> 1);
            if n > 7 {
                return None;
            }
            let mut acc = [0u8; 8];
            acc[..n].copy_from_slice(take(input, n)?);
            let m = u64::from_le_bytes(acc) as i64;
            Value::Integer(if tag & 1 == 1 { m } else { -m })
        },
        ScalarKind::Float => Value::Float(f64::from(f32::from_le_bytes(take_array(input)?))),
        ScalarKind::Double => Value::Float(f64::from_le_bytes(take_array(input)?)),
        ScalarKind::String => {
            let len = u16::from_le_bytes(take_array(input)?);
            Value::text(take(input, usize::from(len))?.to_vec())
        },
        ScalarKind::Message => read_record(input, field.children(), depth + 1)?,
    };
    Some(value)
}
