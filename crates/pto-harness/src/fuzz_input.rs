//! Structured fuzz inputs.
//!
//! [`FuzzCase`] turns raw fuzzer bytes into a schema plus a value shaped
//! after it. Values follow the schema's structure but draw scalars from the
//! full range of their Rust type, so out-of-range integers and NaN floats
//! show up regularly.

use arbitrary::{Arbitrary, Result, Unstructured};
use pto_proto::{Field, Protocol, ScalarKind, Value};

/// Deepest message nesting a fuzz schema uses.
const MAX_FUZZ_DEPTH: usize = 4;

#[derive(Debug, Clone, Copy, Arbitrary)]
enum Shape {
    Bool,
    Short,
    Int,
    Float,
    Double,
    String,
    Message,
}

impl Shape {
    fn kind(self) -> ScalarKind {
        match self {
            Self::Bool => ScalarKind::Bool,
            Self::Short => ScalarKind::Short,
            Self::Int => ScalarKind::Int,
            Self::Float => ScalarKind::Float,
            Self::Double => ScalarKind::Double,
            Self::String => ScalarKind::String,
            Self::Message => ScalarKind::Message,
        }
    }
}

/// A schema and a value built against it.
#[derive(Debug, Clone)]
pub struct FuzzCase {
    /// Generated schema
    pub protocol: Protocol,
    /// Value following the schema's shape
    pub value: Value,
}

impl<'a> Arbitrary<'a> for FuzzCase {
    fn arbitrary(u: &mut Unstructured<'a>) -> Result<Self> {
        let fields = arbitrary_fields(u, 0)?;
        let value = arbitrary_record(u, &fields)?;
        Ok(Self { protocol: Protocol::new("fuzz", fields), value })
    }
}

fn arbitrary_fields(u: &mut Unstructured<'_>, depth: usize) -> Result<Vec<Field>> {
    let count = u.int_in_range(0..=4)?;
    let mut fields = Vec::with_capacity(count);

    for i in 0..count {
        let name = format!("f{i}");
        let array = bool::arbitrary(u)?;
        let field = match Shape::arbitrary(u)? {
            Shape::Message if depth < MAX_FUZZ_DEPTH => {
                let children = arbitrary_fields(u, depth + 1)?;
                if array {
                    Field::message_array(name, children)
                } else {
                    Field::message(name, children)
                }
            },
            Shape::Message => Field::scalar(name, ScalarKind::Bool),
            shape if array => Field::array(name, shape.kind()),
            shape => Field::scalar(name, shape.kind()),
        };
        fields.push(field);
    }
    Ok(fields)
}

fn arbitrary_record(u: &mut Unstructured<'_>, fields: &[Field]) -> Result<Value> {
    let mut members = Vec::with_capacity(fields.len());
    for field in fields {
        let member = if field.is_array() {
            let len = u.int_in_range(0..=4)?;
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(arbitrary_element(u, field)?);
            }
            Value::Sequence(items)
        } else {
            arbitrary_element(u, field)?
        };
        members.push((field.name(), member));
    }
    Ok(Value::record(members))
}

fn arbitrary_element(u: &mut Unstructured<'_>, field: &Field) -> Result<Value> {
    let value = match field.kind() {
        ScalarKind::Bool => Value::Bool(bool::arbitrary(u)?),
        ScalarKind::Short => Value::from(i16::arbitrary(u)?),
        ScalarKind::Int => Value::Integer(i64::arbitrary(u)?),
        ScalarKind::Float => Value::Float(f64::from(f32::arbitrary(u)?)),
        ScalarKind::Double => Value::Float(f64::arbitrary(u)?),
        ScalarKind::String => {
            let len = u.int_in_range(0..=32)?.min(u.len());
            Value::text(u.bytes(len)?.to_vec())
        },
        ScalarKind::Message => arbitrary_record(u, field.children())?,
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_fixed_bytes() {
        let raw: Vec<u8> = (0u8..=255).cycle().take(1024).collect();
        let case = FuzzCase::arbitrary(&mut Unstructured::new(&raw)).unwrap();

        assert!(case.protocol.max_depth() <= MAX_FUZZ_DEPTH);
        assert!(matches!(case.value, Value::Record(_)));
    }

    #[test]
    fn empty_input_gives_empty_protocol() {
        let case = FuzzCase::arbitrary(&mut Unstructured::new(&[])).unwrap();
        assert!(case.protocol.fields().is_empty());
    }
}
