//! Schema descriptors and the importer that turns them into field trees.
//!
//! Descriptors are what the host hands over: plain data mirroring the
//! textual protocol definition, one entry per field with `name`, `type`
//! (a [`ScalarKind`] discriminant), `array` and, for messages, a nested `pto`
//! list. They are serde types so they can travel as CBOR or any other serde
//! format.
//!
//! Schemas come from a trusted source, but import still rejects unknown kinds
//! and nesting deeper than the runtime limit so that anything imported can
//! actually be encoded.

use serde::{Deserialize, Serialize};

use crate::{
    errors::SchemaError,
    field::Field,
    kind::ScalarKind,
    limits::MAX_DEPTH,
    protocol::Protocol,
    registry::ProtocolId,
};

/// Host description of one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name
    pub name: String,

    /// Raw [`ScalarKind`] discriminant. Kept raw so that unknown kinds are
    /// reported by the importer rather than by the document parser.
    #[serde(rename = "type")]
    pub kind: i64,

    /// Array flag
    #[serde(default)]
    pub array: bool,

    /// Children of a message field. Absent means an empty message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pto: Option<Vec<FieldDescriptor>>,
}

impl FieldDescriptor {
    /// Scalar field descriptor.
    pub fn scalar(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self { name: name.into(), kind: i64::from(kind.to_u8()), array: false, pto: None }
    }

    /// Array field descriptor.
    pub fn array(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self { array: true, ..Self::scalar(name, kind) }
    }

    /// Message field descriptor.
    pub fn message(name: impl Into<String>, children: Vec<Self>) -> Self {
        Self { pto: Some(children), ..Self::scalar(name, ScalarKind::Message) }
    }

    /// Array-of-messages field descriptor.
    pub fn message_array(name: impl Into<String>, children: Vec<Self>) -> Self {
        Self { array: true, ..Self::message(name, children) }
    }
}

impl From<&Field> for FieldDescriptor {
    fn from(field: &Field) -> Self {
        let pto = (field.kind() == ScalarKind::Message)
            .then(|| field.children().iter().map(Self::from).collect());
        Self {
            name: field.name().to_string(),
            kind: i64::from(field.kind().to_u8()),
            array: field.is_array(),
            pto,
        }
    }
}

/// Host description of a whole protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolDescriptor {
    /// Numeric ID, validated against the 16-bit range on import
    pub id: i64,
    /// Protocol name
    pub name: String,
    /// Top-level fields in wire order
    pub fields: Vec<FieldDescriptor>,
}

impl ProtocolDescriptor {
    /// Describe an existing protocol.
    pub fn describe(id: ProtocolId, protocol: &Protocol) -> Self {
        Self {
            id: i64::from(id.get()),
            name: protocol.name().to_string(),
            fields: protocol.fields().iter().map(FieldDescriptor::from).collect(),
        }
    }

    /// Validate the ID and build the field tree.
    pub fn build(&self) -> Result<(ProtocolId, Protocol), SchemaError> {
        let id = ProtocolId::try_from(self.id)?;
        Ok((id, build_protocol(&self.name, &self.fields)?))
    }
}

/// Build a protocol from its top-level descriptors.
pub fn build_protocol(
    name: impl Into<String>,
    descriptors: &[FieldDescriptor],
) -> Result<Protocol, SchemaError> {
    Ok(Protocol::new(name, import_fields(descriptors)?))
}

/// Build field trees from descriptors, preserving order.
pub fn import_fields(descriptors: &[FieldDescriptor]) -> Result<Vec<Field>, SchemaError> {
    import_level(descriptors, 0)
}

fn import_level(descriptors: &[FieldDescriptor], depth: usize) -> Result<Vec<Field>, SchemaError> {
    descriptors.iter().map(|d| import_field(d, depth)).collect()
}

fn import_field(descriptor: &FieldDescriptor, depth: usize) -> Result<Field, SchemaError> {
    if descriptor.name.is_empty() {
        return Err(SchemaError::EmptyFieldName);
    }

    let kind = ScalarKind::from_discriminant(descriptor.kind).ok_or_else(|| {
        SchemaError::UnknownFieldKind { field: descriptor.name.clone(), kind: descriptor.kind }
    })?;

    let children = match (kind, &descriptor.pto) {
        (ScalarKind::Message, _) if depth + 1 > MAX_DEPTH => {
            return Err(SchemaError::TooDeep { field: descriptor.name.clone() });
        },
        (ScalarKind::Message, Some(children)) => import_level(children, depth + 1)?,
        _ => Vec::new(),
    };

    Ok(Field::from_parts(descriptor.name.clone(), kind, descriptor.array, children))
}
