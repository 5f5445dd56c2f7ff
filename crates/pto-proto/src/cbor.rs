//! CBOR host adapter.
//!
//! Lets a host that speaks CBOR hand over message values and schema
//! descriptors without writing its own glue. Values map as follows:
//!
//! | CBOR              | [`Value`]                         |
//! |-------------------|-----------------------------------|
//! | bool              | `Bool`                            |
//! | integer           | `Integer` (must fit in `i64`)     |
//! | float             | `Float`                           |
//! | text, bytes       | `Text`                            |
//! | map (text keys)   | `Record`; `null` members are absent |
//! | array             | `Sequence`                        |
//! | tag               | the tagged item                   |
//!
//! Going back, `Text` becomes a CBOR text string when it is valid UTF-8 and
//! a byte string otherwise.

use std::collections::BTreeMap;

use bytes::Bytes;
use ciborium::value::{Integer, Value as Cbor};
use thiserror::Error;

use crate::{descriptor::ProtocolDescriptor, errors::SchemaError, value::Value};

/// Failure converting between CBOR and [`Value`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CborError {
    /// Bytes were not a well-formed CBOR item
    #[error("malformed cbor: {0}")]
    Malformed(String),

    /// Item has no [`Value`] counterpart
    #[error("unsupported cbor item: {0}")]
    Unsupported(&'static str),

    /// Map key was not a text string
    #[error("record keys must be text strings")]
    NonTextKey,

    /// Integer does not fit in `i64`
    #[error("integer {0} does not fit in 64 bits")]
    IntegerOverflow(i128),
}

impl Value {
    /// Convert a CBOR item.
    pub fn from_cbor(item: &Cbor) -> Result<Self, CborError> {
        let value = match item {
            Cbor::Bool(b) => Self::Bool(*b),
            Cbor::Integer(i) => {
                let wide = i128::from(*i);
                Self::Integer(i64::try_from(wide).map_err(|_| CborError::IntegerOverflow(wide))?)
            },
            Cbor::Float(f) => Self::Float(*f),
            Cbor::Text(s) => Self::Text(Bytes::copy_from_slice(s.as_bytes())),
            Cbor::Bytes(b) => Self::Text(Bytes::copy_from_slice(b)),
            Cbor::Array(items) => {
                Self::Sequence(items.iter().map(Self::from_cbor).collect::<Result<_, _>>()?)
            },
            Cbor::Map(entries) => {
                let mut members = BTreeMap::new();
                for (key, member) in entries {
                    let Cbor::Text(key) = key else {
                        return Err(CborError::NonTextKey);
                    };
                    if member.is_null() {
                        continue;
                    }
                    members.insert(key.clone(), Self::from_cbor(member)?);
                }
                Self::Record(members)
            },
            Cbor::Tag(_, inner) => Self::from_cbor(inner)?,
            Cbor::Null => return Err(CborError::Unsupported("null")),
            _ => return Err(CborError::Unsupported("unknown item")),
        };
        Ok(value)
    }

    /// Convert to a CBOR item.
    pub fn to_cbor(&self) -> Cbor {
        match self {
            Self::Bool(b) => Cbor::Bool(*b),
            Self::Integer(i) => Cbor::Integer(Integer::from(*i)),
            Self::Float(f) => Cbor::Float(*f),
            Self::Text(bytes) => match std::str::from_utf8(bytes) {
                Ok(s) => Cbor::Text(s.to_string()),
                Err(_) => Cbor::Bytes(bytes.to_vec()),
            },
            Self::Record(members) => Cbor::Map(
                members.iter().map(|(k, v)| (Cbor::Text(k.clone()), v.to_cbor())).collect(),
            ),
            Self::Sequence(items) => Cbor::Array(items.iter().map(Self::to_cbor).collect()),
        }
    }

    /// Parse a CBOR document into a value.
    pub fn from_cbor_slice(bytes: &[u8]) -> Result<Self, CborError> {
        let item: Cbor =
            ciborium::de::from_reader(bytes).map_err(|e| CborError::Malformed(e.to_string()))?;
        Self::from_cbor(&item)
    }

    /// Serialize to a CBOR document.
    pub fn to_cbor_vec(&self) -> Result<Vec<u8>, CborError> {
        let mut out = Vec::new();
        ciborium::ser::into_writer(&self.to_cbor(), &mut out)
            .map_err(|e| CborError::Malformed(e.to_string()))?;
        Ok(out)
    }
}

impl ProtocolDescriptor {
    /// Parse a protocol descriptor from a CBOR document.
    pub fn from_cbor_slice(bytes: &[u8]) -> Result<Self, SchemaError> {
        ciborium::de::from_reader(bytes).map_err(|e| SchemaError::Document(e.to_string()))
    }

    /// Serialize to a CBOR document.
    pub fn to_cbor_vec(&self) -> Result<Vec<u8>, SchemaError> {
        let mut out = Vec::new();
        ciborium::ser::into_writer(self, &mut out)
            .map_err(|e| SchemaError::Document(e.to_string()))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{descriptor::FieldDescriptor, kind::ScalarKind, registry::Registry};

    fn map(entries: Vec<(&str, Cbor)>) -> Cbor {
        Cbor::Map(entries.into_iter().map(|(k, v)| (Cbor::Text(k.into()), v)).collect())
    }

    #[test]
    fn converts_nested_documents() {
        let item = map(vec![
            ("id", Cbor::Integer(42.into())),
            ("tags", Cbor::Array(vec![Cbor::Text("a".into()), Cbor::Bytes(vec![0xff])])),
            ("inner", map(vec![("on", Cbor::Bool(true))])),
        ]);
        let value = Value::from_cbor(&item).unwrap();

        assert_eq!(value.get("id"), Some(&Value::Integer(42)));
        let tags = value.get("tags").and_then(Value::as_sequence).unwrap();
        assert_eq!(tags[1].as_bytes(), Some(&[0xff][..]));
        assert_eq!(value.get("inner").and_then(|i| i.get("on")), Some(&Value::Bool(true)));
    }

    #[test]
    fn null_members_are_absent() {
        let item = map(vec![("x", Cbor::Null), ("y", Cbor::Bool(false))]);
        let value = Value::from_cbor(&item).unwrap();
        assert_eq!(value.get("x"), None);
        assert_eq!(value.as_record().map(BTreeMap::len), Some(1));
    }

    #[test]
    fn rejects_what_values_cannot_hold() {
        assert_eq!(Value::from_cbor(&Cbor::Null), Err(CborError::Unsupported("null")));
        assert_eq!(
            Value::from_cbor(&Cbor::Map(vec![(Cbor::Integer(1.into()), Cbor::Bool(true))])),
            Err(CborError::NonTextKey)
        );
        assert_eq!(
            Value::from_cbor(&Cbor::Integer(u64::MAX.into())),
            Err(CborError::IntegerOverflow(i128::from(u64::MAX)))
        );
    }

    #[test]
    fn text_falls_back_to_bytes() {
        assert_eq!(Value::text("ok").to_cbor(), Cbor::Text("ok".into()));
        assert_eq!(Value::text(vec![0xc3, 0x28]).to_cbor(), Cbor::Bytes(vec![0xc3, 0x28]));
    }

    #[test]
    fn document_round_trip() {
        let value = Value::record([
            ("n", Value::Integer(-7)),
            ("xs", Value::sequence([Value::Float(0.5), Value::Float(2.0)])),
        ]);
        let doc = value.to_cbor_vec().unwrap();
        assert_eq!(Value::from_cbor_slice(&doc), Ok(value));
    }

    #[test]
    fn descriptor_document_imports() {
        let desc = ProtocolDescriptor {
            id: 100,
            name: "login".into(),
            fields: vec![
                FieldDescriptor::scalar("user", ScalarKind::String),
                FieldDescriptor::array("flags", ScalarKind::Bool),
            ],
        };
        let doc = desc.to_cbor_vec().unwrap();
        let parsed = ProtocolDescriptor::from_cbor_slice(&doc).unwrap();
        assert_eq!(parsed, desc);

        let mut registry = Registry::new();
        let id = registry.import_descriptor(&parsed).unwrap();
        assert_eq!(registry.get(id.get()).map(|p| p.fields().len()), Some(2));
    }

    #[test]
    fn descriptor_document_garbage() {
        assert!(matches!(
            ProtocolDescriptor::from_cbor_slice(&[0xff, 0x00]),
            Err(SchemaError::Document(_))
        ));
    }
}
