//! Dynamic values exchanged with the host.
//!
//! The host's own dynamic type (script tables, CBOR documents, ...) is adapted
//! into [`Value`] at the boundary. The engines only need kind tests, member
//! lookup by name, and sequence length/indexing.

use std::collections::BTreeMap;

use bytes::Bytes;

/// A structured dynamic value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean
    Bool(bool),
    /// Signed integer
    Integer(i64),
    /// Floating point number
    Float(f64),
    /// Byte string (not necessarily UTF-8)
    Text(Bytes),
    /// Record keyed by field name
    Record(BTreeMap<String, Value>),
    /// Homogeneous sequence, used for array fields
    Sequence(Vec<Value>),
}

/// Kind of a [`Value`], or [`ValueKind::Nil`] for an absent member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// No value
    Nil,
    /// [`Value::Bool`]
    Bool,
    /// [`Value::Integer`]
    Integer,
    /// [`Value::Float`]
    Float,
    /// [`Value::Text`]
    Text,
    /// [`Value::Record`]
    Record,
    /// [`Value::Sequence`]
    Sequence,
}

impl ValueKind {
    /// Kind of an optional value.
    pub fn of(value: Option<&Value>) -> Self {
        value.map_or(Self::Nil, Value::kind)
    }

    /// Name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Text => "string",
            Self::Record => "record",
            Self::Sequence => "sequence",
        }
    }

    /// Integer or float.
    pub fn is_number(self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }
}

impl Value {
    /// Build a record from `(name, value)` pairs.
    pub fn record<K, I>(members: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Self)>,
    {
        Self::Record(members.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a sequence.
    pub fn sequence<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Self>,
    {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }

    /// Build a byte string.
    pub fn text(bytes: impl Into<Bytes>) -> Self {
        Self::Text(bytes.into())
    }

    /// Kind tag.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Integer(_) => ValueKind::Integer,
            Self::Float(_) => ValueKind::Float,
            Self::Text(_) => ValueKind::Text,
            Self::Record(_) => ValueKind::Record,
            Self::Sequence(_) => ValueKind::Sequence,
        }
    }

    /// Whether this is an integer or float.
    pub fn is_number(&self) -> bool {
        self.kind().is_number()
    }

    /// Boolean payload.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer payload. Floats are not converted.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric payload as `f64`, converting integers.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Raw bytes of a string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Text(b) => Some(b),
            _ => None,
        }
    }

    /// String as UTF-8, `None` if not a string or not valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Record members.
    pub fn as_record(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Record(m) => Some(m),
            _ => None,
        }
    }

    /// Sequence elements.
    pub fn as_sequence(&self) -> Option<&[Self]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Record member by name. `None` for missing members and non-records.
    pub fn get(&self, name: &str) -> Option<&Self> {
        self.as_record().and_then(|m| m.get(name))
    }

    /// Sequence element by index.
    pub fn index(&self, i: usize) -> Option<&Self> {
        self.as_sequence().and_then(|items| items.get(i))
    }

    /// Sequence length, `None` for non-sequences.
    pub fn sequence_len(&self) -> Option<usize> {
        self.as_sequence().map(<[Self]>::len)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<i16> for Value {
    fn from(n: i16) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Self::Float(f64::from(f))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(Bytes::from(s))
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Self::Text(b)
    }
}

impl From<Vec<Self>> for Value {
    fn from(items: Vec<Self>) -> Self {
        Self::Sequence(items)
    }
}

impl From<BTreeMap<String, Self>> for Value {
    fn from(members: BTreeMap<String, Self>) -> Self {
        Self::Record(members)
    }
}
