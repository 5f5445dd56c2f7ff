//! Scalar kinds.
//!
//! Discriminants are part of the host contract: schema descriptors carry the
//! kind as a small integer, so the values below must never be renumbered.

/// Wire kind of a field.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// One byte, 0 or 1
    Bool = 0,
    /// Two-byte signed integer
    Short = 1,
    /// Tagged variable-length signed integer, magnitude up to `2^56 - 1`
    Int = 2,
    /// Four-byte IEEE 754 float
    Float = 3,
    /// Eight-byte IEEE 754 float
    Double = 4,
    /// `u16` length followed by raw bytes
    String = 5,
    /// Nested record described by the field's children
    Message = 6,
}

impl ScalarKind {
    /// All kinds in discriminant order.
    pub const ALL: [Self; 7] = [
        Self::Bool,
        Self::Short,
        Self::Int,
        Self::Float,
        Self::Double,
        Self::String,
        Self::Message,
    ];

    /// Discriminant as used by schema descriptors.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Kind for a raw discriminant, `None` if unknown.
    pub fn from_discriminant(raw: i64) -> Option<Self> {
        match raw {
            0 => Some(Self::Bool),
            1 => Some(Self::Short),
            2 => Some(Self::Int),
            3 => Some(Self::Float),
            4 => Some(Self::Double),
            5 => Some(Self::String),
            6 => Some(Self::Message),
            _ => None,
        }
    }

    /// Width on the wire for fixed-size kinds, `None` for varint, string and
    /// message.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            Self::Bool => Some(1),
            Self::Short => Some(2),
            Self::Float => Some(4),
            Self::Double => Some(8),
            Self::Int | Self::String | Self::Message => None,
        }
    }

    /// Lowercase name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Short => "short",
            Self::Int => "int",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
            Self::Message => "table",
        }
    }
}

impl TryFrom<u8> for ScalarKind {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::from_discriminant(i64::from(raw)).ok_or(raw)
    }
}

impl std::fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
