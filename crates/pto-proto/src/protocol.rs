//! Protocol: a named, ordered list of top-level fields.

use crate::field::Field;

/// Schema for one message type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Protocol {
    name: String,
    fields: Vec<Field>,
}

impl Protocol {
    /// Create a protocol from its top-level fields.
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self { name: name.into(), fields }
    }

    /// Protocol name, used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Top-level fields in declared (wire) order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Top-level field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Deepest message nesting of any field.
    pub fn max_depth(&self) -> usize {
        self.fields.iter().map(Field::depth).max().unwrap_or(0)
    }

    /// Total number of fields in the tree, nested ones included.
    pub fn field_count(&self) -> usize {
        let mut count = 0;
        for field in &self.fields {
            field.walk(0, &mut |_, _| count += 1);
        }
        count
    }
}
