//! Field tree.
//!
//! Each [`Field`] owns its children outright. The tree has no sharing and no
//! back-edges, so dropping a [`crate::Protocol`] releases the whole subtree.

use crate::kind::ScalarKind;

/// One named element of a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
    kind: ScalarKind,
    array: bool,
    /// Non-empty only for [`ScalarKind::Message`]
    children: Vec<Field>,
}

impl Field {
    /// Single scalar field.
    ///
    /// Passing [`ScalarKind::Message`] yields a message with no children,
    /// which encodes as an empty record.
    pub fn scalar(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self { name: name.into(), kind, array: false, children: Vec::new() }
    }

    /// Array of scalars.
    pub fn array(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self { name: name.into(), kind, array: true, children: Vec::new() }
    }

    /// Nested record.
    pub fn message(name: impl Into<String>, children: Vec<Self>) -> Self {
        Self { name: name.into(), kind: ScalarKind::Message, array: false, children }
    }

    /// Array of nested records.
    pub fn message_array(name: impl Into<String>, children: Vec<Self>) -> Self {
        Self { name: name.into(), kind: ScalarKind::Message, array: true, children }
    }

    /// Build from parts. Children are discarded for non-message kinds.
    pub(crate) fn from_parts(
        name: String,
        kind: ScalarKind,
        array: bool,
        children: Vec<Self>,
    ) -> Self {
        let children = if kind == ScalarKind::Message { children } else { Vec::new() };
        Self { name, kind, array, children }
    }

    /// Field name, the key looked up in records.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scalar kind.
    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// Whether the field is an array of `kind`.
    pub fn is_array(&self) -> bool {
        self.array
    }

    /// Child fields in declared order. Empty unless this is a message.
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Child field by name.
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Message nesting height of this subtree.
    ///
    /// Zero for non-message fields, otherwise one more than the deepest child.
    pub fn depth(&self) -> usize {
        if self.kind != ScalarKind::Message {
            return 0;
        }
        1 + self.children.iter().map(Self::depth).max().unwrap_or(0)
    }

    /// Visit this field and every descendant, pre-order.
    ///
    /// `visit` receives each field with its message nesting level, where this
    /// field is at `level`.
    pub fn walk<F>(&self, level: usize, visit: &mut F)
    where
        F: FnMut(&Self, usize),
    {
        visit(self, level);
        for child in &self.children {
            child.walk(level + 1, visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point() -> Field {
        Field::message(
            "point",
            vec![Field::scalar("x", ScalarKind::Float), Field::scalar("y", ScalarKind::Float)],
        )
    }

    #[test]
    fn scalar_fields_have_no_children() {
        let field = Field::from_parts(
            "n".into(),
            ScalarKind::Int,
            false,
            vec![Field::scalar("ignored", ScalarKind::Bool)],
        );
        assert!(field.children().is_empty());
        assert_eq!(field.depth(), 0);
    }

    #[test]
    fn depth_counts_message_levels() {
        let nested = Field::message("outer", vec![Field::message_array("points", vec![point()])]);
        assert_eq!(point().depth(), 1);
        assert_eq!(nested.depth(), 3);
        assert_eq!(Field::message("empty", Vec::new()).depth(), 1);
    }

    #[test]
    fn walk_visits_pre_order() {
        let tree = Field::message("outer", vec![point(), Field::scalar("tag", ScalarKind::String)]);
        let mut seen = Vec::new();
        tree.walk(0, &mut |f, level| seen.push((f.name().to_string(), level)));

        let names: Vec<_> = seen.iter().map(|(n, l)| format!("{n}@{l}")).collect();
        assert_eq!(names, ["outer@0", "point@1", "x@2", "y@2", "tag@1"]);
    }

    #[test]
    fn child_lookup() {
        let p = point();
        assert_eq!(p.child("y").map(Field::kind), Some(ScalarKind::Float));
        assert!(p.child("z").is_none());
    }
}
