//! Proptest strategies for schemas and schema-conforming values.
//!
//! Generated field trees never repeat a name among siblings, since a record
//! holds one member per name. Float values are drawn from `f32` so that they
//! survive the narrowing on the wire.

use std::collections::HashSet;

use proptest::{collection::vec, prelude::*};
use pto_proto::{Field, Protocol, ScalarKind, Value, limits::MAX_INT_MAGNITUDE};

/// Most children per message.
pub const MAX_CHILDREN: usize = 4;

/// Most elements per generated array.
pub const MAX_ELEMENTS: usize = 4;

/// Field or protocol name.
pub fn arb_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}"
}

/// Any non-message kind.
pub fn arb_scalar_kind() -> impl Strategy<Value = ScalarKind> {
    prop_oneof![
        Just(ScalarKind::Bool),
        Just(ScalarKind::Short),
        Just(ScalarKind::Int),
        Just(ScalarKind::Float),
        Just(ScalarKind::Double),
        Just(ScalarKind::String),
    ]
}

/// Field trees with at most `depth` message levels.
pub fn arb_field(depth: u32) -> impl Strategy<Value = Field> {
    let leaf = (arb_name(), arb_scalar_kind(), any::<bool>()).prop_map(|(name, kind, array)| {
        if array { Field::array(name, kind) } else { Field::scalar(name, kind) }
    });

    leaf.prop_recursive(depth, 32, MAX_CHILDREN as u32, |inner| {
        (arb_name(), vec(inner, 0..MAX_CHILDREN), any::<bool>()).prop_map(
            |(name, children, array)| {
                let children = unique_names(children);
                if array {
                    Field::message_array(name, children)
                } else {
                    Field::message(name, children)
                }
            },
        )
    })
}

/// Protocols with up to six top-level fields, three message levels deep.
pub fn arb_protocol() -> impl Strategy<Value = Protocol> {
    (arb_name(), vec(arb_field(3), 0..6))
        .prop_map(|(name, fields)| Protocol::new(name, unique_names(fields)))
}

/// A protocol together with a value that conforms to it.
pub fn arb_protocol_and_value() -> impl Strategy<Value = (Protocol, Value)> {
    arb_protocol().prop_flat_map(|protocol| {
        let value = record_for(protocol.fields());
        (Just(protocol), value)
    })
}

/// Records conforming to `fields`.
pub fn record_for(fields: &[Field]) -> BoxedStrategy<Value> {
    let names: Vec<String> = fields.iter().map(|f| f.name().to_string()).collect();
    let members: Vec<BoxedStrategy<Value>> = fields.iter().map(value_for).collect();

    members
        .prop_map(move |values| Value::record(names.iter().cloned().zip(values)))
        .boxed()
}

/// Values conforming to one field, arrays included.
pub fn value_for(field: &Field) -> BoxedStrategy<Value> {
    let element = element_for(field);
    if field.is_array() {
        vec(element, 0..MAX_ELEMENTS).prop_map(Value::Sequence).boxed()
    } else {
        element
    }
}

fn element_for(field: &Field) -> BoxedStrategy<Value> {
    let magnitude = MAX_INT_MAGNITUDE as i64;
    match field.kind() {
        ScalarKind::Bool => any::<bool>().prop_map(Value::Bool).boxed(),
        ScalarKind::Short => any::<i16>().prop_map(Value::from).boxed(),
        ScalarKind::Int => (-magnitude..=magnitude).prop_map(Value::Integer).boxed(),
        ScalarKind::Float => (-1e6f32..1e6).prop_map(|f| Value::Float(f64::from(f))).boxed(),
        ScalarKind::Double => (-1e12f64..1e12).prop_map(Value::Float).boxed(),
        ScalarKind::String => vec(any::<u8>(), 0..16).prop_map(Value::text).boxed(),
        ScalarKind::Message => record_for(field.children()),
    }
}

/// Keep the first field of each name.
pub fn unique_names(fields: Vec<Field>) -> Vec<Field> {
    let mut seen = HashSet::new();
    fields.into_iter().filter(|f| seen.insert(f.name().to_string())).collect()
}
