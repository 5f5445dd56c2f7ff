//! Seeded schema and value generation.
//!
//! Deterministic counterpart to the proptest strategies for long-running
//! stress loops: one `u64` seed reproduces the whole run.

use std::collections::HashSet;

use pto_proto::{Field, Protocol, ScalarKind, Value, limits::MAX_INT_MAGNITUDE};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::strategy::{MAX_CHILDREN, MAX_ELEMENTS};

const NAMES: [&str; 8] = ["id", "name", "flags", "items", "pos", "hp", "owner", "tags"];

/// Seeded generator of protocols and conforming values.
#[derive(Debug, Clone)]
pub struct ValueGen {
    rng: ChaCha8Rng,
}

impl ValueGen {
    /// Generator seeded with `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Random protocol nesting at most `depth` message levels.
    pub fn protocol(&mut self, name: &str, depth: usize) -> Protocol {
        let fields = self.fields(depth);
        Protocol::new(name, fields)
    }

    fn fields(&mut self, depth: usize) -> Vec<Field> {
        let count = self.rng.gen_range(0..=MAX_CHILDREN);
        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(count);

        for _ in 0..count {
            let name = NAMES[self.rng.gen_range(0..NAMES.len())];
            if !seen.insert(name) {
                continue;
            }

            let array = self.rng.gen_bool(0.3);
            let kind = ScalarKind::ALL[self.rng.gen_range(0..ScalarKind::ALL.len())];
            let field = match kind {
                ScalarKind::Message if depth > 0 => {
                    let children = self.fields(depth - 1);
                    if array {
                        Field::message_array(name, children)
                    } else {
                        Field::message(name, children)
                    }
                },
                ScalarKind::Message => Field::scalar(name, ScalarKind::Int),
                kind if array => Field::array(name, kind),
                kind => Field::scalar(name, kind),
            };
            fields.push(field);
        }
        fields
    }

    /// Random value conforming to `protocol`.
    pub fn record_for(&mut self, protocol: &Protocol) -> Value {
        self.record(protocol.fields())
    }

    fn record(&mut self, fields: &[Field]) -> Value {
        Value::record(fields.iter().map(|f| (f.name(), self.member(f))).collect::<Vec<_>>())
    }

    fn member(&mut self, field: &Field) -> Value {
        if !field.is_array() {
            return self.element(field);
        }
        let len = self.rng.gen_range(0..=MAX_ELEMENTS);
        Value::Sequence((0..len).map(|_| self.element(field)).collect())
    }

    fn element(&mut self, field: &Field) -> Value {
        let magnitude = MAX_INT_MAGNITUDE as i64;
        match field.kind() {
            ScalarKind::Bool => Value::Bool(self.rng.r#gen()),
            ScalarKind::Short => Value::from(self.rng.r#gen::<i16>()),
            ScalarKind::Int => Value::Integer(self.rng.gen_range(-magnitude..=magnitude)),
            ScalarKind::Float => Value::Float(f64::from(self.rng.gen_range(-1e6f32..1e6))),
            ScalarKind::Double => Value::Float(self.rng.gen_range(-1e12..1e12)),
            ScalarKind::String => {
                let len = self.rng.gen_range(0..16);
                Value::text((0..len).map(|_| self.rng.r#gen::<u8>()).collect::<Vec<_>>())
            },
            ScalarKind::Message => self.record(field.children()),
        }
    }
}
