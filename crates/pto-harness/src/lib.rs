//! Test support for the pto wire format.
//!
//! Proptest strategies for arbitrary schemas and values that conform to
//! them, a seeded generator for reproducible stress runs, structured fuzz
//! inputs, and a reference model of the codec for model-based testing.
//!
//! # Architecture
//!
//! ```text
//! strategy / seeded / fuzz_input  ──>  (Protocol, Value)
//!                                            │
//!                          ┌─────────────────┴─────────────────┐
//!                          ▼                                   ▼
//!                    ModelRegistry                       pto_proto::Registry
//!                     (reference)                            (real)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fuzz_input;
pub mod model;
pub mod seeded;
pub mod strategy;

pub use fuzz_input::FuzzCase;
pub use model::{
    ModelRegistry, Operation, OperationError, OperationResult, predicted_len, reference_decode,
    reference_encode, same_value,
};
pub use seeded::ValueGen;
pub use strategy::{arb_field, arb_protocol, arb_protocol_and_value, record_for, value_for};
