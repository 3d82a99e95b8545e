//! Target-agnostic compilation passes.
//!
//! These passes operate purely on the DAG structure without consulting
//! the coupling map. They are safe to run on any circuit.

pub mod cancel;
pub mod unroll;

pub use cancel::InverseCancellation;
pub use unroll::UnrollMultiQubit;
