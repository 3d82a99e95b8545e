//! Trios Circuit Intermediate Representation
//!
//! This crate provides the dependency-graph representation that the Trios
//! router and decomposition passes operate on.
//!
//! # Overview
//!
//! A program is a DAG whose operation nodes reference one to three qubit
//! wires. An edge from `A` to `B` on wire `q` means `B` is the next
//! operation on `q` after `A`. The high-level [`Circuit`] API provides a
//! builder on top of [`CircuitDag`].
//!
//! # Core Components
//!
//! - **Qubits**: [`QubitId`] addresses a wire (logical before layout,
//!   physical after)
//! - **Gates**: [`StandardGate`] for built-in gates and [`CustomGate`] for
//!   opaque operations; [`Gate::native`] marks calibrated hardware gates
//! - **Instructions**: [`Instruction`] combining gates with their operands
//! - **DAG**: [`CircuitDag`] with stable node indices, per-wire navigation
//!   and in-place block replacement
//! - **Circuit**: [`Circuit`] high-level builder API
//!
//! # Example
//!
//! ```rust
//! use trios_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("toffoli", 3);
//! circuit.ccx(QubitId(0), QubitId(1), QubitId(2)).unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 3);
//! assert_eq!(circuit.dag().ops_with_arity(3).len(), 1);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `H` | 1 | Hadamard gate |
//! | `X`, `Y`, `Z` | 1 | Pauli gates |
//! | `S`, `Sdg` | 1 | S and S-dagger gates |
//! | `T`, `Tdg` | 1 | T and T-dagger gates |
//! | `SX`, `SXdg` | 1 | sqrt(X) and its inverse |
//! | `CX` | 2 | Controlled-NOT (CNOT) |
//! | `CZ` | 2 | Controlled-Z |
//! | `Swap` | 2 | SWAP gate |
//! | `CCX` | 3 | Toffoli (CCNOT) gate |
//! | `CSwap` | 3 | Fredkin gate |

pub mod circuit;
pub mod dag;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::Circuit;
pub use dag::{CircuitDag, CircuitLevel, DagEdge, DagNode, NodeIndex};
pub use error::{IrError, IrResult};
pub use gate::{CustomGate, Gate, GateKind, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{Qubit, QubitId};
