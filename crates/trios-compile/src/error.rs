//! Error types for the compilation crate.

use thiserror::Error;

/// Errors that can occur during compilation.
///
/// Every variant is fatal for the running pass. An unsatisfied adjacency
/// found by [`CheckMap`](crate::passes::CheckMap) is not an error; it is
/// reported as data in [`AdjacencyReport`](crate::passes::AdjacencyReport).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// Error from the IR crate.
    #[error("IR error: {0}")]
    Ir(#[from] trios_ir::IrError),

    /// Missing coupling map for a target pass.
    #[error("Missing coupling map for routing")]
    MissingCouplingMap,

    /// Missing layout for a target pass.
    #[error("Missing layout for routing")]
    MissingLayout,

    /// The graph contains an operation the target passes cannot handle.
    #[error("Structural violation: {0}")]
    StructuralViolation(String),

    /// More logical resources than the topology provides.
    #[error("Circuit requires {required} qubits but target only has {available}")]
    CapacityExceeded { required: usize, available: u32 },

    /// Two physical resources are not connected on the topology.
    #[error("No path between physical qubits {from} and {to}")]
    UnreachableTopology { from: u32, to: u32 },

    /// An adjacency class has neither a matching variant nor a canonical one.
    #[error("No decomposition variant defined for {0}")]
    UndefinedVariant(String),

    /// A rewriting pass met an operation whose operands are not adjacent.
    #[error("Gate '{gate}' on physical qubits {qubits:?} is not adjacent on the target")]
    NotAdjacent { gate: String, qubits: Vec<u32> },

    /// A user-provided layout is not a bijection onto the register.
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// Invalid pass configuration.
    #[error("Invalid pass configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
