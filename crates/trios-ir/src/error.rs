//! Error types for the IR crate.

use crate::qubit::QubitId;
use thiserror::Error;

/// Errors raised while building or rewriting a dependency graph.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// An operand names a wire the graph does not have.
    #[error("'{op}' acts on unknown wire {qubit}")]
    UnknownWire { qubit: QubitId, op: String },

    /// Operand count differs from the gate's arity.
    #[error("'{op}' takes {expected} operands, got {got}")]
    ArityMismatch {
        op: String,
        expected: usize,
        got: usize,
    },

    /// The same wire appears twice among one operation's operands.
    #[error("'{op}' repeats operand {qubit}")]
    RepeatedOperand { qubit: QubitId, op: String },

    /// The node does not exist or is not an operation.
    #[error("Invalid node index")]
    InvalidNode,

    /// The wire structure is inconsistent.
    #[error("Broken graph: {0}")]
    BrokenGraph(String),

    /// A block replacement acts on a wire the block does not touch.
    #[error("Replacement touches wire {qubit} outside the replaced block")]
    ForeignWire { qubit: QubitId },
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
