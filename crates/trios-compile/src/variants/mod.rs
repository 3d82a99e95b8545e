//! Decomposition variant library.
//!
//! A variant is a fixed sequence of elementary [`Step`]s over operand
//! indices. Binding a sequence to the physical operands of a node yields the
//! replacement instructions. Every sequence in this module is exactly equal
//! to the gate it replaces, not merely up to a global phase.
//!
//! - [`toffoli`]: context-keyed CCX sequences and one canonical sequence per
//!   adjacency class.
//! - [`two_qubit`]: orientation-aware CX, SWAP and bridge sequences.

pub mod toffoli;
pub mod two_qubit;

use std::fmt;

use serde::{Deserialize, Serialize};
use trios_ir::{Instruction, QubitId, StandardGate};

use crate::error::{CompileError, CompileResult};

pub use toffoli::ToffoliLibrary;
pub use two_qubit::{Boundary, SwapVariant};

/// One elementary gate of a variant, addressed by operand index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    /// Hadamard.
    H(u8),
    /// T gate.
    T(u8),
    /// T-dagger gate.
    Tdg(u8),
    /// CX with (control, target).
    Cx(u8, u8),
}

impl Step {
    /// Bind this step to concrete operands.
    ///
    /// Fails with [`CompileError::UndefinedVariant`] when the step addresses
    /// an operand index outside `operands`, which only a user-supplied table
    /// can do.
    pub fn bind(self, operands: &[QubitId]) -> CompileResult<Instruction> {
        let q = |i: u8| {
            operands.get(usize::from(i)).copied().ok_or_else(|| {
                CompileError::UndefinedVariant(format!(
                    "step {self:?} addresses operand {i} of {}",
                    operands.len()
                ))
            })
        };
        Ok(match self {
            Step::H(i) => Instruction::single_qubit_gate(StandardGate::H, q(i)?),
            Step::T(i) => Instruction::single_qubit_gate(StandardGate::T, q(i)?),
            Step::Tdg(i) => Instruction::single_qubit_gate(StandardGate::Tdg, q(i)?),
            Step::Cx(c, t) => Instruction::two_qubit_gate(StandardGate::CX, q(c)?, q(t)?),
        })
    }

    /// Check if this step is a CX.
    pub fn is_cx(self) -> bool {
        matches!(self, Step::Cx(..))
    }
}

/// Bind a whole sequence to concrete operands.
pub fn bind_steps(steps: &[Step], operands: &[QubitId]) -> CompileResult<Vec<Instruction>> {
    steps.iter().map(|s| s.bind(operands)).collect()
}

/// Number of CX gates in a sequence.
pub fn cx_count(steps: &[Step]) -> usize {
    steps.iter().filter(|s| s.is_cx()).count()
}

/// An ordered operand-index pair, as used by a neighbouring CX-like block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OperandPair {
    /// Operand index acting as control.
    pub control: u8,
    /// Operand index acting as target.
    pub target: u8,
}

impl OperandPair {
    /// Create a new pair.
    pub const fn new(control: u8, target: u8) -> Self {
        Self { control, target }
    }

    /// The same two operands with the roles exchanged.
    #[must_use]
    pub const fn reversed(self) -> Self {
        Self {
            control: self.target,
            target: self.control,
        }
    }
}

impl fmt::Display for OperandPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.control, self.target)
    }
}

/// Which operand pairs of a three-operand gate are physically adjacent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AdjacencyClass {
    /// All three pairs are adjacent.
    Full,
    /// Only the operand at this index is adjacent to both others.
    Pivot(u8),
}

impl fmt::Display for AdjacencyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdjacencyClass::Full => write!(f, "full"),
            AdjacencyClass::Pivot(i) => write!(f, "pivot on operand {i}"),
        }
    }
}

/// Which side of a variant is shaped to cancel against a neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Bias {
    /// The sequence opens with a block that cancels the preceding operation.
    Predecessor,
    /// The sequence closes with a block that cancels the following operation.
    Successor,
}

impl Bias {
    /// The opposite side.
    pub fn other(self) -> Self {
        match self {
            Bias::Predecessor => Bias::Successor,
            Bias::Successor => Bias::Predecessor,
        }
    }
}

/// Neighbourhood context identifying one CCX variant.
///
/// Ordering is lexicographic over the fields in declaration order, with
/// `None` before any pattern. The fallback search uses it as the final
/// tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SelectorKey {
    /// Pattern of the block at the start of the sequence.
    pub predecessor: Option<OperandPair>,
    /// Pattern of the block at the end of the sequence.
    pub successor: Option<OperandPair>,
    /// Adjacency class of the operands.
    pub class: AdjacencyClass,
    /// Which side is biased.
    pub bias: Bias,
}

impl SelectorKey {
    /// A key with no neighbourhood context.
    pub const fn bare(class: AdjacencyClass, bias: Bias) -> Self {
        Self {
            predecessor: None,
            successor: None,
            class,
            bias,
        }
    }

    /// The pattern on one side.
    pub fn pattern(&self, side: Bias) -> Option<OperandPair> {
        match side {
            Bias::Predecessor => self.predecessor,
            Bias::Successor => self.successor,
        }
    }

    /// Whether any neighbourhood context is present.
    pub fn has_context(&self) -> bool {
        self.predecessor.is_some() || self.successor.is_some()
    }
}

impl fmt::Display for SelectorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |p: Option<OperandPair>| p.map_or_else(|| "-".to_string(), |p| p.to_string());
        write!(
            f,
            "pred={} succ={} {} {:?}",
            side(self.predecessor),
            side(self.successor),
            self.class,
            self.bias
        )
    }
}

/// The sequence a lookup settled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariantChoice {
    /// A keyed table entry.
    Keyed(SelectorKey),
    /// The canonical sequence of a class.
    Canonical(AdjacencyClass),
}

impl fmt::Display for VariantChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantChoice::Keyed(key) => write!(f, "keyed [{key}]"),
            VariantChoice::Canonical(class) => write!(f, "canonical {class}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_steps() {
        let operands = [QubitId(4), QubitId(2), QubitId(7)];
        let bound = bind_steps(&[Step::H(2), Step::Cx(0, 1)], &operands).unwrap();
        assert_eq!(bound[0].qubits, vec![QubitId(7)]);
        assert_eq!(bound[0].standard_gate(), Some(StandardGate::H));
        assert_eq!(bound[1].qubits, vec![QubitId(4), QubitId(2)]);
        assert_eq!(bound[1].standard_gate(), Some(StandardGate::CX));
    }

    #[test]
    fn test_bind_out_of_range_operand() {
        let operands = [QubitId(0), QubitId(1), QubitId(2)];
        let err = bind_steps(&[Step::H(0), Step::Cx(1, 3)], &operands).unwrap_err();
        assert!(matches!(err, CompileError::UndefinedVariant(_)));
        assert!(err.to_string().contains("operand 3 of 3"));
    }

    #[test]
    fn test_key_order_puts_none_first() {
        let bare = SelectorKey::bare(AdjacencyClass::Full, Bias::Predecessor);
        let keyed = SelectorKey {
            predecessor: Some(OperandPair::new(0, 1)),
            ..bare
        };
        assert!(bare < keyed);
        assert!(keyed.has_context());
        assert!(!bare.has_context());
    }

    #[test]
    fn test_display() {
        let key = SelectorKey {
            predecessor: None,
            successor: Some(OperandPair::new(0, 1)),
            class: AdjacencyClass::Pivot(1),
            bias: Bias::Successor,
        };
        assert_eq!(key.to_string(), "pred=- succ=(0, 1) pivot on operand 1 Successor");
        assert_eq!(
            VariantChoice::Canonical(AdjacencyClass::Full).to_string(),
            "canonical full"
        );
    }
}
