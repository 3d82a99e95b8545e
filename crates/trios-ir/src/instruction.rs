//! Nodes of the dependency graph: a gate or a barrier on ordered wires.

use serde::{Deserialize, Serialize};

use crate::gate::{Gate, StandardGate};
use crate::qubit::QubitId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    Gate(Gate),
    /// Orders the wires it touches. Never rewritten or cancelled across.
    Barrier,
}

/// An operation with its operands.
///
/// Operand order is semantic: controls come before the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub kind: InstructionKind,
    pub qubits: Vec<QubitId>,
}

impl Instruction {
    pub fn gate(gate: impl Into<Gate>, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Gate(gate.into()),
            qubits: qubits.into_iter().collect(),
        }
    }

    pub fn single_qubit_gate(gate: StandardGate, qubit: QubitId) -> Self {
        Self::gate(gate, [qubit])
    }

    /// Operands in `(control, target)` order for CX.
    pub fn two_qubit_gate(gate: StandardGate, q1: QubitId, q2: QubitId) -> Self {
        Self::gate(gate, [q1, q2])
    }

    pub fn three_qubit_gate(gate: StandardGate, q1: QubitId, q2: QubitId, q3: QubitId) -> Self {
        Self::gate(gate, [q1, q2, q3])
    }

    pub fn barrier(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Barrier,
            qubits: qubits.into_iter().collect(),
        }
    }

    pub fn is_gate(&self) -> bool {
        matches!(self.kind, InstructionKind::Gate(_))
    }

    pub fn is_barrier(&self) -> bool {
        matches!(self.kind, InstructionKind::Barrier)
    }

    /// Whether this is a gate marked native.
    pub fn is_native(&self) -> bool {
        self.as_gate().is_some_and(|g| g.native)
    }

    pub fn as_gate(&self) -> Option<&Gate> {
        if let InstructionKind::Gate(gate) = &self.kind {
            Some(gate)
        } else {
            None
        }
    }

    /// The standard gate, if this is a standard gate instruction.
    pub fn standard_gate(&self) -> Option<StandardGate> {
        self.as_gate().and_then(Gate::as_standard)
    }

    /// Check whether this is a non-native instance of `gate`.
    ///
    /// Rewriting passes use this to select their candidates.
    pub fn is_rewritable(&self, gate: StandardGate) -> bool {
        self.as_gate()
            .is_some_and(|g| !g.native && g.as_standard() == Some(gate))
    }

    /// Lower-case gate name, or `"barrier"`.
    pub fn name(&self) -> &str {
        self.as_gate().map_or("barrier", Gate::name)
    }

    /// Number of operands.
    pub fn arity(&self) -> usize {
        self.qubits.len()
    }

    /// Return a copy with every operand passed through `f`.
    #[must_use]
    pub fn remapped(&self, mut f: impl FnMut(QubitId) -> QubitId) -> Self {
        Self {
            kind: self.kind.clone(),
            qubits: self.qubits.iter().map(|&q| f(q)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_instruction() {
        let inst = Instruction::single_qubit_gate(StandardGate::H, QubitId(0));
        assert!(inst.is_gate());
        assert_eq!(inst.qubits.len(), 1);
        assert_eq!(inst.name(), "h");
    }

    #[test]
    fn test_barrier_instruction() {
        let inst = Instruction::barrier([QubitId(0), QubitId(1), QubitId(2)]);
        assert!(inst.is_barrier());
        assert_eq!(inst.arity(), 3);
        assert_eq!(inst.standard_gate(), None);
    }

    #[test]
    fn test_native_is_not_rewritable() {
        let plain = Instruction::three_qubit_gate(StandardGate::CCX, QubitId(0), QubitId(1), QubitId(2));
        assert!(plain.is_rewritable(StandardGate::CCX));
        assert!(!plain.is_rewritable(StandardGate::CX));

        let native = Instruction::gate(
            Gate::standard(StandardGate::CCX).as_native(),
            [QubitId(0), QubitId(1), QubitId(2)],
        );
        assert!(native.is_native());
        assert!(!native.is_rewritable(StandardGate::CCX));
    }

    #[test]
    fn test_remapped() {
        let inst = Instruction::two_qubit_gate(StandardGate::CX, QubitId(0), QubitId(1));
        let mapped = inst.remapped(|q| QubitId(q.0 + 5));
        assert_eq!(mapped.qubits, vec![QubitId(5), QubitId(6)]);
        assert_eq!(mapped.kind, inst.kind);
    }
}
