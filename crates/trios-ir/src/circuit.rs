//! Fluent construction of reversible circuits.

use crate::dag::CircuitDag;
use crate::error::IrResult;
use crate::gate::{Gate, StandardGate};
use crate::instruction::Instruction;
use crate::qubit::{Qubit, QubitId};

macro_rules! one_qubit_builders {
    ($($(#[$doc:meta])* $method:ident => $gate:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $method(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
                self.push(Instruction::single_qubit_gate(StandardGate::$gate, qubit))
            }
        )*
    };
}

/// A named program over qubit wires, stored as a [`CircuitDag`].
///
/// Every builder method validates its operands against the declared wires
/// and returns `&mut Self`, so calls chain with `?`.
#[derive(Debug, Clone)]
pub struct Circuit {
    name: String,
    wires: Vec<Qubit>,
    dag: CircuitDag,
}

impl Circuit {
    /// An empty circuit with no wires.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wires: Vec::new(),
            dag: CircuitDag::new(),
        }
    }

    /// A circuit with wires `q0..q{num_qubits - 1}`.
    pub fn with_size(name: impl Into<String>, num_qubits: u32) -> Self {
        let mut circuit = Self::new(name);
        (0..num_qubits).for_each(|_| {
            circuit.add_qubit();
        });
        circuit
    }

    fn next_id(&self) -> QubitId {
        QubitId(self.wires.len() as u32)
    }

    fn declare(&mut self, wire: Qubit) -> QubitId {
        let id = wire.id;
        self.dag.add_qubit(id);
        self.wires.push(wire);
        id
    }

    /// Declares one anonymous wire and returns its id.
    pub fn add_qubit(&mut self) -> QubitId {
        let id = self.next_id();
        self.declare(Qubit::new(id))
    }

    /// Declares `size` wires belonging to register `name`.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> Vec<QubitId> {
        let name = name.into();
        (0..size)
            .map(|index| {
                let id = self.next_id();
                self.declare(Qubit::with_register(id, &name, index))
            })
            .collect()
    }

    fn push(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.dag.apply(instruction)?;
        Ok(self)
    }

    one_qubit_builders! {
        /// Hadamard.
        h => H;
        x => X;
        y => Y;
        z => Z;
        s => S;
        sdg => Sdg;
        /// π/8 phase.
        t => T;
        tdg => Tdg;
        /// Square root of X.
        sx => SX;
        sxdg => SXdg;
    }

    /// CNOT from `control` onto `target`.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(StandardGate::CX, control, target))
    }

    pub fn cz(&mut self, a: QubitId, b: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(StandardGate::CZ, a, b))
    }

    /// Exchange the states of two wires. Routing treats program SWAPs like
    /// any other two-qubit gate.
    pub fn swap(&mut self, a: QubitId, b: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(StandardGate::Swap, a, b))
    }

    /// Toffoli with controls `c1`, `c2`.
    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::gate(StandardGate::CCX, [c1, c2, target]))
    }

    pub fn cswap(&mut self, control: QubitId, a: QubitId, b: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::gate(StandardGate::CSwap, [control, a, b]))
    }

    /// Any standard or custom gate on explicit operands.
    pub fn gate(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.push(Instruction::gate(gate, qubits))
    }

    /// Apply a standard gate flagged as a calibrated native operation.
    ///
    /// Native gates keep their operands and are left alone by routing and
    /// decomposition.
    pub fn native(
        &mut self,
        gate: StandardGate,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.gate(Gate::standard(gate).as_native(), qubits)
    }

    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.push(Instruction::barrier(qubits))
    }

    /// Barrier across every declared wire.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        let ids: Vec<QubitId> = self.wires.iter().map(|wire| wire.id).collect();
        self.barrier(ids)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_qubits(&self) -> usize {
        self.wires.len()
    }

    /// Longest gate chain along any wire.
    pub fn depth(&self) -> usize {
        self.dag.depth()
    }

    pub fn qubits(&self) -> &[Qubit] {
        &self.wires
    }

    pub fn dag(&self) -> &CircuitDag {
        &self.dag
    }

    pub fn into_dag(self) -> CircuitDag {
        self.dag
    }

    /// Wraps an existing graph. Wires lose their register names.
    pub fn from_dag(dag: CircuitDag) -> Self {
        let wires = dag.qubits().map(Qubit::new).collect();
        Self {
            name: "circuit".into(),
            wires,
            dag,
        }
    }

    /// A ladder of overlapping Toffolis: `ccx(i, i+1, i+2)` for every `i`.
    ///
    /// Consecutive gates share two wires, which makes this the standard
    /// workload for context-aware decomposition.
    pub fn toffoli_ladder(n: u32) -> IrResult<Self> {
        let mut circuit = Self::with_size("toffoli_ladder", n);
        for i in 0..n.saturating_sub(2) {
            circuit.ccx(QubitId(i), QubitId(i + 1), QubitId(i + 2))?;
        }
        Ok(circuit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_circuit() {
        let circuit = Circuit::new("empty");
        assert_eq!(circuit.name(), "empty");
        assert_eq!(circuit.num_qubits(), 0);
        assert_eq!(circuit.depth(), 0);
    }

    #[test]
    fn test_add_registers() {
        let mut circuit = Circuit::new("test");
        let data = circuit.add_qreg("data", 3);
        let anc = circuit.add_qreg("anc", 1);

        assert_eq!(data, vec![QubitId(0), QubitId(1), QubitId(2)]);
        assert_eq!(anc, vec![QubitId(3)]);
        assert_eq!(circuit.num_qubits(), 4);
        assert_eq!(format!("{}", circuit.qubits()[3]), "anc[0]");
    }

    #[test]
    fn test_unknown_wire_is_rejected() {
        let mut circuit = Circuit::with_size("test", 2);
        assert!(circuit.cx(QubitId(0), QubitId(2)).is_err());
        assert_eq!(circuit.dag().num_ops(), 0);
    }

    #[test]
    fn test_toffoli_ladder() {
        let circuit = Circuit::toffoli_ladder(5).unwrap();
        assert_eq!(circuit.dag().num_ops(), 3);
        assert_eq!(circuit.dag().ops_with_arity(3).len(), 3);
        assert_eq!(circuit.depth(), 3);
        assert_eq!(Circuit::toffoli_ladder(2).unwrap().dag().num_ops(), 0);
    }

    #[test]
    fn test_native_gate() {
        let mut circuit = Circuit::with_size("test", 3);
        circuit
            .native(StandardGate::CCX, [QubitId(0), QubitId(1), QubitId(2)])
            .unwrap();
        let (_, inst) = circuit.dag().topological_ops().next().unwrap();
        assert!(inst.is_native());
    }

    #[test]
    fn test_chained_builders() {
        let mut circuit = Circuit::with_size("test", 3);
        circuit
            .h(QubitId(2))
            .unwrap()
            .ccx(QubitId(0), QubitId(1), QubitId(2))
            .unwrap()
            .sx(QubitId(2))
            .unwrap();

        assert_eq!(circuit.depth(), 3);
    }

    #[test]
    fn test_from_dag_keeps_wires() {
        let circuit = Circuit::toffoli_ladder(4).unwrap();
        let mut rebuilt = Circuit::from_dag(circuit.into_dag());
        assert_eq!(rebuilt.num_qubits(), 4);
        assert_eq!(rebuilt.dag().num_ops(), 2);
        assert_eq!(rebuilt.add_qubit(), QubitId(4));
    }
}
