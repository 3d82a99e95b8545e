//! Expansion of three-qubit gates other than CCX.

use tracing::debug;
use trios_ir::{CircuitDag, Instruction, IrError, NodeIndex, StandardGate};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Rewrites every gate on three or more qubits, except CCX, into gates the
/// router understands.
///
/// CSWAP becomes `CX(b, a) CCX(c, a, b) CX(b, a)`. Native gates are left
/// as they are. Any other gate of arity three or more has no expansion and
/// fails with [`CompileError::StructuralViolation`].
pub struct UnrollMultiQubit;

/// The replacement for a non-CCX multi-qubit gate, if one exists.
fn expansion(inst: &Instruction) -> Option<Vec<Instruction>> {
    match (inst.standard_gate()?, inst.qubits.as_slice()) {
        (StandardGate::CSwap, &[control, a, b]) => Some(vec![
            Instruction::two_qubit_gate(StandardGate::CX, b, a),
            Instruction::gate(StandardGate::CCX, [control, a, b]),
            Instruction::two_qubit_gate(StandardGate::CX, b, a),
        ]),
        _ => None,
    }
}

impl Pass for UnrollMultiQubit {
    fn name(&self) -> &'static str {
        "UnrollMultiQubit"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, _properties: &mut PropertySet) -> CompileResult<()> {
        let nodes: Vec<NodeIndex> = dag
            .topological_ops()
            .filter(|(_, inst)| {
                inst.is_gate()
                    && inst.arity() >= 3
                    && !inst.is_native()
                    && inst.standard_gate() != Some(StandardGate::CCX)
            })
            .map(|(node, _)| node)
            .collect();

        for &node in &nodes {
            let inst = dag.get_instruction(node).ok_or(IrError::InvalidNode)?;
            let Some(replacement) = expansion(inst) else {
                return Err(CompileError::StructuralViolation(format!(
                    "no expansion for gate '{}' on {} qubits",
                    inst.name(),
                    inst.arity()
                )));
            };
            dag.substitute_node(node, replacement)?;
        }

        debug!("Expanded {} multi-qubit gates", nodes.len());
        Ok(())
    }

    fn should_run(&self, dag: &CircuitDag, _properties: &PropertySet) -> bool {
        dag.topological_ops().any(|(_, inst)| inst.arity() >= 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unitary::Unitary;
    use trios_ir::{Circuit, CustomGate, QubitId};

    fn unroll(circuit: &Circuit) -> CompileResult<CircuitDag> {
        let mut dag = circuit.dag().clone();
        UnrollMultiQubit.run(&mut dag, &mut PropertySet::new())?;
        Ok(dag)
    }

    #[test]
    fn test_cswap_expansion() {
        let mut circuit = Circuit::with_size("test", 4);
        circuit.h(QubitId(0)).unwrap();
        circuit.cswap(QubitId(3), QubitId(0), QubitId(2)).unwrap();
        circuit.t(QubitId(2)).unwrap();

        let dag = unroll(&circuit).unwrap();
        dag.verify_integrity().unwrap();
        let counts = dag.count_ops();
        assert_eq!(counts.get("cswap"), None);
        assert_eq!(counts.get("ccx"), Some(&1));
        assert_eq!(counts.get("cx"), Some(&2));

        let before = Unitary::from_dag(circuit.dag(), 4).unwrap();
        let after = Unitary::from_dag(&dag, 4).unwrap();
        assert!(before.approx_eq(&after));
    }

    #[test]
    fn test_ccx_and_native_kept() {
        let mut circuit = Circuit::with_size("test", 3);
        circuit.ccx(QubitId(0), QubitId(1), QubitId(2)).unwrap();
        circuit
            .native(StandardGate::CSwap, [QubitId(0), QubitId(1), QubitId(2)])
            .unwrap();

        let dag = unroll(&circuit).unwrap();
        assert_eq!(dag.num_ops(), 2);
        assert_eq!(dag.count_ops().get("cswap"), Some(&1));
    }

    #[test]
    fn test_custom_gate_has_no_expansion() {
        let mut circuit = Circuit::with_size("test", 3);
        circuit
            .gate(CustomGate::new("oracle", 3), (0..3).map(QubitId))
            .unwrap();
        assert!(matches!(
            unroll(&circuit),
            Err(CompileError::StructuralViolation(_))
        ));
    }
}
