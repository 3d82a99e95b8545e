//! Orientation-aware CX decomposition.

use rustc_hash::FxHashSet;
use tracing::debug;
use trios_ir::{CircuitDag, IrError, NodeIndex, StandardGate};

use crate::coupling::Orientation;
use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;
use crate::variants::two_qubit::cx_variant;
use crate::variants::{Boundary, bind_steps};

/// Rewrite every CX into its native direction.
///
/// A CX whose control is the native control of its edge stays. A reversed
/// one becomes `H H CX H H`. Two reversed CX on the same ordered pair,
/// immediately adjacent on both wires, are rewritten together without the
/// Hadamard pair between them.
///
/// Directions come from [`PropertySet::orientation`], so an
/// [`OrientationMap`](crate::OrientationMap) overrides the coupling map.
pub struct ContextAwareCx;

impl Pass for ContextAwareCx {
    fn name(&self) -> &'static str {
        "ContextAwareCx"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let mut visited: FxHashSet<NodeIndex> = FxHashSet::default();
        let mut plans: Vec<(NodeIndex, Boundary)> = Vec::new();

        for node in dag.ops_with_arity(2) {
            if !visited.insert(node) {
                continue;
            }
            let inst = dag.get_instruction(node).ok_or(IrError::InvalidNode)?;
            if !inst.is_rewritable(StandardGate::CX) {
                continue;
            }
            let (control, target) = (inst.qubits[0], inst.qubits[1]);
            if properties.orientation(control.0, target.0)? == Orientation::Forward {
                continue;
            }

            let next = dag.next_on_wire(node, control);
            let joint = next.filter(|&n| {
                !visited.contains(&n)
                    && dag.next_on_wire(node, target) == Some(n)
                    && dag
                        .get_instruction(n)
                        .is_some_and(|i| i.is_rewritable(StandardGate::CX) && i.qubits == inst.qubits)
            });
            match joint {
                Some(next) => {
                    visited.insert(next);
                    plans.push((node, Boundary::OpenTail));
                    plans.push((next, Boundary::OpenHead));
                }
                None => plans.push((node, Boundary::Whole)),
            }
        }

        let reversed = plans.len();
        for (node, boundary) in plans {
            let operands = dag
                .get_instruction(node)
                .ok_or(IrError::InvalidNode)?
                .qubits
                .clone();
            let steps = cx_variant(Orientation::Backward, boundary);
            dag.substitute_node(node, bind_steps(steps, &operands)?)?;
        }
        debug!("Reversed {reversed} CX gates");
        Ok(())
    }

    fn should_run(&self, _dag: &CircuitDag, properties: &PropertySet) -> bool {
        properties.coupling_map.is_some() || properties.orientation_map.is_some()
    }
}
