//! Cancellation of adjacent inverse gate pairs.

use rustc_hash::FxHashSet;
use tracing::debug;
use trios_ir::{CircuitDag, Instruction, NodeIndex, StandardGate};

use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Inverse cancellation pass.
///
/// Removes pairs of gates that are immediately adjacent on every wire they
/// touch and whose product is the identity:
///
/// - self-inverse single-qubit gates (H, X, Y, Z) and the pairs S/S†,
///   T/T†, SX/SX†
/// - CX twice with the same control and target
/// - CZ or SWAP twice on the same qubits, in any order
/// - CCX twice with the same controls (any order) and target
///
/// Native gates are never removed. Runs until no pair is left.
pub struct InverseCancellation;

impl InverseCancellation {
    /// Create a new cancellation pass.
    pub fn new() -> Self {
        Self
    }

    /// Find disjoint pairs of adjacent, mutually inverse gates.
    #[allow(clippy::unused_self)]
    fn find_cancellable_pairs(&self, dag: &CircuitDag) -> Vec<(NodeIndex, NodeIndex)> {
        let mut pairs = Vec::new();
        let mut processed: FxHashSet<NodeIndex> = FxHashSet::default();

        for (node, inst) in dag.topological_ops() {
            if processed.contains(&node) || inst.is_native() || inst.standard_gate().is_none() {
                continue;
            }
            let Some(&first_wire) = inst.qubits.first() else {
                continue;
            };
            let Some(next) = dag.next_on_wire(node, first_wire) else {
                continue;
            };
            if processed.contains(&next)
                || !inst
                    .qubits
                    .iter()
                    .all(|&q| dag.next_on_wire(node, q) == Some(next))
            {
                continue;
            }
            let Some(next_inst) = dag.get_instruction(next) else {
                continue;
            };
            if !next_inst.is_native() && is_inverse_pair(inst, next_inst) {
                pairs.push((node, next));
                processed.insert(node);
                processed.insert(next);
            }
        }

        pairs
    }
}

/// Whether `second` undoes `first` when applied right after it.
fn is_inverse_pair(first: &Instruction, second: &Instruction) -> bool {
    let (Some(a), Some(b)) = (first.standard_gate(), second.standard_gate()) else {
        return false;
    };
    if first.arity() != second.arity() {
        return false;
    }
    let (p, q) = (&first.qubits, &second.qubits);
    match a {
        StandardGate::I => false,
        StandardGate::CX => b == StandardGate::CX && p == q,
        StandardGate::CZ | StandardGate::Swap => {
            b == a && (p == q || (p[0] == q[1] && p[1] == q[0]))
        }
        StandardGate::CCX => {
            b == StandardGate::CCX
                && p[2] == q[2]
                && ((p[0] == q[0] && p[1] == q[1]) || (p[0] == q[1] && p[1] == q[0]))
        }
        StandardGate::CSwap => false,
        single => b == single.inverse() && p == q,
    }
}

impl Default for InverseCancellation {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for InverseCancellation {
    fn name(&self) -> &'static str {
        "InverseCancellation"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, _properties: &mut PropertySet) -> CompileResult<()> {
        // Bound iterations to avoid pathological cases.
        const MAX_ITERATIONS: usize = 100;
        let mut removed = 0;
        for _ in 0..MAX_ITERATIONS {
            let pairs = self.find_cancellable_pairs(dag);
            if pairs.is_empty() {
                break;
            }
            for (node1, node2) in pairs.into_iter().rev() {
                dag.remove_op(node2)?;
                dag.remove_op(node1)?;
                removed += 2;
            }
        }
        debug!("Cancelled {removed} gates");
        Ok(())
    }

    fn should_run(&self, dag: &CircuitDag, _properties: &PropertySet) -> bool {
        dag.num_ops() > 1
    }
}
