//! SWAP decomposition with bridge and merge rewrites.

use rustc_hash::FxHashSet;
use tracing::debug;
use trios_ir::{CircuitDag, Instruction, IrError, NodeIndex, QubitId, StandardGate};

use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;
use crate::variants::two_qubit::{
    BRIDGE_FAR_TO_OUTER, BRIDGE_OUTER_TO_FAR, CX_THEN_SWAP, SWAP_THEN_CX,
};
use crate::variants::{Step, SwapVariant, bind_steps};

/// Decompose SWAP gates into CX, exploiting the CX gates around them.
///
/// For each SWAP, in topological order, the first applicable rule wins:
///
/// 1. `SWAP(p0,p1)`, a CX between `p1` and `p2`, then `SWAP(p0,p1)` again,
///    all immediately adjacent: the three become a 4-CX bridge acting
///    between `p0` and `p2` through `p1`.
/// 2. A CX on the same two qubits right after (or right before) the SWAP:
///    the pair becomes 2 CX.
/// 3. Otherwise the 3-CX form whose outer CX run in the native direction.
pub struct BridgeSwap;

/// A decided rewrite of a contiguous block.
struct Rewrite {
    block: Vec<NodeIndex>,
    steps: &'static [Step],
    operands: Vec<QubitId>,
}

fn is_swap_on(inst: &Instruction, a: QubitId, b: QubitId) -> bool {
    inst.is_rewritable(StandardGate::Swap)
        && ((inst.qubits[0] == a && inst.qubits[1] == b)
            || (inst.qubits[0] == b && inst.qubits[1] == a))
}

fn is_cx_on(inst: &Instruction, a: QubitId, b: QubitId) -> bool {
    inst.is_rewritable(StandardGate::CX)
        && (inst.qubits.as_slice() == [a, b] || inst.qubits.as_slice() == [b, a])
}

impl BridgeSwap {
    /// Rule 1: SWAP · CX · SWAP around a middle qubit.
    fn bridge(
        dag: &CircuitDag,
        node: NodeIndex,
        inst: &Instruction,
        visited: &FxHashSet<NodeIndex>,
    ) -> Option<Rewrite> {
        let (a, b) = (inst.qubits[0], inst.qubits[1]);
        for (middle, outer) in [(b, a), (a, b)] {
            let Some(cx) = dag.next_on_wire(node, middle) else {
                continue;
            };
            let Some(cx_inst) = dag.get_instruction(cx) else {
                continue;
            };
            if visited.contains(&cx) || !cx_inst.is_rewritable(StandardGate::CX) {
                continue;
            }
            let Some(&far) = cx_inst.qubits.iter().find(|&&q| q != middle) else {
                continue;
            };
            if far == outer || !cx_inst.qubits.contains(&middle) {
                continue;
            }
            let Some(closing) = dag.next_on_wire(cx, middle) else {
                continue;
            };
            if visited.contains(&closing)
                || dag.next_on_wire(node, outer) != Some(closing)
                || !dag
                    .get_instruction(closing)
                    .is_some_and(|i| is_swap_on(i, a, b))
            {
                continue;
            }
            let steps = if cx_inst.qubits[0] == middle {
                BRIDGE_OUTER_TO_FAR
            } else {
                BRIDGE_FAR_TO_OUTER
            };
            return Some(Rewrite {
                block: vec![node, cx, closing],
                steps,
                operands: vec![outer, middle, far],
            });
        }
        None
    }

    /// Rule 2: SWAP next to a CX on the same pair.
    fn merge(
        dag: &CircuitDag,
        node: NodeIndex,
        inst: &Instruction,
        visited: &FxHashSet<NodeIndex>,
    ) -> Option<Rewrite> {
        let (a, b) = (inst.qubits[0], inst.qubits[1]);
        let matching = |n: NodeIndex| {
            !visited.contains(&n) && dag.get_instruction(n).is_some_and(|i| is_cx_on(i, a, b))
        };

        let after = dag.next_on_wire(node, a);
        if let Some(cx) = after.filter(|&n| dag.next_on_wire(node, b) == Some(n) && matching(n)) {
            let operands = dag.get_instruction(cx)?.qubits.clone();
            return Some(Rewrite {
                block: vec![node, cx],
                steps: SWAP_THEN_CX,
                operands,
            });
        }

        let before = dag.prev_on_wire(node, a);
        if let Some(cx) = before.filter(|&n| dag.prev_on_wire(node, b) == Some(n) && matching(n)) {
            let operands = dag.get_instruction(cx)?.qubits.clone();
            return Some(Rewrite {
                block: vec![cx, node],
                steps: CX_THEN_SWAP,
                operands,
            });
        }
        None
    }
}

impl Pass for BridgeSwap {
    fn name(&self) -> &'static str {
        "BridgeSwap"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let mut visited: FxHashSet<NodeIndex> = FxHashSet::default();
        let mut rewrites = Vec::new();
        let (mut bridged, mut merged) = (0, 0);

        for node in dag.ops_with_arity(2) {
            if visited.contains(&node) {
                continue;
            }
            let inst = dag.get_instruction(node).ok_or(IrError::InvalidNode)?;
            if !inst.is_rewritable(StandardGate::Swap) {
                continue;
            }
            visited.insert(node);

            let rewrite = if let Some(r) = Self::bridge(dag, node, inst, &visited) {
                bridged += 1;
                r
            } else if let Some(r) = Self::merge(dag, node, inst, &visited) {
                merged += 1;
                r
            } else {
                let (a, b) = (inst.qubits[0], inst.qubits[1]);
                let variant = SwapVariant::for_orientation(properties.orientation(a.0, b.0)?);
                Rewrite {
                    block: vec![node],
                    steps: variant.steps(),
                    operands: vec![a, b],
                }
            };
            visited.extend(rewrite.block.iter().copied());
            rewrites.push(rewrite);
        }

        let total = rewrites.len();
        for rewrite in rewrites {
            dag.replace_block(&rewrite.block, bind_steps(rewrite.steps, &rewrite.operands)?)?;
        }
        debug!("Decomposed {total} SWAP gates ({bridged} bridged, {merged} merged)");
        Ok(())
    }

    fn should_run(&self, _dag: &CircuitDag, properties: &PropertySet) -> bool {
        properties.coupling_map.is_some() || properties.orientation_map.is_some()
    }
}
