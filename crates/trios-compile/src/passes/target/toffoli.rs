//! Context-aware CCX decomposition.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use trios_ir::{CircuitDag, Instruction, IrError, NodeIndex, QubitId, StandardGate};

use crate::coupling::CouplingMap;
use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;
use crate::variants::{
    AdjacencyClass, Bias, OperandPair, SelectorKey, Step, ToffoliLibrary, VariantChoice,
    bind_steps,
};

/// One CCX decomposition decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRecord {
    /// Position of the gate among the circuit's CCX gates, in topological
    /// order.
    pub ordinal: usize,
    /// Physical operands.
    pub qubits: [u32; 3],
    /// Key built from the gate's neighbourhood.
    pub requested: SelectorKey,
    /// What the library resolved it to.
    pub choice: VariantChoice,
}

/// All decisions of a [`ContextAwareToffoli`] run, ordered by `ordinal`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionLog {
    /// The records.
    pub records: Vec<SelectionRecord>,
}

impl SelectionLog {
    /// Number of decomposed gates.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no gate was decomposed.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of gates that fell back to a canonical sequence.
    pub fn canonical_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.choice, VariantChoice::Canonical(_)))
            .count()
    }
}

/// Adjacency class of three physical qubits, if any operand is adjacent to
/// both others.
pub fn adjacency_class(coupling_map: &CouplingMap, qubits: [u32; 3]) -> Option<AdjacencyClass> {
    let adjacent = |i: usize, j: usize| coupling_map.is_adjacent(qubits[i], qubits[j]);
    if adjacent(0, 1) && adjacent(1, 2) && adjacent(0, 2) {
        return Some(AdjacencyClass::Full);
    }
    (0u8..3)
        .find(|&p| {
            let p = usize::from(p);
            (0..3).filter(|&o| o != p).all(|o| adjacent(p, o))
        })
        .map(AdjacencyClass::Pivot)
}

/// Decompose every CCX using the variant that best fits its neighbours.
///
/// The circuit must already be routed: wire ids are read as physical
/// qubits. For each CCX, in topological order:
///
/// 1. A following CCX sharing two wires claims a successor/predecessor
///    pair of variants whose boundary blocks cancel. The pair must keep the
///    control/target roles of both wires, be physically adjacent, and both
///    biased entries must exist. The claimed CCX is decided on the spot.
/// 2. Otherwise a following CX on two control wires sets the successor
///    pattern.
/// 3. A preceding CX on two control wires sets the predecessor pattern.
///
/// The resulting key goes through [`ToffoliLibrary::select`] and the gate
/// is replaced in place. Decisions are stored as a [`SelectionLog`].
pub struct ContextAwareToffoli {
    library: ToffoliLibrary,
}

impl ContextAwareToffoli {
    /// Use the built-in tables.
    pub fn new() -> Self {
        Self {
            library: ToffoliLibrary::standard().clone(),
        }
    }

    /// Use a custom library.
    pub fn with_library(library: ToffoliLibrary) -> Self {
        Self { library }
    }
}

impl Default for ContextAwareToffoli {
    fn default() -> Self {
        Self::new()
    }
}

/// A decided replacement.
struct Plan {
    node: NodeIndex,
    operands: Vec<QubitId>,
    steps: &'static [Step],
}

impl ContextAwareToffoli {
    fn class_of(coupling_map: &CouplingMap, inst: &Instruction) -> CompileResult<AdjacencyClass> {
        let qubits = physical_triple(inst)?;
        adjacency_class(coupling_map, qubits).ok_or_else(|| CompileError::NotAdjacent {
            gate: inst.name().to_string(),
            qubits: qubits.to_vec(),
        })
    }

    /// Try to pair `node` with the CCX `succ` on two shared wires.
    fn claim_successor(
        &self,
        coupling_map: &CouplingMap,
        inst: &Instruction,
        class: AdjacencyClass,
        succ_inst: &Instruction,
        shared: &[QubitId],
    ) -> Option<(OperandPair, SelectorKey, &'static [Step])> {
        let succ_qubits = physical_triple(succ_inst).ok()?;
        let succ_class = adjacency_class(coupling_map, succ_qubits)?;
        for x in 0..3 {
            for y in (0..3).filter(|&y| y != x) {
                let (wx, wy) = (inst.qubits[x], inst.qubits[y]);
                if !shared.contains(&wx) || !shared.contains(&wy) {
                    continue;
                }
                let sx = succ_inst.qubits.iter().position(|&q| q == wx)?;
                let sy = succ_inst.qubits.iter().position(|&q| q == wy)?;
                if (x < 2) != (sx < 2) || (y < 2) != (sy < 2) {
                    continue;
                }
                if !coupling_map.is_adjacent(wx.0, wy.0) {
                    continue;
                }
                let mine = OperandPair::new(index(x), index(y));
                let theirs = OperandPair::new(index(sx), index(sy));
                if self
                    .library
                    .biased_entry(class, Bias::Successor, mine)
                    .is_none()
                {
                    continue;
                }
                if let Some((key, steps)) =
                    self.library
                        .biased_entry(succ_class, Bias::Predecessor, theirs)
                {
                    return Some((mine, key, steps));
                }
            }
        }
        None
    }
}

impl Pass for ContextAwareToffoli {
    fn name(&self) -> &'static str {
        "ContextAwareToffoli"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let coupling_map = properties.require_coupling_map()?;

        let ccx_nodes: Vec<NodeIndex> = dag
            .topological_ops()
            .filter(|(_, inst)| inst.is_rewritable(StandardGate::CCX))
            .map(|(node, _)| node)
            .collect();
        let ordinals: FxHashMap<NodeIndex, usize> =
            ccx_nodes.iter().enumerate().map(|(i, &n)| (n, i)).collect();

        let mut visited: FxHashSet<NodeIndex> = FxHashSet::default();
        let mut plans = Vec::new();
        let mut log = SelectionLog::default();

        for &node in &ccx_nodes {
            if !visited.insert(node) {
                continue;
            }
            let inst = dag.get_instruction(node).ok_or(IrError::InvalidNode)?;
            let class = Self::class_of(coupling_map, inst)?;
            let mut requested = SelectorKey::bare(class, Bias::Predecessor);

            let mut successors: Vec<NodeIndex> = Vec::new();
            for &q in &inst.qubits {
                if let Some(s) = dag.next_on_wire(node, q) {
                    if !successors.contains(&s) {
                        successors.push(s);
                    }
                }
            }
            for succ in successors {
                let Some(succ_inst) = dag.get_instruction(succ) else {
                    continue;
                };
                let shared: Vec<QubitId> = inst
                    .qubits
                    .iter()
                    .copied()
                    .filter(|&q| dag.next_on_wire(node, q) == Some(succ))
                    .collect();
                if shared.len() < 2 {
                    continue;
                }

                if succ_inst.is_rewritable(StandardGate::CCX) && !visited.contains(&succ) {
                    let claimed = self.claim_successor(coupling_map, inst, class, succ_inst, &shared);
                    if let Some((pattern, succ_key, succ_steps)) = claimed {
                        requested.successor = Some(pattern);
                        requested.bias = Bias::Successor;
                        visited.insert(succ);
                        debug!("CCX {} paired with following CCX as {succ_key}", ordinals[&node]);
                        log.records.push(SelectionRecord {
                            ordinal: ordinals[&succ],
                            qubits: physical_triple(succ_inst)?,
                            requested: succ_key,
                            choice: VariantChoice::Keyed(succ_key),
                        });
                        plans.push(Plan {
                            node: succ,
                            operands: succ_inst.qubits.clone(),
                            steps: succ_steps,
                        });
                        break;
                    }
                } else if succ_inst.is_rewritable(StandardGate::CX) {
                    if let Some(pattern) = control_pattern(inst, succ_inst) {
                        requested.successor = Some(pattern);
                        requested.bias = Bias::Successor;
                        break;
                    }
                }
            }

            let mut predecessors: Vec<NodeIndex> = Vec::new();
            for &q in &inst.qubits[..2] {
                if let Some(p) = dag.prev_on_wire(node, q) {
                    if !predecessors.contains(&p) {
                        predecessors.push(p);
                    }
                }
            }
            for pred in predecessors {
                let Some(pred_inst) = dag.get_instruction(pred) else {
                    continue;
                };
                if !pred_inst.is_rewritable(StandardGate::CX)
                    || !pred_inst
                        .qubits
                        .iter()
                        .all(|&q| dag.prev_on_wire(node, q) == Some(pred))
                {
                    continue;
                }
                if let Some(pattern) = control_pattern(inst, pred_inst) {
                    requested.predecessor = Some(pattern);
                    break;
                }
            }

            let (choice, steps) = self.library.select(&requested)?;
            match choice {
                VariantChoice::Canonical(_) if requested.has_context() => {
                    warn!("No variant for [{requested}], using {choice}");
                }
                _ => debug!("CCX {}: [{requested}] -> {choice}", ordinals[&node]),
            }
            log.records.push(SelectionRecord {
                ordinal: ordinals[&node],
                qubits: physical_triple(inst)?,
                requested,
                choice,
            });
            plans.push(Plan {
                node,
                operands: inst.qubits.clone(),
                steps,
            });
        }

        for plan in plans {
            dag.substitute_node(plan.node, bind_steps(plan.steps, &plan.operands)?)?;
        }

        log.records.sort_by_key(|r| r.ordinal);
        debug!(
            "Decomposed {} CCX gates, {} canonical",
            log.len(),
            log.canonical_count()
        );
        properties.insert(log);
        Ok(())
    }

    fn should_run(&self, _dag: &CircuitDag, properties: &PropertySet) -> bool {
        properties.coupling_map.is_some()
    }
}

#[allow(clippy::cast_possible_truncation)]
fn index(i: usize) -> u8 {
    i as u8
}

fn physical_triple(inst: &Instruction) -> CompileResult<[u32; 3]> {
    match inst.qubits.as_slice() {
        [a, b, c] => Ok([a.0, b.0, c.0]),
        _ => Err(CompileError::StructuralViolation(format!(
            "'{}' is not a three-qubit gate",
            inst.name()
        ))),
    }
}

/// Operand pattern of a CX acting on two control wires of `ccx`.
fn control_pattern(ccx: &Instruction, cx: &Instruction) -> Option<OperandPair> {
    let control = ccx.qubits[..2].iter().position(|&q| q == cx.qubits[0])?;
    let target = ccx.qubits[..2].iter().position(|&q| q == cx.qubits[1])?;
    Some(OperandPair::new(index(control), index(target)))
}
