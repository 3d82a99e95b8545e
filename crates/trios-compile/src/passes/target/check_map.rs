//! Adjacency check of a mapped circuit against the coupling map.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use trios_ir::{CircuitDag, CircuitLevel, NodeIndex, StandardGate};

use super::physical_position;
use super::toffoli::adjacency_class;
use crate::coupling::CouplingMap;
use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::{Layout, PropertySet};

/// The first gate found acting on non-adjacent qubits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjacencyViolation {
    /// Offending node.
    #[serde(skip)]
    pub node: NodeIndex,
    /// Gate name.
    pub gate: String,
    /// The physical pair that is not adjacent.
    pub qubits: (u32, u32),
}

impl std::fmt::Display for AdjacencyViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({}, {}) failed", self.gate, self.qubits.0, self.qubits.1)
    }
}

/// Result of [`check_adjacency`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjacencyReport {
    /// Whether every checked gate acts on adjacent qubits.
    pub satisfied: bool,
    /// The first failure, if any.
    pub violation: Option<AdjacencyViolation>,
}

impl AdjacencyReport {
    fn satisfied() -> Self {
        Self {
            satisfied: true,
            violation: None,
        }
    }
}

/// Check that every two- and three-qubit gate acts on adjacent qubits.
///
/// Two-qubit gates are checked first, then three-qubit gates, each in
/// topological order. A CCX passes when one operand is adjacent to the
/// other two; otherwise the first non-adjacent pair of (0,1), (1,2), (0,2)
/// is reported. Only CCX is accepted at arity three. Native gates are
/// skipped.
pub fn check_adjacency(
    dag: &CircuitDag,
    layout: Option<&Layout>,
    coupling_map: &CouplingMap,
) -> CompileResult<AdjacencyReport> {
    if let Some((_, inst)) = dag
        .topological_ops()
        .find(|(_, inst)| inst.is_gate() && inst.arity() > 3)
    {
        return Err(CompileError::StructuralViolation(format!(
            "gate '{}' acts on {} qubits",
            inst.name(),
            inst.arity()
        )));
    }

    for arity in [2, 3] {
        for node in dag.ops_with_arity(arity) {
            let Some(inst) = dag.get_instruction(node) else {
                continue;
            };
            if inst.is_native() {
                continue;
            }
            if arity == 3 && inst.standard_gate() != Some(StandardGate::CCX) {
                return Err(CompileError::StructuralViolation(format!(
                    "unsupported three-qubit gate '{}'",
                    inst.name()
                )));
            }

            let positions = inst
                .qubits
                .iter()
                .map(|&q| physical_position(layout, q))
                .collect::<CompileResult<Vec<u32>>>()?;
            if let [a, b, c] = positions[..] {
                if adjacency_class(coupling_map, [a, b, c]).is_some() {
                    continue;
                }
            }

            let pairs: &[(usize, usize)] = if arity == 2 {
                &[(0, 1)]
            } else {
                &[(0, 1), (1, 2), (0, 2)]
            };
            for &(i, j) in pairs {
                let (p0, p1) = (positions[i], positions[j]);
                if !coupling_map.is_adjacent(p0, p1) {
                    return Ok(AdjacencyReport {
                        satisfied: false,
                        violation: Some(AdjacencyViolation {
                            node,
                            gate: inst.name().to_string(),
                            qubits: (p0, p1),
                        }),
                    });
                }
            }
        }
    }

    Ok(AdjacencyReport::satisfied())
}

/// Analysis pass storing an [`AdjacencyReport`] in the property set.
///
/// A failed check is data, not an error; routing is what fixes it.
pub struct CheckMap;

impl Pass for CheckMap {
    fn name(&self) -> &'static str {
        "CheckMap"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let coupling_map = properties.require_coupling_map()?;
        let layout = match dag.level() {
            CircuitLevel::Logical => properties.layout.as_ref(),
            CircuitLevel::Physical => None,
        };
        let report = check_adjacency(dag, layout, coupling_map)?;
        match &report.violation {
            Some(violation) => warn!("Adjacency check: {violation}"),
            None => debug!("Adjacency check passed"),
        }
        properties.insert(report);
        Ok(())
    }

    fn should_run(&self, _dag: &CircuitDag, properties: &PropertySet) -> bool {
        properties.coupling_map.is_some()
    }
}
