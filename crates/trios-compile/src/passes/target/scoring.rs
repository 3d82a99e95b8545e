//! Distance score of a layout against the coupling map.

use serde::{Deserialize, Serialize};
use tracing::debug;
use trios_ir::{CircuitDag, CircuitLevel};

use super::physical_position;
use crate::coupling::CouplingMap;
use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::{Layout, PropertySet};

/// Sum of `distance - 1` over the operand pairs of every multi-qubit gate.
///
/// Two-qubit gates contribute their one pair, three-qubit gates all three.
/// Native gates and barriers are ignored. The score is zero exactly when
/// every gate already acts on adjacent qubits.
///
/// `layout` maps wires to physical qubits; pass `None` when the wires
/// already are physical positions.
pub fn layout_distance(
    dag: &CircuitDag,
    layout: Option<&Layout>,
    coupling_map: &CouplingMap,
) -> CompileResult<u64> {
    let mut total = 0u64;
    for (_, inst) in dag.topological_ops() {
        if !inst.is_gate() || inst.is_native() || inst.arity() < 2 {
            continue;
        }
        let positions = inst
            .qubits
            .iter()
            .map(|&q| physical_position(layout, q))
            .collect::<CompileResult<Vec<_>>>()?;
        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                let d = coupling_map.distance(positions[i], positions[j])?;
                total += u64::from(d.saturating_sub(1));
            }
        }
    }
    Ok(total)
}

/// Score stored by [`LayoutDistance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutScore(pub u64);

/// Analysis pass computing [`layout_distance`] for the current mapping.
pub struct LayoutDistance;

impl Pass for LayoutDistance {
    fn name(&self) -> &'static str {
        "LayoutDistance"
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
        let score = layout_distance(dag, layout, coupling_map)?;
        debug!("Layout distance: {score}");
        properties.insert(LayoutScore(score));
        Ok(())
    }

    fn should_run(&self, _dag: &CircuitDag, properties: &PropertySet) -> bool {
        properties.coupling_map.is_some()
    }
}
