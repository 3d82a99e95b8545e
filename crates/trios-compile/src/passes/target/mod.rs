//! Target-specific compilation passes.
//!
//! These passes require the coupling map from the PropertySet and produce
//! circuits whose multi-qubit gates act on adjacent, natively oriented
//! physical qubits.

pub mod bridge;
pub mod check_map;
pub mod cx;
pub mod layout;
pub mod routing;
pub mod scoring;
pub mod toffoli;

pub use bridge::BridgeSwap;
pub use check_map::{AdjacencyReport, AdjacencyViolation, CheckMap, check_adjacency};
pub use cx::ContextAwareCx;
pub use layout::{ApplyLayout, TrivialLayout};
pub use routing::{BasicRouting, RoutingTrace};
pub use scoring::{LayoutDistance, LayoutScore, layout_distance};
pub use toffoli::{ContextAwareToffoli, SelectionLog, SelectionRecord};

use trios_ir::QubitId;

use crate::error::{CompileError, CompileResult};
use crate::property::Layout;

/// Physical position of a wire: through `layout` when the graph is still
/// logical, the wire itself when it is already physical.
pub(crate) fn physical_position(layout: Option<&Layout>, wire: QubitId) -> CompileResult<u32> {
    match layout {
        None => Ok(wire.0),
        Some(layout) => layout.physical_of(wire).ok_or_else(|| {
            CompileError::StructuralViolation(format!(
                "wire {wire} is outside a layout of {} qubits",
                layout.len()
            ))
        }),
    }
}
