//! Built-in compilation passes.
//!
//! Passes are organized into two categories:
//! - [`agnostic`]: Target-agnostic passes that operate purely on DAG structure
//! - [`target`]: Target-specific passes that require the coupling map

pub mod agnostic;
pub mod target;

pub use agnostic::{InverseCancellation, UnrollMultiQubit};
pub use target::{
    AdjacencyReport, AdjacencyViolation, ApplyLayout, BasicRouting, BridgeSwap, CheckMap,
    ContextAwareCx, ContextAwareToffoli, LayoutDistance, LayoutScore, RoutingTrace, SelectionLog,
    SelectionRecord, TrivialLayout, check_adjacency, layout_distance,
};
