//! The unit of work in a compilation pipeline.

use trios_ir::CircuitDag;

use crate::error::CompileResult;
use crate::property::PropertySet;

/// Whether a pass may rewrite the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Reports into the property set only.
    Analysis,
    /// Rewrites the graph.
    Transformation,
}

/// One stage of compilation over a [`CircuitDag`].
///
/// Passes are synchronous and own no state between runs; everything a later
/// pass needs goes through the [`PropertySet`].
pub trait Pass: Send + Sync {
    /// Name shown in logs and in `PassManager::pass_names`.
    fn name(&self) -> &str;

    fn kind(&self) -> PassKind;

    /// Analysis passes must leave the DAG unchanged and report through the
    /// `PropertySet`. Transformation passes rewrite the DAG and may record
    /// what they did in the `PropertySet`.
    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()>;

    /// Skip the pass when its inputs are missing. Defaults to always running.
    fn should_run(&self, _dag: &CircuitDag, _properties: &PropertySet) -> bool {
        true
    }
}
