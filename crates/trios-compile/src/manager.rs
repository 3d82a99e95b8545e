//! Pass manager for orchestrating compilation.

use tracing::{debug, info, instrument};

use trios_ir::CircuitDag;

use crate::config::CompileConfig;
use crate::coupling::CouplingMap;
use crate::error::CompileResult;
use crate::orientation::OrientationMap;
use crate::pass::Pass;
use crate::passes::{
    ApplyLayout, BasicRouting, BridgeSwap, CheckMap, ContextAwareCx, ContextAwareToffoli,
    InverseCancellation, LayoutDistance, TrivialLayout, UnrollMultiQubit,
};
use crate::property::{Layout, PropertySet};

/// Manages and executes a sequence of compilation passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Names of the passes, in execution order.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Run all passes on the given DAG.
    ///
    /// The first failing pass aborts the run; the DAG may then be partially
    /// rewritten.
    #[instrument(skip(self, dag, properties))]
    pub fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        info!(
            "Running pass manager with {} passes on circuit with {} qubits",
            self.passes.len(),
            dag.num_qubits()
        );

        for pass in &self.passes {
            if pass.should_run(dag, properties) {
                debug!("Running pass: {}", pass.name());
                pass.run(dag, properties)?;
                debug!("Pass {} completed, ops: {}", pass.name(), dag.num_ops());
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        info!(
            "Pass manager completed, final depth: {}, ops: {}",
            dag.depth(),
            dag.num_ops()
        );

        Ok(())
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for the standard routing and decomposition pipeline.
///
/// With a coupling map the pipeline is:
///
/// 1. `UnrollMultiQubit`
/// 2. `TrivialLayout` (skipped when a layout was supplied)
/// 3. `LayoutDistance`
/// 4. `ApplyLayout`
/// 5. `CheckMap`
/// 6. `BasicRouting`
/// 7. `CheckMap`
/// 8. `ContextAwareToffoli`
/// 9. `InverseCancellation`
/// 10. `BridgeSwap`
/// 11. `ContextAwareCx`
/// 12. `InverseCancellation`
///
/// [`CompileConfig`] switches individual stages off. A fake routing run
/// keeps only the analysis stages. Without a coupling map only inverse
/// cancellation remains.
pub struct PassManagerBuilder {
    config: CompileConfig,
    properties: PropertySet,
}

impl PassManagerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: CompileConfig::default(),
            properties: PropertySet::new(),
        }
    }

    /// Set the target properties.
    #[must_use]
    pub fn with_properties(mut self, properties: PropertySet) -> Self {
        self.properties = properties;
        self
    }

    /// Set the target coupling map.
    #[must_use]
    pub fn with_coupling_map(mut self, coupling_map: CouplingMap) -> Self {
        self.properties.coupling_map = Some(coupling_map);
        self
    }

    /// Override native CX directions.
    #[must_use]
    pub fn with_orientation_map(mut self, orientation_map: OrientationMap) -> Self {
        self.properties.orientation_map = Some(orientation_map);
        self
    }

    /// Start from a given initial layout instead of the trivial one.
    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.properties.layout = Some(layout);
        self
    }

    /// Apply a validated configuration.
    ///
    /// Durations in the configuration replace any orientation map set
    /// earlier.
    pub fn with_config(mut self, config: CompileConfig) -> CompileResult<Self> {
        config.validate()?;
        if let Some(orientation_map) = config.orientation_map()? {
            self.properties.orientation_map = Some(orientation_map);
        }
        self.config = config;
        Ok(self)
    }

    /// Build the pass manager and return it with the properties.
    pub fn build(self) -> (PassManager, PropertySet) {
        let mut pm = PassManager::new();
        let config = &self.config;
        let cancel = config.selection.cancel_inverses;

        if self.properties.coupling_map.is_none() {
            if cancel {
                pm.add_pass(InverseCancellation::new());
            }
            return (pm, self.properties);
        }

        pm.add_pass(UnrollMultiQubit);
        pm.add_pass(TrivialLayout);
        pm.add_pass(LayoutDistance);
        pm.add_pass(ApplyLayout);
        if config.check_adjacency {
            pm.add_pass(CheckMap);
        }
        pm.add_pass(BasicRouting {
            fake_run: config.routing.fake_run,
        });
        if config.check_adjacency {
            pm.add_pass(CheckMap);
        }

        if config.routing.fake_run {
            return (pm, self.properties);
        }

        if config.selection.toffoli {
            pm.add_pass(ContextAwareToffoli::new());
            if cancel {
                pm.add_pass(InverseCancellation::new());
            }
        }
        if config.selection.bridge {
            pm.add_pass(BridgeSwap);
        }
        if config.selection.cx {
            pm.add_pass(ContextAwareCx);
        }
        if cancel {
            pm.add_pass(InverseCancellation::new());
        }

        (pm, self.properties)
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
