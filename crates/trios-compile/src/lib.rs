//! Trios Routing and Decomposition Framework
//!
//! This crate maps reversible circuits built from CX, SWAP and Toffoli (CCX)
//! gates onto hardware with restricted qubit connectivity, then decomposes
//! every multi-qubit gate into CX and single-qubit gates so that adjacent
//! decompositions can cancel against each other.
//!
//! # Overview
//!
//! Compilation runs a sequence of passes over a [`trios_ir::CircuitDag`]:
//! 1. **Unrolling**: Expand CSWAP into CX and CCX
//! 2. **Layout**: Place logical qubits on physical qubits and score the placement
//! 3. **Routing**: Insert SWAP gates so every gate acts on adjacent qubits;
//!    a Toffoli has all three operands brought around one pivot
//! 4. **Toffoli selection**: Pick, per CCX, the decomposition variant whose
//!    boundary gates cancel against its neighbours
//! 5. **SWAP and CX decomposition**: Lower SWAPs (with bridge and merge
//!    rewrites) and orient every CX natively
//! 6. **Cancellation**: Remove the inverse pairs exposed at the seams
//!
//! # Architecture
//!
//! ```text
//! Input Circuit
//!       |
//!       v
//! +-------------+
//! | PassManager | <-- PropertySet (coupling map, orientation, layout, reports)
//! +-------------+
//!       |
//!       |-- UnrollMultiQubit
//!       |-- TrivialLayout / LayoutDistance / ApplyLayout
//!       |-- CheckMap / BasicRouting / CheckMap
//!       |-- ContextAwareToffoli / InverseCancellation
//!       |-- BridgeSwap / ContextAwareCx / InverseCancellation
//!       |
//!       v
//! Output Circuit (adjacent, natively oriented CX + 1q gates)
//! ```
//!
//! # Example: Basic Compilation
//!
//! ```rust
//! use trios_compile::{CouplingMap, PassManagerBuilder};
//! use trios_compile::passes::{RoutingTrace, SelectionLog};
//! use trios_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("adder", 3);
//! circuit.ccx(QubitId(0), QubitId(1), QubitId(2)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//!
//! let (pm, mut props) = PassManagerBuilder::new()
//!     .with_coupling_map(CouplingMap::linear(3))
//!     .build();
//!
//! let mut dag = circuit.into_dag();
//! pm.run(&mut dag, &mut props).unwrap();
//!
//! assert!(props.get::<RoutingTrace>().unwrap().is_empty());
//! assert_eq!(props.get::<SelectionLog>().unwrap().len(), 1);
//! assert_eq!(dag.count_ops().get("ccx"), None);
//! ```
//!
//! # Configuration
//!
//! The pipeline stages can be switched from YAML or JSON through
//! [`CompileConfig`]:
//!
//! ```rust
//! use trios_compile::{CompileConfig, CouplingMap, PassManagerBuilder};
//!
//! let config = CompileConfig::from_yaml_str("selection:\n  bridge: false\n").unwrap();
//! let (pm, _props) = PassManagerBuilder::new()
//!     .with_coupling_map(CouplingMap::ring(6))
//!     .with_config(config)
//!     .unwrap()
//!     .build();
//! assert!(!pm.pass_names().contains(&"BridgeSwap"));
//! ```
//!
//! # Custom Passes
//!
//! Implement the [`Pass`] trait to create custom compilation passes:
//!
//! ```rust
//! use trios_compile::{Pass, PassKind, CompileResult, PropertySet};
//! use trios_ir::CircuitDag;
//!
//! struct CountToffolis;
//!
//! impl Pass for CountToffolis {
//!     fn name(&self) -> &str { "count_toffolis" }
//!     fn kind(&self) -> PassKind { PassKind::Analysis }
//!
//!     fn run(&self, dag: &mut CircuitDag, props: &mut PropertySet) -> CompileResult<()> {
//!         props.insert(dag.ops_with_arity(3).len());
//!         Ok(())
//!     }
//! }
//! ```

pub mod config;
pub mod coupling;
pub mod error;
pub mod manager;
pub mod orientation;
pub mod pass;
pub mod property;
pub mod unitary;
pub mod variants;

// Built-in passes
pub mod passes;

pub use config::{CompileConfig, RoutingConfig, SelectionConfig};
pub use coupling::{CouplingMap, Orientation};
pub use error::{CompileError, CompileResult};
pub use manager::{PassManager, PassManagerBuilder};
pub use orientation::{EdgeDuration, OrientationMap};
pub use pass::{Pass, PassKind};
pub use property::{Layout, PropertySet};
pub use unitary::Unitary;
