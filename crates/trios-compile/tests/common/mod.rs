//! Shared helpers for the integration tests.

#![allow(dead_code)]

use trios_compile::{CompileResult, CouplingMap, PassManagerBuilder, PropertySet, Unitary};
use trios_ir::{Circuit, CircuitDag};

/// Install a test-writer subscriber once; `RUST_LOG` selects the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Run the default pipeline on a copy of `circuit`.
pub fn compile(
    circuit: &Circuit,
    coupling_map: CouplingMap,
) -> CompileResult<(CircuitDag, PropertySet)> {
    init_tracing();
    let (pm, mut props) = PassManagerBuilder::new()
        .with_coupling_map(coupling_map)
        .build();
    let mut dag = circuit.dag().clone();
    pm.run(&mut dag, &mut props)?;
    Ok((dag, props))
}

/// A fully connected map whose every edge is native in both directions.
pub fn bidirectional_full(n: u32) -> CouplingMap {
    CouplingMap::from_edges(
        n,
        (0..n).flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j))),
    )
}

/// Count gates of the given name.
pub fn count(dag: &CircuitDag, name: &str) -> usize {
    dag.count_ops().get(name).copied().unwrap_or(0)
}

/// Whether the compiled circuit implements `program`, once the initial
/// layout and the routing permutation are taken into account.
pub fn implements(program: &Circuit, compiled: &CircuitDag, props: &PropertySet) -> bool {
    let layout = props.layout.as_ref().expect("pipeline sets a layout");
    let moved = props.program_to_final().expect("pipeline sets a final layout");
    let n = layout.len();

    let input: Vec<usize> = layout.iter().map(|(_, p)| p as usize).collect();
    let output: Vec<usize> = moved.iter().map(|(_, p)| p as usize).collect();

    let expected = Unitary::from_dag(program.dag(), n)
        .unwrap()
        .permuted(&input, &output);
    let actual = Unitary::from_dag(compiled, n).unwrap();
    actual.equals_up_to_global_phase(&expected)
}
