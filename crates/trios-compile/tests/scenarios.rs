//! End-to-end compilation scenarios.
//!
//! Each test runs the default pipeline and checks routing, Toffoli
//! selection and the final gate counts.

mod common;

use common::{bidirectional_full, compile, count, implements};
use trios_compile::passes::{AdjacencyReport, RoutingTrace, SelectionLog};
use trios_compile::variants::{AdjacencyClass, Bias, VariantChoice};
use trios_compile::{CompileConfig, CompileError, CouplingMap, PassManagerBuilder};
use trios_ir::{Circuit, CustomGate, QubitId};

// ============================================================================
// Routing
// ============================================================================

#[test]
fn test_distant_cx_needs_one_swap() {
    let mut circuit = Circuit::with_size("test", 3);
    circuit.cx(QubitId(0), QubitId(2)).unwrap();

    let config = CompileConfig::from_yaml_str(
        "selection:\n  toffoli: false\n  cx: false\n  bridge: false\n",
    )
    .unwrap();
    let (pm, mut props) = PassManagerBuilder::new()
        .with_coupling_map(CouplingMap::linear(3))
        .with_config(config)
        .unwrap()
        .build();
    let mut dag = circuit.dag().clone();
    pm.run(&mut dag, &mut props).unwrap();

    let trace = props.get::<RoutingTrace>().unwrap();
    assert_eq!(trace.len(), 1);
    assert_eq!(count(&dag, "swap"), 1);

    let (_, cx) = dag
        .topological_ops()
        .find(|(_, inst)| inst.name() == "cx")
        .unwrap();
    let coupling_map = props.coupling_map.as_ref().unwrap();
    assert!(coupling_map.is_adjacent(cx.qubits[0].0, cx.qubits[1].0));
    assert!(props.get::<AdjacencyReport>().unwrap().satisfied);
    assert!(implements(&circuit, &dag, &props));
}

#[test]
fn test_distant_cx_full_pipeline() {
    let mut circuit = Circuit::with_size("test", 3);
    circuit.cx(QubitId(0), QubitId(2)).unwrap();

    let (dag, props) = compile(&circuit, CouplingMap::linear(3)).unwrap();
    assert_eq!(props.get::<RoutingTrace>().unwrap().len(), 1);
    assert_eq!(count(&dag, "swap"), 0);
    assert!(implements(&circuit, &dag, &props));
}

// ============================================================================
// Toffoli selection
// ============================================================================

#[test]
fn test_triangle_ccx_is_canonical_full() {
    let mut circuit = Circuit::with_size("test", 3);
    circuit.ccx(QubitId(0), QubitId(1), QubitId(2)).unwrap();

    let (dag, props) = compile(&circuit, CouplingMap::full(3)).unwrap();
    assert!(props.get::<RoutingTrace>().unwrap().is_empty());

    let log = props.get::<SelectionLog>().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(
        log.records[0].choice,
        VariantChoice::Canonical(AdjacencyClass::Full)
    );
    assert_eq!(count(&dag, "ccx"), 0);
    assert!(implements(&circuit, &dag, &props));
}

#[test]
fn test_line_ccx_is_canonical_pivot() {
    let mut circuit = Circuit::with_size("test", 3);
    circuit.ccx(QubitId(0), QubitId(1), QubitId(2)).unwrap();

    let (dag, props) = compile(&circuit, CouplingMap::linear(3)).unwrap();
    assert!(props.get::<RoutingTrace>().unwrap().is_empty());

    let log = props.get::<SelectionLog>().unwrap();
    assert_eq!(log.len(), 1);
    assert!(!log.records[0].requested.has_context());
    assert_eq!(
        log.records[0].choice,
        VariantChoice::Canonical(AdjacencyClass::Pivot(1))
    );
    assert_eq!(log.canonical_count(), 1);
    assert!(implements(&circuit, &dag, &props));
}

#[test]
fn test_ccx_pair_shares_cancelled_boundary() {
    let mut circuit = Circuit::with_size("test", 4);
    circuit.ccx(QubitId(0), QubitId(1), QubitId(2)).unwrap();
    circuit.ccx(QubitId(0), QubitId(1), QubitId(3)).unwrap();

    let (dag, props) = compile(&circuit, bidirectional_full(4)).unwrap();

    let log = props.get::<SelectionLog>().unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log.records[0].requested.bias, Bias::Successor);
    let VariantChoice::Keyed(first) = log.records[0].choice else {
        panic!("first CCX should use a keyed variant");
    };
    let VariantChoice::Keyed(second) = log.records[1].choice else {
        panic!("second CCX should use a keyed variant");
    };
    assert_eq!(first.bias, Bias::Successor);
    assert_eq!(second.bias, Bias::Predecessor);

    // Two isolated canonical decompositions take 15 gates each.
    assert!(dag.num_ops() < 30, "got {} gates", dag.num_ops());
    assert!(implements(&circuit, &dag, &props));
}

#[test]
fn test_routed_ccx_uses_pivot() {
    let mut circuit = Circuit::with_size("test", 5);
    circuit.ccx(QubitId(0), QubitId(2), QubitId(4)).unwrap();

    let (dag, props) = compile(&circuit, CouplingMap::linear(5)).unwrap();
    assert_eq!(props.get::<RoutingTrace>().unwrap().len(), 2);
    assert!(props.get::<AdjacencyReport>().unwrap().satisfied);
    assert_eq!(count(&dag, "ccx"), 0);
    assert_eq!(count(&dag, "swap"), 0);
    assert!(implements(&circuit, &dag, &props));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_too_many_qubits() {
    let circuit = Circuit::with_size("test", 4);
    assert!(matches!(
        compile(&circuit, CouplingMap::linear(3)),
        Err(CompileError::CapacityExceeded {
            required: 4,
            available: 3
        })
    ));
}

#[test]
fn test_disconnected_topology() {
    let mut circuit = Circuit::with_size("test", 4);
    circuit.cx(QubitId(0), QubitId(3)).unwrap();
    let coupling_map = CouplingMap::from_edges(4, [(0, 1), (2, 3)]);
    assert!(matches!(
        compile(&circuit, coupling_map),
        Err(CompileError::UnreachableTopology { .. })
    ));
}

#[test]
fn test_custom_gate_is_structural_violation() {
    let mut circuit = Circuit::with_size("test", 4);
    circuit
        .gate(
            CustomGate::new("maj", 4),
            [QubitId(0), QubitId(1), QubitId(2), QubitId(3)],
        )
        .unwrap();
    assert!(matches!(
        compile(&circuit, CouplingMap::linear(4)),
        Err(CompileError::StructuralViolation(_))
    ));
}
