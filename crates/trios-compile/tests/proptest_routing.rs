//! Property-based tests for routing.
//!
//! Tests that routed circuits satisfy the topology, that routing and
//! variant selection are deterministic, and that a single two-qubit gate
//! costs exactly `distance - 1` SWAPs.

use proptest::prelude::*;
use trios_compile::passes::{
    BasicRouting, ContextAwareCx, ContextAwareToffoli, RoutingTrace, SelectionLog, check_adjacency,
};
use trios_compile::{CouplingMap, Pass, PropertySet};
use trios_ir::{Circuit, CircuitDag, Instruction, QubitId};

/// Generate a random circuit of CX, SWAP and CCX gates.
///
/// Generates circuits with:
/// - `num_qubits` wires
/// - 1-12 gates, repeated operands skipped
fn arb_circuit(num_qubits: u32) -> impl Strategy<Value = Circuit> {
    let q = 0..num_qubits;
    let op = prop_oneof![
        (q.clone(), q.clone()).prop_map(|(a, b)| vec![a, b]),
        (q.clone(), q.clone(), q).prop_map(|(a, b, c)| vec![a, b, c]),
    ];
    (prop::collection::vec(op, 1..=12), any::<bool>()).prop_map(move |(ops, use_swap)| {
        let mut circuit = Circuit::with_size("prop", num_qubits);
        for qubits in ops {
            let _ = match qubits.as_slice() {
                [a, b] if use_swap && a % 2 == 0 => circuit.swap(QubitId(*a), QubitId(*b)),
                [a, b] => circuit.cx(QubitId(*a), QubitId(*b)),
                [a, b, c] => circuit.ccx(QubitId(*a), QubitId(*b), QubitId(*c)),
                _ => continue,
            };
        }
        circuit
    })
}

fn arb_topology() -> impl Strategy<Value = CouplingMap> {
    prop_oneof![
        (3_u32..=8).prop_map(CouplingMap::linear),
        (3_u32..=8).prop_map(CouplingMap::ring),
        (3_u32..=8).prop_map(CouplingMap::star),
        (2_u32..=3, 2_u32..=3).prop_map(|(r, c)| CouplingMap::grid(r, c)),
    ]
}

fn arb_routing_case() -> impl Strategy<Value = (CouplingMap, Circuit)> {
    arb_topology().prop_flat_map(|cm| {
        let n = cm.num_qubits();
        (Just(cm), arb_circuit(n))
    })
}

fn route(circuit: &Circuit, coupling_map: &CouplingMap, pass: BasicRouting) -> (CircuitDag, PropertySet) {
    let mut dag = circuit.dag().clone();
    let mut props = PropertySet::new().with_coupling_map(coupling_map.clone());
    pass.run(&mut dag, &mut props).unwrap();
    (dag, props)
}

fn instructions(dag: &CircuitDag) -> Vec<Instruction> {
    dag.topological_ops().map(|(_, inst)| inst.clone()).collect()
}

/// Toffoli then CX selection on a copy of an already routed graph.
fn select(routed: &CircuitDag, coupling_map: &CouplingMap) -> (Vec<Instruction>, SelectionLog) {
    let mut dag = routed.clone();
    let mut props = PropertySet::new().with_coupling_map(coupling_map.clone());
    ContextAwareToffoli::new().run(&mut dag, &mut props).unwrap();
    ContextAwareCx.run(&mut dag, &mut props).unwrap();
    (instructions(&dag), props.remove::<SelectionLog>().unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Every gate of a routed circuit acts on adjacent physical qubits.
    #[test]
    fn prop_routed_circuit_is_adjacent((coupling_map, circuit) in arb_routing_case()) {
        let (dag, _) = route(&circuit, &coupling_map, BasicRouting::new());
        dag.verify_integrity().unwrap();
        let report = check_adjacency(&dag, None, &coupling_map).unwrap();
        prop_assert!(report.satisfied, "violation: {:?}", report.violation);
    }

    /// Routing the same input twice gives identical output.
    #[test]
    fn prop_routing_is_deterministic((coupling_map, circuit) in arb_routing_case()) {
        let (first, first_props) = route(&circuit, &coupling_map, BasicRouting::new());
        let (second, second_props) = route(&circuit, &coupling_map, BasicRouting::new());
        prop_assert_eq!(instructions(&first), instructions(&second));
        prop_assert_eq!(
            first_props.get::<RoutingTrace>(),
            second_props.get::<RoutingTrace>()
        );
        prop_assert_eq!(first_props.final_layout, second_props.final_layout);
    }

    /// Selection over the same routed graph twice gives identical output.
    #[test]
    fn prop_selection_is_deterministic((coupling_map, circuit) in arb_routing_case()) {
        let (routed, _) = route(&circuit, &coupling_map, BasicRouting::new());
        let (first_ops, first_log) = select(&routed, &coupling_map);
        let (second_ops, second_log) = select(&routed, &coupling_map);

        prop_assert_eq!(
            serde_json::to_string(&first_ops).unwrap(),
            serde_json::to_string(&second_ops).unwrap()
        );
        prop_assert_eq!(&first_log, &second_log);
        prop_assert_eq!(first_log.len(), circuit.dag().ops_with_arity(3).len());
    }

    /// A fake run records the same SWAPs and final layout as a real run.
    #[test]
    fn prop_fake_run_matches((coupling_map, circuit) in arb_routing_case()) {
        let (_, real) = route(&circuit, &coupling_map, BasicRouting::new());
        let (untouched, fake) = route(&circuit, &coupling_map, BasicRouting::fake_run());
        prop_assert_eq!(real.get::<RoutingTrace>(), fake.get::<RoutingTrace>());
        prop_assert_eq!(real.final_layout, fake.final_layout);
        prop_assert_eq!(instructions(&untouched), instructions(circuit.dag()));
    }

    /// A lone two-qubit gate needs exactly `distance - 1` SWAPs.
    #[test]
    fn prop_two_qubit_gate_is_minimal(
        (coupling_map, a, b) in arb_topology().prop_flat_map(|cm| {
            let n = cm.num_qubits();
            (Just(cm), 0..n, 0..n)
        }).prop_filter("distinct operands", |(_, a, b)| a != b)
    ) {
        let mut circuit = Circuit::with_size("pair", coupling_map.num_qubits());
        circuit.cx(QubitId(a), QubitId(b)).unwrap();
        let (_, props) = route(&circuit, &coupling_map, BasicRouting::new());

        let distance = coupling_map.distance(a, b).unwrap() as usize;
        prop_assert_eq!(props.get::<RoutingTrace>().unwrap().len(), distance - 1);
    }
}
