//! Property-based tests for DAG rewriting.
//!
//! Substitution and removal must keep every wire a single chain from input
//! to output and must not reorder anything they do not touch.

use proptest::prelude::*;
use trios_ir::{Circuit, CircuitDag, Instruction, QubitId};

const NUM_QUBITS: u32 = 4;

fn arb_circuit() -> impl Strategy<Value = Circuit> {
    let q = 0..NUM_QUBITS;
    let op = prop_oneof![
        q.clone().prop_map(|a| vec![a]),
        (q.clone(), q.clone()).prop_map(|(a, b)| vec![a, b]),
        (q.clone(), q.clone(), q).prop_map(|(a, b, c)| vec![a, b, c]),
    ];
    prop::collection::vec(op, 1..=16).prop_map(|ops| {
        let mut circuit = Circuit::with_size("prop", NUM_QUBITS);
        for qubits in ops {
            // Repeated operands are rejected and skipped.
            let _ = match qubits.as_slice() {
                [a] => circuit.t(QubitId(*a)),
                [a, b] => circuit.cx(QubitId(*a), QubitId(*b)),
                [a, b, c] => circuit.ccx(QubitId(*a), QubitId(*b), QubitId(*c)),
                _ => continue,
            };
        }
        circuit
    })
}

/// The instructions on each wire, in wire order.
fn wire_sequences(dag: &CircuitDag) -> Vec<Vec<Instruction>> {
    (0..NUM_QUBITS)
        .map(|w| {
            dag.wire_ops(QubitId(w))
                .into_iter()
                .filter_map(|n| dag.get_instruction(n).cloned())
                .collect()
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Doubling every operation in place doubles each wire's sequence.
    #[test]
    fn prop_substitute_in_place(circuit in arb_circuit()) {
        let mut dag = circuit.dag().clone();
        let before = wire_sequences(&dag);
        let nodes: Vec<_> = dag.topological_ops().map(|(n, _)| n).collect();

        for node in nodes {
            let inst = dag.get_instruction(node).unwrap().clone();
            dag.substitute_node(node, [inst.clone(), inst]).unwrap();
        }

        dag.verify_integrity().unwrap();
        prop_assert_eq!(dag.num_ops(), 2 * circuit.dag().num_ops());
        let doubled: Vec<Vec<Instruction>> = before
            .into_iter()
            .map(|seq| seq.into_iter().flat_map(|i| [i.clone(), i]).collect())
            .collect();
        prop_assert_eq!(wire_sequences(&dag), doubled);
    }

    /// Removing one operation drops it from exactly its own wires.
    #[test]
    fn prop_remove_keeps_wire_order(circuit in arb_circuit(), pick in any::<prop::sample::Index>()) {
        let mut dag = circuit.dag().clone();
        prop_assume!(dag.num_ops() > 0);
        let before = wire_sequences(&dag);
        let (node, _) = dag.topological_ops().nth(pick.index(dag.num_ops())).unwrap();

        let removed = dag.remove_op(node).unwrap();

        dag.verify_integrity().unwrap();
        prop_assert_eq!(dag.num_ops(), circuit.dag().num_ops() - 1);
        for (w, (old, new)) in before.iter().zip(wire_sequences(&dag)).enumerate() {
            if removed.qubits.contains(&QubitId(w as u32)) {
                prop_assert_eq!(new.len(), old.len() - 1);
            } else {
                prop_assert_eq!(&new, old);
            }
        }
    }

    /// Replacing an operation by an empty sequence reconnects its wires.
    #[test]
    fn prop_empty_replacement(circuit in arb_circuit()) {
        let mut dag = circuit.dag().clone();
        let first = dag.topological_ops().next().map(|(n, _)| n);
        prop_assume!(first.is_some());
        if let Some(node) = first {
            let new_nodes = dag.substitute_node(node, Vec::new()).unwrap();
            prop_assert!(new_nodes.is_empty());
        }
        dag.verify_integrity().unwrap();
        prop_assert_eq!(dag.num_ops(), circuit.dag().num_ops() - 1);
    }
}
