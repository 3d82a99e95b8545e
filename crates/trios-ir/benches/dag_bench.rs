//! Benchmarks for Trios DAG operations
//!
//! Run with: cargo bench -p trios-ir

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use trios_ir::{Circuit, Instruction, StandardGate};

/// Benchmark building Toffoli ladders
fn bench_ladder_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("ladder_construction");

    for n in &[5u32, 20, 100] {
        group.bench_with_input(BenchmarkId::new("toffoli_ladder", n), n, |b, &n| {
            b.iter(|| Circuit::toffoli_ladder(black_box(n)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark deterministic layering
fn bench_layers(c: &mut Criterion) {
    let mut group = c.benchmark_group("layers");

    for n in &[20u32, 100] {
        let circuit = Circuit::toffoli_ladder(*n).unwrap();
        group.bench_with_input(BenchmarkId::new("layers", n), circuit.dag(), |b, dag| {
            b.iter(|| black_box(dag.layers()));
        });
    }

    group.finish();
}

/// Benchmark in-place substitution of every Toffoli
fn bench_substitute(c: &mut Criterion) {
    c.bench_function("substitute_all_ccx_50", |b| {
        b.iter_batched(
            || Circuit::toffoli_ladder(50).unwrap().into_dag(),
            |mut dag| {
                for node in dag.ops_with_arity(3) {
                    let qubits = dag.get_instruction(node).unwrap().qubits.clone();
                    let replacement = vec![
                        Instruction::single_qubit_gate(StandardGate::H, qubits[2]),
                        Instruction::two_qubit_gate(StandardGate::CX, qubits[1], qubits[2]),
                        Instruction::single_qubit_gate(StandardGate::H, qubits[2]),
                    ];
                    dag.substitute_node(node, replacement).unwrap();
                }
                black_box(dag.num_ops())
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_ladder_construction,
    bench_layers,
    bench_substitute
);
criterion_main!(benches);
