//! Benchmarks for routing and the full compilation pipeline
//!
//! Run with: cargo bench -p trios-compile

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use trios_compile::passes::{BasicRouting, ContextAwareToffoli};
use trios_compile::{CouplingMap, Pass, PassManagerBuilder, PropertySet};
use trios_ir::{Circuit, QubitId};

/// A reversed Toffoli ladder: every gate spans the whole register.
fn spread_ladder(n: u32) -> Circuit {
    let mut circuit = Circuit::with_size("spread", n);
    for i in 0..n / 2 {
        // The middle gate would repeat an operand; skip it.
        let _ = circuit.ccx(QubitId(i), QubitId(n - 1 - i), QubitId(n / 2));
        let _ = circuit.cx(QubitId(n - 1 - i), QubitId(i));
    }
    circuit
}

/// Benchmark routing on sparse topologies
fn bench_routing(c: &mut Criterion) {
    let mut group = c.benchmark_group("routing");

    for n in &[8u32, 16, 32] {
        for (topology, coupling_map) in [
            ("linear", CouplingMap::linear(*n)),
            ("ring", CouplingMap::ring(*n)),
        ] {
            let circuit = spread_ladder(*n);
            group.bench_with_input(BenchmarkId::new(topology, n), &circuit, |b, circuit| {
                b.iter_batched(
                    || {
                        (
                            circuit.dag().clone(),
                            PropertySet::new().with_coupling_map(coupling_map.clone()),
                        )
                    },
                    |(mut dag, mut props)| {
                        BasicRouting::new().run(&mut dag, &mut props).unwrap();
                        black_box(dag.num_ops())
                    },
                    BatchSize::SmallInput,
                );
            });
        }
    }

    group.finish();
}

/// Benchmark context-aware Toffoli selection on a routed ladder
fn bench_toffoli_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("toffoli_selection");

    for n in &[10u32, 50] {
        let circuit = Circuit::toffoli_ladder(*n).unwrap();
        let coupling_map = CouplingMap::linear(*n);
        group.bench_with_input(BenchmarkId::new("ladder", n), &circuit, |b, circuit| {
            b.iter_batched(
                || {
                    (
                        circuit.dag().clone(),
                        PropertySet::new().with_coupling_map(coupling_map.clone()),
                    )
                },
                |(mut dag, mut props)| {
                    ContextAwareToffoli::new().run(&mut dag, &mut props).unwrap();
                    black_box(dag.num_ops())
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// Benchmark the default pipeline end to end
fn bench_pipeline(c: &mut Criterion) {
    let circuit = spread_ladder(16);
    c.bench_function("pipeline_grid_4x4", |b| {
        b.iter_batched(
            || {
                PassManagerBuilder::new()
                    .with_coupling_map(CouplingMap::grid(4, 4))
                    .build()
            },
            |(pm, mut props)| {
                let mut dag = circuit.dag().clone();
                pm.run(&mut dag, &mut props).unwrap();
                black_box(dag.num_ops())
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_routing, bench_toffoli_selection, bench_pipeline);
criterion_main!(benches);
