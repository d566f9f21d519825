use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use ixa_gridsir::parameters::Parameters;
use ixa_gridsir::simulation::Simulation;
use ixa_gridsir::summary::Summary;

fn full_run(parameters: Parameters) -> Vec<Summary> {
    let mut summaries = Vec::new();
    Simulation::new(parameters)
        .run(&mut summaries)
        .expect("collecting summaries cannot fail");
    summaries
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let dense = Parameters::new(10, 10_000, 5, 1000).expect("valid parameters");
    c.bench_function("full run, dense grid", |bencher| {
        bencher.iter_with_large_drop(|| full_run(black_box(dense)))
    });

    let sparse = Parameters::new(1000, 100_000, 10, 100_000).expect("valid parameters");
    c.bench_function("100 rounds, sparse grid", |bencher| {
        bencher.iter_with_large_drop(|| {
            let mut simulation = Simulation::new(black_box(sparse));
            for _ in 0..100 {
                black_box(simulation.one_round());
            }
            simulation
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
