//! Criterion benchmarks for complete runs across worker counts.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tlm_bench::{free_space_profile, room_profile};
use tlm_engine::{RebalanceConfig, Simulation};

fn bench_free_space_32(c: &mut Criterion) {
    let mut group = c.benchmark_group("free_space_32");
    group.sample_size(10);
    for workers in [1, 2, 4, 8] {
        let (grid, config) = free_space_profile(32, workers);
        let mut sim = Simulation::new(grid, config).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, _| {
            b.iter(|| {
                let report = sim.run().unwrap();
                black_box(&report);
            });
        });
    }
    group.finish();
}

fn bench_room(c: &mut Criterion) {
    let mut group = c.benchmark_group("room");
    group.sample_size(10);
    for workers in [1, 4, 8] {
        let (grid, config) = room_profile(workers);
        let mut sim = Simulation::new(grid, config).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, _| {
            b.iter(|| {
                let report = sim.run().unwrap();
                black_box(&report);
            });
        });
    }
    group.finish();
}

fn bench_room_without_rebalancing(c: &mut Criterion) {
    let (grid, mut config) = room_profile(8);
    config.rebalance = RebalanceConfig::disabled();
    let mut sim = Simulation::new(grid, config).unwrap();
    let mut group = c.benchmark_group("room_static");
    group.sample_size(10);
    group.bench_function("8", |b| {
        b.iter(|| {
            let report = sim.run().unwrap();
            black_box(&report);
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_free_space_32,
    bench_room,
    bench_room_without_rebalancing
);
criterion_main!(benches);
