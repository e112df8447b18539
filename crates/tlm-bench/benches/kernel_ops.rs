//! Criterion benchmarks for the single-threaded scatter/connect phases.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use tlm_core::{PruneMetric, Source};
use tlm_grid::Grid;
use tlm_kernel::{clear_pruned, connect, inject, scatter, ActiveSet, Pruning};
use tlm_test_utils::free_space;

/// Step a central impulse `steps` times so the wavefront is a wide
/// shell, returning the grid and its active set.
fn grown_front(n: u32, steps: u64) -> (Grid, ActiveSet, Pruning) {
    let grid = free_space(n, n, n);
    let pruning = Pruning::new(PruneMetric::Magnitude, tlm_bench::PROFILE_THRESHOLDS);
    let source = Source::impulse(grid.dims().centre());
    let src = grid.index(source.position);
    let territory = grid.dims().bounds();
    let mut set = ActiveSet::new();
    let mut pruned = Vec::new();
    set.insert(&grid, src);
    for step in 0..steps {
        if let Some(a) = source.sample(step) {
            inject(&grid, &mut set, src, a, &pruning);
        }
        scatter(&grid, &mut set, &territory, |_, _| {});
        connect(&grid, &mut set, &pruning, &mut pruned);
        clear_pruned(&grid, &mut pruned);
    }
    (grid, set, pruning)
}

fn bench_step_48(c: &mut Criterion) {
    c.bench_function("step_48_front", |b| {
        b.iter_batched(
            || grown_front(48, 12),
            |(grid, mut set, pruning)| {
                let territory = grid.dims().bounds();
                let mut pruned = Vec::new();
                let s = scatter(&grid, &mut set, &territory, |_, _| {});
                let k = connect(&grid, &mut set, &pruning, &mut pruned);
                clear_pruned(&grid, &mut pruned);
                black_box((s, k));
            },
            criterion::BatchSize::LargeInput,
        );
    });
}

fn bench_active_set_sweep(c: &mut Criterion) {
    let (grid, set, _) = grown_front(48, 12);
    c.bench_function("active_set_sweep", |b| {
        b.iter_batched(
            || set.clone(),
            |mut set| {
                set.sweep(|i| {
                    if grid.node(i).v() > 0.0 {
                        tlm_kernel::Sweep::Keep
                    } else {
                        tlm_kernel::Sweep::Detach
                    }
                });
                black_box(set.len());
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_step_48, bench_active_set_sweep);
criterion_main!(benches);
