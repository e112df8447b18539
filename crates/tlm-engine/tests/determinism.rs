//! Integration test: results do not depend on how the grid is split.
//!
//! Every run is compared against the single-threaded reference stepper
//! in `tlm-test-utils`. Peaks must match bit for bit, and so must the
//! step count and the active count after every step, for any worker
//! count and with rebalancing moving the cuts mid-run.

use proptest::prelude::*;
use tlm_core::{Coord, Dims, PruneMetric, Source, Thresholds, Waveform};
use tlm_engine::{RebalanceConfig, SimConfig, Simulation, Termination};
use tlm_grid::Grid;
use tlm_kernel::Pruning;
use tlm_test_utils::{free_space, layered_slab, random_scene, reference_run};

const MAX_STEPS: u64 = 10_000;

fn bits(peaks: &[f64]) -> Vec<u64> {
    peaks.iter().map(|p| p.to_bits()).collect()
}

/// Run the engine on `grid` and the reference on `twin`, which must be
/// an identical grid, and compare.
fn assert_matches_reference(grid: Grid, mut twin: Grid, config: SimConfig) {
    let pruning = Pruning::new(config.metric, config.thresholds);
    let reference = reference_run(&mut twin, &config.source, pruning, MAX_STEPS);

    let mut sim = Simulation::new(grid, config).unwrap();
    let report = sim.run().unwrap();

    assert_eq!(report.termination, Termination::Converged);
    assert_eq!(report.steps, reference.steps);
    assert_eq!(report.metrics.active_counts(), reference.active_counts);
    assert_eq!(bits(&sim.grid().peaks()), bits(&reference.peaks));
    assert_eq!(sim.grid().active_count(), 0);
}

fn config(source: Source, workers: usize) -> SimConfig {
    SimConfig {
        thresholds: Thresholds::new(1e-3, 1e-4),
        workers: Some(workers),
        rebalance: RebalanceConfig::disabled(),
        max_steps: Some(MAX_STEPS),
        audit_ownership: true,
        ..SimConfig::new(source)
    }
}

#[test]
fn impulse_in_free_space_any_worker_count() {
    let source = Source::impulse(Coord::new(2, 2, 2));
    for workers in [1, 2, 3, 4, 6, 8] {
        assert_matches_reference(
            free_space(5, 5, 5),
            free_space(5, 5, 5),
            config(source, workers),
        );
    }
}

#[test]
fn impulse_in_free_space_takes_44_steps() {
    let source = Source::impulse(Coord::new(2, 2, 2));
    let mut sim = Simulation::new(free_space(5, 5, 5), config(source, 8)).unwrap();
    let report = sim.run().unwrap();
    assert_eq!(report.steps, 44);
    assert_eq!(report.metrics.peak_active(), 63);
    assert_eq!(report.partitions, 8);
}

#[test]
fn dielectric_slab_with_rebalancing() {
    // Source off-centre so the load is lopsided and the cuts move.
    let source = Source::impulse(Coord::new(1, 1, 1));
    let config = SimConfig {
        rebalance: RebalanceConfig {
            interval: 2,
            min_imbalance: 0.0,
        },
        ..config(source, 8)
    };
    let probe = Simulation::new(layered_slab(9, 3, 4.0), config.clone())
        .unwrap()
        .run()
        .unwrap();
    assert!(probe.metrics.rebalances > 0, "cuts never moved");

    assert_matches_reference(layered_slab(9, 3, 4.0), layered_slab(9, 3, 4.0), config);
}

#[test]
fn energy_metric_matches_reference() {
    let source = Source::impulse(Coord::new(3, 2, 2));
    let config = SimConfig {
        metric: PruneMetric::Energy,
        ..config(source, 4)
    };
    assert_matches_reference(free_space(7, 5, 5), free_space(7, 5, 5), config);
}

#[test]
fn gaussian_source_matches_reference() {
    let source = Source {
        waveform: Waveform::Gaussian,
        position: Coord::new(3, 3, 3),
        duration: 8,
    };
    assert_matches_reference(free_space(7, 7, 7), free_space(7, 7, 7), config(source, 6));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn random_scenes_match_reference(
        seed in any::<u64>(),
        x in 3u32..8,
        y in 3u32..8,
        z in 1u32..6,
        workers in 1usize..9,
        rebalance in proptest::bool::ANY,
    ) {
        let dims = Dims::new(x, y, z).unwrap();
        let scene = random_scene(seed, dims);
        let twin = random_scene(seed, dims);
        let source = Source {
            waveform: Waveform::RaisedCosine,
            position: scene.source,
            duration: 4,
        };
        let mut config = config(source, workers);
        if rebalance {
            config.rebalance = RebalanceConfig { interval: 3, min_imbalance: 0.0 };
        }
        assert_matches_reference(scene.grid, twin.grid, config);
    }
}
