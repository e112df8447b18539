//! Integration test: run lifecycle, termination and reporting.

use tlm_core::{Axis, Coord, Source, Thresholds, Waveform};
use tlm_engine::{
    CancelToken, ConfigError, RebalanceConfig, RunError, SimConfig, Simulation, Termination,
};
use tlm_grid::{GridBuilder, SliceSpec};
use tlm_test_utils::{enclosed_source, free_space};

fn config(source: Source) -> SimConfig {
    SimConfig {
        thresholds: Thresholds::new(1e-3, 1e-4),
        workers: Some(4),
        max_steps: Some(10_000),
        audit_ownership: true,
        ..SimConfig::new(source)
    }
}

// ── Termination ──────────────────────────────────────────────────────

#[test]
fn enclosed_dielectric_rings_down() {
    let (grid, centre) = enclosed_source(4.0);
    let mut sim = Simulation::new(grid, config(Source::impulse(centre))).unwrap();
    let report = sim.run().unwrap();

    assert_eq!(report.termination, Termination::Converged);
    assert_eq!(report.steps, 7);
    assert_eq!(report.metrics.active_counts(), vec![1, 1, 1, 1, 1, 1, 0]);
    assert_eq!(sim.grid().state(centre).peak, 1.0);
}

#[test]
fn enclosed_source_decays_strictly_after_injection() {
    let (grid, centre) = enclosed_source(4.0);
    let config = SimConfig {
        slice: Some(SliceSpec::Row {
            axis: Axis::Z,
            through: centre,
        }),
        ..config(Source::impulse(centre))
    };
    let report = Simulation::run_once(grid, config).unwrap().0;
    assert_eq!(report.termination, Termination::Converged);

    // Every face reflects -1/3 of what leaves it, so V after step k is
    // 2·(-1/3)^(k+1) until it falls below the absolute threshold.
    let trace: Vec<f64> = report
        .time_variation
        .iter()
        .map(|row| row[centre.z as usize])
        .collect();
    assert_eq!(trace.len(), 7);
    for (k, v) in trace[..6].iter().enumerate() {
        let expected = 2.0 * (-1.0f64 / 3.0).powi(k as i32 + 1);
        assert!((v - expected).abs() < 1e-12, "step {k}: {v} vs {expected}");
    }
    for pair in trace[..6].windows(2) {
        assert!(
            pair[1].abs() < pair[0].abs(),
            "|V| grew from {} to {}",
            pair[0],
            pair[1]
        );
        assert!(pair[1] * pair[1] < pair[0] * pair[0]);
    }
    assert_eq!(trace[6], 0.0);
}

#[test]
fn every_node_quiescent_after_convergence() {
    let source = Source::impulse(Coord::new(4, 1, 2));
    let mut sim = Simulation::new(free_space(8, 6, 5), config(source)).unwrap();
    let report = sim.run().unwrap();
    assert_eq!(report.termination, Termination::Converged);

    let grid = sim.grid();
    for i in 0..grid.len() {
        let state = grid.state_at(i);
        assert!(state.is_quiescent(), "node {} not at rest: {state:?}", grid.coord(i));
    }
}

#[test]
fn waits_for_source_to_finish() {
    // A lone node loses everything through its open faces on step 0,
    // but the source still has four silent steps to run.
    let source = Source {
        waveform: Waveform::Impulse,
        position: Coord::new(0, 0, 0),
        duration: 5,
    };
    let report = Simulation::new(free_space(1, 1, 1), config(source))
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(report.termination, Termination::Converged);
    assert_eq!(report.steps, 5);
    assert_eq!(report.metrics.active_counts(), vec![0; 5]);
    assert_eq!(report.partitions, 1);
}

#[test]
fn step_limit_stops_run() {
    let source = Source::impulse(Coord::new(2, 2, 2));
    let config = SimConfig {
        max_steps: Some(5),
        ..config(source)
    };
    let mut sim = Simulation::new(free_space(5, 5, 5), config).unwrap();
    let report = sim.run().unwrap();
    assert_eq!(report.termination, Termination::StepLimit);
    assert_eq!(report.steps, 5);
    assert!(sim.grid().active_count() > 0);
}

#[test]
fn cancelled_before_first_step() {
    let token = CancelToken::new();
    token.cancel();
    let source = Source::impulse(Coord::new(2, 2, 2));
    let mut sim = Simulation::new(free_space(5, 5, 5), config(source)).unwrap();
    let report = sim.run_with_cancel(&token).unwrap();
    assert_eq!(report.termination, Termination::Cancelled);
    assert_eq!(report.steps, 0);
    assert!(report.metrics.steps.is_empty());
}

#[test]
fn second_run_repeats_first() {
    let source = Source::impulse(Coord::new(2, 3, 1));
    let mut sim = Simulation::new(free_space(6, 6, 4), config(source)).unwrap();
    let first = sim.run().unwrap();
    let peaks = sim.grid().peaks();
    let second = sim.run().unwrap();
    assert_eq!(first.steps, second.steps);
    assert_eq!(first.metrics.active_counts(), second.metrics.active_counts());
    assert_eq!(peaks, sim.grid().peaks());
}

// ── Boundary hand-offs ──────────────────────────────────────────────

#[test]
fn node_discovered_twice_is_activated_once() {
    // Four single-node partitions on a 2x2x1 grid. On step 1 both
    // neighbours of the source rediscover it and both find the far
    // corner, so two of the four hand-offs are duplicates.
    let source = Source::impulse(Coord::new(0, 0, 0));
    let (report, grid) = Simulation::run_once(free_space(2, 2, 1), config(source)).unwrap();
    assert_eq!(report.partitions, 4);

    let step0 = &report.metrics.steps[0];
    assert_eq!(step0.handed_off, 2);
    assert_eq!(step0.merged, 2);
    assert_eq!(step0.duplicates, 0);

    let step1 = &report.metrics.steps[1];
    assert_eq!(step1.handed_off, 4);
    assert_eq!(step1.merged, 2);
    assert_eq!(step1.duplicates, 2);
    assert_eq!(grid.active_count(), 0);
}

#[test]
fn rebalancing_keeps_partitions_tiling() {
    let source = Source::impulse(Coord::new(0, 0, 0));
    let config = SimConfig {
        workers: Some(8),
        rebalance: RebalanceConfig {
            interval: 1,
            min_imbalance: 0.0,
        },
        ..config(source)
    };
    let report = Simulation::run_once(free_space(10, 10, 10), config)
        .unwrap()
        .0;
    assert_eq!(report.termination, Termination::Converged);
    assert!(report.metrics.rebalances > 0);
    let volume: usize = report.final_bounds.iter().map(|b| b.volume()).sum();
    assert_eq!(volume, 1000);
}

// ── Recording ────────────────────────────────────────────────────────

#[test]
fn slice_recorded_every_step() {
    let source = Source::impulse(Coord::new(3, 3, 3));
    let grid = free_space(7, 7, 7);
    let config = SimConfig {
        slice: Some(SliceSpec::centre_row(grid.dims())),
        ..config(source)
    };
    let report = Simulation::run_once(grid, config).unwrap().0;
    assert_eq!(report.time_variation.len() as u64, report.steps);
    assert!(report.time_variation.iter().all(|row| row.len() == 7));
    // Step 0 leaves the centre at zero and lights its x neighbours.
    let first = &report.time_variation[0];
    assert!(first[2] > 0.0 && first[4] > 0.0);
    assert_eq!(first[0], 0.0);
}

// ── Configuration errors ─────────────────────────────────────────────

#[test]
fn blocked_source_rejected() {
    let grid = GridBuilder::sized(3, 3, 3)
        .unwrap()
        .blocking(Coord::new(1, 1, 1))
        .build()
        .unwrap();
    match Simulation::new(grid, config(Source::impulse(Coord::new(1, 1, 1)))) {
        Err(ConfigError::SourceBlocked { .. }) => {}
        other => panic!("expected SourceBlocked, got {other:?}"),
    }
}

#[test]
fn run_once_surfaces_config_errors() {
    let source = Source {
        duration: 0,
        ..Source::impulse(Coord::new(1, 1, 1))
    };
    match Simulation::run_once(free_space(3, 3, 3), config(source)) {
        Err(RunError::Config(ConfigError::ZeroDuration)) => {}
        other => panic!("expected Config(ZeroDuration), got {other:?}"),
    }
}
