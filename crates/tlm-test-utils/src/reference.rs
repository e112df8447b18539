//! Single-threaded reference stepper.
//!
//! Drives the kernel phases over one active set covering the whole
//! grid, with no partitions, channels or barriers. The partitioned
//! engine must reproduce its peaks exactly for any worker count.

use tlm_core::Source;
use tlm_grid::Grid;
use tlm_kernel::{clear_pruned, connect, inject, scatter, ActiveSet, Pruning};

/// Outcome of [`reference_run`].
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceRun {
    /// Steps executed.
    pub steps: u64,
    /// Active nodes after each step.
    pub active_counts: Vec<usize>,
    /// Per-node peaks, in flat index order.
    pub peaks: Vec<f64>,
}

/// Step `grid` from rest until the wavefront dies out after the source
/// finishes, or `max_steps` steps have run.
pub fn reference_run(
    grid: &mut Grid,
    source: &Source,
    pruning: Pruning,
    max_steps: u64,
) -> ReferenceRun {
    grid.reset();
    let grid: &Grid = grid;
    let territory = grid.dims().bounds();
    let src = grid.index(source.position);
    let duration = u64::from(source.duration);

    let mut set = ActiveSet::new();
    set.insert(grid, src);
    let mut pruned = Vec::new();
    let mut active_counts = Vec::new();

    for step in 0..max_steps {
        if let Some(amplitude) = source.sample(step) {
            inject(grid, &mut set, src, amplitude, &pruning);
        }
        scatter(grid, &mut set, &territory, |face, n| {
            panic!("node {n} across {face} lies outside the whole grid")
        });
        connect(grid, &mut set, &pruning, &mut pruned);
        clear_pruned(grid, &mut pruned);
        active_counts.push(set.len());
        if set.is_empty() && step + 1 >= duration {
            break;
        }
    }

    ReferenceRun {
        steps: active_counts.len() as u64,
        active_counts,
        peaks: grid.peaks(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{enclosed_source, free_space};
    use tlm_core::{Coord, PruneMetric, Thresholds};

    fn magnitude(absolute: f64) -> Pruning {
        Pruning::new(PruneMetric::Magnitude, Thresholds::new(absolute, 1e-4))
    }

    #[test]
    fn impulse_in_small_cube_dies_out() {
        let mut grid = free_space(5, 5, 5);
        let source = Source::impulse(Coord::new(2, 2, 2));
        let run = reference_run(&mut grid, &source, magnitude(1e-3), 1_000);
        assert_eq!(run.steps, 44);
        assert_eq!(run.active_counts.last(), Some(&0));
        assert_eq!(run.active_counts.iter().max(), Some(&63));
        assert_eq!(grid.active_count(), 0);
        // The returning wave peaks above the injected unit pulse.
        let source_peak = run.peaks[grid.index(Coord::new(2, 2, 2))];
        assert!((source_peak - 4.0 / 3.0).abs() < 1e-12, "peak {source_peak}");
    }

    #[test]
    fn enclosed_dielectric_rings_down() {
        // Zs = Z0/2, so R = -1/3 on every face and |V| shrinks threefold
        // each step until it drops below 1e-3 on the seventh.
        let (mut grid, centre) = enclosed_source(4.0);
        let run = reference_run(&mut grid, &Source::impulse(centre), magnitude(1e-3), 100);
        assert_eq!(run.active_counts, vec![1, 1, 1, 1, 1, 1, 0]);
        assert_eq!(run.peaks[grid.index(centre)], 1.0);
        assert!(grid.state(centre).is_quiescent());
    }

    #[test]
    fn step_limit_respected() {
        let mut grid = free_space(5, 5, 5);
        let source = Source::impulse(Coord::new(2, 2, 2));
        let run = reference_run(&mut grid, &source, magnitude(1e-3), 5);
        assert_eq!(run.steps, 5);
        assert!(grid.active_count() > 0);
    }
}
