//! Threshold pruning under a chosen metric.

use tlm_core::{PruneMetric, Thresholds};
use tlm_grid::Node;

/// Decides whether a node leaves the wavefront after connect.
///
/// Holds thresholds already expressed in the units of its metric, so
/// `Thresholds` given in magnitude form can be passed straight in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pruning {
    metric: PruneMetric,
    thresholds: Thresholds,
}

impl Pruning {
    /// Pruning by `metric`, converting magnitude `thresholds` to match.
    pub fn new(metric: PruneMetric, thresholds: Thresholds) -> Self {
        Self {
            metric,
            thresholds: thresholds.for_metric(metric),
        }
    }

    /// The metric in use.
    pub fn metric(&self) -> PruneMetric {
        self.metric
    }

    /// Thresholds in the metric's units.
    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Store the freshly connected voltage `v` and update the node's
    /// peak. Returns `true` if the node should be pruned.
    pub fn update(&self, node: &Node, v: f64) -> bool {
        match self.metric {
            PruneMetric::Magnitude => {
                node.set_v(v);
                let m = v.abs();
                let peak = node.raise_peak(m);
                self.thresholds.should_prune(m, peak)
            }
            PruneMetric::Energy => {
                let prev = node.v();
                node.set_v(v);
                let pulse = node.energy() + v * v;
                node.set_energy(pulse);
                let peak = node.raise_peak(pulse);
                self.thresholds.should_prune(v * v + prev * prev, peak)
            }
        }
    }

    /// Update the peak after the source raised the node voltage to `v`.
    pub fn record_injection(&self, node: &Node, v: f64) {
        match self.metric {
            PruneMetric::Magnitude => {
                node.raise_peak(v.abs());
            }
            PruneMetric::Energy => {
                let pulse = node.energy() + v * v;
                node.set_energy(pulse);
                node.raise_peak(pulse);
            }
        }
    }
}
