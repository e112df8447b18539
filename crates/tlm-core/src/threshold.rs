//! Pruning thresholds.
//!
//! A node leaves the wavefront when its metric falls below the absolute
//! floor **or** below a fraction of its own peak. Either condition alone
//! is enough.

use std::f64::consts::PI;

use crate::constants::{
    DEFAULT_FREQUENCY_HZ, DEFAULT_GRID_SPACING, DEFAULT_MAX_PATH_LOSS_DB,
    DEFAULT_RELATIVE_THRESHOLD, KAPPA, SPEED_OF_LIGHT,
};

/// Quantity compared against the thresholds when deciding to prune.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PruneMetric {
    /// Instantaneous `|V|` against the peak `|V|` seen at the node.
    #[default]
    Magnitude,
    /// Two-step energy `V² + V_prev²` against the peak accumulated pulse
    /// energy `ΣV²`. Thresholds are squared to stay in energy units.
    Energy,
}

/// Inputs for deriving an absolute threshold from a path-loss budget.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathLossParams {
    /// Distance between adjacent nodes, in metres.
    pub grid_spacing: f64,
    /// Deepest path loss worth tracking, in dB (negative).
    pub max_path_loss_db: f64,
    /// Operating frequency, in hertz.
    pub frequency_hz: f64,
    /// Fraction of a node's own peak below which it is pruned.
    pub relative: f64,
}

impl Default for PathLossParams {
    fn default() -> Self {
        Self {
            grid_spacing: DEFAULT_GRID_SPACING,
            max_path_loss_db: DEFAULT_MAX_PATH_LOSS_DB,
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            relative: DEFAULT_RELATIVE_THRESHOLD,
        }
    }
}

/// Absolute and relative pruning thresholds, fixed for a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thresholds {
    /// Metric floor below which any node is pruned.
    pub absolute: f64,
    /// Fraction of the node's peak below which it is pruned.
    pub relative: f64,
}

impl Thresholds {
    /// Thresholds given directly.
    pub const fn new(absolute: f64, relative: f64) -> Self {
        Self { absolute, relative }
    }

    /// Derive the magnitude thresholds from a path-loss budget:
    /// `4π·Δl·10^(PL/20) / κ · f / c`.
    pub fn from_path_loss(params: &PathLossParams) -> Self {
        let absolute = 4.0 * PI * params.grid_spacing * 10f64.powf(params.max_path_loss_db / 20.0)
            / KAPPA
            * params.frequency_hz
            / SPEED_OF_LIGHT;
        Self {
            absolute,
            relative: params.relative,
        }
    }

    /// The same thresholds expressed for `metric`.
    ///
    /// Magnitude thresholds pass through; energy thresholds are squared.
    pub fn for_metric(self, metric: PruneMetric) -> Self {
        match metric {
            PruneMetric::Magnitude => self,
            PruneMetric::Energy => Self {
                absolute: self.absolute * self.absolute,
                relative: self.relative * self.relative,
            },
        }
    }

    /// Whether a node with the given metric value and peak is pruned.
    pub fn should_prune(&self, value: f64, peak: f64) -> bool {
        value < self.absolute || value < peak * self.relative
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::from_path_loss(&PathLossParams::default())
    }
}
