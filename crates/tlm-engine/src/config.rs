//! Simulation configuration, validation, and error types.
//!
//! [`SimConfig`] is the input for constructing a
//! [`Simulation`](crate::Simulation). [`validate()`](SimConfig::validate)
//! checks everything against the grid before any worker starts, so a
//! run never discovers a setup error mid-step.

use thiserror::Error;
use tlm_core::{Coord, Dims, PathLossParams, PruneMetric, Source, Thresholds};
use tlm_grid::{Grid, SliceSpec};

/// Upper bound on worker threads.
pub const MAX_WORKERS: usize = 64;

// ── RebalanceConfig ────────────────────────────────────────────────

/// Dynamic partition rebalancing.
///
/// Every `interval` steps the driver shifts the cut planes of one axis
/// towards the side with fewer active nodes, in proportion to the
/// imbalance. Axes are visited in rotation.
#[derive(Clone, Debug, PartialEq)]
pub struct RebalanceConfig {
    /// Steps between rebalancing rounds. `0` disables rebalancing.
    /// Default: 10.
    pub interval: u64,
    /// Smallest relative imbalance `|A − B| / (A + B)` across a cut
    /// worth acting on. Default: 0.1.
    pub min_imbalance: f64,
}

impl Default for RebalanceConfig {
    fn default() -> Self {
        Self {
            interval: 10,
            min_imbalance: 0.1,
        }
    }
}

impl RebalanceConfig {
    /// Rebalancing switched off.
    pub fn disabled() -> Self {
        Self {
            interval: 0,
            ..Self::default()
        }
    }

    /// Whether a rebalancing round follows `step`.
    pub fn due_after(&self, step: u64) -> bool {
        self.interval > 0 && (step + 1) % self.interval == 0
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`SimConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The source position is outside the grid.
    #[error("source at {position} is outside the {dims} grid")]
    SourceOutOfBounds {
        /// Configured source position.
        position: Coord,
        /// Grid dimensions.
        dims: Dims,
    },
    /// The source sits on a node that can never be activated.
    #[error("source at {position} is on a blocking node")]
    SourceBlocked {
        /// Configured source position.
        position: Coord,
    },
    /// The source lasts zero steps.
    #[error("source duration must be at least 1 step")]
    ZeroDuration,
    /// A pruning threshold is out of range.
    #[error("invalid threshold: {reason}")]
    InvalidThreshold {
        /// Which threshold and why.
        reason: String,
    },
    /// A path-loss parameter is out of range.
    #[error("invalid path-loss parameters: {reason}")]
    InvalidPathLoss {
        /// Which parameter and why.
        reason: String,
    },
    /// An explicit worker count of zero.
    #[error("worker count must be at least 1")]
    InvalidWorkerCount,
    /// RebalanceConfig invariant violated.
    #[error("invalid rebalance config: {reason}")]
    InvalidRebalance {
        /// Which invariant and why.
        reason: String,
    },
    /// The recording slice does not fit the grid.
    #[error("slice {slice:?} does not fit the {dims} grid")]
    InvalidSlice {
        /// Configured slice.
        slice: SliceSpec,
        /// Grid dimensions.
        dims: Dims,
    },
}

// ── SimConfig ──────────────────────────────────────────────────────

/// Complete configuration for one simulation run.
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    /// The excitation.
    pub source: Source,
    /// Pruning thresholds in magnitude form. Default: derived from
    /// [`PathLossParams::default`].
    pub thresholds: Thresholds,
    /// Pruning metric. Default: [`PruneMetric::Magnitude`].
    pub metric: PruneMetric,
    /// Worker threads. `None` = auto-detect (`available_parallelism`,
    /// clamped to `[1, MAX_WORKERS]`). The partitioner may use fewer if
    /// the grid is too thin to split that many ways.
    pub workers: Option<usize>,
    /// Dynamic rebalancing.
    pub rebalance: RebalanceConfig,
    /// Stop after this many steps even if the wavefront is still alive.
    pub max_steps: Option<u64>,
    /// Record the voltages of this slice after every step.
    pub slice: Option<SliceSpec>,
    /// Verify single ownership of every active node after every step.
    /// Costs a full grid scan per step. Default: false.
    pub audit_ownership: bool,
}

impl SimConfig {
    /// Defaults for everything but the source.
    pub fn new(source: Source) -> Self {
        Self {
            source,
            thresholds: Thresholds::default(),
            metric: PruneMetric::default(),
            workers: None,
            rebalance: RebalanceConfig::default(),
            max_steps: None,
            slice: None,
            audit_ownership: false,
        }
    }

    /// Replace the thresholds with ones derived from a path-loss budget.
    pub fn with_path_loss(mut self, params: &PathLossParams) -> Result<Self, ConfigError> {
        let bad = |reason: String| ConfigError::InvalidPathLoss { reason };
        if !params.grid_spacing.is_finite() || params.grid_spacing <= 0.0 {
            return Err(bad(format!(
                "grid_spacing must be finite and positive, got {}",
                params.grid_spacing
            )));
        }
        if !params.frequency_hz.is_finite() || params.frequency_hz <= 0.0 {
            return Err(bad(format!(
                "frequency_hz must be finite and positive, got {}",
                params.frequency_hz
            )));
        }
        if !params.max_path_loss_db.is_finite() {
            return Err(bad(format!(
                "max_path_loss_db must be finite, got {}",
                params.max_path_loss_db
            )));
        }
        self.thresholds = Thresholds::from_path_loss(params);
        Ok(self)
    }

    /// Resolve the worker count, applying auto-detection if `None`.
    ///
    /// Values are clamped to `[1, MAX_WORKERS]`.
    pub fn resolved_worker_count(&self) -> usize {
        match self.workers {
            Some(n) => n.clamp(1, MAX_WORKERS),
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
                .clamp(1, MAX_WORKERS),
        }
    }

    /// Validate against the grid the run will use.
    pub fn validate(&self, grid: &Grid) -> Result<(), ConfigError> {
        let dims = grid.dims();

        // 1. Source must be on a propagating node inside the grid.
        let position = self.source.position;
        if !dims.contains(position) {
            return Err(ConfigError::SourceOutOfBounds { position, dims });
        }
        if !grid.propagates(dims.index(position)) {
            return Err(ConfigError::SourceBlocked { position });
        }
        // 2. Source must inject at least once.
        if self.source.duration == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        // 3. Absolute threshold finite and positive, so a node at rest
        //    is always pruned and the run can converge.
        let t = &self.thresholds;
        if !t.absolute.is_finite() || t.absolute <= 0.0 {
            return Err(ConfigError::InvalidThreshold {
                reason: format!("absolute must be finite and positive, got {}", t.absolute),
            });
        }
        // 4. Relative threshold is a fraction.
        if !t.relative.is_finite() || !(0.0..=1.0).contains(&t.relative) {
            return Err(ConfigError::InvalidThreshold {
                reason: format!("relative must be in [0.0, 1.0], got {}", t.relative),
            });
        }
        // 5. Explicit worker count must be positive.
        if self.workers == Some(0) {
            return Err(ConfigError::InvalidWorkerCount);
        }
        // 6. RebalanceConfig invariants.
        let m = self.rebalance.min_imbalance;
        if !m.is_finite() || !(0.0..=1.0).contains(&m) {
            return Err(ConfigError::InvalidRebalance {
                reason: format!("min_imbalance must be in [0.0, 1.0], got {m}"),
            });
        }
        // 7. Slice must fit.
        if let Some(slice) = self.slice {
            if !slice.fits(dims) {
                return Err(ConfigError::InvalidSlice { slice, dims });
            }
        }
        Ok(())
    }
}
