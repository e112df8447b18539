//! Tlm: a concurrent active-wavefront Transmission-Line-Matrix engine.
//!
//! This is the facade crate that re-exports the public API from the
//! `tlm-*` sub-crates. For most users, adding `tlm` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use tlm::prelude::*;
//!
//! // A 5×5×5 free-space cube with a unit impulse in the middle.
//! let grid = GridBuilder::sized(5, 5, 5).unwrap().build().unwrap();
//! let config = SimConfig {
//!     thresholds: Thresholds::new(1e-3, 1e-4),
//!     workers: Some(8),
//!     ..SimConfig::new(Source::impulse(Coord::new(2, 2, 2)))
//! };
//! let mut sim = Simulation::new(grid, config).unwrap();
//! let report = sim.run().unwrap();
//!
//! assert_eq!(report.termination, Termination::Converged);
//! assert_eq!(report.steps, 44);
//! assert_eq!(sim.grid().active_count(), 0);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `tlm-core` | Coordinates, dimensions, sources, thresholds, constants |
//! | [`grid`] | `tlm-grid` | Node storage, coefficients, builder, slices |
//! | [`kernel`] | `tlm-kernel` | Active sets and the scatter/connect phases |
//! | [`engine`] | `tlm-engine` | Partitioned, multi-threaded simulation driver |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core geometry, waveforms and thresholds (`tlm-core`).
///
/// Contains [`types::Coord`], [`types::Dims`], [`types::Bounds`],
/// [`types::Source`] and [`types::Thresholds`], plus the physical
/// constants in [`types::constants`].
pub use tlm_core as types;

/// Node storage and grid construction (`tlm-grid`).
///
/// Build a [`grid::Grid`] with [`grid::GridBuilder`]; read results back
/// through [`grid::Grid::state`] and [`grid::Grid::peaks`].
pub use tlm_grid as grid;

/// Single-threaded stepping building blocks (`tlm-kernel`).
///
/// [`kernel::scatter`], [`kernel::connect`] and [`kernel::ActiveSet`]
/// are what each engine worker runs on its own partition.
pub use tlm_kernel as kernel;

/// The partitioned simulation engine (`tlm-engine`).
///
/// [`engine::Simulation`] runs a configured grid to termination across
/// worker threads.
pub use tlm_engine as engine;

/// Common imports for typical usage.
///
/// ```rust
/// use tlm::prelude::*;
/// ```
///
/// This imports the geometry and source types, the grid builder, and the
/// simulation driver with its configuration and report types.
pub mod prelude {
    // Geometry and excitation
    pub use tlm_core::{
        Axis, Bounds, Coord, Dims, Face, PathLossParams, PruneMetric, Source, Thresholds,
        Waveform,
    };

    // Grid
    pub use tlm_grid::{Grid, GridBuilder, Material, NodeState, SliceSpec};

    // Errors
    pub use tlm_core::DimsError;
    pub use tlm_engine::{ConfigError, RunError};
    pub use tlm_grid::GridError;

    // Engine
    pub use tlm_engine::{
        CancelToken, RebalanceConfig, RunMetrics, RunReport, SimConfig, Simulation, StepRecord,
        Termination,
    };
}
