//! Error types for grid construction.

use thiserror::Error;
use tlm_core::{Coord, Dims, DimsError, Face};

/// Errors from [`GridBuilder::build`](crate::GridBuilder::build).
///
/// All of these are setup errors: they are reported before any worker
/// starts and never occur mid-run.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GridError {
    /// The requested dimensions are empty or too large to index.
    #[error(transparent)]
    Dims(#[from] DimsError),
    /// A builder call addressed a node outside the grid.
    #[error("coordinate {coord} is outside the {dims} grid")]
    CoordOutOfBounds {
        /// The offending coordinate.
        coord: Coord,
        /// The grid dimensions.
        dims: Dims,
    },
    /// A node's impedance is not a finite positive number.
    #[error("node {coord} has invalid impedance {value}")]
    InvalidImpedance {
        /// The offending node.
        coord: Coord,
        /// The rejected impedance.
        value: f64,
    },
    /// A derived or overridden coefficient is NaN or infinite.
    #[error("node {coord} has a non-finite coefficient on face {face}")]
    NonFiniteCoefficient {
        /// The offending node.
        coord: Coord,
        /// The face carrying the bad coefficient.
        face: Face,
    },
}
