//! Error types for grid geometry.

use thiserror::Error;

/// Errors from constructing grid [`Dims`](crate::Dims).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DimsError {
    /// At least one axis has zero length.
    #[error("grid {x}x{y}x{z} has no cells")]
    EmptyGrid {
        /// Requested x length.
        x: u32,
        /// Requested y length.
        y: u32,
        /// Requested z length.
        z: u32,
    },
    /// The cell count does not fit in a `usize`.
    #[error("grid {x}x{y}x{z} is too large to index")]
    DimensionTooLarge {
        /// Requested x length.
        x: u32,
        /// Requested y length.
        y: u32,
        /// Requested z length.
        z: u32,
    },
}
