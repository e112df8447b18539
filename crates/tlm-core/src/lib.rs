//! Core types for the TLM wavefront engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the geometry vocabulary shared by the grid, kernel and engine crates
//! (coordinates, dimensions, faces, bounding boxes), the source
//! descriptor and its waveforms, and the pruning thresholds.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod constants;
pub mod coord;
pub mod error;
pub mod source;
pub mod threshold;

pub use coord::{Axis, Bounds, Coord, Dims, Face};
pub use error::DimsError;
pub use source::{Source, Waveform};
pub use threshold::{PathLossParams, PruneMetric, Thresholds};
