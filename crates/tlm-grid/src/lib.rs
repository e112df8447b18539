//! Node storage and construction for the TLM wavefront engine.
//!
//! A [`Grid`] is populated once by [`GridBuilder`] and never resized.
//! Coefficients and propagate flags are read-only afterwards; port
//! voltages, peaks and the active flag are relaxed atomics so that
//! partition workers can share a single `&Grid`. Cross-thread ordering
//! comes from the engine's phase barriers, not from the atomics.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod atomic;
pub mod builder;
pub mod coefficients;
pub mod error;
pub mod grid;
pub mod slice;

pub use atomic::AtomicF64;
pub use builder::{GridBuilder, Material};
pub use coefficients::Coefficients;
pub use error::GridError;
pub use grid::{Grid, Node, NodeState};
pub use slice::SliceSpec;
