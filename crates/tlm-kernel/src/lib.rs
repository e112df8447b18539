//! Active-set bookkeeping and the scatter/connect step kernel.
//!
//! One time step over one partition is:
//!
//! ```text
//! inject(source)                       // steps < duration, owner only
//! scatter(set)   -> out = V/3 − in     // discovers neighbours
//! ── all scatters visible ──
//! connect(set)   -> in = R·out + T·nbr.out, V = Σin, prune
//! ── all connects done ──
//! clear_pruned(pruned)                 // zero pruned outgoing ports
//! ```
//!
//! The functions here operate on one [`ActiveSet`] and never block.
//! Keeping pruned nodes' outgoing ports until [`clear_pruned`] makes a
//! step independent of iteration order and of how the grid is
//! partitioned.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod active_set;
pub mod phase;
pub mod pruning;

pub use active_set::{ActiveSet, Sweep};
pub use phase::{clear_pruned, connect, inject, scatter, ConnectStats, ScatterStats};
pub use pruning::Pruning;
