//! Partitioned, lock-step TLM wavefront engine.
//!
//! The grid is split into a rectilinear lattice of partitions by
//! [`PartitionLayout`], one scoped worker thread per partition. Each
//! worker owns the active nodes inside its bounds and steps them in two
//! barrier-separated phases:
//!
//! ```text
//!   inject ─► scatter ─┬─► barrier A ─► merge ─► connect ─┬─► barrier B ─► clear
//!                      └── hand-offs to face neighbours ──┘
//! ```
//!
//! Nodes discovered across a boundary are staged on a per-pair channel
//! and activated by their owner at merge, so no node is ever owned
//! twice. The [`Simulation`] driver issues steps, gathers per-partition
//! counts, records slices, rebalances the cut planes and stops the run
//! once the wavefront has died out.
//!
//! Results do not depend on the worker count: a node's voltages depend
//! only on its own and its neighbours' ports from the previous phase.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod audit;
pub mod barrier;
pub mod config;
pub(crate) mod handoff;
pub mod metrics;
pub mod partition;
pub mod simulation;
pub(crate) mod worker;

pub use audit::{audit_ownership, OwnershipViolation};
pub use barrier::{BarrierPoisoned, PhaseBarrier};
pub use config::{ConfigError, RebalanceConfig, SimConfig, MAX_WORKERS};
pub use metrics::{RunMetrics, StepRecord};
pub use partition::{factor_workers, PartitionLayout};
pub use simulation::{CancelToken, RunError, RunReport, Simulation, Termination};
