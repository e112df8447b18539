//! Test utilities for TLM development.
//!
//! Grid fixtures ([`fixtures`]), seeded random scenes ([`scene`]) and a
//! single-threaded reference stepper ([`reference`]) that the
//! partitioned engine must agree with bit for bit.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod reference;
pub mod scene;

pub use fixtures::{enclosed_source, free_space, layered_slab};
pub use reference::{reference_run, ReferenceRun};
pub use scene::{random_scene, Scene};
