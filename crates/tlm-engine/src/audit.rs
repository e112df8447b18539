//! Single-ownership audit of the active wavefront.
//!
//! Run by the driver between steps when
//! [`SimConfig::audit_ownership`](crate::SimConfig::audit_ownership) is
//! set: every active node must be owned by exactly one partition, lie
//! inside that partition's bounds and carry its active flag, and no
//! flag may be set on a node nobody owns.

use indexmap::IndexMap;
use thiserror::Error;
use tlm_core::{Bounds, Coord};
use tlm_grid::Grid;

use crate::partition::PartitionLayout;

/// A broken ownership invariant.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum OwnershipViolation {
    /// Two partitions both hold the node.
    #[error("node {node} is owned by partitions {first} and {second}")]
    DoubleOwnership {
        /// The node.
        node: Coord,
        /// First owner found.
        first: usize,
        /// Second owner found.
        second: usize,
    },
    /// A partition holds a node outside its territory.
    #[error("node {node} owned by partition {partition} lies outside {bounds}")]
    OutsideTerritory {
        /// The node.
        node: Coord,
        /// Its owner.
        partition: usize,
        /// The owner's territory.
        bounds: Bounds,
    },
    /// A partition holds a node whose active flag is clear.
    #[error("node {node} owned by partition {partition} is not flagged active")]
    FlagClear {
        /// The node.
        node: Coord,
        /// Its owner.
        partition: usize,
    },
    /// Active flags set on nodes no partition owns.
    #[error("{flagged} nodes are flagged active but {owned} are owned")]
    Unowned {
        /// Nodes with the flag set.
        flagged: usize,
        /// Nodes held by some partition.
        owned: usize,
    },
}

/// Check `members` (one list per partition of `layout`) against the
/// grid's active flags.
pub fn audit_ownership(
    grid: &Grid,
    layout: &PartitionLayout,
    members: &[Vec<usize>],
) -> Result<(), OwnershipViolation> {
    let mut owners: IndexMap<usize, usize> = IndexMap::new();
    for (partition, list) in members.iter().enumerate() {
        let bounds = layout.bounds(partition);
        for &index in list {
            let node = grid.coord(index);
            if let Some(first) = owners.insert(index, partition) {
                return Err(OwnershipViolation::DoubleOwnership {
                    node,
                    first,
                    second: partition,
                });
            }
            if !bounds.contains(node) {
                return Err(OwnershipViolation::OutsideTerritory {
                    node,
                    partition,
                    bounds,
                });
            }
            if !grid.node(index).is_active() {
                return Err(OwnershipViolation::FlagClear { node, partition });
            }
        }
    }

    let flagged = grid.active_count();
    if flagged != owners.len() {
        return Err(OwnershipViolation::Unowned {
            flagged,
            owned: owners.len(),
        });
    }
    Ok(())
}
