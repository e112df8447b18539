//! Boundary staging channels between adjacent partitions.
//!
//! Each ordered pair of face-adjacent partitions gets its own channel,
//! so unrelated pairs never contend. A partition sends on the face the
//! node was found across and receives on the opposite face.

use crossbeam_channel::{Receiver, Sender};

use crate::partition::PartitionLayout;

/// A node crossing a partition boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Handoff {
    /// Found by a neighbour's scatter; activate it if nobody has yet.
    Discovered(usize),
    /// Already active; ownership moves because the boundary moved.
    Migrated(usize),
}

/// One partition's ends of its staging channels, indexed by face.
#[derive(Debug, Default)]
pub(crate) struct Links {
    pub(crate) outbound: [Option<Sender<Handoff>>; 6],
    pub(crate) inbound: [Option<Receiver<Handoff>>; 6],
}

impl Links {
    /// Every message currently waiting on any inbound channel.
    pub(crate) fn drain(&self) -> impl Iterator<Item = Handoff> + '_ {
        self.inbound.iter().flatten().flat_map(|rx| rx.try_iter())
    }
}

/// Create the channel mesh for `layout`, one [`Links`] per partition.
pub(crate) fn link_partitions(layout: &PartitionLayout) -> Vec<Links> {
    let n = layout.partition_count();
    let mut links: Vec<Links> = (0..n).map(|_| Links::default()).collect();
    for p in 0..n {
        for (face, q) in layout.neighbours(p) {
            let (tx, rx) = crossbeam_channel::unbounded();
            links[p].outbound[face.index()] = Some(tx);
            links[q].inbound[face.opposite().index()] = Some(rx);
        }
    }
    links
}
