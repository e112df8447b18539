//! Scatter, connect and source injection over one active set.

use tlm_core::{Bounds, Face};
use tlm_grid::Grid;

use crate::active_set::{ActiveSet, Sweep};
use crate::pruning::Pruning;

/// Counters from one [`scatter`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScatterStats {
    /// Members scattered (the set's size when the pass began).
    pub scattered: usize,
    /// Neighbours activated inside the territory.
    pub activated: usize,
    /// Discoveries outside the territory passed to the hand-off sink.
    /// May count the same node more than once.
    pub handed_off: usize,
}

/// Counters from one [`connect`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConnectStats {
    /// Members connected.
    pub connected: usize,
    /// Members pruned and removed from the set.
    pub pruned: usize,
}

/// Add the source sample `amplitude` to node `index` and update its
/// peak.
///
/// If the node is inactive and the sample is non-zero it is activated
/// into `set`. Returns whether that happened.
pub fn inject(
    grid: &Grid,
    set: &mut ActiveSet,
    index: usize,
    amplitude: f64,
    pruning: &Pruning,
) -> bool {
    let node = grid.node(index);
    let v = node.v() + amplitude;
    node.set_v(v);
    pruning.record_injection(node, v);
    amplitude != 0.0 && !node.is_active() && set.insert(grid, index)
}

/// Scatter every member of `set`: `out[f] = V/3 − in[f]`.
///
/// Inactive propagating neighbours are activated into `set` when they
/// lie in `territory`, and otherwise passed to `handoff` with the face
/// they were discovered across. Nodes activated here are not scattered
/// until the next pass.
pub fn scatter(
    grid: &Grid,
    set: &mut ActiveSet,
    territory: &Bounds,
    mut handoff: impl FnMut(Face, usize),
) -> ScatterStats {
    let dims = grid.dims();
    let mut stats = ScatterStats::default();
    let members = set.len();

    // Inserts append, so positions below `members` are the original set.
    for pos in 0..members {
        let Some(index) = set.get(pos) else { break };
        let node = grid.node(index);
        let third = node.v() / 3.0;
        for face in Face::ALL {
            node.set_outgoing(face, third - node.incoming(face));
        }

        for (face, n) in grid.neighbours(dims.coord(index)) {
            if !grid.propagates(n) || grid.node(n).is_active() {
                continue;
            }
            if territory.contains(dims.coord(n)) {
                if set.insert(grid, n) {
                    stats.activated += 1;
                }
            } else {
                handoff(face, n);
                stats.handed_off += 1;
            }
        }
    }
    stats.scattered = members;
    stats
}

/// Connect every member of `set` and prune those that fall below
/// threshold.
///
/// `in[f] = R[f]·out[f] + T[f]·nbr.out[opposite f]`, the neighbour term
/// dropped at the grid edge; `V = Σ in`. Pruned nodes are removed from
/// `set`, have their flag, voltage and incoming ports cleared, and are
/// appended to `pruned`. Their outgoing ports survive until
/// [`clear_pruned`] because neighbours may still read them this phase.
pub fn connect(
    grid: &Grid,
    set: &mut ActiveSet,
    pruning: &Pruning,
    pruned: &mut Vec<usize>,
) -> ConnectStats {
    let dims = grid.dims();
    let mut stats = ConnectStats::default();
    set.sweep(|index| {
        let c = dims.coord(index);
        let node = grid.node(index);
        let k = grid.coefficients(index);
        let mut v = 0.0;
        for face in Face::ALL {
            let mut incoming = k.r(face) * node.outgoing(face);
            if let Some(nc) = dims.neighbour(c, face) {
                incoming += k.t(face) * grid.node(dims.index(nc)).outgoing(face.opposite());
            }
            node.set_incoming(face, incoming);
            v += incoming;
        }
        stats.connected += 1;

        if pruning.update(node, v) {
            node.clear_inputs();
            node.deactivate();
            pruned.push(index);
            stats.pruned += 1;
            Sweep::Detach
        } else {
            Sweep::Keep
        }
    });
    stats
}

/// Zero the outgoing ports of nodes pruned this step and empty `pruned`.
///
/// Must run after every partition has finished connect.
pub fn clear_pruned(grid: &Grid, pruned: &mut Vec<usize>) {
    for index in pruned.drain(..) {
        grid.node(index).clear_outgoing();
    }
}
