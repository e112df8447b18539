//! The node grid.

use std::sync::atomic::{AtomicBool, Ordering};

use smallvec::SmallVec;
use tlm_core::{Coord, Dims, Face};

use crate::atomic::AtomicF64;
use crate::coefficients::Coefficients;
use crate::slice::SliceSpec;

// ── Node ────────────────────────────────────────────────────────

/// Mutable state of one six-port junction.
///
/// Every field is a relaxed atomic. Within a phase each field has a
/// single writer (the worker owning the node), so plain load/store is
/// sufficient.
#[derive(Debug, Default)]
pub struct Node {
    v: AtomicF64,
    incoming: [AtomicF64; 6],
    outgoing: [AtomicF64; 6],
    peak: AtomicF64,
    energy: AtomicF64,
    active: AtomicBool,
}

impl Node {
    /// Total node voltage.
    #[inline]
    pub fn v(&self) -> f64 {
        self.v.load()
    }

    /// Set the total node voltage.
    #[inline]
    pub fn set_v(&self, v: f64) {
        self.v.store(v);
    }

    /// Incoming port voltage on `face`.
    #[inline]
    pub fn incoming(&self, face: Face) -> f64 {
        self.incoming[face.index()].load()
    }

    /// Set the incoming port voltage on `face`.
    #[inline]
    pub fn set_incoming(&self, face: Face, v: f64) {
        self.incoming[face.index()].store(v);
    }

    /// Outgoing port voltage on `face`.
    #[inline]
    pub fn outgoing(&self, face: Face) -> f64 {
        self.outgoing[face.index()].load()
    }

    /// Set the outgoing port voltage on `face`.
    #[inline]
    pub fn set_outgoing(&self, face: Face, v: f64) {
        self.outgoing[face.index()].store(v);
    }

    /// Peak metric seen at this node.
    #[inline]
    pub fn peak(&self) -> f64 {
        self.peak.load()
    }

    /// Raise the peak to `value` if it is larger. Returns the new peak.
    #[inline]
    pub fn raise_peak(&self, value: f64) -> f64 {
        let peak = self.peak.load();
        if value > peak {
            self.peak.store(value);
            value
        } else {
            peak
        }
    }

    /// Accumulated pulse energy `ΣV²` since the node last activated.
    #[inline]
    pub fn energy(&self) -> f64 {
        self.energy.load()
    }

    /// Set the accumulated pulse energy.
    #[inline]
    pub fn set_energy(&self, e: f64) {
        self.energy.store(e);
    }

    /// Whether the node is in some partition's active set.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    /// Set the active flag if it was clear. Returns `true` if this call
    /// set it, so concurrent callers agree on a single winner.
    #[inline]
    pub fn try_activate(&self) -> bool {
        self.active
            .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
    }

    /// Clear the active flag.
    #[inline]
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::Relaxed);
    }

    /// Zero the voltage, incoming ports and pulse energy.
    ///
    /// Outgoing ports are left alone: neighbours may still read them in
    /// the current connect phase. See [`Node::clear_outgoing`].
    pub fn clear_inputs(&self) {
        self.v.store(0.0);
        self.energy.store(0.0);
        for port in &self.incoming {
            port.store(0.0);
        }
    }

    /// Zero the outgoing ports.
    pub fn clear_outgoing(&self) {
        for port in &self.outgoing {
            port.store(0.0);
        }
    }

    fn reset(&self) {
        self.clear_inputs();
        self.clear_outgoing();
        self.peak.store(0.0);
        self.deactivate();
    }
}

// ── NodeState ───────────────────────────────────────────────────

/// Plain copy of one node, for inspection after (or between) steps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeState {
    /// Total voltage.
    pub v: f64,
    /// Incoming port voltages by face.
    pub incoming: [f64; 6],
    /// Outgoing port voltages by face.
    pub outgoing: [f64; 6],
    /// Peak metric (peak `|V|`, or peak pulse energy for the energy metric).
    pub peak: f64,
    /// Accumulated pulse energy.
    pub energy: f64,
    /// Active flag.
    pub active: bool,
    /// Whether the node can ever be activated.
    pub propagate: bool,
}

impl NodeState {
    /// Whether the node is inactive with all ports and voltage at zero.
    pub fn is_quiescent(&self) -> bool {
        !self.active
            && self.v == 0.0
            && self.incoming.iter().all(|&p| p == 0.0)
            && self.outgoing.iter().all(|&p| p == 0.0)
    }
}

// ── Grid ────────────────────────────────────────────────────────

/// The full node grid for one simulation.
///
/// Built by [`GridBuilder`](crate::GridBuilder); fixed size thereafter.
#[derive(Debug)]
pub struct Grid {
    dims: Dims,
    nodes: Vec<Node>,
    coefficients: Vec<Coefficients>,
    propagate: Vec<bool>,
}

// Compile-time assertion: Grid is shared by reference across workers.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<Grid>();
};

impl Grid {
    pub(crate) fn from_parts(
        dims: Dims,
        coefficients: Vec<Coefficients>,
        propagate: Vec<bool>,
    ) -> Self {
        debug_assert_eq!(coefficients.len(), dims.volume());
        debug_assert_eq!(propagate.len(), dims.volume());
        let nodes = (0..dims.volume()).map(|_| Node::default()).collect();
        Self {
            dims,
            nodes,
            coefficients,
            propagate,
        }
    }

    /// Grid dimensions.
    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a built grid has at least one node.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Flat index of `c`.
    #[inline]
    pub fn index(&self, c: Coord) -> usize {
        self.dims.index(c)
    }

    /// Coordinate of flat index `i`.
    #[inline]
    pub fn coord(&self, i: usize) -> Coord {
        self.dims.coord(i)
    }

    /// Node at flat index `i`.
    #[inline]
    pub fn node(&self, i: usize) -> &Node {
        &self.nodes[i]
    }

    /// Coefficients of the node at flat index `i`.
    #[inline]
    pub fn coefficients(&self, i: usize) -> &Coefficients {
        &self.coefficients[i]
    }

    /// Whether the node at flat index `i` may ever be activated.
    #[inline]
    pub fn propagates(&self, i: usize) -> bool {
        self.propagate[i]
    }

    /// Face neighbours of `c` that exist, with their flat indices.
    #[inline]
    pub fn neighbours(&self, c: Coord) -> SmallVec<[(Face, usize); 6]> {
        Face::ALL
            .into_iter()
            .filter_map(|face| {
                self.dims
                    .neighbour(c, face)
                    .map(|n| (face, self.dims.index(n)))
            })
            .collect()
    }

    /// Snapshot of the node at `c`.
    ///
    /// # Panics
    ///
    /// Panics if `c` is outside the grid.
    pub fn state(&self, c: Coord) -> NodeState {
        assert!(self.dims.contains(c), "{c} outside {}", self.dims);
        self.state_at(self.dims.index(c))
    }

    /// Snapshot of the node at flat index `i`.
    pub fn state_at(&self, i: usize) -> NodeState {
        let n = &self.nodes[i];
        NodeState {
            v: n.v(),
            incoming: Face::ALL.map(|f| n.incoming(f)),
            outgoing: Face::ALL.map(|f| n.outgoing(f)),
            peak: n.peak(),
            energy: n.energy(),
            active: n.is_active(),
            propagate: self.propagate[i],
        }
    }

    /// Number of nodes whose active flag is set.
    pub fn active_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_active()).count()
    }

    /// Peak metric of every node, in flat order.
    pub fn peaks(&self) -> Vec<f64> {
        self.nodes.iter().map(Node::peak).collect()
    }

    /// Voltages of the nodes selected by `slice`.
    pub fn sample(&self, slice: &SliceSpec) -> Vec<f64> {
        slice
            .bounds(self.dims)
            .iter()
            .map(|c| self.nodes[self.dims.index(c)].v())
            .collect()
    }

    /// Return every node to rest: zero voltages and peaks, clear flags.
    ///
    /// Requires exclusive access so it cannot race a running simulation.
    pub fn reset(&mut self) {
        for n in &self.nodes {
            n.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GridBuilder;
    use tlm_core::Dims;

    fn grid(x: u32, y: u32, z: u32) -> Grid {
        GridBuilder::new(Dims::new(x, y, z).unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn try_activate_has_one_winner() {
        let g = grid(2, 2, 2);
        let n = g.node(3);
        assert!(n.try_activate());
        assert!(!n.try_activate());
        n.deactivate();
        assert!(n.try_activate());
    }

    #[test]
    fn corner_has_three_neighbours() {
        let g = grid(3, 3, 3);
        assert_eq!(g.neighbours(Coord::new(0, 0, 0)).len(), 3);
        assert_eq!(g.neighbours(Coord::new(1, 1, 1)).len(), 6);
        let faces: Vec<_> = g
            .neighbours(Coord::new(2, 1, 0))
            .into_iter()
            .map(|(f, _)| f)
            .collect();
        assert_eq!(faces, vec![Face::XNeg, Face::YPos, Face::YNeg, Face::ZPos]);
    }

    #[test]
    fn clear_inputs_keeps_outgoing() {
        let g = grid(1, 1, 1);
        let n = g.node(0);
        n.set_v(2.0);
        n.set_incoming(Face::XPos, 1.0);
        n.set_outgoing(Face::XPos, 0.5);
        n.set_energy(4.0);
        n.clear_inputs();
        let s = g.state_at(0);
        assert_eq!(s.v, 0.0);
        assert_eq!(s.incoming, [0.0; 6]);
        assert_eq!(s.energy, 0.0);
        assert_eq!(s.outgoing[Face::XPos.index()], 0.5);
        n.clear_outgoing();
        assert!(g.state_at(0).is_quiescent());
    }

    #[test]
    fn raise_peak_is_monotonic() {
        let g = grid(1, 1, 1);
        let n = g.node(0);
        assert_eq!(n.raise_peak(0.5), 0.5);
        assert_eq!(n.raise_peak(0.2), 0.5);
        assert_eq!(n.raise_peak(0.7), 0.7);
    }

    #[test]
    fn reset_returns_grid_to_rest() {
        let mut g = grid(2, 1, 1);
        let n = g.node(1);
        assert!(n.try_activate());
        n.set_v(1.0);
        n.raise_peak(1.0);
        n.set_outgoing(Face::ZNeg, 0.3);
        g.reset();
        assert_eq!(g.active_count(), 0);
        assert!(g.state_at(1).is_quiescent());
        assert_eq!(g.peaks(), vec![0.0, 0.0]);
    }

    #[test]
    fn sample_reads_row_voltages() {
        let g = grid(3, 3, 3);
        for x in 0..3 {
            g.node(g.index(Coord::new(x, 1, 1))).set_v(f64::from(x) + 1.0);
        }
        let row = g.sample(&SliceSpec::centre_row(g.dims()));
        assert_eq!(row, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn state_rejects_out_of_bounds() {
        let g = grid(2, 2, 2);
        let _ = g.state(Coord::new(2, 0, 0));
    }
}
