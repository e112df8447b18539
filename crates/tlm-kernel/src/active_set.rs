//! The set of nodes a partition is currently stepping.

use indexmap::IndexSet;
use tlm_grid::Grid;

/// Outcome of visiting one member during [`ActiveSet::sweep`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sweep {
    /// Leave the member in the set.
    Keep,
    /// Remove the member from the set.
    Detach,
}

/// Flat indices of the nodes owned by one partition's wavefront.
///
/// The node's own `active` flag is the deduplication source of truth:
/// [`ActiveSet::insert`] only adds a node whose flag it managed to set.
/// Members keep insertion order until a removal swaps the last member
/// into the vacated slot.
#[derive(Clone, Debug, Default)]
pub struct ActiveSet {
    members: IndexSet<usize>,
}

impl ActiveSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate node `index` and add it to the set.
    ///
    /// Returns `false`, and does nothing, if the node was already active
    /// anywhere.
    pub fn insert(&mut self, grid: &Grid, index: usize) -> bool {
        if !grid.node(index).try_activate() {
            return false;
        }
        let fresh = self.members.insert(index);
        debug_assert!(fresh, "node {index} was a member with its flag clear");
        true
    }

    /// Take ownership of an already-active node handed over by another
    /// partition.
    ///
    /// # Panics
    ///
    /// Panics if the node is already a member.
    pub fn adopt(&mut self, index: usize) {
        assert!(
            self.members.insert(index),
            "node {index} adopted by a partition that already owns it"
        );
    }

    /// Give up ownership of `index` without touching its flag. Returns
    /// whether it was a member.
    pub fn detach(&mut self, index: usize) -> bool {
        self.members.swap_remove(&index)
    }

    /// Visit every member once, removing those for which `f` returns
    /// [`Sweep::Detach`].
    pub fn sweep(&mut self, mut f: impl FnMut(usize) -> Sweep) {
        let mut i = 0;
        while let Some(&index) = self.members.get_index(i) {
            match f(index) {
                Sweep::Keep => i += 1,
                // The last member moves into slot i and is visited next.
                Sweep::Detach => {
                    self.members.swap_remove_index(i);
                }
            }
        }
    }

    /// Member at position `i` in the current order.
    pub fn get(&self, i: usize) -> Option<usize> {
        self.members.get_index(i).copied()
    }

    /// Whether `index` is a member.
    pub fn contains(&self, index: usize) -> bool {
        self.members.contains(&index)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the set has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in the current order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.members.iter().copied()
    }
}
