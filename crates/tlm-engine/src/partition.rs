//! Spatial decomposition of the grid into a lattice of partitions.
//!
//! The grid is cut by axis-aligned planes into `nx × ny × nz` slabs, so
//! every partition is a box and a node crossing one face lands in the
//! face-adjacent partition. Partition state elsewhere in the engine is
//! kept in flat arrays indexed `(px·ny + py)·nz + pz`.

use std::cmp::Reverse;

use smallvec::SmallVec;
use tlm_core::{Axis, Bounds, Coord, Dims, Face};

/// Split `workers` into per-axis slab counts `[nx, ny, nz]`.
///
/// Maximises `nx·ny·nz ≤ workers`, breaking ties by the smallest
/// `nx + ny + nz`, with the largest factor on the longest axis. No
/// factor exceeds the length of its axis, so a thin grid may be given
/// fewer partitions than workers.
pub fn factor_workers(workers: usize, dims: Dims) -> [usize; 3] {
    let mut axes = Axis::ALL;
    // Stable: equal lengths keep x, y, z order.
    axes.sort_by_key(|&a| Reverse(dims.len(a)));
    let lens = axes.map(|a| dims.len(a) as usize);

    let workers = workers.max(1);
    let mut best = [1usize; 3];
    let mut best_key = (1usize, Reverse(3usize));
    for a in 1..=workers.min(lens[0]) {
        for b in 1..=a.min(workers / a).min(lens[1]) {
            for c in 1..=b.min(workers / (a * b)).min(lens[2]) {
                let key = (a * b * c, Reverse(a + b + c));
                if key > best_key {
                    best_key = key;
                    best = [a, b, c];
                }
            }
        }
    }

    let mut shape = [1usize; 3];
    for (axis, n) in axes.into_iter().zip(best) {
        shape[axis.index()] = n;
    }
    shape
}

/// Partition bounds as per-axis cut planes.
///
/// `cuts(axis)` holds `n + 1` ascending positions for `n` slabs; slab
/// `i` spans `[cuts[i], cuts[i + 1] − 1]`. Every slab holds at least one
/// node, so the partitions tile the grid exactly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionLayout {
    dims: Dims,
    cuts: [Vec<u32>; 3],
}

impl PartitionLayout {
    /// Even split of `dims` across up to `workers` partitions.
    ///
    /// Slab `i` of an axis of length `L` cut `n` ways starts at
    /// `⌊i·L/n⌋`.
    pub fn new(dims: Dims, workers: usize) -> Self {
        let shape = factor_workers(workers, dims);
        let cuts = Axis::ALL.map(|axis| {
            let len = u64::from(dims.len(axis));
            let n = shape[axis.index()] as u64;
            (0..=n).map(|i| (i * len / n) as u32).collect()
        });
        Self { dims, cuts }
    }

    /// Grid dimensions.
    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// Cut positions along `axis`, including `0` and the axis length.
    pub fn cuts(&self, axis: Axis) -> &[u32] {
        &self.cuts[axis.index()]
    }

    /// Slabs per axis `[nx, ny, nz]`.
    pub fn shape(&self) -> [usize; 3] {
        Axis::ALL.map(|a| self.cuts[a.index()].len() - 1)
    }

    /// Number of partitions.
    pub fn partition_count(&self) -> usize {
        self.shape().iter().product()
    }

    /// Lattice position `[px, py, pz]` of partition `p`.
    pub fn lattice_position(&self, p: usize) -> [usize; 3] {
        let [_, ny, nz] = self.shape();
        [p / (ny * nz), (p / nz) % ny, p % nz]
    }

    /// Partition at lattice position `pos`.
    pub fn partition_at(&self, pos: [usize; 3]) -> usize {
        let [_, ny, nz] = self.shape();
        (pos[0] * ny + pos[1]) * nz + pos[2]
    }

    /// Inclusive bounds of partition `p`.
    pub fn bounds(&self, p: usize) -> Bounds {
        let pos = self.lattice_position(p);
        let lo = Axis::ALL.map(|a| self.cuts[a.index()][pos[a.index()]]);
        let hi = Axis::ALL.map(|a| self.cuts[a.index()][pos[a.index()] + 1] - 1);
        Bounds::new(
            Coord::new(lo[0], lo[1], lo[2]),
            Coord::new(hi[0], hi[1], hi[2]),
        )
    }

    /// Bounds of every partition, in partition order.
    pub fn all_bounds(&self) -> Vec<Bounds> {
        (0..self.partition_count()).map(|p| self.bounds(p)).collect()
    }

    /// Slab along `axis` containing position `v`.
    pub fn slab_of(&self, axis: Axis, v: u32) -> usize {
        self.cuts[axis.index()].partition_point(|&c| c <= v) - 1
    }

    /// Partition owning `c`.
    ///
    /// # Panics
    ///
    /// Panics if `c` is outside the grid.
    pub fn owner_of(&self, c: Coord) -> usize {
        assert!(self.dims.contains(c), "{c} is outside every partition");
        self.partition_at(Axis::ALL.map(|a| self.slab_of(a, c.get(a))))
    }

    /// The partition across `face` from partition `p`, if any.
    pub fn neighbour(&self, p: usize, face: Face) -> Option<usize> {
        let shape = self.shape();
        let mut pos = self.lattice_position(p);
        let i = face.axis().index();
        if face.is_positive() {
            if pos[i] + 1 >= shape[i] {
                return None;
            }
            pos[i] += 1;
        } else {
            pos[i] = pos[i].checked_sub(1)?;
        }
        Some(self.partition_at(pos))
    }

    /// All partitions adjacent to `p`, with the face they lie across.
    pub fn neighbours(&self, p: usize) -> SmallVec<[(Face, usize); 6]> {
        Face::ALL
            .into_iter()
            .filter_map(|f| self.neighbour(p, f).map(|q| (f, q)))
            .collect()
    }

    /// Total nodes covered by all partitions. Equals the grid volume.
    pub fn covered_volume(&self) -> usize {
        self.all_bounds().iter().map(Bounds::volume).sum()
    }

    /// Shift the cuts of `axis` towards the lighter side of each cut.
    ///
    /// `slab_counts[i]` is the number of active nodes in slab `i` along
    /// `axis`. For a cut between slab counts `A` and `B` whose relative
    /// imbalance reaches `min_imbalance`, the last node of the lower
    /// slab moves by `w·(B − A)/(2(A + B))`, where `w` is the width of
    /// the heavier side, rounded to the nearest node. Each cut is kept
    /// strictly between its neighbours' old and new positions, so every
    /// slab stays non-empty and no node moves more than one slab.
    ///
    /// Returns `None` if no cut moved.
    pub fn rebalanced(
        &self,
        axis: Axis,
        slab_counts: &[usize],
        min_imbalance: f64,
    ) -> Option<PartitionLayout> {
        let old = &self.cuts[axis.index()];
        let slabs = old.len() - 1;
        debug_assert_eq!(slab_counts.len(), slabs);
        let mut new = old.clone();

        for k in 1..slabs {
            let a = slab_counts[k - 1] as f64;
            let b = slab_counts[k] as f64;
            if a + b == 0.0 || (a - b).abs() / (a + b) < min_imbalance {
                continue;
            }
            let first_a = f64::from(old[k - 1]);
            let last_a = f64::from(old[k] - 1);
            let last_b = f64::from(old[k + 1] - 1);
            let width = if a > b { last_a - first_a } else { last_b - last_a };
            let target = (last_a + width * (b - a) / (2.0 * (a + b))).round() + 1.0;

            let lo = old[k - 1].max(new[k - 1]) + 1;
            let hi = old[k + 1] - 1;
            new[k] = target.clamp(f64::from(lo), f64::from(hi)) as u32;
        }

        if new == *old {
            return None;
        }
        let mut cuts = self.cuts.clone();
        cuts[axis.index()] = new;
        Some(Self {
            dims: self.dims,
            cuts,
        })
    }
}
