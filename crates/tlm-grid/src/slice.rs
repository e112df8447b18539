//! Grid slices sampled for time-variation recording.

use tlm_core::{Axis, Bounds, Coord, Dims};

/// A line or plane of nodes whose voltages are recorded each step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SliceSpec {
    /// Every node along `axis` passing through `through`. The `axis`
    /// component of `through` is ignored.
    Row {
        /// Direction of the row.
        axis: Axis,
        /// Any node on the row.
        through: Coord,
    },
    /// Every node in the plane normal to `axis` at index `at`.
    Plane {
        /// Plane normal.
        axis: Axis,
        /// Index along the normal.
        at: u32,
    },
}

impl SliceSpec {
    /// The row along x through the centre of the y and z axes.
    pub fn centre_row(dims: Dims) -> Self {
        SliceSpec::Row {
            axis: Axis::X,
            through: dims.centre(),
        }
    }

    /// Whether the slice lies inside a grid of `dims`.
    pub fn fits(&self, dims: Dims) -> bool {
        match *self {
            SliceSpec::Row { axis, through } => dims.contains(through.with(axis, 0)),
            SliceSpec::Plane { axis, at } => at < dims.len(axis),
        }
    }

    /// The box of nodes covered by the slice.
    ///
    /// Callers check [`SliceSpec::fits`] first.
    pub fn bounds(&self, dims: Dims) -> Bounds {
        let full = dims.bounds();
        match *self {
            SliceSpec::Row { axis, through } => Bounds::new(
                through.with(axis, 0),
                through.with(axis, dims.len(axis) - 1),
            ),
            SliceSpec::Plane { axis, at } => {
                Bounds::new(full.min.with(axis, at), full.max.with(axis, at))
            }
        }
    }

    /// Number of nodes sampled.
    pub fn len(&self, dims: Dims) -> usize {
        self.bounds(dims).volume()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_row_spans_x() {
        let d = Dims::new(7, 4, 5).unwrap();
        let s = SliceSpec::centre_row(d);
        let b = s.bounds(d);
        assert_eq!(b.min, Coord::new(0, 2, 2));
        assert_eq!(b.max, Coord::new(6, 2, 2));
        assert_eq!(s.len(d), 7);
    }

    #[test]
    fn plane_covers_cross_section() {
        let d = Dims::new(3, 4, 5).unwrap();
        let s = SliceSpec::Plane {
            axis: Axis::Y,
            at: 3,
        };
        assert!(s.fits(d));
        assert_eq!(s.len(d), 15);
        assert!(!SliceSpec::Plane {
            axis: Axis::Y,
            at: 4
        }
        .fits(d));
    }

    #[test]
    fn row_outside_grid_does_not_fit() {
        let d = Dims::new(3, 3, 3).unwrap();
        let s = SliceSpec::Row {
            axis: Axis::Z,
            through: Coord::new(1, 3, 99),
        };
        assert!(!s.fits(d));
    }
}
