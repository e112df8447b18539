//! Integer grid coordinates, dimensions, faces and bounding boxes.
//!
//! Nodes are stored in a flat array indexed `x + X·(y + Y·z)`, so x is
//! the fastest-varying axis. [`Dims`] owns that mapping; every other
//! crate goes through it rather than computing offsets by hand.

use std::fmt;

use crate::error::DimsError;

// ── Axis ────────────────────────────────────────────────────────

/// One of the three grid axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// The x axis (fastest-varying in flat storage).
    X,
    /// The y axis.
    Y,
    /// The z axis (slowest-varying in flat storage).
    Z,
}

impl Axis {
    /// All axes in x, y, z order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Position of this axis in [`Axis::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The axis after this one, wrapping z back to x.
    pub const fn next(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::Z,
            Axis::Z => Axis::X,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        f.write_str(name)
    }
}

// ── Face ────────────────────────────────────────────────────────

/// One of the six faces of a node, each carrying one port pair.
///
/// The discriminant doubles as the port index, so `[f64; 6]` port
/// arrays are indexed with [`Face::index`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Face {
    /// Towards increasing x.
    XPos,
    /// Towards decreasing x.
    XNeg,
    /// Towards increasing y.
    YPos,
    /// Towards decreasing y.
    YNeg,
    /// Towards increasing z.
    ZPos,
    /// Towards decreasing z.
    ZNeg,
}

impl Face {
    /// All faces in port order.
    pub const ALL: [Face; 6] = [
        Face::XPos,
        Face::XNeg,
        Face::YPos,
        Face::YNeg,
        Face::ZPos,
        Face::ZNeg,
    ];

    /// Port index of this face.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The face pointing the other way along the same axis.
    pub const fn opposite(self) -> Face {
        match self {
            Face::XPos => Face::XNeg,
            Face::XNeg => Face::XPos,
            Face::YPos => Face::YNeg,
            Face::YNeg => Face::YPos,
            Face::ZPos => Face::ZNeg,
            Face::ZNeg => Face::ZPos,
        }
    }

    /// Axis this face is normal to.
    pub const fn axis(self) -> Axis {
        match self {
            Face::XPos | Face::XNeg => Axis::X,
            Face::YPos | Face::YNeg => Axis::Y,
            Face::ZPos | Face::ZNeg => Axis::Z,
        }
    }

    /// Whether this face points towards increasing coordinates.
    pub const fn is_positive(self) -> bool {
        matches!(self, Face::XPos | Face::YPos | Face::ZPos)
    }

    /// The face normal to `axis` on the given side.
    pub const fn toward(axis: Axis, positive: bool) -> Face {
        match (axis, positive) {
            (Axis::X, true) => Face::XPos,
            (Axis::X, false) => Face::XNeg,
            (Axis::Y, true) => Face::YPos,
            (Axis::Y, false) => Face::YNeg,
            (Axis::Z, true) => Face::ZPos,
            (Axis::Z, false) => Face::ZNeg,
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_positive() { '+' } else { '-' };
        write!(f, "{sign}{}", self.axis())
    }
}

// ── Coord ───────────────────────────────────────────────────────

/// Integer position of a node in the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    /// X index.
    pub x: u32,
    /// Y index.
    pub y: u32,
    /// Z index.
    pub z: u32,
}

impl Coord {
    /// Create a coordinate.
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Component along `axis`.
    pub const fn get(self, axis: Axis) -> u32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Copy of this coordinate with the `axis` component replaced.
    pub const fn with(self, axis: Axis, value: u32) -> Self {
        match axis {
            Axis::X => Self { x: value, ..self },
            Axis::Y => Self { y: value, ..self },
            Axis::Z => Self { z: value, ..self },
        }
    }
}

impl From<(u32, u32, u32)> for Coord {
    fn from((x, y, z): (u32, u32, u32)) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ── Dims ────────────────────────────────────────────────────────

/// Validated grid dimensions.
///
/// Construction guarantees every axis is non-empty and that the cell
/// count fits in a `usize`, so flat indexing never overflows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Dims {
    x: u32,
    y: u32,
    z: u32,
    volume: usize,
}

impl Dims {
    /// Create dimensions for an `x × y × z` grid.
    ///
    /// Returns `Err(DimsError::EmptyGrid)` if any axis is zero, or
    /// `Err(DimsError::DimensionTooLarge)` if the cell count overflows.
    pub fn new(x: u32, y: u32, z: u32) -> Result<Self, DimsError> {
        if x == 0 || y == 0 || z == 0 {
            return Err(DimsError::EmptyGrid { x, y, z });
        }
        let volume = (x as usize)
            .checked_mul(y as usize)
            .and_then(|xy| xy.checked_mul(z as usize))
            .ok_or(DimsError::DimensionTooLarge { x, y, z })?;
        Ok(Self { x, y, z, volume })
    }

    /// Length along x.
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Length along y.
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Length along z.
    pub const fn z(&self) -> u32 {
        self.z
    }

    /// Length along `axis`.
    pub const fn len(&self, axis: Axis) -> u32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Total number of nodes.
    pub const fn volume(&self) -> usize {
        self.volume
    }

    /// Whether `c` lies inside the grid.
    pub const fn contains(&self, c: Coord) -> bool {
        c.x < self.x && c.y < self.y && c.z < self.z
    }

    /// Flat storage index of `c`.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `c` is outside the grid.
    pub fn index(&self, c: Coord) -> usize {
        debug_assert!(self.contains(c), "{c} outside {self}");
        c.x as usize + self.x as usize * (c.y as usize + self.y as usize * c.z as usize)
    }

    /// Coordinate of flat storage index `index`.
    pub fn coord(&self, index: usize) -> Coord {
        debug_assert!(index < self.volume, "index {index} outside {self}");
        let x = self.x as usize;
        let y = self.y as usize;
        Coord::new(
            (index % x) as u32,
            ((index / x) % y) as u32,
            (index / (x * y)) as u32,
        )
    }

    /// The node across `face` from `c`, or `None` at the grid edge.
    pub fn neighbour(&self, c: Coord, face: Face) -> Option<Coord> {
        let axis = face.axis();
        let v = c.get(axis);
        let moved = if face.is_positive() {
            v.checked_add(1).filter(|&n| n < self.len(axis))?
        } else {
            v.checked_sub(1)?
        };
        Some(c.with(axis, moved))
    }

    /// The centre node, rounding down on even axes.
    pub const fn centre(&self) -> Coord {
        Coord::new(self.x / 2, self.y / 2, self.z / 2)
    }

    /// The box covering the whole grid.
    pub const fn bounds(&self) -> Bounds {
        Bounds {
            min: Coord::new(0, 0, 0),
            max: Coord::new(self.x - 1, self.y - 1, self.z - 1),
        }
    }
}

impl fmt::Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.x, self.y, self.z)
    }
}

// ── Bounds ──────────────────────────────────────────────────────

/// An inclusive axis-aligned box `[min, max]` of grid nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Bounds {
    /// Lowest corner (inclusive).
    pub min: Coord,
    /// Highest corner (inclusive).
    pub max: Coord,
}

impl Bounds {
    /// Create a box from two inclusive corners.
    ///
    /// # Panics
    ///
    /// Panics if `min` exceeds `max` on any axis.
    pub fn new(min: Coord, max: Coord) -> Self {
        for axis in Axis::ALL {
            assert!(
                min.get(axis) <= max.get(axis),
                "inverted bounds on {axis}: {min} > {max}"
            );
        }
        Self { min, max }
    }

    /// Whether `c` lies inside the box.
    pub const fn contains(&self, c: Coord) -> bool {
        c.x >= self.min.x
            && c.x <= self.max.x
            && c.y >= self.min.y
            && c.y <= self.max.y
            && c.z >= self.min.z
            && c.z <= self.max.z
    }

    /// Number of nodes spanned along `axis`.
    pub const fn len(&self, axis: Axis) -> u32 {
        self.max.get(axis) - self.min.get(axis) + 1
    }

    /// Number of nodes in the box.
    pub fn volume(&self) -> usize {
        Axis::ALL
            .iter()
            .map(|&a| self.len(a) as usize)
            .product()
    }

    /// Whether the two boxes share at least one node.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        Axis::ALL.iter().all(|&a| {
            self.min.get(a) <= other.max.get(a) && other.min.get(a) <= self.max.get(a)
        })
    }

    /// Every node in the box, x fastest.
    pub fn iter(&self) -> impl Iterator<Item = Coord> {
        let Bounds { min, max } = *self;
        (min.z..=max.z).flat_map(move |z| {
            (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| Coord::new(x, y, z)))
        })
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}..={}, {}..={}, {}..={}]",
            self.min.x, self.max.x, self.min.y, self.max.y, self.min.z, self.max.z
        )
    }
}
