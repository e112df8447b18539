//! Grid construction from node impedances.
//!
//! Stands in for the scene rasteriser: it fills nodes with materials
//! and derives every node's per-face coefficients from its impedance
//! and its neighbours'. Polygon scenes are out of scope; uniform fills,
//! axis-aligned boxes and per-node overrides are enough to drive the
//! engine.

use tlm_core::constants::IMPEDANCE_OF_FREE_SPACE;
use tlm_core::{Bounds, Coord, Dims, Face};

use crate::coefficients::Coefficients;
use crate::error::GridError;
use crate::grid::Grid;

/// Electrical properties assigned to a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// Relative permittivity `εr`.
    pub permittivity: f64,
    /// Whether the wavefront may enter nodes of this material.
    pub propagate: bool,
}

impl Material {
    /// Lossless free space.
    pub const FREE_SPACE: Material = Material {
        permittivity: 1.0,
        propagate: true,
    };

    /// An absorbing node the wavefront never enters.
    pub const BLOCKING: Material = Material {
        permittivity: 1.0,
        propagate: false,
    };

    /// A propagating dielectric with relative permittivity `permittivity`.
    pub const fn dielectric(permittivity: f64) -> Self {
        Self {
            permittivity,
            propagate: true,
        }
    }

    /// Wave impedance `Z0 / √εr`.
    pub fn impedance(&self) -> f64 {
        IMPEDANCE_OF_FREE_SPACE / self.permittivity.sqrt()
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::FREE_SPACE
    }
}

/// Builder for [`Grid`].
///
/// Every node starts as free space. Setters never fail immediately; the
/// first out-of-bounds coordinate is remembered and reported by
/// [`GridBuilder::build`].
#[derive(Debug)]
pub struct GridBuilder {
    dims: Dims,
    impedance: Vec<f64>,
    propagate: Vec<bool>,
    overrides: Vec<(usize, Coefficients)>,
    error: Option<GridError>,
}

impl GridBuilder {
    /// Start a free-space grid of `dims`.
    pub fn new(dims: Dims) -> Self {
        let n = dims.volume();
        Self {
            dims,
            impedance: vec![IMPEDANCE_OF_FREE_SPACE; n],
            propagate: vec![true; n],
            overrides: Vec::new(),
            error: None,
        }
    }

    /// Start a free-space `x × y × z` grid.
    pub fn sized(x: u32, y: u32, z: u32) -> Result<Self, GridError> {
        Ok(Self::new(Dims::new(x, y, z)?))
    }

    /// Dimensions of the grid being built.
    pub fn dims(&self) -> Dims {
        self.dims
    }

    fn locate(&mut self, coord: Coord) -> Option<usize> {
        if self.dims.contains(coord) {
            Some(self.dims.index(coord))
        } else {
            self.error.get_or_insert(GridError::CoordOutOfBounds {
                coord,
                dims: self.dims,
            });
            None
        }
    }

    /// Set the impedance of one node directly.
    pub fn impedance(mut self, coord: Coord, ohms: f64) -> Self {
        if let Some(i) = self.locate(coord) {
            self.impedance[i] = ohms;
        }
        self
    }

    /// Assign `material` to one node.
    pub fn material(mut self, coord: Coord, material: Material) -> Self {
        if let Some(i) = self.locate(coord) {
            self.impedance[i] = material.impedance();
            self.propagate[i] = material.propagate;
        }
        self
    }

    /// Mark one node as blocking, keeping its impedance.
    pub fn blocking(mut self, coord: Coord) -> Self {
        if let Some(i) = self.locate(coord) {
            self.propagate[i] = false;
        }
        self
    }

    /// Assign `material` to every node in `bounds`.
    pub fn material_box(mut self, bounds: Bounds, material: Material) -> Self {
        if self.locate(bounds.max).is_none() {
            return self;
        }
        let z = material.impedance();
        for c in bounds.iter() {
            let i = self.dims.index(c);
            self.impedance[i] = z;
            self.propagate[i] = material.propagate;
        }
        self
    }

    /// Assign a material to every node from a function of its position.
    pub fn fill_with(mut self, mut f: impl FnMut(Coord) -> Material) -> Self {
        let dims = self.dims;
        for (i, (z, p)) in self
            .impedance
            .iter_mut()
            .zip(self.propagate.iter_mut())
            .enumerate()
        {
            let m = f(dims.coord(i));
            *z = m.impedance();
            *p = m.propagate;
        }
        self
    }

    /// Replace the derived coefficients of one node.
    ///
    /// Applied after derivation, so the override wins regardless of call
    /// order.
    pub fn coefficients(mut self, coord: Coord, coefficients: Coefficients) -> Self {
        if let Some(i) = self.locate(coord) {
            self.overrides.push((i, coefficients));
        }
        self
    }

    /// Derive coefficients and produce the grid.
    ///
    /// Checks, in order:
    /// 1. No builder call addressed a node outside the grid.
    /// 2. Every impedance is finite and positive.
    /// 3. Every coefficient (derived or overridden) is finite.
    pub fn build(self) -> Result<Grid, GridError> {
        let dims = self.dims;

        // 1. Out-of-bounds setters.
        if let Some(e) = self.error {
            return Err(e);
        }

        // 2. Impedances.
        if let Some((i, &value)) = self
            .impedance
            .iter()
            .enumerate()
            .find(|(_, z)| !(z.is_finite() && **z > 0.0))
        {
            return Err(GridError::InvalidImpedance {
                coord: dims.coord(i),
                value,
            });
        }

        let mut coefficients = Vec::with_capacity(dims.volume());
        for i in 0..dims.volume() {
            let c = dims.coord(i);
            let zs = self.impedance[i];
            let mut coeffs = Coefficients::MATCHED;
            for face in Face::ALL {
                // Open edge faces keep R = 0, T = 1.
                if let Some(n) = dims.neighbour(c, face) {
                    let (r, t) = Coefficients::junction(zs, self.impedance[dims.index(n)]);
                    coeffs.reflection[face.index()] = r;
                    coeffs.transmission[face.index()] = t;
                }
            }
            coefficients.push(coeffs);
        }
        for (i, c) in self.overrides {
            coefficients[i] = c;
        }

        // 3. Coefficients.
        for (i, c) in coefficients.iter().enumerate() {
            if let Some(face) = c.first_non_finite() {
                return Err(GridError::NonFiniteCoefficient {
                    coord: dims.coord(i),
                    face,
                });
            }
        }

        Ok(Grid::from_parts(dims, coefficients, self.propagate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_space_is_matched_everywhere() {
        let g = GridBuilder::sized(3, 3, 3).unwrap().build().unwrap();
        for i in 0..g.len() {
            assert_eq!(*g.coefficients(i), Coefficients::MATCHED);
            assert!(g.propagates(i));
        }
    }

    #[test]
    fn dielectric_boundary_reflects() {
        let g = GridBuilder::sized(2, 1, 1)
            .unwrap()
            .material(Coord::new(1, 0, 0), Material::dielectric(4.0))
            .build()
            .unwrap();
        // Z0 into Z0/2: R = 1/3, T = 2/3.
        let air = g.coefficients(0);
        assert!((air.r(Face::XPos) - 1.0 / 3.0).abs() < 1e-12);
        assert!((air.t(Face::XPos) - 2.0 / 3.0).abs() < 1e-12);
        // Z0/2 into Z0: R = -1/3, T = 4/3.
        let glass = g.coefficients(1);
        assert!((glass.r(Face::XNeg) + 1.0 / 3.0).abs() < 1e-12);
        assert!((glass.t(Face::XNeg) - 4.0 / 3.0).abs() < 1e-12);
        // Edges stay open.
        assert_eq!(air.r(Face::XNeg), 0.0);
        assert_eq!(air.t(Face::XNeg), 1.0);
    }

    #[test]
    fn blocking_keeps_impedance() {
        let g = GridBuilder::sized(3, 1, 1)
            .unwrap()
            .blocking(Coord::new(1, 0, 0))
            .build()
            .unwrap();
        assert!(!g.propagates(1));
        assert_eq!(*g.coefficients(0), Coefficients::MATCHED);
    }

    #[test]
    fn material_box_fills_region() {
        let g = GridBuilder::sized(4, 4, 4)
            .unwrap()
            .material_box(
                Bounds::new(Coord::new(1, 1, 1), Coord::new(2, 2, 2)),
                Material::BLOCKING,
            )
            .build()
            .unwrap();
        let blocked = (0..g.len()).filter(|&i| !g.propagates(i)).count();
        assert_eq!(blocked, 8);
    }

    #[test]
    fn out_of_bounds_setter_is_reported() {
        let err = GridBuilder::sized(2, 2, 2)
            .unwrap()
            .blocking(Coord::new(0, 5, 0))
            .blocking(Coord::new(9, 9, 9))
            .build()
            .unwrap_err();
        match err {
            GridError::CoordOutOfBounds { coord, .. } => assert_eq!(coord, Coord::new(0, 5, 0)),
            other => panic!("expected CoordOutOfBounds, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_positive_impedance() {
        match GridBuilder::sized(2, 2, 2)
            .unwrap()
            .impedance(Coord::new(1, 1, 1), 0.0)
            .build()
        {
            Err(GridError::InvalidImpedance { coord, value }) => {
                assert_eq!(coord, Coord::new(1, 1, 1));
                assert_eq!(value, 0.0);
            }
            other => panic!("expected InvalidImpedance, got {other:?}"),
        }
    }

    #[test]
    fn negative_permittivity_is_invalid_impedance() {
        let r = GridBuilder::sized(1, 1, 1)
            .unwrap()
            .material(Coord::new(0, 0, 0), Material::dielectric(-1.0))
            .build();
        assert!(matches!(r, Err(GridError::InvalidImpedance { .. })));
    }

    #[test]
    fn rejects_non_finite_override() {
        let mut bad = Coefficients::MATCHED;
        bad.reflection[Face::ZPos.index()] = f64::INFINITY;
        match GridBuilder::sized(2, 2, 2)
            .unwrap()
            .coefficients(Coord::new(0, 0, 1), bad)
            .build()
        {
            Err(GridError::NonFiniteCoefficient { coord, face }) => {
                assert_eq!(coord, Coord::new(0, 0, 1));
                assert_eq!(face, Face::ZPos);
            }
            other => panic!("expected NonFiniteCoefficient, got {other:?}"),
        }
    }

    #[test]
    fn empty_dims_propagate_as_grid_error() {
        assert!(matches!(
            GridBuilder::sized(0, 1, 1),
            Err(GridError::Dims(_))
        ));
    }
}
