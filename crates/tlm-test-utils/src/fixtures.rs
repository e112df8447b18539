//! Reusable grids.
//!
//! - [`free_space`]: every node matched to Z0, edges absorbing.
//! - [`enclosed_source`]: one dielectric node walled in by blocking
//!   nodes, so it rings down on its own.
//! - [`layered_slab`]: free space with a dielectric slab across the
//!   middle of the z axis.

use tlm_core::{Bounds, Coord};
use tlm_grid::{Grid, GridBuilder, Material};

/// An `x`×`y`×`z` free-space grid.
pub fn free_space(x: u32, y: u32, z: u32) -> Grid {
    GridBuilder::sized(x, y, z)
        .and_then(GridBuilder::build)
        .expect("free-space fixture dimensions must be valid")
}

/// A 3×3×3 grid whose centre has relative permittivity `permittivity`
/// and every other node blocks. Returns the grid and the centre.
///
/// The centre's reflection coefficient is `(Zs − Z0)/(Zs + Z0)` on
/// every face and nothing is transmitted, so an impulse there decays by
/// that factor each step.
pub fn enclosed_source(permittivity: f64) -> (Grid, Coord) {
    let centre = Coord::new(1, 1, 1);
    let grid = GridBuilder::sized(3, 3, 3)
        .expect("3x3x3 is valid")
        .fill_with(|c| {
            if c == centre {
                Material::dielectric(permittivity)
            } else {
                Material::BLOCKING
            }
        })
        .build()
        .expect("enclosed fixture must build");
    (grid, centre)
}

/// An `n`×`n`×`n` free-space grid with a slab of `permittivity`
/// `thickness` nodes thick centred on the z axis.
pub fn layered_slab(n: u32, thickness: u32, permittivity: f64) -> Grid {
    assert!(thickness > 0 && thickness <= n, "slab thicker than grid");
    let z0 = (n - thickness) / 2;
    let slab = Bounds::new(
        Coord::new(0, 0, z0),
        Coord::new(n - 1, n - 1, z0 + thickness - 1),
    );
    GridBuilder::sized(n, n, n)
        .expect("slab fixture dimensions must be valid")
        .material_box(slab, Material::dielectric(permittivity))
        .build()
        .expect("slab fixture must build")
}
