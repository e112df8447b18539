//! Seeded random scenes.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tlm_core::{Coord, Dims};
use tlm_grid::{Grid, GridBuilder, Material};

/// A random grid and a source position on a propagating node.
#[derive(Debug)]
pub struct Scene {
    pub grid: Grid,
    pub source: Coord,
}

/// Build a scene of `dims` from `seed`.
///
/// Roughly one node in twelve blocks and one in six is a dielectric
/// with permittivity in `[1, 8)`. The grid centre is kept free space
/// and used as the source. The same seed always gives the same scene.
pub fn random_scene(seed: u64, dims: Dims) -> Scene {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let source = dims.centre();
    let grid = GridBuilder::new(dims)
        .fill_with(|c| {
            if c == source {
                return Material::FREE_SPACE;
            }
            let roll: f64 = rng.random();
            if roll < 1.0 / 12.0 {
                Material::BLOCKING
            } else if roll < 1.0 / 12.0 + 1.0 / 6.0 {
                Material::dielectric(rng.random_range(1.0..8.0))
            } else {
                Material::FREE_SPACE
            }
        })
        .build()
        .expect("random scene materials are always valid");
    Scene { grid, source }
}
