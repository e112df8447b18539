//! Benchmark profiles for the TLM wavefront engine.
//!
//! Provides pre-built grids and configurations for benchmarking:
//!
//! - [`room_profile`]: a 64x64x16 room with outer walls, an inner wall
//!   with a doorway and a dielectric pillar
//! - [`free_space_profile`]: an open n×n×n cube with a central impulse

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use tlm_core::{Bounds, Coord, Source, Thresholds, Waveform};
use tlm_engine::{RebalanceConfig, SimConfig};
use tlm_grid::{Grid, GridBuilder, Material};

/// Thresholds shared by every profile.
pub const PROFILE_THRESHOLDS: Thresholds = Thresholds::new(1e-3, 1e-4);

/// Build the room profile for `workers` threads.
///
/// Walls are one node thick on every side of x and y; the inner wall at
/// x = 32 has a 6-node doorway. A Gaussian source sits in the left half.
pub fn room_profile(workers: usize) -> (Grid, SimConfig) {
    let (x, y, z) = (64, 64, 16);
    let door = 29..35;
    let pillar = Bounds::new(Coord::new(44, 20, 0), Coord::new(49, 25, z - 1));
    let grid = GridBuilder::sized(x, y, z)
        .unwrap()
        .fill_with(|c| {
            let outer = c.x == 0 || c.x == x - 1 || c.y == 0 || c.y == y - 1;
            let inner = c.x == 32 && !door.contains(&c.y);
            if outer || inner {
                Material::BLOCKING
            } else if pillar.contains(c) {
                Material::dielectric(6.0)
            } else {
                Material::FREE_SPACE
            }
        })
        .build()
        .unwrap();

    let source = Source {
        waveform: Waveform::Gaussian,
        position: Coord::new(16, 32, 8),
        duration: 12,
    };
    let config = SimConfig {
        thresholds: PROFILE_THRESHOLDS,
        workers: Some(workers),
        max_steps: Some(5_000),
        ..SimConfig::new(source)
    };
    (grid, config)
}

/// Build an open `n`×`n`×`n` cube with a unit impulse at the centre.
pub fn free_space_profile(n: u32, workers: usize) -> (Grid, SimConfig) {
    let grid = GridBuilder::sized(n, n, n).unwrap().build().unwrap();
    let config = SimConfig {
        thresholds: PROFILE_THRESHOLDS,
        workers: Some(workers),
        rebalance: RebalanceConfig::disabled(),
        max_steps: Some(5_000),
        ..SimConfig::new(Source::impulse(grid.dims().centre()))
    };
    (grid, config)
}
