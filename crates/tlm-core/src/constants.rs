//! Physical constants and run defaults.

/// Wave impedance of free space, in ohms.
pub const IMPEDANCE_OF_FREE_SPACE: f64 = 376.730_313_461_77;

/// Speed of light in vacuum, in metres per second.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Empirical scaling between a node's voltage and received power,
/// used when converting a path-loss budget into an absolute threshold.
pub const KAPPA: f64 = 4.5;

/// Default distance between adjacent grid nodes, in metres.
pub const DEFAULT_GRID_SPACING: f64 = 0.2;

/// Default maximum path loss tracked before a node is pruned, in dB.
pub const DEFAULT_MAX_PATH_LOSS_DB: f64 = -160.0;

/// Default fraction of a node's own peak below which it is pruned.
pub const DEFAULT_RELATIVE_THRESHOLD: f64 = 1e-4;

/// Default operating frequency, in hertz.
pub const DEFAULT_FREQUENCY_HZ: f64 = 2.4e9;
