//! A relaxed atomic `f64`.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// An `f64` stored as its bit pattern in an [`AtomicU64`].
///
/// All accesses are `Relaxed`. The value is only ever written by the
/// worker that owns the node in the current phase; visibility to other
/// workers is established by the barrier between phases.
#[derive(Default)]
pub struct AtomicF64(AtomicU64);

impl AtomicF64 {
    /// Create a new atomic holding `value`.
    pub fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    /// Read the current value.
    #[inline]
    pub fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    /// Overwrite the current value.
    #[inline]
    pub fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

impl fmt::Debug for AtomicF64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AtomicF64").field(&self.load()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_positive_zero() {
        let a = AtomicF64::default();
        assert_eq!(a.load().to_bits(), 0.0f64.to_bits());
    }

    #[test]
    fn store_preserves_bits() {
        let a = AtomicF64::new(1.0);
        a.store(-0.0);
        assert!(a.load().is_sign_negative());
        a.store(f64::MIN_POSITIVE / 2.0);
        assert_eq!(a.load(), f64::MIN_POSITIVE / 2.0);
    }
}
