//! A reusable, poisonable phase barrier.
//!
//! `std::sync::Barrier` cannot be released early, so a worker that
//! panics between phases would leave its peers waiting forever. This
//! barrier can be poisoned: every current and future waiter returns
//! [`BarrierPoisoned`] instead of blocking.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

/// Returned by [`PhaseBarrier::wait`] once the barrier is poisoned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("phase barrier poisoned by a failed worker")]
pub struct BarrierPoisoned;

#[derive(Debug)]
struct State {
    arrived: usize,
    generation: u64,
    poisoned: bool,
}

/// Rendezvous point for a fixed number of parties, reusable across
/// phases.
#[derive(Debug)]
pub struct PhaseBarrier {
    parties: usize,
    state: Mutex<State>,
    released: Condvar,
}

impl PhaseBarrier {
    /// A barrier for `parties` participants.
    ///
    /// # Panics
    ///
    /// Panics if `parties` is zero.
    pub fn new(parties: usize) -> Self {
        assert!(parties > 0, "barrier needs at least one party");
        Self {
            parties,
            state: Mutex::new(State {
                arrived: 0,
                generation: 0,
                poisoned: false,
            }),
            released: Condvar::new(),
        }
    }

    // The lock is never held across code that can panic.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until all parties have arrived.
    ///
    /// Returns `Ok(true)` for exactly one party per phase (the last to
    /// arrive), `Ok(false)` for the rest, and `Err(BarrierPoisoned)` if
    /// the barrier was poisoned before this phase completed.
    pub fn wait(&self) -> Result<bool, BarrierPoisoned> {
        let mut state = self.lock();
        if state.poisoned {
            return Err(BarrierPoisoned);
        }
        let generation = state.generation;
        state.arrived += 1;
        if state.arrived == self.parties {
            state.arrived = 0;
            state.generation = generation.wrapping_add(1);
            self.released.notify_all();
            return Ok(true);
        }
        while state.generation == generation && !state.poisoned {
            state = self
                .released
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        if state.generation == generation {
            Err(BarrierPoisoned)
        } else {
            Ok(false)
        }
    }

    /// Release every waiter with [`BarrierPoisoned`], now and for all
    /// later phases.
    pub fn poison(&self) {
        self.lock().poisoned = true;
        self.released.notify_all();
    }

    /// Whether [`PhaseBarrier::poison`] has been called.
    pub fn is_poisoned(&self) -> bool {
        self.lock().poisoned
    }
}
