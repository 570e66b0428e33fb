//! A reusable two-phase cyclic barrier.
//!
//! This generalizes the monitor pattern the branch-and-bound engine this
//! crate is descended from uses to park idle worker threads (a
//! `parking_lot::Mutex`-guarded critical section plus a `parking_lot::
//! Condvar` notified on state changes) into a barrier that can be waited on
//! repeatedly, once per relaxation iteration, by a fixed set of parties.
//!
//! `std::sync::Barrier` would do the same job, but this crate already pulls
//! in `parking_lot` for its non-poisoning, lower-overhead mutex and condvar,
//! so the barrier is built on those instead of adding a second primitive
//! family for the same concern.

use parking_lot::{Condvar, Mutex};

use crate::error::SolverError;

struct State {
    /// Number of parties that have arrived in the current generation.
    arrived: usize,
    /// Incremented each time the barrier releases; distinguishes "still
    /// waiting in this generation" from "released, move on".
    generation: u64,
}

/// A barrier for a fixed number of parties that can be waited on repeatedly.
pub struct CyclicBarrier {
    parties: usize,
    state: Mutex<State>,
    released: Condvar,
}

impl CyclicBarrier {
    /// Creates a barrier for exactly `parties` participants.
    ///
    /// Fails with `Resource` if `parties == 0`: a barrier with no parties
    /// can never release.
    pub fn new(parties: usize) -> Result<Self, SolverError> {
        if parties == 0 {
            return Err(SolverError::Resource {
                detail: "a barrier needs at least one party".to_string(),
            });
        }
        Ok(Self {
            parties,
            state: Mutex::new(State {
                arrived: 0,
                generation: 0,
            }),
            released: Condvar::new(),
        })
    }

    /// Blocks until every party has called `wait` for the current
    /// generation, then releases all of them together. The last party to
    /// arrive returns immediately without blocking.
    pub fn wait(&self) {
        let mut state = self.state.lock();
        let arrived_generation = state.generation;
        state.arrived += 1;

        if state.arrived == self.parties {
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            self.released.notify_all();
        } else {
            while state.generation == arrived_generation {
                self.released.wait(&mut state);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn releases_only_once_every_party_arrives() {
        let barrier = CyclicBarrier::new(4).unwrap();
        let counter = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for _ in 0..3 {
                scope.spawn(|| {
                    std::thread::sleep(std::time::Duration::from_millis(10));
                    counter.fetch_add(1, Ordering::SeqCst);
                    barrier.wait();
                });
            }
            // The coordinator arrives last; by the time its `wait()` returns
            // every worker must already have incremented the counter.
            barrier.wait();
        });

        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn can_be_reused_across_many_generations() {
        let barrier = CyclicBarrier::new(2).unwrap();
        std::thread::scope(|scope| {
            scope.spawn(|| {
                for _ in 0..100 {
                    barrier.wait();
                }
            });
            for _ in 0..100 {
                barrier.wait();
            }
        });
    }

    #[test]
    fn rejects_zero_parties() {
        assert!(matches!(
            CyclicBarrier::new(0),
            Err(SolverError::Resource { .. })
        ));
    }
}
