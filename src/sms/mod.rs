//! The shared-memory solver core (§4.4): a persistent worker-thread pool
//! cooperating through a pair of cyclic barriers each iteration.

mod barrier;
mod engine;
mod shared_grid;

pub use barrier::CyclicBarrier;
pub use engine::{relax, SmsConfig, SmsReport};
