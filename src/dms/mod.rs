//! The distributed-memory solver core (§4.5): message-passing peers, each
//! owning a horizontal strip of the grid, built on the `mpi` crate.

mod engine;
mod local;
mod strip;

pub use engine::{relax, DmsConfig, DmsReport};
pub use strip::{strip_allocation, Strip};
