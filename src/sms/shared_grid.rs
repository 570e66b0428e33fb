//! A grid whose cells can be read and written from multiple persistent
//! worker threads without locking, relying on the caller to uphold the
//! disjoint-access discipline described in §5 (SMS): workers only ever
//! write cells in their own row band of the *output* buffer, and only ever
//! read the *input* buffer, which no one writes during that iteration.
//!
//! This is the unsafe core the engine builds its safe public API around.
//! Every unsafe block below exists because `UnsafeCell` is the only way to
//! give several threads mutable access to disjoint regions of one
//! allocation without paying for a lock that the barrier protocol already
//! makes unnecessary.

use std::cell::UnsafeCell;

use crate::grid::Grid;

pub struct SharedGrid {
    dim: usize,
    cells: UnsafeCell<Vec<f64>>,
}

// SAFETY: `SharedGrid` is shared across worker threads behind a plain
// reference. Callers (exclusively the code in `crate::sms::engine`) must
// ensure that, for any given iteration, each cell is targeted by at most one
// writer and never simultaneously read and written. The two-barrier
// protocol in `engine.rs` is what makes that true; `SharedGrid` itself
// cannot enforce it and trusts its callers.
unsafe impl Sync for SharedGrid {}

impl SharedGrid {
    pub fn new(grid: Grid) -> Self {
        Self {
            dim: grid.dim(),
            cells: UnsafeCell::new(grid.into_vec()),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Reads a single cell.
    ///
    /// # Safety
    /// The caller must ensure no thread is concurrently writing this cell.
    /// Concurrent reads from multiple threads are fine.
    #[inline]
    pub unsafe fn read(&self, row: usize, col: usize) -> f64 {
        let dim = self.dim;
        (*self.cells.get())[row * dim + col]
    }

    /// Writes a single cell.
    ///
    /// # Safety
    /// The caller must ensure no other thread concurrently reads or writes
    /// this cell.
    #[inline]
    pub unsafe fn write(&self, row: usize, col: usize, value: f64) {
        let dim = self.dim;
        (*self.cells.get())[row * dim + col] = value;
    }

    /// Borrows the whole buffer as a flat slice.
    ///
    /// # Safety
    /// The caller must ensure no thread is concurrently writing to any cell
    /// this slice would expose — i.e. all worker threads are parked at a
    /// barrier when this is called.
    pub unsafe fn as_slice(&self) -> &[f64] {
        &*self.cells.get()
    }

    /// Consumes the shared grid. Safe unconditionally: taking `self` by
    /// value proves no other reference to it (and therefore no worker
    /// thread holding a borrow of it) can still be alive.
    pub fn into_grid(self) -> Grid {
        let dim = self.dim;
        Grid::from_vec(dim, self.cells.into_inner())
            .expect("SharedGrid always wraps a valid dim x dim buffer")
    }
}
