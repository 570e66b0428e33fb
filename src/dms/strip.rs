//! Strip allocation (§3, §4.2 DMS variant): wraps the shared row-band
//! partitioner to split the *full* dimension `D` across `P` peers, rather
//! than the interior height the shared-memory engine splits.

use crate::error::SolverError;
use crate::partition::partition_rows;

/// One peer's `(allocStart, allocRows)` within the global grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strip {
    pub alloc_start: usize,
    pub rows: usize,
}

/// Computes every peer's strip for a grid of dimension `dim` split across
/// `peers` peers. Index `i` of the returned vector is peer `i`'s strip.
pub fn strip_allocation(dim: usize, peers: usize) -> Result<Vec<Strip>, SolverError> {
    partition_rows(dim, peers).map(|bands| {
        bands
            .into_iter()
            .map(|(start, end)| Strip {
                alloc_start: start,
                rows: end - start,
            })
            .collect()
    })
}
