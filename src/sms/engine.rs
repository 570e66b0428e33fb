//! The shared-memory iteration engine (§4.4): a pool of persistent worker
//! threads relaxing disjoint row bands of a single grid, synchronized by
//! two cyclic barriers per iteration, with convergence decided by a
//! coordinator that never itself touches a row band.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::convergence::converged_slice;
use crate::error::SolverError;
use crate::grid::Grid;
use crate::partition::partition_rows;
use crate::stencil::mean4;

use super::barrier::CyclicBarrier;
use super::shared_grid::SharedGrid;

/// Tunable parameters for a shared-memory relaxation run. Dimension is
/// implied by the initial grid passed to [`relax`].
#[derive(Debug, Clone, Copy)]
pub struct SmsConfig {
    pub epsilon: f64,
    pub workers: usize,
}

/// Summary of a completed run, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmsReport {
    pub iterations: usize,
}

/// Relaxes `initial` to convergence using `config.workers` persistent
/// worker threads plus this (calling) thread as coordinator. Returns the
/// converged grid and a small run report.
pub fn relax(initial: Grid, config: SmsConfig) -> Result<(Grid, SmsReport), SolverError> {
    if !(config.epsilon > 0.0) {
        return Err(SolverError::InvalidArgument {
            detail: format!("precision must be positive, got {}", config.epsilon),
        });
    }
    if config.workers == 0 {
        return Err(SolverError::InvalidArgument {
            detail: "worker count must be at least 1".to_string(),
        });
    }

    let dim = initial.dim();
    let interior_height = dim - 2;
    let bands: Vec<(usize, usize)> = partition_rows(interior_height, config.workers)?
        .into_iter()
        .map(|(start, end)| (start + 1, end + 1))
        .collect();

    tracing::info!(
        dim,
        workers = config.workers,
        epsilon = config.epsilon,
        "starting shared-memory relaxation"
    );

    // Both buffers start identical, including boundaries, per the
    // iteration-entry invariant in §3.
    let grid_a = SharedGrid::new(initial.clone());
    let grid_b = SharedGrid::new(initial);

    let barrier1 = CyclicBarrier::new(config.workers + 1)?;
    let barrier2 = CyclicBarrier::new(config.workers + 1)?;
    let terminate = AtomicBool::new(false);
    // true: grid_a is input, grid_b is output. Flipped by the coordinator
    // instead of physically swapping row storage (§9, dual-buffer note).
    let input_is_a = AtomicBool::new(true);
    let mut iterations = 0usize;

    std::thread::scope(|scope| {
        for &band in &bands {
            scope.spawn(|| {
                worker_loop(
                    &grid_a,
                    &grid_b,
                    band,
                    &barrier1,
                    &barrier2,
                    &input_is_a,
                    &terminate,
                )
            });
        }

        loop {
            barrier1.wait();
            iterations += 1;

            let is_a = input_is_a.load(Ordering::Acquire);
            let (input, output) = if is_a {
                (&grid_a, &grid_b)
            } else {
                (&grid_b, &grid_a)
            };

            // SAFETY: every worker thread is parked inside barrier1.wait()
            // right now (it cannot proceed to compute until barrier2
            // releases), so nothing is concurrently writing either buffer.
            let converged_now = unsafe {
                converged_slice(
                    input.as_slice(),
                    output.as_slice(),
                    dim,
                    1,
                    dim - 1,
                    1,
                    dim - 1,
                    config.epsilon,
                )
            };

            tracing::debug!(iteration = iterations, converged = converged_now, "iteration complete");

            if converged_now {
                terminate.store(true, Ordering::Release);
            } else {
                input_is_a.store(!is_a, Ordering::Release);
            }

            barrier2.wait();

            if converged_now {
                break;
            }
        }
    });

    let final_grid = if input_is_a.load(Ordering::Acquire) {
        grid_b.into_grid()
    } else {
        grid_a.into_grid()
    };

    Ok((final_grid, SmsReport { iterations }))
}

#[allow(clippy::too_many_arguments)]
fn worker_loop(
    grid_a: &SharedGrid,
    grid_b: &SharedGrid,
    band: (usize, usize),
    barrier1: &CyclicBarrier,
    barrier2: &CyclicBarrier,
    input_is_a: &AtomicBool,
    terminate: &AtomicBool,
) {
    let (start, end) = band;
    let dim = grid_a.dim();

    loop {
        let is_a = input_is_a.load(Ordering::Acquire);
        let (input, output) = if is_a {
            (grid_a, grid_b)
        } else {
            (grid_b, grid_a)
        };

        for row in start..end {
            for col in 1..dim - 1 {
                // SAFETY: `input` is only ever read this iteration, never
                // written, so concurrent reads from every worker are sound.
                // `output`'s rows [start, end) belong exclusively to this
                // worker's band for this iteration — no other worker
                // targets them, and the coordinator only reads `output`
                // after both barriers have synchronized with every write
                // below.
                let value = unsafe {
                    mean4(
                        input.read(row - 1, col),
                        input.read(row + 1, col),
                        input.read(row, col - 1),
                        input.read(row, col + 1),
                    )
                };
                unsafe { output.write(row, col, value) };
            }
        }

        barrier1.wait();
        barrier2.wait();

        if terminate.load(Ordering::Acquire) {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_epsilon() {
        let grid = Grid::filled(4, 0.0).unwrap();
        let err = relax(
            grid,
            SmsConfig {
                epsilon: 0.0,
                workers: 1,
            },
        )
        .unwrap_err();
        assert!(matches!(err, SolverError::InvalidArgument { .. }));
    }

    #[test]
    fn rejects_zero_workers() {
        let grid = Grid::filled(4, 0.0).unwrap();
        let err = relax(
            grid,
            SmsConfig {
                epsilon: 0.1,
                workers: 0,
            },
        )
        .unwrap_err();
        assert!(matches!(err, SolverError::InvalidArgument { .. }));
    }

    #[test]
    fn scenario_1_three_by_three_single_worker_converges_in_two_iterations() {
        let mut grid = Grid::filled(3, 0.0).unwrap();
        grid.set(0, 0, 1.0);
        grid.set(0, 1, 1.0);
        grid.set(0, 2, 1.0);
        grid.set(1, 0, 1.0);
        grid.set(2, 0, 1.0);

        let (result, report) = relax(
            grid,
            SmsConfig {
                epsilon: 0.1,
                workers: 1,
            },
        )
        .unwrap();

        assert_eq!(report.iterations, 2);
        assert_eq!(result.get(1, 1), 0.5);
        // boundaries unchanged
        assert_eq!(result.get(0, 0), 1.0);
        assert_eq!(result.get(0, 1), 1.0);
        assert_eq!(result.get(0, 2), 1.0);
        assert_eq!(result.get(1, 0), 1.0);
        assert_eq!(result.get(2, 0), 1.0);
        assert_eq!(result.get(2, 1), 0.0);
        assert_eq!(result.get(2, 2), 0.0);
    }

    #[test]
    fn scenario_5_already_converged_grid_runs_exactly_one_iteration() {
        // A constant interior is a fixed point of the stencil, so the very
        // first iteration's output equals the input everywhere.
        let grid = Grid::filled(5, 0.25).unwrap();
        let (result, report) = relax(
            grid.clone(),
            SmsConfig {
                epsilon: 0.1,
                workers: 2,
            },
        )
        .unwrap();
        assert_eq!(report.iterations, 1);
        assert_eq!(result, grid);
    }

    #[test]
    fn boundary_cells_are_never_written() {
        let mut grid = Grid::filled(6, 0.0).unwrap();
        grid.set_boundary_only(1.0);
        let before = grid.clone();

        let (result, _) = relax(
            grid,
            SmsConfig {
                epsilon: 1e-6,
                workers: 3,
            },
        )
        .unwrap();

        let dim = result.dim();
        for i in 0..dim {
            assert_eq!(result.get(0, i), before.get(0, i));
            assert_eq!(result.get(dim - 1, i), before.get(dim - 1, i));
            assert_eq!(result.get(i, 0), before.get(i, 0));
            assert_eq!(result.get(i, dim - 1), before.get(i, dim - 1));
        }
    }

    #[test]
    fn worker_count_does_not_change_the_result() {
        let mut grid = Grid::filled(10, 0.0).unwrap();
        grid.set_boundary_only(1.0);
        // Deterministic pseudo-random interior, independent of wall clock.
        let mut seed = 12345u64;
        for r in 1..9 {
            for c in 1..9 {
                seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
                let bit = (seed >> 60) & 1;
                grid.set(r, c, bit as f64);
            }
        }

        let mut results = Vec::new();
        for workers in [1, 2, 4] {
            let (result, _) = relax(
                grid.clone(),
                SmsConfig {
                    epsilon: 0.01,
                    workers,
                },
            )
            .unwrap();
            results.push(result);
        }

        for pair in results.windows(2) {
            assert_eq!(pair[0], pair[1]);
        }
    }
}
