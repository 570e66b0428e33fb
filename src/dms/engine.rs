//! The distributed iteration engine (§4.5): one process per peer, each
//! single-threaded, overlapping halo exchange with interior relaxation and
//! agreeing on termination via a collective all-reduce.

use mpi::collective::SystemOperation;
use mpi::point_to_point::{Destination, Source};
use mpi::request;
use mpi::topology::SimpleCommunicator;
use mpi::traits::*;

use crate::error::SolverError;

use super::local::{relax_bottom_edge, relax_interior, relax_single_row, relax_top_edge};

const TOP_TAG: i32 = 0;
const BOTTOM_TAG: i32 = 1;

/// Tunable parameters for a distributed relaxation run.
#[derive(Debug, Clone, Copy)]
pub struct DmsConfig {
    pub epsilon: f64,
}

/// Summary of a completed run, identical on every peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DmsReport {
    pub iterations: usize,
}

/// Relaxes one peer's strip to global convergence, communicating with its
/// row-neighbors over `comm`. `alloc_start`/`rows` come from
/// [`crate::dms::strip_allocation`]; `strip` is the peer's initial
/// `rows x dim` buffer, boundaries already populated.
pub fn relax(
    comm: &SimpleCommunicator,
    dim: usize,
    alloc_start: usize,
    rows: usize,
    strip: Vec<f64>,
    config: DmsConfig,
) -> Result<(Vec<f64>, DmsReport), SolverError> {
    if !(config.epsilon > 0.0) {
        return Err(SolverError::InvalidArgument {
            detail: format!("precision must be positive, got {}", config.epsilon),
        });
    }

    let rank = comm.rank();
    let peers = comm.size();
    let is_top_peer = rank == 0;
    let is_bottom_peer = rank == peers - 1;
    let is_global_top_row = alloc_start == 0;
    let is_global_bottom_row = alloc_start + rows == dim;

    let mut input = strip;
    let mut output = input.clone();
    let mut top_halo = vec![0.0; dim];
    let mut bottom_halo = vec![0.0; dim];
    let mut iterations = 0usize;

    tracing::info!(rank, dim, alloc_start, rows, "peer joined distributed relaxation");

    loop {
        iterations += 1;

        let finished = request::scope(|scope| {
            let mut recv_top = None;
            let mut recv_bottom = None;
            let mut send_top = None;
            let mut send_bottom = None;

            if !is_top_peer {
                recv_top = Some(
                    comm.process_at_rank(rank - 1)
                        .immediate_receive_into_with_tag(scope, &mut top_halo, BOTTOM_TAG),
                );
                send_top = Some(
                    comm.process_at_rank(rank - 1)
                        .immediate_send_with_tag(scope, &input[0..dim], TOP_TAG),
                );
            }
            if !is_bottom_peer {
                recv_bottom = Some(
                    comm.process_at_rank(rank + 1)
                        .immediate_receive_into_with_tag(scope, &mut bottom_halo, TOP_TAG),
                );
                send_bottom = Some(
                    comm.process_at_rank(rank + 1)
                        .immediate_send_with_tag(scope, &input[(rows - 1) * dim..rows * dim], BOTTOM_TAG),
                );
            }

            relax_interior(&input, &mut output, dim, rows);

            if let Some(req) = recv_top {
                req.wait();
            }
            if let Some(req) = recv_bottom {
                req.wait();
            }

            // A one-row strip has no second local row to lend either edge
            // relaxer, so a peer in the middle of the chain (neither the
            // global top nor bottom row) must relax its only row from both
            // halos at once. The global top/bottom rows are boundary and are
            // never relaxed regardless of strip height.
            if rows == 1 {
                if !is_global_top_row && !is_global_bottom_row {
                    relax_single_row(&input, &top_halo, &bottom_halo, &mut output, dim);
                }
            } else {
                if !is_global_top_row {
                    relax_top_edge(&input, &top_halo, &mut output, dim);
                }
                if !is_global_bottom_row {
                    relax_bottom_edge(&input, &bottom_halo, &mut output, dim, rows);
                }
            }

            if let Some(req) = send_top {
                req.wait();
            }
            if let Some(req) = send_bottom {
                req.wait();
            }

            let local_converged = crate::convergence::converged_slice(
                &input,
                &output,
                dim,
                if is_global_top_row { 1 } else { 0 },
                if is_global_bottom_row { rows - 1 } else { rows },
                1,
                dim - 1,
                config.epsilon,
            );

            let local_flag = local_converged as i32;
            let mut global_flag = 0i32;
            comm.all_reduce_into(&local_flag, &mut global_flag, SystemOperation::logical_and());
            global_flag != 0
        });

        tracing::debug!(rank, iteration = iterations, finished, "iteration complete");

        if finished {
            return Ok((output, DmsReport { iterations }));
        }

        std::mem::swap(&mut input, &mut output);
    }
}
