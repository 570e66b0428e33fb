use std::path::PathBuf;

use gridrelax::dms::{relax, strip_allocation, DmsConfig};
use gridrelax::io::{default_grid_path, default_output_path, FileGridStorage, GridStorage};
use gridrelax::SolverError;
use mpi::traits::*;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "dms", about = "Distributed-memory grid relaxation")]
struct Opt {
    /// Grid dimension.
    #[structopt(short = "d", long)]
    dim: Option<usize>,

    /// Convergence precision.
    #[structopt(short = "p", long, default_value = "0.001")]
    epsilon: f64,

    /// Input grid file; defaults to `grids/grid_D.bin`.
    #[structopt(short = "f", long)]
    file: Option<PathBuf>,
}

fn run(comm: &mpi::topology::SimpleCommunicator, opt: Opt) -> Result<(), SolverError> {
    let dim = opt.dim.ok_or_else(|| SolverError::InvalidArgument {
        detail: "missing mandatory -d (grid dimension)".to_string(),
    })?;

    let peers = comm.size() as usize;
    let strips = strip_allocation(dim, peers)?;
    let strip = strips[comm.rank() as usize];

    let path = opt.file.unwrap_or_else(|| default_grid_path(dim));
    let storage = FileGridStorage::new(&path);
    let buffer = storage.read_strip(dim, strip.alloc_start, strip.rows)?;

    let config = DmsConfig { epsilon: opt.epsilon };
    let (result, report) = relax(comm, dim, strip.alloc_start, strip.rows, buffer, config)?;
    tracing::info!(rank = comm.rank(), iterations = report.iterations, "converged");

    let output_storage = FileGridStorage::new(default_output_path(dim));
    output_storage.write_strip(dim, strip.alloc_start, strip.rows, &result)?;

    Ok(())
}

fn main() {
    gridrelax::logging::init();
    let opt = Opt::from_args();

    let universe = mpi::initialize().expect("MPI_Init failed");
    let world = universe.world();

    if let Err(err) = run(&world, opt) {
        tracing::error!(rank = world.rank(), %err, "distributed relaxation aborted");
        eprintln!("{err}");
        // Every peer that observes a local error aborts the whole job so no
        // peer is left waiting at a collective it will never reach.
        world.abort(1);
    }
}
