use std::path::PathBuf;
use std::process::exit;

use gridrelax::io::{default_output_path, FileGridStorage, GridStorage};
use gridrelax::sms::{relax, SmsConfig};
use gridrelax::{Grid, SolverError};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "sms", about = "Shared-memory grid relaxation")]
struct Opt {
    /// Grid dimension.
    #[structopt(short = "d", long, default_value = "10")]
    dim: usize,

    /// Convergence precision.
    #[structopt(short = "p", long, default_value = "0.1")]
    epsilon: f64,

    /// Worker thread count; defaults to the number of logical CPUs.
    #[structopt(short = "w", long)]
    workers: Option<usize>,

    /// Input grid file; if absent, a boundary-only grid is synthesized.
    #[structopt(short = "f", long)]
    file: Option<PathBuf>,

    /// Output grid file.
    #[structopt(short = "o", long)]
    output: Option<PathBuf>,
}

fn run(opt: Opt) -> Result<(), SolverError> {
    let initial = match &opt.file {
        Some(path) => {
            let storage = FileGridStorage::new(path);
            let cells = storage.read_strip(opt.dim, 0, opt.dim)?;
            Grid::from_vec(opt.dim, cells)?
        }
        None => {
            let mut grid = Grid::filled(opt.dim, 0.0)?;
            grid.set_boundary_only(1.0);
            grid
        }
    };

    let config = SmsConfig {
        epsilon: opt.epsilon,
        workers: opt.workers.unwrap_or_else(num_cpus::get),
    };

    let (result, report) = relax(initial, config)?;
    tracing::info!(iterations = report.iterations, "converged");

    let output_path = opt.output.unwrap_or_else(|| default_output_path(opt.dim));
    let storage = FileGridStorage::new(&output_path);
    storage.write_strip(opt.dim, 0, opt.dim, result.as_slice())?;

    Ok(())
}

fn main() {
    gridrelax::logging::init();
    let opt = Opt::from_args();

    if let Err(err) = run(opt) {
        tracing::error!(%err, "shared-memory relaxation aborted");
        eprintln!("{err}");
        exit(1);
    }
}
