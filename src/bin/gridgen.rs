use std::process::exit;

use gridrelax::io::{default_grid_path, FileGridStorage, GridStorage};
use gridrelax::{Grid, SolverError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "gridgen", about = "Synthesizes a grid file for the solvers")]
struct Opt {
    /// Grid dimension.
    #[structopt(short = "s", long)]
    size: usize,

    /// Boundary-only mode: row 0 and column 0 set to 1.0, interior 0.0.
    /// Without this flag every cell, boundary included, is drawn uniformly
    /// from {0.0, 1.0}, matching the original generator.
    #[structopt(short = "b", long)]
    boundary_only: bool,

    /// PRNG seed. Fixed by default so generated grids are reproducible.
    #[structopt(long, default_value = "42")]
    seed: u64,
}

fn run(opt: Opt) -> Result<(), SolverError> {
    let grid = if opt.boundary_only {
        let mut grid = Grid::filled(opt.size, 0.0)?;
        grid.set_boundary_only(1.0);
        grid
    } else {
        let mut rng = StdRng::seed_from_u64(opt.seed);
        let cells: Vec<f64> = (0..opt.size * opt.size)
            .map(|_| rng.gen_range(0..2) as f64)
            .collect();
        Grid::from_vec(opt.size, cells)?
    };

    let path = default_grid_path(opt.size);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| SolverError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let storage = FileGridStorage::new(&path);
    storage.write_strip(opt.size, 0, opt.size, grid.as_slice())?;
    tracing::info!(path = %path.display(), size = opt.size, "wrote grid");

    Ok(())
}

fn main() {
    gridrelax::logging::init();
    let opt = Opt::from_args();

    if let Err(err) = run(opt) {
        tracing::error!(%err, "grid generation failed");
        eprintln!("{err}");
        exit(1);
    }
}
