//! Emits Slurm-style batch scripts for scalability sweeps over dimension and
//! process count, one script per (D, P) pair, mirroring `slurm_writer.c` in
//! spirit: each script invokes the `dms` binary with matching `-d`/`-p`/`-f`
//! flags and an MPI process count of P.

use std::io::Write as _;
use std::path::PathBuf;
use std::process::exit;

use gridrelax::io::default_grid_path;
use gridrelax::SolverError;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "batchgen", about = "Generates Slurm batch scripts for scalability sweeps")]
struct Opt {
    /// Grid dimensions to sweep.
    #[structopt(short = "d", long, use_delimiter = true, default_value = "1000,2000,4000")]
    dims: Vec<usize>,

    /// Process counts to sweep.
    #[structopt(short = "n", long, use_delimiter = true, default_value = "4,16,44")]
    processes: Vec<usize>,

    /// Convergence precision.
    #[structopt(short = "p", long, default_value = "0.001")]
    epsilon: f64,

    /// Output directory for the generated scripts.
    #[structopt(short = "o", long, default_value = "scalability_testing")]
    out_dir: PathBuf,
}

fn nodes_for(processes: usize) -> (usize, usize) {
    let nodes = if processes > 132 { 4 } else { (processes + 43) / 44 };
    let tasks_per_node = processes / nodes.max(1);
    (nodes.max(1), tasks_per_node.max(1))
}

fn write_script(opt: &Opt, dim: usize, processes: usize) -> Result<(), SolverError> {
    let grid_file = default_grid_path(dim);
    let job_name = format!("grid_{dim}_{processes}");
    let script_path = opt.out_dir.join(format!("{job_name}.batch"));

    let (nodes, tasks_per_node) = nodes_for(processes);

    let mut script = String::new();
    script.push_str("#!/bin/bash\n\n");
    script.push_str(&format!("#SBATCH --job-name={job_name}\n"));
    script.push_str(&format!("#SBATCH --output=out/{job_name}.out\n"));
    script.push_str(&format!("#SBATCH --error=err/{job_name}.err\n\n"));
    script.push_str(&format!("#SBATCH --nodes={nodes}\n"));
    script.push_str(&format!("#SBATCH --ntasks-per-node={tasks_per_node}\n\n"));
    script.push_str(&format!(
        "mpirun -np {processes} ./dms -d {dim} -p {epsilon:.15} -f {grid_file}\n",
        epsilon = opt.epsilon,
        grid_file = grid_file.display(),
    ));

    let mut file = std::fs::File::create(&script_path).map_err(|source| SolverError::Io {
        path: script_path.clone(),
        source,
    })?;
    file.write_all(script.as_bytes()).map_err(|source| SolverError::Io {
        path: script_path.clone(),
        source,
    })?;

    tracing::info!(path = %script_path.display(), dim, processes, "wrote batch script");
    Ok(())
}

fn run(opt: Opt) -> Result<(), SolverError> {
    std::fs::create_dir_all(&opt.out_dir).map_err(|source| SolverError::Io {
        path: opt.out_dir.clone(),
        source,
    })?;

    for &dim in &opt.dims {
        for &processes in &opt.processes {
            write_script(&opt, dim, processes)?;
        }
    }
    Ok(())
}

fn main() {
    gridrelax::logging::init();
    let opt = Opt::from_args();

    if let Err(err) = run(opt) {
        tracing::error!(%err, "batch script generation failed");
        eprintln!("{err}");
        exit(1);
    }
}
