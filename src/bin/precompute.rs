//! Solve Super Six for a total, persist the table, and optionally export it.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use tracing::info;

use super6::constants::{DEFAULT_MAX_ITERATIONS, EPSILON, MAX_TOTAL_STICKS};
use super6::env_config;
use super6::storage::{load_or_compute, save_solution, state_file_path};
use super6::strategy_table::{write_lid_slice, StrategyTable};
use super6::value_iteration::{solve_with_config, SolverConfig, UpdateMode};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum UpdateArg {
    /// Read the previous sweep, write a scratch table
    Synchronous,
    /// Gauss–Seidel: overwrite values during the sweep
    InPlace,
}

impl From<UpdateArg> for UpdateMode {
    fn from(arg: UpdateArg) -> Self {
        match arg {
            UpdateArg::Synchronous => UpdateMode::Synchronous,
            UpdateArg::InPlace => UpdateMode::InPlace,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "super6-precompute")]
#[command(version, about = "Compute the optimal Super Six strategy table", long_about = None)]
struct Args {
    /// Total sticks in the game
    #[arg(long, short = 'n', default_value_t = 12)]
    sticks: u32,

    /// Convergence tolerance on the largest per-sweep change
    #[arg(long, default_value_t = EPSILON)]
    epsilon: f64,

    /// Sweeps before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,

    /// Sweep update mode
    #[arg(long, value_enum, default_value = "synchronous")]
    update: UpdateArg,

    /// Update states of each synchronous sweep in parallel
    #[arg(long)]
    parallel: bool,

    /// Recompute even if a stored table exists
    #[arg(long)]
    force: bool,

    /// Table file (default: data/strategy_tables/super6_n{sticks}.bin)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Also export the table as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Also export the table as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Print the free-choice rows with this many sticks in the lid
    #[arg(long)]
    lid: Option<u32>,
}

fn run(args: Args) -> super6::Result<()> {
    if args.sticks > MAX_TOTAL_STICKS {
        return Err(super6::Error::InvalidConfiguration {
            message: format!("--sticks {} exceeds the maximum of {}", args.sticks, MAX_TOTAL_STICKS),
        });
    }

    let config = SolverConfig {
        epsilon: args.epsilon,
        max_iterations: args.max_iterations,
        update: args.update.into(),
        parallel: args.parallel,
    };
    if config.parallel {
        env_config::init_rayon_threads();
    }

    let path = args.output.unwrap_or_else(|| state_file_path(args.sticks));
    let start = Instant::now();
    let solution = if args.force {
        let solution = solve_with_config(args.sticks, &config)?;
        save_solution(&solution, &path)?;
        solution
    } else {
        load_or_compute(args.sticks, &path, &config)?
    };

    let table = StrategyTable::from_solution(&solution);
    if let Some(json) = &args.json {
        table.write_json(json)?;
        info!(path = %json.display(), rows = table.len(), "wrote JSON table");
    }
    if let Some(csv) = &args.csv {
        table.write_csv(csv)?;
        info!(path = %csv.display(), rows = table.len(), "wrote CSV table");
    }

    println!(
        "Super Six, {} sticks: {} configurations, {} sweeps, final delta {:.3e} ({:.2} s)",
        solution.total(),
        solution.states().len(),
        solution.iterations(),
        solution.final_delta(),
        start.elapsed().as_secs_f64()
    );
    if let Some(lid) = args.lid {
        println!();
        write_lid_slice(&mut std::io::stdout().lock(), &table, lid)
            .map_err(|e| super6::Error::io("write lid slice", e))?;
    }
    Ok(())
}

fn main() {
    env_config::init_logging();
    env_config::init_base_path();
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
