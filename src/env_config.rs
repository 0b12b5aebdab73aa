//! Shared environment configuration for the Super Six binaries.
//!
//! Consolidates `SUPER6_BASE_PATH`, `RAYON_NUM_THREADS`, `SUPER6_PORT`,
//! `SUPER6_STICKS` and the `RUST_LOG` filter.

use std::path::PathBuf;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Default total for the server when `SUPER6_STICKS` is unset.
pub const DEFAULT_SERVER_STICKS: u32 = 12;

/// Install the fmt subscriber. `RUST_LOG` overrides the default `info` filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Read `SUPER6_BASE_PATH` (default `"."`) and chdir into it. Exits on failure.
pub fn init_base_path() -> PathBuf {
    let base_path = std::env::var("SUPER6_BASE_PATH").unwrap_or_else(|_| ".".to_string());
    let path = PathBuf::from(&base_path);
    if let Err(e) = std::env::set_current_dir(&path) {
        eprintln!("Failed to change directory to {}: {}", base_path, e);
        std::process::exit(1);
    }
    if let Ok(cwd) = std::env::current_dir() {
        info!(base_path = %base_path, cwd = %cwd.display(), "working directory");
    }
    path
}

/// Read `RAYON_NUM_THREADS` (fallback `OMP_NUM_THREADS`, default 8) and build
/// the global rayon pool. Tolerates an already-initialized pool. Returns the thread count.
pub fn init_rayon_threads() -> usize {
    let num_threads = std::env::var("RAYON_NUM_THREADS")
        .or_else(|_| std::env::var("OMP_NUM_THREADS"))
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8);
    // The global pool can only be built once per process. Tests and library
    // callers may already have triggered rayon's default pool, in which case
    // that pool is used as is.
    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
    {
        debug!(error = %e, "rayon pool already initialized, keeping it");
    }
    info!(num_threads, "rayon thread pool");
    num_threads
}

/// Read `SUPER6_PORT` (default 9000).
pub fn server_port() -> u16 {
    std::env::var("SUPER6_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(9000)
}

/// Read `SUPER6_STICKS` (default [`DEFAULT_SERVER_STICKS`]).
pub fn server_sticks() -> u32 {
    std::env::var("SUPER6_STICKS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SERVER_STICKS)
}
