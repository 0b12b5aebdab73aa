//! Error types for the Super Six solver.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Configuration;

/// Main error type for the crate.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid total {total}: a game needs at least one stick")]
    InvalidInput { total: u32 },

    #[error("transition target {configuration:?} is neither terminal nor in the state index")]
    LookupFailure { configuration: Configuration },

    #[error("value iteration did not converge after {iterations} sweeps (delta = {delta:e})")]
    NonConvergence { iterations: usize, delta: f64 },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("invalid state file '{}': {reason}", path.display())]
    InvalidStateFile { path: PathBuf, reason: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Convenience type alias for Results using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap an I/O error with the operation that failed.
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            operation: operation.into(),
            source,
        }
    }
}
