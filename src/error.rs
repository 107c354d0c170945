use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

/// Failures that end a whole run
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Usage(#[from] clap::Error),

    #[error("Invalid filename: '{}'", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to read log file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to write output file '{}': {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("{failed} of {total} queries failed")]
    QueriesFailed { failed: usize, total: usize },
}

impl AppError {
    /// Process exit status for this failure
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Usage(e) if !e.use_stderr() => 0,
            AppError::Usage(_) => 1,
            AppError::FileNotFound(_) => 2,
            AppError::QueriesFailed { .. } => 3,
            AppError::Io { .. }
            | AppError::Config(_)
            | AppError::Output { .. }
            | AppError::Serialize(_) => 4,
        }
    }
}
