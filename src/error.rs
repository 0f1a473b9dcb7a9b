use crate::record::SourceError;
use std::path::PathBuf;
use thiserror::Error;

/// Terminal failure of a calculation. There is never a partial result.
#[derive(Debug, Error)]
pub enum CalculationError {
    #[error("thread count must be at least 1, got {worker_count}")]
    InvalidConfiguration { worker_count: usize },

    #[error("provided path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("no .{extension} files found in directory: {}", directory.display())]
    NoInputFiles { directory: PathBuf, extension: String },

    #[error("failed to read directory {}: {source}", directory.display())]
    DirectoryRead {
        directory: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to parse file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: SourceError,
    },

    #[error("interrupted while waiting for the worker processing {}", path.display())]
    InterruptedWait { path: PathBuf },
}

impl CalculationError {
    /// File the failure is attributed to, when it concerns a single input file.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            CalculationError::Parse { path, .. } | CalculationError::InterruptedWait { path } => Some(path),
            _ => None,
        }
    }
}
