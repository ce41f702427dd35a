//! Error types for the CLI runtime.

use std::io;
use std::path::PathBuf;

use remold_rewrite::RewriteError;
use thiserror::Error;
use tracing::subscriber::SetGlobalDefaultError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("invalid log filter: {0}")]
    LogFilter(String),
    #[error("failed to install telemetry subscriber: {0}")]
    Telemetry(#[from] SetGlobalDefaultError),
    #[error("failed to traverse {}: {source}", path.display())]
    Traverse {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("{} is neither a file nor a directory", path.display())]
    UnsupportedPath { path: PathBuf },
    #[error("failed to read {}: {source}", path.display())]
    ReadSource { path: PathBuf, source: io::Error },
    #[error("failed to migrate {}: {source}", path.display())]
    Migrate {
        path: PathBuf,
        source: RewriteError,
    },
    #[error("failed to write {}: {source}", path.display())]
    WriteOutput { path: PathBuf, source: io::Error },
}
