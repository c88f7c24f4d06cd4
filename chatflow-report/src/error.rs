//! Error types for chatflow-report.

use std::path::PathBuf;

use thiserror::Error;

use chatflow_core::NotFound;

/// All errors that can arise while building or rendering a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// JSON serialization error (building tera context).
    #[error("context serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error while loading user templates.
    #[error("template io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The report subject does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFound),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ReportError {
    ReportError::Io { path: path.into(), source }
}
