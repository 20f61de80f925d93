//! Report output error types.

use std::path::PathBuf;

use thiserror::Error;

/// A report file that could not be written.
#[derive(Debug, Error)]
#[error("failed to write {}: {source}", path.display())]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

impl WriteError {
    pub(crate) fn new(path: impl Into<PathBuf>, source: impl Into<std::io::Error>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// A report file that could not be read back.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid report file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The dashboard template failed to render.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] askama::Error),

    #[error("chart data serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
