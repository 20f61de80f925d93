//! News fetching error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the search collaborator.
#[derive(Debug, Error)]
pub enum SearchError {
    /// HTTP transport error (connection, timeout, body decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Search API returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the API.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// The daily query quota is exhausted.
    #[error("search quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The API returned a 429 Too Many Requests response.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Failed to parse a search response.
    #[error("parse error: {0}")]
    Parse(String),

    /// The query itself was rejected before sending.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

/// A single keyword query that could not be fetched.
#[derive(Debug, Error)]
#[error("fetch failed for query {query}: {source}")]
pub struct FetchError {
    pub query: String,
    #[source]
    pub source: SearchError,
}

/// Errors from an article cache backend.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A cache file exists but cannot be decoded.
    #[error("corrupt cache file {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cache serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
