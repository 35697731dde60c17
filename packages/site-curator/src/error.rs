//! Typed errors for the curation engine.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can match
//! on the failure class: fetch failures downgrade to "not a product page",
//! search rate limits downgrade to "no results", oracle failures fail the
//! row that triggered them.

use thiserror::Error;

/// Errors that abort the evaluation of a single dataset row.
#[derive(Debug, Error)]
pub enum CuratorError {
    /// Oracle call failed after retries (or failed fatally)
    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),

    /// Response cache could not be read or written
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// Dataset or audit file operation failed
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),
}

/// Errors raised while fetching a page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed (connection, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Server answered with a non-success status
    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    /// Connection timeout
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Fetched page had no usable body
    #[error("empty page: {url}")]
    Empty { url: String },

    /// Reading or writing the page cache failed
    #[error("page cache error: {0}")]
    Cache(#[from] CacheError),
}

/// Errors raised by an oracle backend.
///
/// The variant decides how the oracle client reacts: transient failures are
/// retried with backoff, context overflows are truncated and retried once,
/// fatal failures are surfaced immediately.
#[derive(Debug, Error)]
pub enum OracleError {
    /// Network error, rate limit, 5xx, malformed body
    #[error("transient oracle failure: {0}")]
    Transient(String),

    /// Prompt exceeds the model context window
    #[error("prompt exceeds the oracle context window")]
    ContextOverflow,

    /// Failure that retrying cannot fix (bad credentials, invalid request)
    #[error("fatal oracle failure: {0}")]
    Fatal(String),

    /// Retries exhausted
    #[error("oracle failed after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: String },

    /// Configuration error (missing API key)
    #[error("oracle config error: {0}")]
    Config(String),
}

/// Errors raised by a search provider.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Provider signalled rate limiting or quota exhaustion
    #[error("search rate limited (HTTP {status})")]
    RateLimited { status: u16 },

    /// Provider returned an error response
    #[error("search API error: {0}")]
    Api(String),

    /// HTTP request failed
    #[error("search HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Configuration error (missing API key or engine id)
    #[error("search config error: {0}")]
    Config(String),
}

/// Errors raised by a response cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Filesystem operation failed
    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Cached value could not be (de)serialized
    #[error("cache JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while reading or writing dataset files.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Filesystem operation failed
    #[error("dataset I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV parse or write failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// No versioned dataset file exists where one was expected
    #[error("no dataset found at {path}")]
    Missing { path: String },
}

impl CacheError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

impl DatasetError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, CuratorError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for oracle operations.
pub type OracleResult<T> = std::result::Result<T, OracleError>;

/// Result type alias for search operations.
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Result type alias for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Result type alias for dataset operations.
pub type DatasetResult<T> = std::result::Result<T, DatasetError>;
