use chrono::NaiveDate;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Invalid archive URL: {0}")]
    InvalidUrl(String),

    #[error("Network request failed for {0}")]
    Request(String, #[source] reqwest::Error),

    // Server-side failure, the only retried variant.
    #[error("Archive server error {status} for {url}")]
    ServerStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Archive rejected request with status {status} for {url}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Embedded payload marker not found in archive response")]
    MarkerNotFound,

    #[error("Embedded payload is not a parseable object literal")]
    PayloadParse(#[source] json5::Error),

    #[error("Archive response contains no points")]
    NoPoints,

    #[error("Unexpected payload shape: {message}")]
    PayloadShape { message: String },

    #[error("Invalid time offset key '{0}' in payload")]
    BadTimeOffset(String),

    #[error("Variable code '{0}' missing from the parameter catalog")]
    ParamNotInCatalog(String),

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("I/O error writing cache file '{0}'")]
    CacheWriteIo(PathBuf, #[source] std::io::Error),

    #[error("Encoding error writing cache file '{0}'")]
    CacheWritePolars(PathBuf, #[source] PolarsError),

    #[error("Failed to read cache file '{0}'")]
    CacheReadPolars(PathBuf, #[source] PolarsError),

    #[error("Cache file '{path}' has {found} columns, expected {expected}")]
    CacheSchemaMismatch {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("Required column '{0}' not found in observation table")]
    ColumnNotFound(String, #[source] PolarsError),

    #[error("Feature '{0}' not found in observation table")]
    FeatureNotFound(String),

    #[error("No half-hourly observation at slot {slot} on {date}")]
    DataNotFound { date: NaiveDate, slot: usize },

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Failed processing observation table: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}

impl ArchiveError {
    /// Whether the retry policy may re-issue the request after this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, ArchiveError::ServerStatus { .. })
    }
}
