//! Error types for the extraction pipeline.
//!
//! Only [`SetupError`] ever reaches the process boundary. The per-item errors
//! ([`ExtractionError`], [`DownloadError`]) are turned into statistics entries
//! by the driver.

use std::path::PathBuf;

use thiserror::Error;

/// Failure detected before the extraction loop starts.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The identifier range is empty or starts below zero.
    #[error("Invalid range: start {start}, end {end}")]
    InvalidRange { start: i64, end: i64 },

    /// Negative or non-finite delay between items.
    #[error("Invalid delay: {0} seconds")]
    InvalidDelay(f64),

    /// Zero or non-finite network timeout.
    #[error("Invalid timeout: {0} seconds")]
    InvalidTimeout(f64),

    /// No source is registered under this name or alias.
    #[error("Unknown source: {name} (available: {available})")]
    UnknownSource { name: String, available: String },

    /// The output root cannot be created or written to.
    #[error("Output directory {} is not writable: {source}", .path.display())]
    OutputNotWritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[source] reqwest::Error),
}

/// Failure of a single markup/JSON fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Connection, timeout or body decoding failure.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
}

impl FetchError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Request(e) => e.status().map(|s| s.as_u16()),
        }
    }

    /// Whether the server reported that the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Unexpected failure while extracting one item.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The item page or API resource could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A JSON payload could not be decoded.
    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload was readable but not in the expected shape.
    #[error("Malformed response for {identifier}: {reason}")]
    Malformed { identifier: String, reason: String },
}

/// Failure while saving one image.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Connection, timeout or body streaming failure.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Creating, writing or renaming the destination failed.
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DownloadError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for per-item extraction.
pub type Result<T, E = ExtractionError> = std::result::Result<T, E>;
