use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building, sending or recording a request.
#[derive(Error, Debug)]
pub enum RhttpError {
    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error while writing or loading a history record.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error for malformed URLs.
    #[error("Error parsing URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// A file name pattern failed to compile.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Invalid or missing command line arguments.
    #[error("{0}")]
    InvalidArgs(String),

    /// The history lookup returned nothing at all.
    #[error("No history records found.")]
    NoHistoryRecords,

    /// The history lookup landed on a different record than requested.
    #[error("Invalid history record index: {0}")]
    InvalidHistoryIndex(String),

    /// Transport failure (connection refused, DNS, timeout).
    #[error("Error sending request: {0}")]
    Http(String),

    /// Unreadable or malformed configuration file.
    #[error("Config error: {0}")]
    Config(String),

    /// Fewer bytes reached the file than were handed to it.
    #[error("Not all data written to {}: wrote {written} of {expected} bytes", path.display())]
    PartialWrite {
        path: PathBuf,
        written: usize,
        expected: usize,
    },
}

/// Convenience result type for rhttp operations.
pub type Result<T> = std::result::Result<T, RhttpError>;
