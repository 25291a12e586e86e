//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Each kind names the stage that
//! failed; the underlying crate's error is kept as the child in the tree.

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Listing runs or artifacts failed.
    #[display("could not list artifacts")]
    Listing,
    /// Downloading an artifact archive failed.
    #[display("could not download artifact {_0}")]
    Download(#[error(not(source))] String),
    /// The artifact name does not yield `<runID>_<os>_<go>`.
    #[display("artifact name cannot be tagged: {_0}")]
    InvalidName(#[error(not(source))] String),
    /// The archive is unreadable or lacks the results database.
    #[display("could not unpack artifact {_0}")]
    Archive(#[error(not(source))] String),
    /// Reading or writing the cache directory failed.
    #[display("cache storage error")]
    Storage,
    #[display("could not tag artifact {_0}")]
    Tagging(#[error(not(source))] String),
    #[display("could not merge artifacts")]
    Merge,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
