//! Archive Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An archive error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Archive is corrupt or truncated. Don't retry with the same input.
    #[display("invalid or corrupted archive")]
    InvalidData,
    /// The bytes are not in any supported container format.
    #[display("unsupported archive format")]
    UnsupportedFormat,
    /// The archive is readable but has no entry with the requested name.
    #[display("archive has no entry named {_0:?}")]
    EntryNotFound(#[error(not(source))] String),
    /// Reading the entry's contents failed.
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
