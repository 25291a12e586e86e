//! Results Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A results error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for results database operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("database error")]
    Database,
    /// The file could not be opened as a SQLite database.
    #[display("cannot open database: {}", _0.display())]
    Open(#[error(not(source))] PathBuf),
    /// The database has no `test_results` table (or it has no columns).
    #[display("no test_results table in {}", _0.display())]
    MissingTable(#[error(not(source))] PathBuf),
    /// The file name does not have the `<runID>_<os>_<go>` shape.
    #[display("invalid results file name: {}", _0.display())]
    InvalidName(#[error(not(source))] PathBuf),
    /// One or more tagging statements failed. Every statement is attempted;
    /// this carries the failure of each one that did not succeed.
    #[display("tagging {} failed: {}", _0.display(), _1.join("; "))]
    Tagging(#[error(not(source))] PathBuf, #[error(not(source))] Vec<String>),
    /// A merge was requested with nothing to merge.
    #[display("no artifacts to merge")]
    NoSources,
    /// Copying the rows of one source into the destination failed; none of
    /// that source's rows were kept.
    #[display("merging {} failed", _0.display())]
    Merge(#[error(not(source))] PathBuf),
    /// A stored value has a type this crate cannot copy.
    #[display("unsupported value type: {_0}")]
    UnsupportedValue(#[error(not(source))] String),
    #[display("I/O error: {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
