//! GitHub Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A GitHub error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for GitHub operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The HTTP client could not be constructed.
    #[display("failed to build HTTP client")]
    Client,
    /// The request never produced a response (DNS, TLS, connection, body).
    #[display("request failed: {_0}")]
    Network(#[error(not(source))] String),
    /// The API answered with a non-success status code.
    #[display("HTTP {_0} from {_1}")]
    Status(#[error(not(source))] u16, #[error(not(source))] String),
    /// The response body did not have the expected shape.
    #[display("unexpected response from {_0}")]
    InvalidResponse(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// Every failure is treated as permanent: the run aborts.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(
            ErrorKind::Status(401, "https://api.github.com/repos".to_string()).to_string(),
            "HTTP 401 from https://api.github.com/repos"
        );
        assert!(!ErrorKind::Network("x".to_string()).is_retryable());
    }
}
