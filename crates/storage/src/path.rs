//! Cache key validation.
//!
//! Cache keys are built from artifact names returned by the remote API and
//! used verbatim as file names, so they must never be able to point outside
//! the cache directory.

use std::path::{Component, Path};

use crate::error::{ErrorKind, Result};

/// Validates that a cache key is a single, plain file name.
///
/// Rejects empty keys, anything containing a path separator or parent
/// traversal, NUL bytes, and names starting with `.` (the staging directory
/// and other hidden files are reserved).
///
/// # Examples
///
/// ```
/// use tally_storage::validate_key;
/// assert!(validate_key("100_ubuntu_go1.21").is_ok());
/// assert!(validate_key("../etc/passwd").is_err());
/// assert!(validate_key("a/b").is_err());
/// assert!(validate_key(".staging").is_err());
/// ```
pub fn validate_key(key: &str) -> Result<&str> {
    if key.is_empty() || key.starts_with('.') || key.contains('\0') {
        exn::bail!(ErrorKind::InvalidKey(key.to_string()));
    }
    let mut components = Path::new(key).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == key => Ok(key),
        _ => exn::bail!(ErrorKind::InvalidKey(key.to_string())),
    }
}
