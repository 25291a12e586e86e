//! Cache entry models.

use std::path::PathBuf;
use time::OffsetDateTime;

/// Where a cache key currently is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryState {
    /// Nothing on disk for this key.
    Missing,
    /// Bytes were staged but never committed (download succeeded, the
    /// process stopped before tagging finished). Treated as a cache miss.
    Fetched,
    /// The entry is committed: downloaded, unpacked and tagged.
    Tagged,
}
impl EntryState {
    /// Only committed entries count as cache hits.
    #[must_use]
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Tagged)
    }
}

/// A committed file in the cache directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// File name inside the cache directory
    pub key: String,
    /// Absolute path of the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modified timestamp
    pub modified: OffsetDateTime,
}
