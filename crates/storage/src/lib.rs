//! Cache directory for downloaded result databases.
//!
//! Every artifact that has been downloaded, unpacked and tagged lives in the
//! store as one file named by its cache key (`<runID>_<artifactName>`). The
//! store is the only persisted state of the tool: entries are never
//! invalidated, only removed explicitly through [`LocalStore::remove`] or
//! [`LocalStore::reset`].
//!
//! Entries are written in two phases. Bytes are first *staged* into a hidden
//! staging directory, where the caller is free to mutate them (tagging), and
//! are then *committed* into place with a rename. A committed file is
//! therefore always complete.

pub mod error;
mod models;
mod path;
mod store;

pub use crate::models::{CacheEntry, EntryState};
pub use crate::path::validate_key;
pub use crate::store::LocalStore;
