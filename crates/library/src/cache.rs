use crate::error::{ErrorKind, Result};
use derive_more::Display;
use exn::{OptionExt, ResultExt};
use std::path::PathBuf;
use tally_github::{Artifact, FetchHandle};
use tally_results::RunMetadata;
use tally_storage::{EntryState, LocalStore};
use tracing::instrument;

/// Name of the database inside every artifact archive.
pub const RESULTS_ENTRY: &str = "test_results.db";

/// Indicates how much work was required to produce a [`Resolved`] result.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum ResolveEffort {
    /// The tagged database was already in the cache. No network I/O.
    #[display("cached")]
    Cached,
    /// The archive was downloaded, unpacked and tagged.
    #[display("downloaded")]
    Downloaded,
}

/// A tagged results database in the cache directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolved {
    pub key: String,
    pub path: PathBuf,
    pub effort: ResolveEffort,
}

/// Downloads artifacts into a [`LocalStore`], once each.
///
/// An artifact's identity is its cache key (`<runID>_<name>`). A committed
/// entry under that key is trusted as-is: it is never re-downloaded or
/// re-tagged.
#[derive(Clone)]
pub struct ArtifactCache {
    store: LocalStore,
    fetch: FetchHandle,
}

impl ArtifactCache {
    pub fn new(store: LocalStore, fetch: FetchHandle) -> Self {
        Self { store, fetch }
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Make sure the tagged database of `artifact` is in the cache and
    /// return its path.
    ///
    /// On a miss the archive is downloaded, the results database is taken
    /// out of it and staged, tagged in the staging area, then committed.
    /// Anything left staged by an interrupted run is overwritten.
    ///
    /// # Errors
    ///
    /// Every failure is fatal to the caller: download, a missing
    /// [`RESULTS_ENTRY`], an artifact name that cannot be tagged, or any
    /// tagging statement failing.
    #[instrument(skip_all, fields(artifact = %artifact.name, run = artifact.run_id))]
    pub async fn resolve(&self, artifact: &Artifact) -> Result<Resolved> {
        let key = artifact.cache_key();
        let state = self.store.state(&key).await.or_raise(|| ErrorKind::Storage)?;
        if state.is_hit() {
            let path = self.store.path(&key).or_raise(|| ErrorKind::Storage)?;
            tracing::debug!(key = %key, "Cache hit");
            return Ok(Resolved { key, path, effort: ResolveEffort::Cached });
        }
        if state == EntryState::Fetched {
            tracing::info!(key = %key, "Discarding unfinished cache entry");
        }
        // Checked before downloading; tagging would fail on this name anyway.
        RunMetadata::from_key(&key).ok_or_raise(|| ErrorKind::InvalidName(key.clone()))?;

        let archive = self
            .fetch
            .get(&artifact.download_url)
            .await
            .or_raise(|| ErrorKind::Download(key.clone()))?;
        let database = tokio::task::spawn_blocking(move || tally_archive::read_entry(&archive, RESULTS_ENTRY))
            .await
            .or_raise(|| ErrorKind::Archive(key.clone()))?
            .or_raise(|| ErrorKind::Archive(key.clone()))?;

        let staged = self.store.stage(&key, &database).await.or_raise(|| ErrorKind::Storage)?;
        tally_results::tag(&staged).await.or_raise(|| ErrorKind::Tagging(key.clone()))?;
        let path = self.store.commit(&key).await.or_raise(|| ErrorKind::Storage)?;
        tracing::info!(key = %key, size = database.len(), "Downloaded artifact");
        Ok(Resolved { key, path, effort: ResolveEffort::Downloaded })
    }
}
