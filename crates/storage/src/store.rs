//! Local filesystem cache store.
//!
//! Files are stored flat in one directory, named by their cache key, and
//! accessed through `tokio::fs`.

use crate::error::{ErrorKind, Result};
use crate::models::{CacheEntry, EntryState};
use crate::path::validate_key;
use std::fs::{Metadata, create_dir_all as sync_create_dir};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Hidden subdirectory holding entries that are not committed yet.
const STAGING_DIR: &str = ".staging";

/// Cache directory on the local filesystem.
///
/// # Examples
///
/// ```no_run
/// use tally_storage::LocalStore;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = LocalStore::new("artifacts")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LocalStore {
    /// Absolute path of the cache directory
    root: PathBuf,
}
impl LocalStore {
    /// Open the cache directory, creating it if it does not exist.
    ///
    /// Relative roots are resolved against the current working directory
    /// once, here, so later changes of directory don't move the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the path exists but is not a directory, or if it
    /// cannot be created.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let root = std::path::absolute(root).map_err(|e| ErrorKind::from_io(e, root))?;
        if root.exists() {
            if !root.is_dir() {
                exn::bail!(ErrorKind::InvalidRoot(root));
            }
        } else {
            // Use non-async here; it only happens once per process and it's
            // not worth making the constructor async.
            sync_create_dir(&root).map_err(|e| ErrorKind::from_io(e, &root))?;
            tracing::debug!(root = %root.display(), "Created cache directory");
        }
        Ok(Self { root })
    }

    /// The cache directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the committed entry for `key` (whether or not it exists).
    pub fn path(&self, key: &str) -> Result<PathBuf> {
        Ok(self.root.join(validate_key(key)?))
    }

    /// Path of the staged entry for `key`.
    ///
    /// The file name is identical to the committed one; only the directory
    /// differs. Anything that parses the file name (tagging) sees the same
    /// value in both phases.
    pub fn staging_path(&self, key: &str) -> Result<PathBuf> {
        Ok(self.root.join(STAGING_DIR).join(validate_key(key)?))
    }

    /// Check if a committed entry exists.
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.path(key)?;
        Ok(fs::try_exists(&path).await.map_err(|e| ErrorKind::from_io(e, &path))?)
    }

    /// Where `key` is in its lifecycle.
    pub async fn state(&self, key: &str) -> Result<EntryState> {
        if self.exists(key).await? {
            return Ok(EntryState::Tagged);
        }
        let staged = self.staging_path(key)?;
        match fs::try_exists(&staged).await.map_err(|e| ErrorKind::from_io(e, &staged))? {
            true => Ok(EntryState::Fetched),
            false => Ok(EntryState::Missing),
        }
    }

    /// Write `data` as the staged entry for `key`, replacing any leftover
    /// from an earlier interrupted run.
    pub async fn stage(&self, key: &str, data: &[u8]) -> Result<PathBuf> {
        let path = self.staging_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| ErrorKind::from_io(e, parent))?;
        }
        fs::write(&path, data).await.map_err(|e| ErrorKind::from_io(e, &path))?;
        tracing::debug!(key, size = data.len(), "Staged cache entry");
        Ok(path)
    }

    /// Move the staged entry for `key` into place.
    ///
    /// Returns [`NotFound`](ErrorKind::NotFound) if nothing was staged.
    pub async fn commit(&self, key: &str) -> Result<PathBuf> {
        let from = self.staging_path(key)?;
        let to = self.path(key)?;
        fs::rename(&from, &to).await.map_err(|e| ErrorKind::from_io(e, &from))?;
        tracing::debug!(key, path = %to.display(), "Committed cache entry");
        Ok(to)
    }

    /// Delete the committed entry for `key`.
    ///
    /// Returns [`NotFound`](ErrorKind::NotFound) if the entry does not exist.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path(key)?;
        Ok(fs::remove_file(&path).await.map_err(|e| ErrorKind::from_io(e, &path))?)
    }

    /// List committed entries, sorted by key.
    ///
    /// Hidden files and subdirectories (including staging) are skipped.
    pub async fn list(&self) -> Result<Vec<CacheEntry>> {
        let mut entries = fs::read_dir(&self.root).await.map_err(|e| ErrorKind::from_io(e, &self.root))?;
        let mut listed = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| ErrorKind::from_io(e, &self.root))? {
            let path = entry.path();
            let Some(key) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if validate_key(&key).is_err() {
                continue;
            }
            let metadata = entry.metadata().await.map_err(|e| ErrorKind::from_io(e, &path))?;
            if !metadata.is_file() {
                continue;
            }
            listed.push(Self::entry(key, path, metadata)?);
        }
        listed.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(listed)
    }

    /// Remove every committed entry and everything staged.
    ///
    /// Returns the number of committed entries removed. The directory itself
    /// is kept, so the store stays usable afterwards.
    pub async fn reset(&self) -> Result<usize> {
        let entries = self.list().await?;
        for entry in &entries {
            fs::remove_file(&entry.path).await.map_err(|e| ErrorKind::from_io(e, &entry.path))?;
        }
        let staging = self.root.join(STAGING_DIR);
        match fs::remove_dir_all(&staging).await {
            Ok(()) => {},
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
            Err(e) => exn::bail!(ErrorKind::from_io(e, &staging)),
        }
        tracing::info!(root = %self.root.display(), removed = entries.len(), "Cache directory reset");
        Ok(entries.len())
    }

    fn entry(key: String, path: PathBuf, metadata: Metadata) -> Result<CacheEntry> {
        let modified = metadata.modified().map_err(ErrorKind::Io)?.into();
        Ok(CacheEntry { key, path, size: metadata.len(), modified })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, LocalStore) {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(temp_dir.path().join("artifacts")).unwrap();
        (temp_dir, store)
    }

    #[test]
    fn test_new_creates_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("a/b/artifacts");
        assert!(!root.exists());
        let store = LocalStore::new(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(store.root(), root);
        // Opening an existing directory is fine too.
        assert!(LocalStore::new(&root).is_ok());
    }

    #[test]
    fn test_new_rejects_file_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("not-a-dir");
        std::fs::write(&file, b"data").unwrap();
        let err = LocalStore::new(&file).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidRoot(_)));
    }

    #[test]
    fn test_paths_share_file_name() {
        let (_dir, store) = store();
        let committed = store.path("100_ubuntu_go1.21").unwrap();
        let staged = store.staging_path("100_ubuntu_go1.21").unwrap();
        assert_eq!(committed.file_name(), staged.file_name());
        assert_ne!(committed, staged);
        assert!(store.path("../escape").is_err());
    }

    #[tokio::test]
    async fn test_two_phase_lifecycle() {
        let (_dir, store) = store();
        let key = "100_ubuntu_go1.21";
        assert_eq!(store.state(key).await.unwrap(), EntryState::Missing);

        let staged = store.stage(key, b"db bytes").await.unwrap();
        assert!(staged.exists());
        assert_eq!(store.state(key).await.unwrap(), EntryState::Fetched);
        assert!(!store.exists(key).await.unwrap());

        let committed = store.commit(key).await.unwrap();
        assert_eq!(committed, store.path(key).unwrap());
        assert_eq!(store.state(key).await.unwrap(), EntryState::Tagged);
        assert!(!staged.exists());
        assert_eq!(std::fs::read(committed).unwrap(), b"db bytes");
    }

    #[tokio::test]
    async fn test_stage_overwrites_leftover() {
        let (_dir, store) = store();
        store.stage("1_a_b", b"half-written").await.unwrap();
        let path = store.stage("1_a_b", b"complete").await.unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"complete");
    }

    #[tokio::test]
    async fn test_commit_without_stage() {
        let (_dir, store) = store();
        let err = store.commit("1_a_b").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_skips_staging_and_hidden() {
        let (_dir, store) = store();
        store.stage("2_b_c", b"two").await.unwrap();
        store.commit("2_b_c").await.unwrap();
        store.stage("1_a_b", b"one").await.unwrap();
        store.commit("1_a_b").await.unwrap();
        store.stage("3_c_d", b"staged only").await.unwrap();
        std::fs::write(store.root().join(".hidden"), b"x").unwrap();

        let listed = store.list().await.unwrap();
        let keys: Vec<_> = listed.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, ["1_a_b", "2_b_c"]);
        assert_eq!(listed[0].size, 3);
        assert_eq!(listed[0].path, store.path("1_a_b").unwrap());
    }

    #[tokio::test]
    async fn test_remove() {
        let (_dir, store) = store();
        store.stage("1_a_b", b"one").await.unwrap();
        store.commit("1_a_b").await.unwrap();
        store.remove("1_a_b").await.unwrap();
        assert!(!store.exists("1_a_b").await.unwrap());
        let err = store.remove("1_a_b").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_reset() {
        let (_dir, store) = store();
        for key in ["1_a_b", "2_b_c"] {
            store.stage(key, b"data").await.unwrap();
            store.commit(key).await.unwrap();
        }
        store.stage("3_c_d", b"staged").await.unwrap();

        assert_eq!(store.reset().await.unwrap(), 2);
        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(store.state("3_c_d").await.unwrap(), EntryState::Missing);
        assert!(store.root().is_dir());
        // Resetting an empty store is a no-op.
        assert_eq!(store.reset().await.unwrap(), 0);
    }
}
