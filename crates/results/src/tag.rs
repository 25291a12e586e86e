//! Run metadata tagging.

use crate::db::{Database, TABLE};
use crate::error::{ErrorKind, Result};
use exn::OptionExt;
use std::path::Path;
use tracing::instrument;

pub const WORKFLOW_ID_COLUMN: &str = "WorkflowID";
pub const OS_COLUMN: &str = "OS";
pub const GO_COLUMN: &str = "Go";

/// Run-identifying values written into every row of a results table.
///
/// Parsed from the cache file name, `<runID>_<os>_<go>`. Anything after the
/// third `_`-separated segment (artifact names containing underscores) is
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunMetadata {
    pub workflow_id: String,
    pub os: String,
    pub go: String,
}
impl RunMetadata {
    /// Parse a cache key. Returns `None` with fewer than three segments.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let mut parts = key.split('_');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(workflow_id), Some(os), Some(go)) => Some(Self {
                workflow_id: workflow_id.to_string(),
                os: os.to_string(),
                go: go.to_string(),
            }),
            _ => None,
        }
    }

    /// Parse the base name of `path`.
    pub fn from_path(path: &Path) -> Result<Self> {
        path.file_name()
            .and_then(|name| name.to_str())
            .and_then(Self::from_key)
            .ok_or_raise(|| ErrorKind::InvalidName(path.to_path_buf()))
    }

    fn columns(&self) -> [(&'static str, &str); 3] {
        [
            (WORKFLOW_ID_COLUMN, &self.workflow_id),
            (OS_COLUMN, &self.os),
            (GO_COLUMN, &self.go),
        ]
    }
}

/// Tag the results table of the database at `path` with the run metadata
/// parsed from its file name.
///
/// The file name is parsed before the database is opened: an unparseable
/// name fails with [`InvalidName`](ErrorKind::InvalidName) and leaves the
/// file untouched.
///
/// Tagging is not repeatable. Running it twice on the same file fails with
/// [`Tagging`](ErrorKind::Tagging) because the columns already exist.
pub async fn tag(path: impl AsRef<Path>) -> Result<RunMetadata> {
    let path = path.as_ref();
    let metadata = RunMetadata::from_path(path)?;
    let mut db = Database::open(path).await?;
    let result = db.tag(&metadata).await;
    db.close().await;
    result.map(|()| metadata)
}

impl Database {
    /// Add the three metadata columns and set them on every row.
    ///
    /// All six statements are attempted even if some fail. Failures are
    /// collected into a single [`Tagging`](ErrorKind::Tagging) error.
    #[instrument(skip(self), fields(path = %self.path().display()))]
    pub async fn tag(&mut self, metadata: &RunMetadata) -> Result<()> {
        let mut failures = Vec::new();
        for (column, _) in metadata.columns() {
            let statement = format!("ALTER TABLE {TABLE} ADD COLUMN {column} TEXT");
            if let Err(e) = sqlx::query(&statement).execute(self.connection()).await {
                tracing::warn!(column, error = %e, "Failed to add metadata column");
                failures.push(format!("add column {column}: {e}"));
            }
        }
        for (column, value) in metadata.columns() {
            let statement = format!("UPDATE {TABLE} SET {column} = ?");
            match sqlx::query(&statement).bind(value).execute(self.connection()).await {
                Ok(done) => tracing::debug!(column, value, rows = done.rows_affected(), "Tagged rows"),
                Err(e) => {
                    tracing::warn!(column, error = %e, "Failed to set metadata column");
                    failures.push(format!("set {column}: {e}"));
                },
            }
        }
        if !failures.is_empty() {
            exn::bail!(ErrorKind::Tagging(self.path().to_path_buf(), failures));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{columns, fixture};
    use rstest::rstest;

    #[rstest]
    #[case("100_ubuntu_go1.21", "100", "ubuntu", "go1.21")]
    #[case("101_windows_go1.22", "101", "windows", "go1.22")]
    #[case("102_macos_go1.21_race_extra", "102", "macos", "go1.21")]
    #[case("7__", "7", "", "")]
    fn test_from_key(#[case] key: &str, #[case] workflow_id: &str, #[case] os: &str, #[case] go: &str) {
        let metadata = RunMetadata::from_key(key).unwrap();
        assert_eq!(metadata.workflow_id, workflow_id);
        assert_eq!(metadata.os, os);
        assert_eq!(metadata.go, go);
    }

    #[rstest]
    #[case("")]
    #[case("100")]
    #[case("100_ubuntu")]
    #[case("merged.db")]
    fn test_from_key_too_few_segments(#[case] key: &str) {
        assert_eq!(RunMetadata::from_key(key), None);
    }

    #[test]
    fn test_from_path_uses_base_name() {
        let metadata = RunMetadata::from_path(Path::new("/cache/under_scored/100_ubuntu_go1.21")).unwrap();
        assert_eq!(metadata.workflow_id, "100");
        let err = RunMetadata::from_path(Path::new("/cache/1_2_3/short_name")).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidName(_)));
    }

    #[tokio::test]
    async fn test_tag_every_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture::source(dir.path(), "100_ubuntu_go1.21", 4).await;
        let metadata = tag(&path).await.unwrap();
        assert_eq!(metadata, RunMetadata::from_key("100_ubuntu_go1.21").unwrap());

        assert!(columns(&path).await.unwrap().ends_with(&[
            WORKFLOW_ID_COLUMN.to_string(),
            OS_COLUMN.to_string(),
            GO_COLUMN.to_string()
        ]));
        let mut db = Database::open(&path).await.unwrap();
        let distinct: Vec<(Option<String>, Option<String>, Option<String>)> =
            sqlx::query_as("SELECT DISTINCT WorkflowID, OS, Go FROM test_results")
                .fetch_all(db.connection())
                .await
                .unwrap();
        assert_eq!(
            distinct,
            [(Some("100".to_string()), Some("ubuntu".to_string()), Some("go1.21".to_string()))]
        );
        assert_eq!(db.count().await.unwrap(), 4);
        db.close().await;
    }

    #[tokio::test]
    async fn test_tag_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture::source(dir.path(), "102_macos_go1.21", 0).await;
        tag(&path).await.unwrap();
        assert_eq!(columns(&path).await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_invalid_name_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture::source(dir.path(), "100_ubuntu", 2).await;
        let before = std::fs::read(&path).unwrap();

        let err = tag(&path).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidName(p) if *p == path));
        assert!(err.to_string().contains("100_ubuntu"));
        assert_eq!(std::fs::read(&path).unwrap(), before);
        assert_eq!(columns(&path).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_tagging_twice_aggregates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture::source(dir.path(), "100_ubuntu_go1.21", 2).await;
        tag(&path).await.unwrap();

        let err = tag(&path).await.unwrap_err();
        let ErrorKind::Tagging(failed, failures) = &*err else {
            panic!("expected a tagging error, got {err:?}");
        };
        assert_eq!(*failed, path);
        // The three ALTER TABLEs fail, the three UPDATEs are still attempted
        // and succeed.
        assert_eq!(failures.len(), 3);
        assert!(failures.iter().all(|f| f.starts_with("add column")));
        assert_eq!(columns(&path).await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_missing_table_fails_every_statement() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture::source_with(dir.path(), "100_ubuntu_go1.21", "CREATE TABLE other (x TEXT)", 0).await;
        let err = tag(&path).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Tagging(_, failures) if failures.len() == 6));
    }
}
