use crate::cache::{ArtifactCache, ResolveEffort, Resolved};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::Path;
use tally_github::ArtifactSource;
use tally_results::{MergeSummary, Merger};
use tracing::instrument;

/// List, resolve and merge, strictly one step at a time.
pub struct Pipeline {
    source: ArtifactSource,
    cache: ArtifactCache,
    merger: Merger,
}

impl Pipeline {
    pub fn new(source: ArtifactSource, cache: ArtifactCache, merger: Merger) -> Self {
        Self { source, cache, merger }
    }

    /// Resolve every artifact of every listed run.
    ///
    /// The result follows listing order: runs as the API returned them, and
    /// each run's artifacts in order within it. The first entry is the merge
    /// seed.
    #[instrument(skip_all)]
    pub async fn collect(&self) -> Result<Vec<Resolved>> {
        let runs = self.source.runs().await.or_raise(|| ErrorKind::Listing)?;
        let mut resolved = Vec::new();
        for run in &runs {
            let artifacts = self.source.artifacts(run).await.or_raise(|| ErrorKind::Listing)?;
            for artifact in &artifacts {
                resolved.push(self.cache.resolve(artifact).await?);
            }
        }
        let downloaded = resolved.iter().filter(|r| r.effort == ResolveEffort::Downloaded).count();
        tracing::info!(
            runs = runs.len(),
            artifacts = resolved.len(),
            downloaded,
            cached = resolved.len() - downloaded,
            "Collected artifacts"
        );
        Ok(resolved)
    }

    /// Collect every artifact and merge them into `destination`.
    pub async fn run(&self, destination: &Path) -> Result<MergeSummary> {
        let resolved = self.collect().await?;
        let sources: Vec<_> = resolved.iter().map(|r| r.path.as_path()).collect();
        self.merger.merge(&sources, destination).await.or_raise(|| ErrorKind::Merge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture;
    use std::sync::Arc;
    use tally_github::MockFetch;
    use tally_results::Database;
    use tally_storage::LocalStore;

    const RUNS_URL: &str = "/repos/o/r/actions/workflows/go-test.yml/runs?branch=master";

    fn runs_json(ids: &[u64]) -> String {
        let runs: Vec<String> = ids
            .iter()
            .map(|id| format!(r#"{{"id": {id}, "artifacts_url": "https://api.github.com/runs/{id}/artifacts"}}"#))
            .collect();
        format!(r#"{{"total_count": {}, "workflow_runs": [{}]}}"#, ids.len(), runs.join(","))
    }

    fn artifacts_json(run: u64, names: &[&str]) -> String {
        let artifacts: Vec<String> = names
            .iter()
            .map(|name| {
                format!(
                    r#"{{"id": 1, "name": "{name}", "archive_download_url": "https://api.github.com/zip/{run}_{name}"}}"#
                )
            })
            .collect();
        format!(r#"{{"artifacts": [{}]}}"#, artifacts.join(","))
    }

    /// Runs 100, 101 and 102 with one artifact each, holding 2, 3 and 0 rows.
    async fn fetch(scratch: &Path) -> Arc<MockFetch> {
        let fetch = MockFetch::with_responses([(RUNS_URL.to_string(), runs_json(&[100, 101, 102]).into_bytes())]);
        for (run, name, rows) in [(100, "ubuntu_go1.21", 2), (101, "windows_go1.22", 3), (102, "macos_go1.21", 0)] {
            fetch.insert(format!("https://api.github.com/runs/{run}/artifacts"), artifacts_json(run, &[name]));
            fetch.insert(
                format!("https://api.github.com/zip/{run}_{name}"),
                fixture::artifact(scratch, &format!("{run}_{name}"), rows).await,
            );
        }
        Arc::new(fetch)
    }

    fn pipeline(fetch: Arc<MockFetch>, root: &Path) -> Pipeline {
        let source = ArtifactSource::new(fetch.clone(), "o/r", "go-test.yml", "master");
        let cache = ArtifactCache::new(LocalStore::new(root).unwrap(), fetch);
        Pipeline::new(source, cache, Merger::default())
    }

    #[tokio::test]
    async fn test_end_to_end() {
        let scratch = tempfile::tempdir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("artifacts");
        let pipeline = pipeline(fetch(scratch.path()).await, &root);

        let destination = root.join("merged.db");
        let summary = pipeline.run(&destination).await.unwrap();
        assert_eq!(summary.sources, 3);
        assert_eq!(summary.rows, 5);

        let mut db = Database::open(&destination).await.unwrap();
        let rows: Vec<(String, String, String)> =
            sqlx::query_as("SELECT WorkflowID, OS, Go FROM test_results ORDER BY rowid")
                .fetch_all(db.connection())
                .await
                .unwrap();
        let workflows: Vec<_> = rows.iter().map(|(id, _, _)| id.as_str()).collect();
        assert_eq!(workflows, ["100", "100", "101", "101", "101"]);
        assert_eq!(rows[2], ("101".to_string(), "windows".to_string(), "go1.22".to_string()));
        db.close().await;
    }

    #[tokio::test]
    async fn test_second_run_uses_cache() {
        let scratch = tempfile::tempdir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let fetch = fetch(scratch.path()).await;
        let pipeline = pipeline(fetch.clone(), dir.path());

        let first = pipeline.collect().await.unwrap();
        assert!(first.iter().all(|r| r.effort == ResolveEffort::Downloaded));
        let second = pipeline.collect().await.unwrap();
        assert!(second.iter().all(|r| r.effort == ResolveEffort::Cached));
        assert_eq!(fetch.call_count("https://api.github.com/zip/100_ubuntu_go1.21"), 1);
        // Listings are always fetched.
        assert_eq!(fetch.call_count(RUNS_URL), 2);
    }

    #[tokio::test]
    async fn test_no_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let fetch = Arc::new(MockFetch::with_responses([(RUNS_URL, runs_json(&[]))]));
        let pipeline = pipeline(fetch, dir.path());
        let destination = dir.path().join("merged.db");

        let err = pipeline.run(&destination).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Merge));
        assert!(!destination.exists());
    }

    #[tokio::test]
    async fn test_listing_failure() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(Arc::new(MockFetch::default()), dir.path());
        let err = pipeline.collect().await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Listing));
    }
}
