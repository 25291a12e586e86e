//! Workflow run and artifact listings.

use crate::FetchHandle;
use crate::error::{ErrorKind, Result};
use crate::models::{Artifact, ArtifactsPage, WorkflowRun, WorkflowRunsPage};
use exn::ResultExt;
use serde::de::DeserializeOwned;
use tracing::instrument;

/// Lists the runs of one workflow on one branch, and their artifacts.
///
/// Listing order is whatever the API returns (most recent run first, in
/// practice); no pagination is performed, so only the first page of runs
/// is considered.
#[derive(Clone)]
pub struct ArtifactSource {
    fetch: FetchHandle,
    repository: String,
    workflow: String,
    branch: String,
}
impl ArtifactSource {
    /// `repository` is `<owner>/<repo>`; `workflow` is the workflow file name
    /// (e.g. `go-test.yml`).
    pub fn new(
        fetch: FetchHandle,
        repository: impl Into<String>,
        workflow: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            fetch,
            repository: repository.into(),
            workflow: workflow.into(),
            branch: branch.into(),
        }
    }

    /// API-relative path of the workflow runs listing.
    pub fn runs_path(&self) -> String {
        format!(
            "/repos/{}/actions/workflows/{}/runs?branch={}",
            self.repository, self.workflow, self.branch
        )
    }

    /// List the workflow's runs on the configured branch.
    #[instrument(skip(self), fields(repository = %self.repository, workflow = %self.workflow, branch = %self.branch))]
    pub async fn runs(&self) -> Result<Vec<WorkflowRun>> {
        let path = self.runs_path();
        let page: WorkflowRunsPage = self.get_json(&path).await?;
        tracing::info!(runs = page.workflow_runs.len(), "Listed workflow runs");
        Ok(page.workflow_runs)
    }

    /// List the artifacts produced by one run.
    #[instrument(skip(self, run), fields(run = run.id))]
    pub async fn artifacts(&self, run: &WorkflowRun) -> Result<Vec<Artifact>> {
        let page: ArtifactsPage = self.get_json(&run.artifacts_url).await?;
        let artifacts: Vec<_> = page.artifacts.into_iter().map(|row| Artifact::from_row(row, run.id)).collect();
        tracing::debug!(artifacts = artifacts.len(), "Listed run artifacts");
        Ok(artifacts)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.fetch.get(url).await?;
        serde_json::from_slice(&body).or_raise(|| ErrorKind::InvalidResponse(url.to_string()))
    }
}
