//! API response models.
//!
//! Only the fields this tool reads are declared; everything else in the
//! responses is ignored by `serde`.

use serde::Deserialize;

/// One execution of the CI workflow.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    /// Absolute URL listing this run's artifacts.
    pub artifacts_url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WorkflowRunsPage {
    pub workflow_runs: Vec<WorkflowRun>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RunRef {
    pub id: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArtifactRow {
    pub id: u64,
    pub name: String,
    pub archive_download_url: String,
    #[serde(default)]
    pub workflow_run: Option<RunRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArtifactsPage {
    pub artifacts: Vec<ArtifactRow>,
}

/// A named bundle produced by a workflow run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub id: u64,
    pub name: String,
    /// Absolute URL of the zip archive.
    pub download_url: String,
    /// The workflow run that produced this artifact.
    pub run_id: u64,
}
impl Artifact {
    /// The artifact's identity on disk: `<runID>_<name>`.
    ///
    /// Also the source of the run metadata written into the database, so
    /// the shape matters: see `tally_results::RunMetadata`.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!("{}_{}", self.run_id, self.name)
    }

    /// Fills in the owning run from the listing when the API omitted it.
    pub(crate) fn from_row(row: ArtifactRow, listed_under: u64) -> Self {
        Self {
            id: row.id,
            name: row.name,
            download_url: row.archive_download_url,
            run_id: row.workflow_run.map(|run| run.id).unwrap_or(listed_under),
        }
    }
}
