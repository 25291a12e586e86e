//! GitHub Actions as a source of test result artifacts.
//!
//! Everything network-facing goes through the [`Fetch`] capability: a plain
//! `GET url → bytes`. [`GithubClient`] is the real implementation;
//! [`ArtifactSource`] builds the listing requests on top of any fetcher and
//! decodes the responses into [`WorkflowRun`]s and [`Artifact`]s.

mod client;
pub mod error;
mod fetch;
#[cfg(feature = "mock")]
mod mock;
mod models;
mod source;

pub use crate::client::{DEFAULT_API_URL, DEFAULT_API_VERSION, GithubClient};
pub use crate::fetch::Fetch;
#[cfg(feature = "mock")]
pub use crate::mock::MockFetch;
pub use crate::models::{Artifact, WorkflowRun};
pub use crate::source::ArtifactSource;
use std::sync::Arc;

pub type FetchHandle = Arc<dyn Fetch>;
