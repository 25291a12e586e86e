//! The artifact cache and the pipeline built on it.
//!
//! [`ArtifactCache::resolve`] turns a remote [`Artifact`](tally_github::Artifact)
//! into a tagged results database on disk, downloading it at most once.
//! [`Pipeline`] lists every artifact of the configured workflow, resolves
//! them in listing order and merges the results into one database.

mod cache;
pub mod error;
mod pipeline;

pub use crate::cache::{ArtifactCache, RESULTS_ENTRY, ResolveEffort, Resolved};
pub use crate::pipeline::Pipeline;
