use crate::error::Result;
use async_trait::async_trait;

/// `GET url → bytes`, the only network capability the rest of the
/// workspace depends on.
///
/// URLs are either absolute (as returned inside API responses, e.g.
/// `artifacts_url`) or API-relative paths starting with `/`; implementations
/// decide how to resolve the latter.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetch the full response body.
    ///
    /// Non-success responses are errors; there is no partial result.
    async fn get(&self, url: &str) -> Result<Vec<u8>>;
}
