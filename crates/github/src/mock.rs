//! In-memory fetcher for testing.

use crate::error::{ErrorKind, Result};
use crate::fetch::Fetch;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory [`Fetch`] implementation that records every request.
///
/// Unknown URLs answer with an HTTP 404 error, like the real API would.
///
/// # Examples
///
/// ```
/// use tally_github::{Fetch, MockFetch};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let fetch = MockFetch::with_responses([("/runs", b"{}".to_vec())]);
/// assert_eq!(fetch.get("/runs").await?, b"{}");
/// assert!(fetch.get("/missing").await.is_err());
/// assert_eq!(fetch.calls(), ["/runs", "/missing"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MockFetch {
    responses: Mutex<HashMap<String, Vec<u8>>>,
    calls: Mutex<Vec<String>>,
}
impl MockFetch {
    /// Create a mock fetcher pre-populated with responses.
    pub fn with_responses(responses: impl IntoIterator<Item = (impl Into<String>, impl Into<Vec<u8>>)>) -> Self {
        let responses = responses.into_iter().map(|(url, body)| (url.into(), body.into())).collect();
        Self {
            responses: Mutex::new(responses),
            calls: Mutex::default(),
        }
    }

    /// Add or replace the response for `url`.
    pub fn insert(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.lock_responses().insert(url.into(), body.into());
    }

    /// Every URL requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    /// How many times `url` was requested.
    pub fn call_count(&self, url: &str) -> usize {
        self.calls().iter().filter(|called| called.as_str() == url).count()
    }

    fn lock_responses(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.responses.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Fetch for MockFetch {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).push(url.to_string());
        match self.lock_responses().get(url) {
            Some(body) => Ok(body.clone()),
            None => exn::bail!(ErrorKind::Status(404, url.to_string())),
        }
    }
}
