//! GitHub REST API client.

use crate::error::{ErrorKind, Result};
use crate::fetch::Fetch;
use async_trait::async_trait;
use exn::ResultExt;
use reqwest::Client;
use reqwest::header::ACCEPT;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_API_VERSION: &str = "2022-11-28";
const MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
// The API rejects requests without a user agent.
const USER_AGENT: &str = concat!("tally/", env!("CARGO_PKG_VERSION"));

/// [`Fetch`] implementation talking to the GitHub REST API.
///
/// Every request carries the `Accept` media type, the pinned API version
/// header and, when a token is configured, `Authorization: Bearer <token>`.
/// Redirects (artifact downloads answer with one to blob storage) are
/// followed; `reqwest` drops the `Authorization` header when the redirect
/// leaves the API host.
///
/// # Examples
///
/// ```no_run
/// use tally_github::{Fetch, GithubClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GithubClient::new("https://api.github.com")?.with_token("ghp_...");
/// let body = client.get("/repos/libp2p/go-libp2p/actions/workflows/go-test.yml/runs?branch=master").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GithubClient {
    http: Client,
    api_url: String,
    api_version: String,
    token: Option<String>,
}
impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("api_url", &self.api_url)
            .field("api_version", &self.api_version)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}
impl GithubClient {
    /// Create a client for the API rooted at `api_url`, without credentials.
    pub fn new(api_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder().user_agent(USER_AGENT).build().or_raise(|| ErrorKind::Client)?;
        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            token: None,
        })
    }

    /// Attach a bearer token to every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Pin a different `X-GitHub-Api-Version`.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Absolute URLs pass through; anything else is joined onto the API root.
    fn resolve(&self, url: &str) -> String {
        if url.starts_with("https://") || url.starts_with("http://") {
            return url.to_string();
        }
        match url.starts_with('/') {
            true => format!("{}{url}", self.api_url),
            false => format!("{}/{url}", self.api_url),
        }
    }
}

#[async_trait]
impl Fetch for GithubClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        let url = self.resolve(url);
        tracing::debug!(%url, "GET");
        let mut request = self
            .http
            .get(&url)
            .header(ACCEPT, MEDIA_TYPE)
            .header(API_VERSION_HEADER, &self.api_version);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.or_raise(|| ErrorKind::Network(url.clone()))?;
        let status = response.status();
        if !status.is_success() {
            exn::bail!(ErrorKind::Status(status.as_u16(), url));
        }
        let body = response.bytes().await.or_raise(|| ErrorKind::Network(url.clone()))?;
        tracing::debug!(%url, size = body.len(), "Response received");
        Ok(body.to_vec())
    }
}
