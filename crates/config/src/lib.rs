//! Layered configuration.
//!
//! Lowest to highest precedence:
//!
//! 1. built-in defaults ([`Config::default`]),
//! 2. a TOML file (given explicitly, or `tally/config.toml` in the platform
//!    configuration directory if it exists),
//! 3. `TALLY_`-prefixed environment variables, with `__` between sections
//!    (`TALLY_GITHUB__BRANCH=main`),
//! 4. `GITHUB_TOKEN`, as `github.token`.

pub mod error;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tally_results::SchemaPolicy;

pub const ENV_PREFIX: &str = "TALLY_";
pub const TOKEN_VAR: &str = "GITHUB_TOKEN";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub github: GithubConfig,
    pub cache: CacheConfig,
    pub merge: MergeConfig,
}

/// Where artifacts come from.
#[derive(Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GithubConfig {
    /// API token. Requests are sent unauthenticated without one.
    pub token: Option<String>,
    pub api_url: String,
    pub api_version: String,
    /// `owner/name`
    pub repository: String,
    /// Workflow file name or numeric ID.
    pub workflow: String,
    pub branch: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: tally_github::DEFAULT_API_URL.to_string(),
            api_version: tally_github::DEFAULT_API_VERSION.to_string(),
            repository: "libp2p/go-libp2p".to_string(),
            workflow: "go-test.yml".to_string(),
            branch: "master".to_string(),
        }
    }
}

impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("api_version", &self.api_version)
            .field("repository", &self.repository)
            .field("workflow", &self.workflow)
            .field("branch", &self.branch)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding one tagged database per artifact.
    pub directory: PathBuf,
    /// Merge output. Relative paths are inside [`directory`](Self::directory).
    pub output: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { directory: PathBuf::from("artifacts"), output: PathBuf::from("merged.db") }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MergeConfig {
    pub schema: SchemaPolicy,
}

impl Config {
    /// Load the configuration.
    ///
    /// `file` must exist if given. Without it, the default file is used only
    /// when present.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let file = match file {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => default_file().filter(|path| path.is_file()),
        };
        if let Some(path) = &file {
            tracing::debug!(path = %path.display(), "Loading configuration file");
        }
        let config: Self = Self::figment(file.as_deref()).extract().or_raise(|| ErrorKind::Invalid)?;
        Ok(config)
    }

    fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Env::raw().only(&[TOKEN_VAR]).map(|_| "github.token".into()))
    }

    /// Path of the merge output.
    pub fn output_path(&self) -> PathBuf {
        self.cache.directory.join(&self.cache.output)
    }
}

/// `tally/config.toml` in the platform configuration directory.
pub fn default_file() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "tally").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}
