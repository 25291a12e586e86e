mod cli;
mod error;
mod logging;

use crate::cli::Cli;
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tally_config::Config;
use tally_github::{ArtifactSource, FetchHandle, GithubClient};
use tally_library::{ArtifactCache, Pipeline};
use tally_results::Merger;
use tally_storage::LocalStore;
use tokio::io::AsyncWriteExt;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(retryable = err.is_retryable(), "{err:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    tracing::debug!(?config, "Loaded configuration");

    let store = LocalStore::new(&config.cache.directory).or_raise(|| ErrorKind::Cache)?;
    if cli.reset_cache {
        store.reset().await.or_raise(|| ErrorKind::Cache)?;
    }

    let mut client = GithubClient::new(&config.github.api_url)
        .or_raise(|| ErrorKind::Client)?
        .with_api_version(&config.github.api_version);
    match &config.github.token {
        Some(token) => client = client.with_token(token),
        None => tracing::warn!("No GITHUB_TOKEN set; sending unauthenticated requests"),
    }
    let fetch: FetchHandle = Arc::new(client);

    let source = ArtifactSource::new(
        fetch.clone(),
        &config.github.repository,
        &config.github.workflow,
        &config.github.branch,
    );
    let cache = ArtifactCache::new(store, fetch);
    let pipeline = Pipeline::new(source, cache, Merger::new(config.merge.schema));

    let merged = config.output_path();
    pipeline.run(&merged).await.or_raise(|| ErrorKind::Pipeline)?;
    emit(&merged, cli.output.as_deref()).await
}

/// Copy the merged database to `output`, or to standard output.
async fn emit(merged: &Path, output: Option<&Path>) -> Result<()> {
    if let Some(output) = output {
        tokio::fs::copy(merged, output).await.or_raise(|| ErrorKind::Output)?;
        tracing::info!(path = %output.display(), "Wrote merged database");
        return Ok(());
    }
    let mut file = tokio::fs::File::open(merged).await.or_raise(|| ErrorKind::Output)?;
    let mut stdout = tokio::io::stdout();
    let written = tokio::io::copy(&mut file, &mut stdout).await.or_raise(|| ErrorKind::Output)?;
    stdout.flush().await.or_raise(|| ErrorKind::Output)?;
    tracing::debug!(bytes = written, "Wrote merged database to standard output");
    Ok(())
}
