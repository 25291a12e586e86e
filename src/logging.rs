//! Log output setup.
//!
//! Standard output carries the merged database, so every log line goes to
//! standard error.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Install the global subscriber.
///
/// Without `-v`, `RUST_LOG` decides and falls back to `info`. Each `-v`
/// raises the level for this workspace's crates (`debug`, then `trace`).
pub fn init(verbose: u8) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter(verbose)?)
        .try_init()?;
    Ok(())
}

fn filter(verbose: u8) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
    let level = match verbose {
        0 => return EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info")),
        1 => "debug",
        _ => "trace",
    };
    EnvFilter::try_new(format!(
        "info,tally={level},tally_library={level},tally_results={level},tally_storage={level},tally_github={level},tally_archive={level},tally_config={level}"
    ))
}
