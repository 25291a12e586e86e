use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Download the test result databases of recent CI runs and merge them into
/// one SQLite database, written to standard output.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Write the merged database to FILE instead of standard output
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
    /// Empty the artifact cache before running
    #[arg(long)]
    pub reset_cache: bool,
    /// More logging (repeat for even more)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_needed() {
        let cli = Cli::try_parse_from(["tally"]).unwrap();
        assert_eq!(cli.config, None);
        assert_eq!(cli.output, None);
        assert!(!cli.reset_cache);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from(["tally", "-vv", "--reset-cache", "-o", "out.db", "--config", "tally.toml"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.reset_cache);
        assert_eq!(cli.output, Some(PathBuf::from("out.db")));
        assert_eq!(cli.config, Some(PathBuf::from("tally.toml")));
    }
}
