//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Flipkart seller API tap
#[derive(Parser, Debug)]
#[command(name = "tap-flipkart")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON or YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Inline config JSON (takes precedence over --config)
    #[arg(long, global = true)]
    pub config_json: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the settings schema
    About,

    /// Exchange credentials for a token
    Check,

    /// Print the stream catalog
    Discover,

    /// Emit schemas and records
    Sync {
        /// Streams to sync (comma-separated, empty = all)
        #[arg(long)]
        streams: Option<String>,

        /// Maximum records per stream
        #[arg(long)]
        max_records: Option<usize>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sync() {
        let cli = Cli::parse_from([
            "tap-flipkart",
            "--config",
            "config.json",
            "sync",
            "--streams",
            "returns",
            "--max-records",
            "5",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("config.json")));
        assert!(matches!(
            cli.command,
            Commands::Sync { ref streams, max_records: Some(5) } if streams.as_deref() == Some("returns")
        ));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["tap-flipkart", "check", "--config-json", "{}", "-v"]);
        assert!(cli.verbose);
        assert_eq!(cli.config_json.as_deref(), Some("{}"));
        assert!(matches!(cli.command, Commands::Check));
    }
}
