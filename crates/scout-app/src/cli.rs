//! CLI argument definitions for the scout binary.
//!
//! Uses `clap` with derive macros. Priority resolution:
//! CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// scout -- scans your channels for commitments you owe and keeps them
/// in a two-bucket task list.
#[derive(Parser, Debug)]
#[command(name = "scout", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Data directory for the task store, ledger, and queue.
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the daemon: scheduled scan cycles plus reminder timers.
    Run,
    /// Trigger one manual scan cycle now.
    Scan,
    /// Run the extractor over a text file and print the candidates.
    Extract {
        /// File to read.
        file: PathBuf,
        /// Channel label for diagnostics.
        #[arg(long, default_value = "notes")]
        source: String,
    },
    /// Queue a text file for the external extraction agent.
    Ingest {
        /// File to read; stdin when omitted.
        file: Option<PathBuf>,
        /// Provenance label stored with the item.
        #[arg(long, default_value = "Manual upload")]
        source: String,
    },
    /// Print the current task store.
    Tasks,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > SCOUT_CONFIG env var > ~/.scout/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("SCOUT_CONFIG") {
            return PathBuf::from(p);
        }
        default_scout_path().join("config.toml")
    }

    /// Resolve the data directory.
    ///
    /// Priority: --data-dir flag > config file value (with `~` expanded).
    pub fn resolve_data_dir(&self, config_dir: &str) -> PathBuf {
        if let Some(ref p) = self.data_dir {
            return p.clone();
        }
        expand_home(config_dir)
    }
}

/// Expand a leading `~/` against the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}

fn default_scout_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".scout");
    }
    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home_passthrough() {
        assert_eq!(expand_home("/var/lib/scout"), PathBuf::from("/var/lib/scout"));
        assert_eq!(expand_home("relative/dir"), PathBuf::from("relative/dir"));
    }

    #[test]
    fn test_parse_run() {
        let args = CliArgs::try_parse_from(["scout", "run"]).unwrap();
        assert!(matches!(args.command, Command::Run));
    }

    #[test]
    fn test_parse_extract_with_source() {
        let args =
            CliArgs::try_parse_from(["scout", "extract", "notes.txt", "--source", "call transcript"])
                .unwrap();
        match args.command {
            Command::Extract { file, source } => {
                assert_eq!(file, PathBuf::from("notes.txt"));
                assert_eq!(source, "call transcript");
            }
            _ => panic!("expected extract"),
        }
    }

    #[test]
    fn test_parse_ingest_defaults() {
        let args = CliArgs::try_parse_from(["scout", "ingest"]).unwrap();
        match args.command {
            Command::Ingest { file, source } => {
                assert!(file.is_none());
                assert_eq!(source, "Manual upload");
            }
            _ => panic!("expected ingest"),
        }
    }
}
