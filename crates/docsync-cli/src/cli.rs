//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// docsync - keep two document folders in sync
#[derive(Parser, Debug)]
#[command(name = "docsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Where the two sides and the sync state live
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct StoreArgs {
    /// Primary folder; wins conflicts
    #[arg(long, env = "DOCSYNC_PRIMARY")]
    pub primary: PathBuf,

    /// Secondary folder
    #[arg(long, env = "DOCSYNC_SECONDARY")]
    pub secondary: PathBuf,

    /// Snapshot file [default: <primary>/.docsync/snapshot.json]
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Config file (TOML, JSON or YAML) [default: <primary>/.docsync/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Synchronize every file between the two folders
    ///
    /// The snapshot is saved even when the run fails part way, so the next
    /// run resumes from the files already synchronized.
    Sync {
        #[command(flatten)]
        stores: StoreArgs,

        /// Abort the run after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Synchronize a single file
    SyncFile {
        /// File name relative to the folder roots, `/`-separated
        name: String,

        #[command(flatten)]
        stores: StoreArgs,
    },

    /// Show what sync would do without changing anything
    Plan {
        #[command(flatten)]
        stores: StoreArgs,

        /// Include files that need no action
        #[arg(long)]
        all: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sync_with_timeout() {
        let cli = Cli::try_parse_from([
            "docsync",
            "-v",
            "sync",
            "--primary",
            "a",
            "--secondary",
            "b",
            "--timeout",
            "30",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Some(Commands::Sync { stores, timeout }) => {
                assert_eq!(stores.primary, PathBuf::from("a"));
                assert_eq!(stores.secondary, PathBuf::from("b"));
                assert_eq!(stores.snapshot, None);
                assert_eq!(timeout, Some(30));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn sync_file_takes_a_name() {
        let cli = Cli::try_parse_from([
            "docsync",
            "sync-file",
            "notes/today.md",
            "--primary",
            "a",
            "--secondary",
            "b",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::SyncFile { ref name, .. }) if name == "notes/today.md"
        ));
    }

    #[test]
    fn command_is_optional() {
        let cli = Cli::try_parse_from(["docsync"]).unwrap();
        assert!(cli.command.is_none());
    }
}
