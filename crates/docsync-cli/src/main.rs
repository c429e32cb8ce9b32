//! docsync CLI
//!
//! Synchronizes two document folders, with the primary folder winning
//! conflicts.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: could not set up logging: {e}", "warning".yellow());
    }
    tracing::debug!("Verbose mode enabled");

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            println!("{} document folder sync", "docsync".green().bold());
            println!();
            println!("Run {} for available commands.", "docsync --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Sync { stores, timeout } => commands::run_sync(&stores, timeout),
        Commands::SyncFile { name, stores } => commands::run_sync_file(&stores, &name),
        Commands::Plan { stores, all, json } => commands::run_plan(&stores, all, json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cli::StoreArgs;
    use docsync_test_utils::TestDirs;

    fn store_args(dirs: &TestDirs) -> StoreArgs {
        StoreArgs {
            primary: dirs.primary().to_path_buf(),
            secondary: dirs.secondary().to_path_buf(),
            snapshot: None,
            config: None,
        }
    }

    #[test]
    fn sync_writes_snapshot_to_default_location() {
        let dirs = TestDirs::new();
        TestDirs::write(dirs.primary(), "index.md", "# Home");

        commands::run_sync(&store_args(&dirs), None).unwrap();

        TestDirs::assert_file(dirs.secondary(), "index.md", "# Home");
        assert!(dirs.snapshot_path().exists());
    }

    #[test]
    fn state_dir_is_not_synced() {
        let dirs = TestDirs::new();
        TestDirs::write(dirs.primary(), "a.md", "a");

        commands::run_sync(&store_args(&dirs), None).unwrap();
        commands::run_sync(&store_args(&dirs), None).unwrap();

        TestDirs::assert_missing(dirs.secondary(), ".docsync/snapshot.json");
    }

    #[test]
    fn missing_folder_is_a_user_error() {
        let dirs = TestDirs::new();
        let mut args = store_args(&dirs);
        args.secondary = dirs.secondary().join("nope");

        let err = commands::run_sync(&args, None).unwrap_err();
        assert!(matches!(err, error::CliError::User { .. }));
    }

    #[test]
    fn cli_error_user() {
        let error = error::CliError::user("test error");
        assert_eq!(format!("{}", error), "test error");
    }
}
