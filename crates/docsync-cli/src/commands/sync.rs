//! Sync, sync-file, and plan command implementations

use std::time::Duration;

use colored::{ColoredString, Colorize};
use serde::Serialize;

use docsync_core::{SyncAction, SyncReport};

use super::session::{Session, runtime};
use crate::cli::StoreArgs;
use crate::error::{CliError, Result};

/// Run the sync command
///
/// The snapshot is persisted whether the run succeeds, fails, or times out.
pub fn run_sync(args: &StoreArgs, timeout: Option<u64>) -> Result<()> {
    println!(
        "{} Syncing {} <-> {}",
        "=>".blue().bold(),
        args.primary.display(),
        args.secondary.display()
    );

    let session = Session::open(args)?;
    let mut snapshot = session.load_snapshot()?;

    let outcome: Result<SyncReport> = runtime()?.block_on(async {
        let run = session.engine.run(&mut snapshot);
        match timeout {
            Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), run).await {
                Ok(result) => result.map_err(CliError::from),
                Err(_) => Err(CliError::Timeout { secs }),
            },
            None => run.await.map_err(CliError::from),
        }
    });

    session.save_snapshot(&snapshot)?;
    let report = outcome?;

    for (name, action) in &report.actions {
        println!("   {} {}", styled(*action), name.cyan());
    }
    println!(
        "{} {} operation(s), {} conflict(s)",
        "OK".green().bold(),
        report.operations,
        report.conflicts()
    );
    Ok(())
}

/// Run the sync-file command
pub fn run_sync_file(args: &StoreArgs, name: &str) -> Result<()> {
    let session = Session::open(args)?;
    let mut snapshot = session.load_snapshot()?;

    let outcome = runtime()?.block_on(session.engine.sync_file(name, &mut snapshot));
    session.save_snapshot(&snapshot)?;
    let operations = outcome?;

    println!(
        "{} {} {} operation(s)",
        "OK".green().bold(),
        name.cyan(),
        operations
    );
    Ok(())
}

#[derive(Serialize)]
struct PlanItem<'a> {
    name: &'a str,
    action: SyncAction,
}

/// Run the plan command
///
/// Lists both folders and prints the decision for each file; nothing is
/// written, including the snapshot.
pub fn run_plan(args: &StoreArgs, all: bool, json: bool) -> Result<()> {
    let session = Session::open(args)?;
    let snapshot = session.load_snapshot()?;

    let plan = runtime()?.block_on(session.engine.plan(&snapshot))?;
    let items: Vec<PlanItem<'_>> = plan
        .iter()
        .filter(|(_, action)| all || action.is_effectful())
        .map(|(name, action)| PlanItem {
            name,
            action: *action,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("{} Nothing to do.", "OK".green().bold());
        return Ok(());
    }
    for item in &items {
        println!("   {} {}", styled(item.action), item.name.cyan());
    }
    let pending = items.iter().filter(|i| i.action.is_effectful()).count();
    println!();
    println!("{pending} file(s) pending.");
    Ok(())
}

fn styled(action: SyncAction) -> ColoredString {
    let label = action.as_str();
    match action {
        SyncAction::Conflict => label.yellow().bold(),
        SyncAction::DeleteOnPrimary | SyncAction::DeleteOnSecondary => label.red(),
        SyncAction::ForgetOnly | SyncAction::NoOp => label.dimmed(),
        _ => label.green(),
    }
}
