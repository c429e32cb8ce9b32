//! SyncEngine implementation
//!
//! The engine reconciles a primary and a secondary [`FileStore`] against a
//! [`Snapshot`]. Files are processed one at a time in name order; the first
//! store error aborts the run and leaves the snapshot as mutated so far.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use docsync_fs::{FileMeta, FileStore, Version, WriteOptions};
use serde::Serialize;
use tracing::{debug, info};

use crate::Result;
use crate::config::SyncConfig;
use crate::conflict::{ConflictResolver, PrimaryWins};
use crate::decision::{SyncAction, decide};
use crate::error::{Side, StoreResultExt};
use crate::filter::{CandidateFilter, ExcludePrefixes};
use crate::snapshot::{Snapshot, SnapshotEntry};

/// Report from a sync run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Effectful operations performed
    pub operations: usize,
    /// Every non-NoOp action taken, in processing order
    pub actions: Vec<(String, SyncAction)>,
}

impl SyncReport {
    /// Number of names that went through conflict resolution.
    pub fn conflicts(&self) -> usize {
        self.actions
            .iter()
            .filter(|(_, a)| *a == SyncAction::Conflict)
            .count()
    }

    /// Action taken for `name`, if any.
    pub fn action_for(&self, name: &str) -> Option<SyncAction> {
        self.actions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, a)| *a)
    }
}

/// Engine for synchronizing two file stores
pub struct SyncEngine {
    primary: Arc<dyn FileStore>,
    secondary: Arc<dyn FileStore>,
    filter: Arc<dyn CandidateFilter>,
    resolver: Arc<dyn ConflictResolver>,
}

impl SyncEngine {
    /// Create an engine with the default filter and the primary-wins
    /// resolver.
    pub fn new(primary: Arc<dyn FileStore>, secondary: Arc<dyn FileStore>) -> Self {
        Self {
            primary,
            secondary,
            filter: Arc::new(ExcludePrefixes::default()),
            resolver: Arc::new(PrimaryWins::default()),
        }
    }

    /// Create an engine with filter and resolver built from `config`.
    pub fn from_config(
        primary: Arc<dyn FileStore>,
        secondary: Arc<dyn FileStore>,
        config: &SyncConfig,
    ) -> Self {
        Self::new(primary, secondary)
            .with_filter(config.filter())
            .with_resolver(config.resolver())
    }

    pub fn with_filter(mut self, filter: impl CandidateFilter + 'static) -> Self {
        self.filter = Arc::new(filter);
        self
    }

    pub fn with_resolver(mut self, resolver: impl ConflictResolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    pub fn primary(&self) -> &Arc<dyn FileStore> {
        &self.primary
    }

    pub fn secondary(&self) -> &Arc<dyn FileStore> {
        &self.secondary
    }

    /// Synchronize every sync candidate on both stores.
    ///
    /// # Errors
    ///
    /// The first store error aborts the run. Entries updated for files
    /// processed before the failure stay in `snapshot`.
    pub async fn run(&self, snapshot: &mut Snapshot) -> Result<SyncReport> {
        let (primary, secondary) = self.versions().await?;
        let names: BTreeSet<String> = snapshot
            .names()
            .map(str::to_string)
            .chain(primary.keys().cloned())
            .chain(secondary.keys().cloned())
            .collect();

        debug!(
            primary = primary.len(),
            secondary = secondary.len(),
            known = snapshot.len(),
            "starting sync run"
        );

        let mut report = SyncReport::default();
        // Names written by a resolver earlier in this run; the listing is
        // stale for them and their entries are already current.
        let mut settled = BTreeSet::new();
        for name in names {
            if settled.contains(&name) {
                debug!(%name, "already written this run, skipping");
                continue;
            }
            let action = decide(
                primary.get(&name).copied(),
                secondary.get(&name).copied(),
                snapshot.get(&name),
            );
            let applied = self.execute(&name, action, snapshot).await?;
            report.operations += applied.operations;
            settled.extend(applied.written);
            if action.is_effectful() {
                report.actions.push((name, action));
            }
        }

        info!(
            operations = report.operations,
            conflicts = report.conflicts(),
            "sync run complete"
        );
        Ok(report)
    }

    /// Synchronize a single file, e.g. in response to a change notification.
    ///
    /// Returns the number of operations performed. Names rejected by the
    /// candidate filter are ignored.
    pub async fn sync_file(&self, name: &str, snapshot: &mut Snapshot) -> Result<usize> {
        if !self.filter.is_sync_candidate(name) {
            debug!(name, "not a sync candidate, skipping");
            return Ok(0);
        }

        let primary = probe(self.primary.as_ref(), name).await.on(Side::Primary)?;
        let secondary = probe(self.secondary.as_ref(), name)
            .await
            .on(Side::Secondary)?;

        let action = decide(
            primary.map(|m| m.version),
            secondary.map(|m| m.version),
            snapshot.get(name),
        );
        Ok(self.execute(name, action, snapshot).await?.operations)
    }

    /// Decide every sync candidate without performing I/O beyond listing.
    ///
    /// The snapshot is left untouched. Includes names that need no action.
    pub async fn plan(&self, snapshot: &Snapshot) -> Result<Vec<(String, SyncAction)>> {
        let (primary, secondary) = self.versions().await?;
        let names: BTreeSet<&str> = snapshot
            .names()
            .chain(primary.keys().map(String::as_str))
            .chain(secondary.keys().map(String::as_str))
            .collect();

        Ok(names
            .into_iter()
            .map(|name| {
                let action = decide(
                    primary.get(name).copied(),
                    secondary.get(name).copied(),
                    snapshot.get(name),
                );
                (name.to_string(), action)
            })
            .collect())
    }

    async fn versions(&self) -> Result<(BTreeMap<String, Version>, BTreeMap<String, Version>)> {
        let primary = self.primary.list().await.on(Side::Primary)?;
        let secondary = self.secondary.list().await.on(Side::Secondary)?;
        Ok((self.version_map(primary), self.version_map(secondary)))
    }

    fn version_map(&self, listing: Vec<FileMeta>) -> BTreeMap<String, Version> {
        listing
            .into_iter()
            .filter(|meta| self.filter.is_sync_candidate(&meta.name))
            .map(|meta| (meta.name, meta.version))
            .collect()
    }

    async fn execute(
        &self,
        name: &str,
        action: SyncAction,
        snapshot: &mut Snapshot,
    ) -> Result<Applied> {
        match action {
            SyncAction::NoOp => return Ok(Applied::default()),
            SyncAction::Conflict => {
                info!(name, %action, "resolving conflict");
                let resolution = self
                    .resolver
                    .resolve(
                        name,
                        snapshot,
                        self.primary.as_ref(),
                        self.secondary.as_ref(),
                    )
                    .await?;
                let written = resolution
                    .updates
                    .iter()
                    .map(|(n, _)| n.clone())
                    .filter(|n| n != name)
                    .collect();
                snapshot.apply(resolution.updates);
                return Ok(Applied {
                    operations: resolution.operations,
                    written,
                });
            }
            _ => info!(name, %action, "syncing"),
        }

        match action {
            SyncAction::NewOnPrimary | SyncAction::UpdatePrimaryToSecondary => {
                let (primary, secondary) = self.copy(name, Side::Primary).await?;
                snapshot.insert(name, SnapshotEntry::new(primary, secondary));
            }
            SyncAction::NewOnSecondary | SyncAction::UpdateSecondaryToPrimary => {
                let (primary, secondary) = self.copy(name, Side::Secondary).await?;
                snapshot.insert(name, SnapshotEntry::new(primary, secondary));
            }
            SyncAction::DeleteOnPrimary => {
                delete_if_present(self.primary.as_ref(), name)
                    .await
                    .on(Side::Primary)?;
                snapshot.remove(name);
            }
            SyncAction::DeleteOnSecondary => {
                delete_if_present(self.secondary.as_ref(), name)
                    .await
                    .on(Side::Secondary)?;
                snapshot.remove(name);
            }
            SyncAction::ForgetOnly => {
                snapshot.remove(name);
            }
            SyncAction::Conflict | SyncAction::NoOp => {}
        }
        Ok(Applied {
            operations: 1,
            written: Vec::new(),
        })
    }

    /// Copy `name` from `from` to the other side.
    ///
    /// Returns the resulting (primary, secondary) versions.
    async fn copy(&self, name: &str, from: Side) -> Result<(Version, Version)> {
        let (source, target, to) = match from {
            Side::Primary => (&self.primary, &self.secondary, Side::Secondary),
            Side::Secondary => (&self.secondary, &self.primary, Side::Primary),
        };

        let (data, meta) = source.read(name).await.on(from)?;
        let written = target
            .write(
                name,
                &data,
                WriteOptions::self_update().with_perm(meta.perm),
            )
            .await
            .on(to)?;

        Ok(match from {
            Side::Primary => (meta.version, written.version),
            Side::Secondary => (written.version, meta.version),
        })
    }
}

/// Result of executing one action
#[derive(Debug, Default)]
struct Applied {
    operations: usize,
    /// Other names written along the way, with current snapshot entries
    written: Vec<String>,
}

/// Metadata for `name`, or `None` if the store does not have it.
async fn probe(store: &dyn FileStore, name: &str) -> docsync_fs::Result<Option<FileMeta>> {
    match store.get_meta(name).await {
        Ok(meta) => Ok(Some(meta)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Delete `name`, treating an already-missing file as done.
async fn delete_if_present(store: &dyn FileStore, name: &str) -> docsync_fs::Result<()> {
    match store.delete(name).await {
        Err(e) if e.is_not_found() => {
            debug!(name, "already deleted");
            Ok(())
        }
        other => other,
    }
}
