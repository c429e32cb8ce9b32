//! Conflict resolution
//!
//! A resolver runs when both sides changed a file since the last sync, or
//! when a file exists on both sides without a snapshot entry. It performs
//! whatever I/O it needs and returns the snapshot entries to set; the
//! engine applies them.

use crate::error::{Result, Side, StoreResultExt};
use crate::snapshot::{Snapshot, SnapshotEntry};
use async_trait::async_trait;
use docsync_content::ContentComparator;
use docsync_content::format::extension;
use docsync_fs::{FileStore, Version, WriteOptions};
use tracing::{debug, info};

/// Default infix marking conflict copies
pub const DEFAULT_CONFLICT_INFIX: &str = "conflicted";

/// Outcome of resolving one conflict
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Data-moving operations performed
    pub operations: usize,
    /// Snapshot entries to set
    pub updates: Vec<(String, SnapshotEntry)>,
}

impl Resolution {
    /// Both sides already agree; only the entry is refreshed.
    pub fn unchanged(name: impl Into<String>, entry: SnapshotEntry) -> Self {
        Self {
            operations: 0,
            updates: vec![(name.into(), entry)],
        }
    }
}

/// Strategy for files changed on both sides
#[async_trait]
pub trait ConflictResolver: Send + Sync {
    async fn resolve(
        &self,
        name: &str,
        snapshot: &Snapshot,
        primary: &dyn FileStore,
        secondary: &dyn FileStore,
    ) -> Result<Resolution>;
}

/// Default strategy: the primary's content wins.
///
/// Contents that are equivalent (byte-equal, or equal after stripping
/// directive bodies for markdown) are a false conflict. Otherwise the
/// secondary's content is preserved under a conflict-copy name on both
/// stores before the secondary's original is overwritten with the primary's.
#[derive(Debug, Clone)]
pub struct PrimaryWins {
    comparator: ContentComparator,
    conflict_infix: String,
}

impl Default for PrimaryWins {
    fn default() -> Self {
        Self::new(ContentComparator::default())
    }
}

impl PrimaryWins {
    pub fn new(comparator: ContentComparator) -> Self {
        Self {
            comparator,
            conflict_infix: DEFAULT_CONFLICT_INFIX.to_string(),
        }
    }

    pub fn with_conflict_infix(mut self, infix: impl Into<String>) -> Self {
        self.conflict_infix = infix.into();
        self
    }
}

#[async_trait]
impl ConflictResolver for PrimaryWins {
    async fn resolve(
        &self,
        name: &str,
        _snapshot: &Snapshot,
        primary: &dyn FileStore,
        secondary: &dyn FileStore,
    ) -> Result<Resolution> {
        let (primary_data, primary_meta) = primary.read(name).await.on(Side::Primary)?;
        let (secondary_data, secondary_meta) = secondary.read(name).await.on(Side::Secondary)?;

        if self.comparator.equivalent(name, &primary_data, &secondary_data) {
            debug!(name, "contents equivalent, no conflict");
            return Ok(Resolution::unchanged(
                name,
                SnapshotEntry::new(primary_meta.version, secondary_meta.version),
            ));
        }

        let copy_name = conflict_copy_name(name, &self.conflict_infix, secondary_meta.version);
        info!(name, conflict_copy = %copy_name, "conflict, keeping primary content");

        // The conflict copy lands on both sides before anything is overwritten.
        let copy_options = WriteOptions::self_update().with_perm(secondary_meta.perm);
        let copy_on_primary = primary
            .write(&copy_name, &secondary_data, copy_options)
            .await
            .on(Side::Primary)?;
        let copy_on_secondary = secondary
            .write(&copy_name, &secondary_data, copy_options)
            .await
            .on(Side::Secondary)?;

        let overwritten = secondary
            .write(
                name,
                &primary_data,
                WriteOptions::self_update().with_perm(primary_meta.perm),
            )
            .await
            .on(Side::Secondary)?;

        Ok(Resolution {
            operations: 1,
            updates: vec![
                (
                    copy_name,
                    SnapshotEntry::new(copy_on_primary.version, copy_on_secondary.version),
                ),
                (
                    name.to_string(),
                    SnapshotEntry::new(primary_meta.version, overwritten.version),
                ),
            ],
        })
    }
}

/// Name for the preserved copy of a losing version.
///
/// `.<infix>.<version>` goes before the final extension, or at the end if
/// the file name has none: `notes/a.md` becomes
/// `notes/a.conflicted.1700000000000.md`.
pub fn conflict_copy_name(name: &str, infix: &str, version: Version) -> String {
    match extension(name) {
        Some(ext) => {
            let stem = &name[..name.len() - ext.len() - 1];
            format!("{stem}.{infix}.{version}.{ext}")
        }
        None => format!("{name}.{infix}.{version}"),
    }
}
