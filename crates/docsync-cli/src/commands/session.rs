//! Shared setup for commands that touch both folders

use std::path::{Path, PathBuf};
use std::sync::Arc;

use docsync_core::{Snapshot, SnapshotLock, SyncConfig, SyncEngine};
use docsync_fs::{DiskStore, NormalizedPath};

use crate::cli::StoreArgs;
use crate::error::{CliError, Result};

/// Folder under the primary root holding docsync's own state
pub const STATE_DIR: &str = ".docsync";

/// An engine over two folders plus the held snapshot lock
pub struct Session {
    pub engine: SyncEngine,
    pub snapshot_path: PathBuf,
    _lock: SnapshotLock,
}

impl Session {
    /// Open both folders, load config and take the snapshot lock.
    pub fn open(args: &StoreArgs) -> Result<Self> {
        let primary_root = existing_dir(&args.primary, "Primary")?;
        let secondary_root = existing_dir(&args.secondary, "Secondary")?;

        let state_dir = primary_root.join(STATE_DIR);
        let snapshot_path = args
            .snapshot
            .clone()
            .unwrap_or_else(|| state_dir.join("snapshot.json"));
        let config_path = args
            .config
            .clone()
            .unwrap_or_else(|| state_dir.join("config.toml"));

        let config = SyncConfig::load(&NormalizedPath::new(&config_path))?;
        tracing::debug!(?config, "loaded sync config");

        let lock = SnapshotLock::acquire(&snapshot_path)?;

        let primary = DiskStore::new(&primary_root)?;
        let secondary = DiskStore::new(&secondary_root)?;
        let engine = SyncEngine::from_config(Arc::new(primary), Arc::new(secondary), &config)
            .with_filter(config.filter().with_prefix(format!("{STATE_DIR}/")));

        Ok(Self {
            engine,
            snapshot_path,
            _lock: lock,
        })
    }

    pub fn load_snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot::load(&self.snapshot_path)?)
    }

    pub fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        Ok(snapshot.save(&self.snapshot_path)?)
    }
}

fn existing_dir(path: &Path, label: &str) -> Result<PathBuf> {
    if !path.is_dir() {
        return Err(CliError::user(format!(
            "{label} folder does not exist: {}",
            path.display()
        )));
    }
    Ok(path.to_path_buf())
}

/// Runtime for driving the async engine from the synchronous CLI.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}
