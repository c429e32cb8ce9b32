//! Snapshot of last-synchronized versions
//!
//! The snapshot is the engine's only durable state between runs. It maps a
//! file name to the pair of versions both stores held the last time the
//! file was confirmed synchronized, and persists as JSON:
//!
//! ```json
//! { "index.md": [1700000000000, 1700000000456] }
//! ```

use crate::{Error, Result};
use docsync_fs::Version;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Versions of one file on both sides at its last synchronization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(Version, Version)", into = "(Version, Version)")]
pub struct SnapshotEntry {
    pub primary: Version,
    pub secondary: Version,
}

impl SnapshotEntry {
    pub fn new(primary: Version, secondary: Version) -> Self {
        Self { primary, secondary }
    }
}

impl From<(Version, Version)> for SnapshotEntry {
    fn from((primary, secondary): (Version, Version)) -> Self {
        Self { primary, secondary }
    }
}

impl From<SnapshotEntry> for (Version, Version) {
    fn from(entry: SnapshotEntry) -> Self {
        (entry.primary, entry.secondary)
    }
}

/// Map from file name to its last-synchronized version pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    entries: BTreeMap<String, SnapshotEntry>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<SnapshotEntry> {
        self.entries.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: SnapshotEntry) {
        self.entries.insert(name.into(), entry);
    }

    pub fn remove(&mut self, name: &str) -> Option<SnapshotEntry> {
        self.entries.remove(name)
    }

    /// Apply a batch of entry updates, as returned by a conflict resolver.
    pub fn apply<I>(&mut self, updates: I)
    where
        I: IntoIterator<Item = (String, SnapshotEntry)>,
    {
        self.entries.extend(updates);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SnapshotEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load a snapshot from a JSON file with a shared lock.
    ///
    /// A missing file yields an empty snapshot: every file on both sides is
    /// then treated as never synchronized.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, locked, or
    /// decoded.
    pub fn load(path: &Path) -> Result<Self> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(?path, "no snapshot file, starting empty");
                return Ok(Self::new());
            }
            Err(e) => return Err(e.into()),
        };
        file.lock_shared()?;

        // Read through the locked handle to avoid a TOCTOU race
        let mut content = String::new();
        (&file).read_to_string(&mut content)?;
        if content.trim().is_empty() {
            return Ok(Self::new());
        }

        serde_json::from_str(&content).map_err(|e| Error::SnapshotCorrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Save the snapshot as JSON, atomically, under an exclusive lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be locked or written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        lock_file.lock_exclusive()?;

        docsync_fs::io::write_atomic(path, content.as_bytes())?;

        // Lock released when lock_file is dropped
        Ok(())
    }
}

/// Exclusive lock serializing sync runs against one snapshot file.
///
/// Held for the duration of a run; released on drop.
#[derive(Debug)]
pub struct SnapshotLock {
    _file: File,
    path: PathBuf,
}

impl SnapshotLock {
    /// Try to take the lock for `snapshot_path` without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SnapshotLocked`] if another process holds it.
    pub fn acquire(snapshot_path: &Path) -> Result<Self> {
        let mut lock_name = snapshot_path.as_os_str().to_owned();
        lock_name.push(".lock");
        let path = PathBuf::from(lock_name);

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        file.try_lock_exclusive().map_err(|_| Error::SnapshotLocked {
            path: snapshot_path.to_path_buf(),
        })?;

        Ok(Self { _file: file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
