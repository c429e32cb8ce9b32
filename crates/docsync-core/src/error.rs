//! Error types for docsync-core

use std::fmt;
use std::path::PathBuf;

/// Result type for docsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which side of the sync an operation touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Primary,
    Secondary,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => f.write_str("primary"),
            Self::Secondary => f.write_str("secondary"),
        }
    }
}

/// Errors that can occur in docsync-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A store operation failed; aborts the current sync run
    #[error("{side} store: {source}")]
    Store {
        side: Side,
        #[source]
        source: docsync_fs::Error,
    },

    /// Snapshot file exists but cannot be decoded
    #[error("Snapshot at {path} is corrupt: {message}")]
    SnapshotCorrupt { path: PathBuf, message: String },

    /// Another process holds the snapshot lock
    #[error("Snapshot at {path} is locked by another sync")]
    SnapshotLocked { path: PathBuf },

    /// Filesystem error from docsync-fs outside of a store operation
    #[error(transparent)]
    Fs(#[from] docsync_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True if the underlying store reported a missing file.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Store { source, .. } | Self::Fs(source) => source.is_not_found(),
            _ => false,
        }
    }
}

/// Attach the store side to a store result.
pub(crate) trait StoreResultExt<T> {
    fn on(self, side: Side) -> Result<T>;
}

impl<T> StoreResultExt<T> for docsync_fs::Result<T> {
    fn on(self, side: Side) -> Result<T> {
        self.map_err(|source| Error::Store { side, source })
    }
}
