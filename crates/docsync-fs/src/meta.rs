//! File metadata and version markers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-file, per-store change marker.
///
/// In practice a last-modification time in milliseconds. Two equal values
/// observed on the same store mean the file did not change in between.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(pub u64);

impl Version {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for Version {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Permission flag reported by a store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Perm {
    #[serde(rename = "ro")]
    ReadOnly,
    #[default]
    #[serde(rename = "rw")]
    ReadWrite,
}

/// Metadata for a single file in a store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    pub name: String,
    pub version: Version,
    pub size: u64,
    pub content_type: String,
    pub perm: Perm,
}

impl FileMeta {
    /// Build metadata with the content type guessed from the name.
    pub fn new(name: impl Into<String>, version: Version, size: u64, perm: Perm) -> Self {
        let name = name.into();
        let content_type = guess_content_type(&name);
        Self {
            name,
            version,
            size,
            content_type,
            perm,
        }
    }
}

/// Options for [`FileStore::write`](crate::FileStore::write)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// The write originates from the sync engine; stores with a change feed
    /// must not announce it.
    pub self_update: bool,
    /// Permission to record for the written file, if the store tracks one.
    pub perm: Option<Perm>,
}

impl WriteOptions {
    pub fn self_update() -> Self {
        Self {
            self_update: true,
            perm: None,
        }
    }

    pub fn with_perm(mut self, perm: Perm) -> Self {
        self.perm = Some(perm);
        self
    }
}

pub(crate) fn guess_content_type(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
