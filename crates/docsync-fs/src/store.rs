//! The FileStore contract

use crate::Result;
use crate::meta::{FileMeta, WriteOptions};
use async_trait::async_trait;

/// Change notification emitted by stores that drive a live-update feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Changed(FileMeta),
    Deleted(String),
}

/// Abstract file storage for one side of a sync.
///
/// Implementations must change a file's [`Version`](crate::Version) on every
/// successful `write`, so that a write followed by `read` or `list` never
/// observes a version the file held before.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// List metadata for every file in the store.
    async fn list(&self) -> Result<Vec<FileMeta>>;

    /// Read a file's bytes and metadata. Fails with `NotFound` if absent.
    async fn read(&self, name: &str) -> Result<(Vec<u8>, FileMeta)>;

    /// Create or replace a file, returning its new metadata.
    async fn write(&self, name: &str, data: &[u8], options: WriteOptions) -> Result<FileMeta>;

    /// Delete a file. Fails with `NotFound` if absent.
    async fn delete(&self, name: &str) -> Result<()>;

    /// Metadata for a single file. Fails with `NotFound` if absent.
    async fn get_meta(&self, name: &str) -> Result<FileMeta> {
        self.read(name).await.map(|(_, meta)| meta)
    }
}
