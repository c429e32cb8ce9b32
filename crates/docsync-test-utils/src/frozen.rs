//! [`FrozenVersionStore`]: a store that breaks the version contract.

use async_trait::async_trait;
use docsync_fs::{FileMeta, FileStore, MemoryStore, Result, Version, WriteOptions};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// In-memory store that reports the first version it ever handed out for a
/// name, no matter how often the file is rewritten.
///
/// Content still changes; only the version marker is stuck.
#[derive(Default)]
pub struct FrozenVersionStore {
    inner: MemoryStore,
    frozen: Mutex<HashMap<String, Version>>,
}

impl FrozenVersionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The backing store, which reports real versions.
    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn freeze(&self, mut meta: FileMeta) -> FileMeta {
        let mut frozen = self.frozen.lock().unwrap_or_else(PoisonError::into_inner);
        meta.version = *frozen.entry(meta.name.clone()).or_insert(meta.version);
        meta
    }
}

#[async_trait]
impl FileStore for FrozenVersionStore {
    async fn list(&self) -> Result<Vec<FileMeta>> {
        let listing = self.inner.list().await?;
        Ok(listing.into_iter().map(|meta| self.freeze(meta)).collect())
    }

    async fn read(&self, name: &str) -> Result<(Vec<u8>, FileMeta)> {
        let (data, meta) = self.inner.read(name).await?;
        Ok((data, self.freeze(meta)))
    }

    async fn write(&self, name: &str, data: &[u8], options: WriteOptions) -> Result<FileMeta> {
        let meta = self.inner.write(name, data, options).await?;
        Ok(self.freeze(meta))
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.inner.delete(name).await
    }
}
