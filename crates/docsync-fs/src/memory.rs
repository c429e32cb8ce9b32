//! In-memory file store

use crate::meta::{FileMeta, Perm, Version, WriteOptions};
use crate::path::validate_store_name;
use crate::store::{FileStore, StoreEvent};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 256;

/// A file store held entirely in memory.
///
/// Clones share the same underlying files, so a test can hand one clone to
/// the sync engine and keep another to edit or inspect the store.
///
/// Versions come from a monotonic millisecond clock: every write gets
/// `max(now, last + 1)`, so a version never repeats even for writes issued
/// within the same millisecond.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    events: broadcast::Sender<StoreEvent>,
}

#[derive(Debug, Default)]
struct State {
    files: BTreeMap<String, StoredFile>,
    last_version: u64,
}

#[derive(Debug, Clone)]
struct StoredFile {
    data: Vec<u8>,
    meta: FileMeta,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(State::default())),
            events,
        }
    }

    /// Subscribe to change events for writes and deletes not flagged as
    /// `self_update`.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Names of all files currently held, in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.lock().files.keys().cloned().collect()
    }

    /// Raw content of a file, if present.
    pub fn contents(&self, name: &str) -> Option<Vec<u8>> {
        self.lock().files.get(name).map(|f| f.data.clone())
    }

    pub fn len(&self) -> usize {
        self.lock().files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, event: StoreEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }
}

impl State {
    fn next_version(&mut self) -> Version {
        let now = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
        self.last_version = now.max(self.last_version + 1);
        Version(self.last_version)
    }
}

#[async_trait]
impl FileStore for MemoryStore {
    async fn list(&self) -> Result<Vec<FileMeta>> {
        Ok(self.lock().files.values().map(|f| f.meta.clone()).collect())
    }

    async fn read(&self, name: &str) -> Result<(Vec<u8>, FileMeta)> {
        self.lock()
            .files
            .get(name)
            .map(|f| (f.data.clone(), f.meta.clone()))
            .ok_or_else(|| Error::not_found(name))
    }

    async fn write(&self, name: &str, data: &[u8], options: WriteOptions) -> Result<FileMeta> {
        validate_store_name(name)?;
        let meta = {
            let mut state = self.lock();
            let version = state.next_version();
            let perm = options
                .perm
                .or_else(|| state.files.get(name).map(|f| f.meta.perm))
                .unwrap_or(Perm::ReadWrite);
            let meta = FileMeta::new(name, version, data.len() as u64, perm);
            state.files.insert(
                name.to_string(),
                StoredFile {
                    data: data.to_vec(),
                    meta: meta.clone(),
                },
            );
            meta
        };
        tracing::trace!(name, version = %meta.version, "memory store write");
        if !options.self_update {
            self.notify(StoreEvent::Changed(meta.clone()));
        }
        Ok(meta)
    }

    async fn delete(&self, name: &str) -> Result<()> {
        if self.lock().files.remove(name).is_none() {
            return Err(Error::not_found(name));
        }
        self.notify(StoreEvent::Deleted(name.to_string()));
        Ok(())
    }

    async fn get_meta(&self, name: &str) -> Result<FileMeta> {
        self.lock()
            .files
            .get(name)
            .map(|f| f.meta.clone())
            .ok_or_else(|| Error::not_found(name))
    }
}
