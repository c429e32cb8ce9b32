//! Sync between on-disk stores with a persisted snapshot

use docsync_core::{Error, Snapshot, SyncAction, SyncEngine, conflict_copy_name};
use docsync_fs::{DiskStore, FileStore, MemoryStore};
use docsync_test_utils::{FailingStore, Op, TestDirs, assert_absent, assert_content, seed};
use pretty_assertions::assert_eq;
use std::sync::Arc;

struct DiskPair {
    dirs: TestDirs,
    primary: DiskStore,
    secondary: DiskStore,
}

impl DiskPair {
    fn new() -> Self {
        let dirs = TestDirs::new();
        let primary = DiskStore::new(dirs.primary()).unwrap();
        let secondary = DiskStore::new(dirs.secondary()).unwrap();
        Self {
            dirs,
            primary,
            secondary,
        }
    }

    fn engine(&self) -> SyncEngine {
        SyncEngine::new(
            Arc::new(self.primary.clone()),
            Arc::new(self.secondary.clone()),
        )
    }

    /// One sync cycle the way a host runs it: load, run, save.
    async fn cycle(&self) -> docsync_core::Result<usize> {
        let path = self.dirs.snapshot_path();
        let mut snapshot = Snapshot::load(&path)?;
        let outcome = self
            .engine()
            .with_filter(|name: &str| !name.starts_with("_plug/") && !name.starts_with(".docsync/"))
            .run(&mut snapshot)
            .await;
        snapshot.save(&path)?;
        outcome.map(|report| report.operations)
    }
}

#[tokio::test]
async fn start_and_test_scenario_on_disk() {
    let pair = DiskPair::new();

    seed(&pair.primary, &[("start", "Hello")]).await;
    assert_eq!(pair.cycle().await.unwrap(), 1);
    assert_content(&pair.secondary, "start", "Hello").await;
    assert_eq!(pair.cycle().await.unwrap(), 0);

    seed(&pair.secondary, &[("start", "Hello!!"), ("test", "Test page")]).await;
    assert_eq!(pair.cycle().await.unwrap(), 2);
    assert_content(&pair.primary, "start", "Hello!!").await;
    assert_content(&pair.primary, "test", "Test page").await;

    seed(&pair.primary, &[("start", "primary wins")]).await;
    seed(&pair.secondary, &[("start", "secondary loses")]).await;
    let losing = pair.secondary.get_meta("start").await.unwrap().version;
    assert_eq!(pair.cycle().await.unwrap(), 1);

    let copy = conflict_copy_name("start", "conflicted", losing);
    assert_content(&pair.primary, "start", "primary wins").await;
    assert_content(&pair.secondary, "start", "primary wins").await;
    assert_content(&pair.primary, &copy, "secondary loses").await;
    assert_content(&pair.secondary, &copy, "secondary loses").await;
    assert_eq!(pair.cycle().await.unwrap(), 0);
}

#[tokio::test]
async fn nested_folders_sync_and_prune() {
    let pair = DiskPair::new();
    seed(&pair.primary, &[("journal/2024/01.md", "jan"), ("journal/2024/02.md", "feb")]).await;
    assert_eq!(pair.cycle().await.unwrap(), 2);
    TestDirs::assert_file(pair.dirs.secondary(), "journal/2024/02.md", "feb");

    pair.primary.delete("journal/2024/01.md").await.unwrap();
    pair.primary.delete("journal/2024/02.md").await.unwrap();
    assert_eq!(pair.cycle().await.unwrap(), 2);
    assert!(!pair.dirs.secondary().join("journal").exists());
}

#[tokio::test]
async fn snapshot_survives_between_engines() {
    let pair = DiskPair::new();
    seed(&pair.primary, &[("a.md", "a")]).await;
    pair.cycle().await.unwrap();

    let persisted = Snapshot::load(&pair.dirs.snapshot_path()).unwrap();
    assert!(persisted.contains("a.md"));

    // A fresh engine sees no work, and state files never leave the primary.
    assert_eq!(pair.cycle().await.unwrap(), 0);
    assert_absent(&pair.secondary, ".docsync/snapshot.json").await;
}

#[tokio::test]
async fn failed_cycle_persists_progress_and_resumes() {
    let pair = DiskPair::new();
    seed(&pair.primary, &[("a.md", "a"), ("b.md", "b"), ("c.md", "c")]).await;

    let path = pair.dirs.snapshot_path();
    let mut snapshot = Snapshot::load(&path).unwrap();
    let failing = FailingStore::new(pair.secondary.clone()).fail_on(Op::Write, "b.md");
    let engine = SyncEngine::new(Arc::new(pair.primary.clone()), Arc::new(failing))
        .with_filter(|name: &str| !name.starts_with(".docsync/"));

    let err = engine.run(&mut snapshot).await.unwrap_err();
    assert!(matches!(err, Error::Store { .. }));
    snapshot.save(&path).unwrap();

    let resumed = Snapshot::load(&path).unwrap();
    assert_eq!(resumed.names().collect::<Vec<_>>(), vec!["a.md"]);

    assert_eq!(pair.cycle().await.unwrap(), 2);
    assert_content(&pair.secondary, "c.md", "c").await;
}

#[tokio::test]
async fn disk_and_memory_stores_interoperate() {
    let dirs = TestDirs::new();
    let disk = DiskStore::new(dirs.primary()).unwrap();
    let memory = MemoryStore::new();
    let engine = SyncEngine::new(Arc::new(disk.clone()), Arc::new(memory.clone()));
    let mut snapshot = Snapshot::new();

    seed(&disk, &[("from-disk.md", "disk")]).await;
    seed(&memory, &[("from-memory.md", "memory")]).await;
    let report = engine.run(&mut snapshot).await.unwrap();

    assert_eq!(report.operations, 2);
    TestDirs::assert_file(dirs.primary(), "from-memory.md", "memory");
    assert_eq!(memory.contents("from-disk.md"), Some(b"disk".to_vec()));

    memory.delete("from-disk.md").await.unwrap();
    let report = engine.run(&mut snapshot).await.unwrap();
    assert_eq!(
        report.actions,
        vec![("from-disk.md".to_string(), SyncAction::DeleteOnPrimary)]
    );
    TestDirs::assert_missing(dirs.primary(), "from-disk.md");
}
