//! Store seeding and assertion helpers.

use docsync_fs::{FileStore, WriteOptions};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write each `(name, content)` pair to `store` as a user edit.
///
/// # Panics
/// Panics if any write fails.
pub async fn seed(store: &dyn FileStore, files: &[(&str, &str)]) {
    for (name, content) in files {
        store
            .write(name, content.as_bytes(), WriteOptions::default())
            .await
            .unwrap_or_else(|e| panic!("seeding {name} failed: {e}"));
    }
}

/// Assert that `name` exists in `store` with exactly `expected` as content.
///
/// # Panics
/// Panics with a descriptive message if the file is missing or differs.
pub async fn assert_content(store: &dyn FileStore, name: &str, expected: &str) {
    let (data, _) = store
        .read(name)
        .await
        .unwrap_or_else(|e| panic!("Expected {name} to exist: {e}"));
    let actual = String::from_utf8_lossy(&data);
    assert_eq!(
        actual, expected,
        "Content of {name} differs.\nExpected: {expected}\nActual: {actual}"
    );
}

/// Assert that `name` does not exist in `store`.
///
/// # Panics
/// Panics if the file exists or the store reports anything but NotFound.
pub async fn assert_absent(store: &dyn FileStore, name: &str) {
    match store.read(name).await {
        Err(e) if e.is_not_found() => {}
        Err(e) => panic!("Unexpected error reading {name}: {e}"),
        Ok(_) => panic!("Expected {name} NOT to exist"),
    }
}

/// A pair of temporary directories backing the two sides of a sync.
pub struct TestDirs {
    primary: TempDir,
    secondary: TempDir,
}

impl Default for TestDirs {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDirs {
    pub fn new() -> Self {
        Self {
            primary: TempDir::new().unwrap(),
            secondary: TempDir::new().unwrap(),
        }
    }

    pub fn primary(&self) -> &Path {
        self.primary.path()
    }

    pub fn secondary(&self) -> &Path {
        self.secondary.path()
    }

    /// Default snapshot location for this pair.
    pub fn snapshot_path(&self) -> PathBuf {
        self.primary().join(".docsync").join("snapshot.json")
    }

    /// Write `content` to `name` under `root`, creating parent directories.
    pub fn write(root: &Path, name: &str, content: &str) {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    /// Assert that `name` under `root` holds exactly `expected`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or differs.
    pub fn assert_file(root: &Path, name: &str, expected: &str) {
        let path = root.join(name);
        let actual = fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()));
        assert_eq!(
            actual,
            expected,
            "File {} differs.\nExpected: {expected}\nActual: {actual}",
            path.display()
        );
    }

    /// Assert that `name` under `root` does not exist.
    pub fn assert_missing(root: &Path, name: &str) {
        let path = root.join(name);
        assert!(
            !path.exists(),
            "Expected file NOT to exist: {}",
            path.display()
        );
    }
}
