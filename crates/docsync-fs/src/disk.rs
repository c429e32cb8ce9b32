//! File store backed by a local directory

use crate::io::{self, TEMP_SUFFIX, map_not_found};
use crate::meta::{FileMeta, Perm, Version, WriteOptions};
use crate::path::{NormalizedPath, validate_store_name};
use crate::store::FileStore;
use crate::{Error, Result};
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A file store rooted at a local directory.
///
/// File names are `/`-separated paths relative to the root. Versions are
/// modification times in milliseconds; a write that would leave the
/// modification time unchanged has it bumped past the previous version.
///
/// Writes are atomic (temp file plus rename). `WriteOptions::perm` maps to
/// the read-only attribute. The `self_update` flag is accepted but has no
/// effect: this store has no change feed.
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        fs::create_dir_all(root).map_err(|e| Error::io(root, e))?;
        let root = dunce::canonicalize(root).map_err(|e| Error::io(root, e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> Result<PathBuf> {
        validate_store_name(name)?;
        Ok(NormalizedPath::new(&self.root).join(name).to_native())
    }

    fn list_blocking(root: &Path) -> Result<Vec<FileMeta>> {
        let mut files = Vec::new();
        let mut pending = vec![root.to_path_buf()];
        while let Some(dir) = pending.pop() {
            let entries = fs::read_dir(&dir).map_err(|e| Error::io(&dir, e))?;
            for entry in entries {
                let entry = entry.map_err(|e| Error::io(&dir, e))?;
                let path = entry.path();
                let file_type = entry.file_type().map_err(|e| Error::io(&path, e))?;
                if file_type.is_dir() {
                    pending.push(path);
                    continue;
                }
                if !file_type.is_file() {
                    continue;
                }
                let Some(name) = relative_name(root, &path) else {
                    continue;
                };
                if name.ends_with(TEMP_SUFFIX) {
                    continue;
                }
                let metadata = entry.metadata().map_err(|e| Error::io(&path, e))?;
                files.push(meta_from_fs(&name, &path, &metadata)?);
            }
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    fn stat_blocking(path: &Path, name: &str) -> Result<FileMeta> {
        let metadata = fs::metadata(path).map_err(|e| map_not_found(e, path, name))?;
        if !metadata.is_file() {
            return Err(Error::not_found(name));
        }
        meta_from_fs(name, path, &metadata)
    }

    fn write_blocking(
        path: &Path,
        name: &str,
        data: &[u8],
        perm: Option<Perm>,
    ) -> Result<FileMeta> {
        let previous = match Self::stat_blocking(path, name) {
            Ok(meta) => Some(meta),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };
        if let Some(meta) = &previous
            && meta.perm == Perm::ReadOnly
        {
            set_readonly(path, false)?;
        }
        let previous = previous.map(|meta| meta.version);

        io::write_atomic(path, data)?;

        let mut meta = Self::stat_blocking(path, name)?;
        if let Some(previous) = previous
            && meta.version <= previous
        {
            let bumped = Version(previous.0 + 1);
            let file = fs::File::options()
                .write(true)
                .open(path)
                .map_err(|e| Error::io(path, e))?;
            file.set_modified(UNIX_EPOCH + Duration::from_millis(bumped.0))
                .map_err(|e| Error::io(path, e))?;
            tracing::debug!(name, %previous, %bumped, "bumped modification time after write");
            meta.version = bumped;
        }

        if perm == Some(Perm::ReadOnly) {
            set_readonly(path, true)?;
            meta.perm = Perm::ReadOnly;
        }
        Ok(meta)
    }

    fn delete_blocking(root: &Path, path: &Path, name: &str) -> Result<()> {
        fs::remove_file(path).map_err(|e| map_not_found(e, path, name))?;

        // Prune directories left empty by the delete, stopping at the root.
        let mut dir = path.parent();
        while let Some(current) = dir {
            if current == root || fs::remove_dir(current).is_err() {
                break;
            }
            dir = current.parent();
        }
        Ok(())
    }
}

#[async_trait]
impl FileStore for DiskStore {
    async fn list(&self) -> Result<Vec<FileMeta>> {
        let root = self.root.clone();
        blocking(move || Self::list_blocking(&root)).await
    }

    async fn read(&self, name: &str) -> Result<(Vec<u8>, FileMeta)> {
        let path = self.resolve(name)?;
        let name = name.to_string();
        blocking(move || {
            let data = io::read_bytes(&path, &name)?;
            let meta = Self::stat_blocking(&path, &name)?;
            Ok((data, meta))
        })
        .await
    }

    async fn write(&self, name: &str, data: &[u8], options: WriteOptions) -> Result<FileMeta> {
        let path = self.resolve(name)?;
        let name = name.to_string();
        let data = data.to_vec();
        blocking(move || Self::write_blocking(&path, &name, &data, options.perm)).await
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let path = self.resolve(name)?;
        let root = self.root.clone();
        let name = name.to_string();
        blocking(move || Self::delete_blocking(&root, &path, &name)).await
    }

    async fn get_meta(&self, name: &str) -> Result<FileMeta> {
        let path = self.resolve(name)?;
        let name = name.to_string();
        blocking(move || Self::stat_blocking(&path, &name)).await
    }
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::backend(format!("blocking task failed: {e}")))?
}

fn set_readonly(path: &Path, readonly: bool) -> Result<()> {
    let mut permissions = fs::metadata(path)
        .map_err(|e| Error::io(path, e))?
        .permissions();
    permissions.set_readonly(readonly);
    fs::set_permissions(path, permissions).map_err(|e| Error::io(path, e))
}

fn relative_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    Some(NormalizedPath::new(relative).as_str().to_string())
}

fn meta_from_fs(name: &str, path: &Path, metadata: &fs::Metadata) -> Result<FileMeta> {
    let modified = metadata.modified().map_err(|e| Error::io(path, e))?;
    let perm = if metadata.permissions().readonly() {
        Perm::ReadOnly
    } else {
        Perm::ReadWrite
    };
    Ok(FileMeta::new(
        name,
        version_of(modified),
        metadata.len(),
        perm,
    ))
}

fn version_of(time: SystemTime) -> Version {
    let millis = time
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    Version(u64::try_from(millis).unwrap_or(u64::MAX))
}
