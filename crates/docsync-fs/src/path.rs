//! Normalized path handling and store name validation

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// A filesystem path kept with `/` separators.
///
/// Store roots and config locations pass through this type so that names
/// built by joining store-relative file names look the same on every
/// platform. It becomes a native [`PathBuf`] only when handed to `std::fs`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedPath {
    inner: String,
}

impl NormalizedPath {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            inner: path.as_ref().to_string_lossy().replace('\\', "/"),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Append a store-relative `name` with exactly one separator between.
    pub fn join(&self, name: &str) -> Self {
        let base = self.inner.trim_end_matches('/');
        let name = name.replace('\\', "/");
        Self {
            inner: format!("{base}/{}", name.trim_start_matches('/')),
        }
    }

    /// Extension of the last segment; dotfiles like `.profile` have none.
    pub fn extension(&self) -> Option<&str> {
        let last = self.inner.trim_end_matches('/').rsplit('/').next()?;
        match last.rfind('.') {
            Some(0) | None => None,
            Some(dot) => Some(&last[dot + 1..]),
        }
    }

    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }
}

/// Validate a store-relative file name.
///
/// Names are `/`-separated, relative, and may not escape the store root.
pub fn validate_store_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_name(name, "empty name"));
    }
    if name.contains('\\') {
        return Err(Error::invalid_name(name, "backslash in name"));
    }
    if name.contains('\0') {
        return Err(Error::invalid_name(name, "NUL byte in name"));
    }
    if name.starts_with('/') || Path::new(name).is_absolute() {
        return Err(Error::invalid_name(name, "absolute name"));
    }
    for segment in name.split('/') {
        match segment {
            "" => return Err(Error::invalid_name(name, "empty path segment")),
            "." | ".." => return Err(Error::invalid_name(name, "relative path segment")),
            _ => {}
        }
    }
    Ok(())
}
