//! [`FailingStore`]: a store wrapper that fails on request.

use async_trait::async_trait;
use docsync_fs::{Error, FileMeta, FileStore, Result, WriteOptions};
use std::fmt;

/// A [`FileStore`] operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    List,
    Read,
    Write,
    Delete,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::List => "list",
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// Wraps a store and returns [`Error::Backend`] for selected operations,
/// standing in for a store that went offline mid-run.
///
/// # Example
///
/// ```rust,no_run
/// use docsync_fs::MemoryStore;
/// use docsync_test_utils::{FailingStore, Op};
///
/// let store = FailingStore::new(MemoryStore::new()).fail_on(Op::Write, "b.md");
/// ```
pub struct FailingStore<S> {
    inner: S,
    rules: Vec<(Op, Option<String>)>,
}

impl<S: FileStore> FailingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            rules: Vec::new(),
        }
    }

    /// Fail `op` when applied to `name`.
    pub fn fail_on(mut self, op: Op, name: impl Into<String>) -> Self {
        self.rules.push((op, Some(name.into())));
        self
    }

    /// Fail `op` for every name.
    pub fn fail_all(mut self, op: Op) -> Self {
        self.rules.push((op, None));
        self
    }

    /// The wrapped store, bypassing injected failures.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn check(&self, op: Op, name: Option<&str>) -> Result<()> {
        let hit = self.rules.iter().any(|(rule_op, rule_name)| {
            *rule_op == op
                && match rule_name {
                    None => true,
                    Some(rule_name) => Some(rule_name.as_str()) == name,
                }
        });
        if hit {
            return Err(Error::backend(format!(
                "injected {op} failure for {}",
                name.unwrap_or("*")
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl<S: FileStore> FileStore for FailingStore<S> {
    async fn list(&self) -> Result<Vec<FileMeta>> {
        self.check(Op::List, None)?;
        self.inner.list().await
    }

    async fn read(&self, name: &str) -> Result<(Vec<u8>, FileMeta)> {
        self.check(Op::Read, Some(name))?;
        self.inner.read(name).await
    }

    async fn write(&self, name: &str, data: &[u8], options: WriteOptions) -> Result<FileMeta> {
        self.check(Op::Write, Some(name))?;
        self.inner.write(name, data, options).await
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.check(Op::Delete, Some(name))?;
        self.inner.delete(name).await
    }
}
