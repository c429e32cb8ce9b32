//! Sync candidate filtering

/// Prefix under which plugin-generated artifacts live
pub const PLUG_PREFIX: &str = "_plug/";

/// Decides which file names take part in sync.
///
/// Any `Fn(&str) -> bool` closure is a filter.
pub trait CandidateFilter: Send + Sync {
    fn is_sync_candidate(&self, name: &str) -> bool;
}

impl<F> CandidateFilter for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_sync_candidate(&self, name: &str) -> bool {
        self(name)
    }
}

/// Excludes every name under one of a set of prefixes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludePrefixes {
    prefixes: Vec<String>,
}

impl Default for ExcludePrefixes {
    fn default() -> Self {
        Self::new([PLUG_PREFIX])
    }
}

impl ExcludePrefixes {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Add another excluded prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

impl CandidateFilter for ExcludePrefixes {
    fn is_sync_candidate(&self, name: &str) -> bool {
        !self.prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_artifacts_are_excluded_by_default() {
        let filter = ExcludePrefixes::default();
        assert!(!filter.is_sync_candidate("_plug/core.plug.js"));
        assert!(filter.is_sync_candidate("index.md"));
        assert!(filter.is_sync_candidate("notes/_plug/not-a-plugin.md"));
    }

    #[test]
    fn extra_prefixes_are_honored() {
        let filter = ExcludePrefixes::default().with_prefix(".docsync/");
        assert!(!filter.is_sync_candidate(".docsync/snapshot.json"));
        assert!(!filter.is_sync_candidate("_plug/x.js"));
    }

    #[test]
    fn closures_are_filters() {
        let only_markdown = |name: &str| name.ends_with(".md");
        assert!(only_markdown.is_sync_candidate("a.md"));
        assert!(!only_markdown.is_sync_candidate("a.png"));
    }
}
