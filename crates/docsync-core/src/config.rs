//! Sync configuration
//!
//! Loaded through [`ConfigStore`], so TOML, JSON and YAML files all work:
//!
//! ```toml
//! excluded_prefixes = ["_plug/", "drafts/"]
//! markdown_extensions = ["md", "markdown"]
//! conflict_infix = "conflicted"
//! ```

use crate::Result;
use crate::conflict::{DEFAULT_CONFLICT_INFIX, PrimaryWins};
use crate::filter::{ExcludePrefixes, PLUG_PREFIX};
use docsync_content::ContentComparator;
use docsync_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};

/// Tunables for a sync engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Names starting with any of these never take part in sync
    pub excluded_prefixes: Vec<String>,
    /// Extensions compared with directive bodies stripped
    pub markdown_extensions: Vec<String>,
    /// Marker inserted into conflict-copy names
    pub conflict_infix: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            excluded_prefixes: vec![PLUG_PREFIX.to_string()],
            markdown_extensions: vec!["md".to_string()],
            conflict_infix: DEFAULT_CONFLICT_INFIX.to_string(),
        }
    }
}

impl SyncConfig {
    /// Load configuration from `path`, falling back to defaults if the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = path.as_str(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Ok(ConfigStore::new().load(path)?)
    }

    pub fn save(&self, path: &NormalizedPath) -> Result<()> {
        Ok(ConfigStore::new().save(path, self)?)
    }

    pub fn filter(&self) -> ExcludePrefixes {
        ExcludePrefixes::new(self.excluded_prefixes.iter().cloned())
    }

    pub fn comparator(&self) -> ContentComparator {
        ContentComparator::new(self.markdown_extensions.iter().cloned())
    }

    pub fn resolver(&self) -> PrimaryWins {
        PrimaryWins::new(self.comparator()).with_conflict_infix(self.conflict_infix.clone())
    }
}
