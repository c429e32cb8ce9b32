//! Format detection from file names

use serde::{Deserialize, Serialize};

/// Content formats the comparator distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    Markdown,
    Binary,
}

impl Format {
    /// Detect the format of `name` given the configured markdown extensions.
    ///
    /// Extensions are matched case-insensitively and without the dot.
    pub fn from_name<S: AsRef<str>>(name: &str, markdown_extensions: &[S]) -> Self {
        let Some(ext) = extension(name) else {
            return Self::Binary;
        };
        if markdown_extensions
            .iter()
            .any(|m| m.as_ref().eq_ignore_ascii_case(ext))
        {
            Self::Markdown
        } else {
            Self::Binary
        }
    }
}

/// Extension of the last path segment of a `/`-separated name.
///
/// Dotfiles have no extension.
pub fn extension(name: &str) -> Option<&str> {
    let file_name = name.rsplit('/').next()?;
    let idx = file_name.rfind('.')?;
    if idx == 0 {
        None
    } else {
        Some(&file_name[idx + 1..])
    }
}
