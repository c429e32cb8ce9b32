//! Content equality checks used to detect false conflicts

use crate::directive::strip_directive_bodies;
use crate::error::Result;
use crate::format::Format;

/// Byte equality, length first.
pub fn bytes_equal(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a == b
}

/// Decides whether two versions of a file carry the same content.
///
/// Markdown files are compared after stripping directive bodies. Any
/// normalization failure falls back to raw byte comparison.
#[derive(Debug, Clone)]
pub struct ContentComparator {
    markdown_extensions: Vec<String>,
}

impl Default for ContentComparator {
    fn default() -> Self {
        Self::new(["md"])
    }
}

impl ContentComparator {
    pub fn new<I, S>(markdown_extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markdown_extensions: markdown_extensions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn format_of(&self, name: &str) -> Format {
        Format::from_name(name, &self.markdown_extensions)
    }

    /// True if `a` and `b` are the same document.
    pub fn equivalent(&self, name: &str, a: &[u8], b: &[u8]) -> bool {
        if bytes_equal(a, b) {
            return true;
        }
        match self.format_of(name) {
            Format::Binary => false,
            Format::Markdown => match (normalize_markdown(a), normalize_markdown(b)) {
                (Ok(left), Ok(right)) => left == right,
                (Err(e), _) | (_, Err(e)) => {
                    tracing::warn!(
                        name,
                        error = %e,
                        "markdown normalization failed, comparing raw bytes"
                    );
                    false
                }
            },
        }
    }
}

/// Decode markdown and strip its directive bodies.
pub fn normalize_markdown(data: &[u8]) -> Result<String> {
    let text = std::str::from_utf8(data)?;
    strip_directive_bodies(text)
}
