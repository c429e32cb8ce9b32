//! Content normalization and comparison for docsync
//!
//! Markdown documents may contain directives: HTML-comment-delimited blocks
//! whose bodies are rendered from other content and can be regenerated at
//! any time. Two copies of a document that differ only inside directive
//! bodies are the same document for conflict purposes.

pub mod compare;
pub mod directive;
pub mod error;
pub mod format;

pub use compare::{ContentComparator, bytes_equal};
pub use directive::{Directive, find_directives, strip_directive_bodies};
pub use error::{Error, Result};
pub use format::Format;
