//! Error types for docsync-content

/// Result type for docsync-content operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while normalizing content
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Directive #{kind} opened at byte {position} is never closed")]
    UnclosedDirective { kind: String, position: usize },

    #[error("Closing /{kind} at byte {position} has no matching opening directive")]
    UnbalancedDirective { kind: String, position: usize },

    #[error("Closing /{found} at byte {position} does not match open #{expected}")]
    MismatchedDirective {
        expected: String,
        found: String,
        position: usize,
    },

    #[error("Content is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}
