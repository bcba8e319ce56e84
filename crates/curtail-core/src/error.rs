use thiserror::Error;

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors produced by storage backends.
///
/// Callers match on the kind, never on identity. Conflict kinds are
/// part of the normal dedup flow; `Unavailable` wraps an opaque
/// backend I/O cause.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("no mapping for the requested key")]
    NotFound,
    #[error("digest already mapped: {0}")]
    DigestExists(String),
    #[error("code already mapped: {0}")]
    CodeExists(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// Whether this error is one of the first-writer-wins conflicts.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            StorageError::DigestExists(_) | StorageError::CodeExists(_)
        )
    }
}
