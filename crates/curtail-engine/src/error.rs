use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors reported by the link engine.
///
/// `InvalidUrl` and `NotFound` are client-input outcomes; the other
/// kinds are internal and are also routed to the configured error
/// reporter.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("short code not found: {0}")]
    NotFound(String),
    #[error("freshly encoded code already mapped: {0}")]
    CodeCollision(String),
    #[error("storage error: {0}")]
    Storage(String),
}
