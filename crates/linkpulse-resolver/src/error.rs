use linkpulse_core::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResolverError>;

/// Failures surfaced by resolution. Cache faults never appear here; they
/// degrade to a store lookup instead.
#[derive(Debug, Clone, Error)]
pub enum ResolverError {
    #[error("short link not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<StorageError> for ResolverError {
    fn from(err: StorageError) -> Self {
        ResolverError::Storage(err.to_string())
    }
}
