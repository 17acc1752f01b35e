use linkpulse_core::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[derive(Debug, Clone, Error)]
pub enum AnalyticsError {
    /// The alias does not exist or belongs to another owner.
    #[error("short link not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<StorageError> for AnalyticsError {
    fn from(err: StorageError) -> Self {
        AnalyticsError::Storage(err.to_string())
    }
}
