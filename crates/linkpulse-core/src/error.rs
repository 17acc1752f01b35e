use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid alias: {0}")]
    InvalidAlias(String),
    #[error("invalid topic: {0}")]
    InvalidTopic(String),
    #[error("invalid owner: {0}")]
    InvalidOwner(String),
}

/// Errors raised by [`DestinationCache`](crate::DestinationCache) backends.
///
/// The resolver never surfaces these; they only decide what gets logged.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("cache operation timed out: {0}")]
    Timeout(String),
    #[error("cache initialization failed: {0}")]
    Initialization(String),
    #[error("cache operation failed: {0}")]
    Operation(String),
}

/// Errors raised by [`AliasStore`](crate::AliasStore) and
/// [`EventLog`](crate::EventLog) backends.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("alias already exists: {0}")]
    Conflict(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
}
