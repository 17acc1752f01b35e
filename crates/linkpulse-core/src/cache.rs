use crate::alias::Alias;
use crate::error::CacheError;
use async_trait::async_trait;
use std::time::Duration;

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// An ephemeral alias → destination cache.
///
/// Only the destination string is cached; click counters always live in the
/// [`AliasStore`](crate::AliasStore). Implementations can use Redis,
/// in-memory caches, or other storage backends.
#[async_trait]
pub trait DestinationCache: Send + Sync + 'static {
    /// Get the cached destination for an alias.
    ///
    /// Returns `Ok(None)` if the key is not in the cache.
    async fn get(&self, alias: &Alias) -> Result<Option<String>>;

    /// Store a destination that expires after `ttl`.
    async fn set(&self, alias: &Alias, destination: &str, ttl: Duration) -> Result<()>;
}
