use async_trait::async_trait;
use linkpulse_core::cache::{DestinationCache, Result};
use linkpulse_core::{Alias, CacheError};
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// A Redis-backed [`DestinationCache`].
///
/// Destinations are stored as plain strings under `<prefix><alias>` and
/// written with `SET ... EX`, so Redis drops them once the TTL passes.
#[derive(Clone)]
pub struct RedisDestinationCache {
    conn: redis::aio::MultiplexedConnection,
    key_prefix: String,
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> CacheError {
    let message = format!("{operation}: {err}");
    if err.is_timeout() {
        CacheError::Timeout(message)
    } else if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() {
        CacheError::Unavailable(message)
    } else {
        CacheError::Operation(message)
    }
}

impl RedisDestinationCache {
    /// Creates a cache using the default `lp:dest:` key prefix.
    pub fn new(conn: redis::aio::MultiplexedConnection) -> Self {
        Self::with_prefix(conn, "lp:dest:")
    }

    pub fn with_prefix(
        conn: redis::aio::MultiplexedConnection,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
        }
    }

    /// Opens a multiplexed connection to `redis_url` and wraps it.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| CacheError::Initialization(format!("invalid redis url: {e}")))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| map_redis_error("failed to connect to Redis", e))?;
        Ok(Self::new(conn))
    }

    fn cache_key(&self, alias: &Alias) -> String {
        format!("{}{}", self.key_prefix, alias.as_str())
    }
}

impl std::fmt::Debug for RedisDestinationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisDestinationCache")
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DestinationCache for RedisDestinationCache {
    async fn get(&self, alias: &Alias) -> Result<Option<String>> {
        let key = self.cache_key(alias);

        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(destination)) => {
                trace!(alias = %alias, "Cache hit in Redis");
                Ok(Some(destination))
            }
            Ok(None) => {
                trace!(alias = %alias, "Cache miss in Redis");
                Ok(None)
            }
            Err(e) => {
                warn!(alias = %alias, error = %e, "Redis error on get");
                Err(map_redis_error("failed to fetch value from Redis", e))
            }
        }
    }

    async fn set(&self, alias: &Alias, destination: &str, ttl: Duration) -> Result<()> {
        let key = self.cache_key(alias);
        // EX rejects zero
        let seconds = ttl.as_secs().max(1);

        let mut conn = self.conn.clone();
        match conn.set_ex::<_, _, ()>(&key, destination, seconds).await {
            Ok(()) => {
                debug!(alias = %alias, ttl_secs = seconds, "Cached destination in Redis");
                Ok(())
            }
            Err(e) => {
                warn!(alias = %alias, error = %e, "Failed to cache destination in Redis");
                Err(map_redis_error("failed to write value to Redis", e))
            }
        }
    }
}
