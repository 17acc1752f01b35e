use async_trait::async_trait;
use linkpulse_core::cache::{DestinationCache, Result};
use linkpulse_core::Alias;
use moka::future::Cache;
use moka::Expiry;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};
use typed_builder::TypedBuilder;

/// A cached destination together with the TTL it was stored with.
#[derive(Debug, Clone)]
struct CachedDestination {
    url: Arc<str>,
    ttl: Duration,
}

/// Expires each entry after the TTL handed to [`DestinationCache::set`].
struct PerEntryTtl;

impl Expiry<Alias, CachedDestination> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &Alias,
        value: &CachedDestination,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &Alias,
        value: &CachedDestination,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// An in-process destination cache backed by Moka.
///
/// Suited to single-node deployments or as the L1 in front of Redis.
#[derive(Debug, Clone)]
pub struct MokaDestinationCache {
    cache: Cache<Alias, CachedDestination>,
}

impl MokaDestinationCache {
    /// Creates a cache holding at most 10,000 destinations.
    pub fn new() -> Self {
        Self::with_capacity(10_000)
    }

    pub fn with_capacity(max_capacity: u64) -> Self {
        CacheConfig::builder().max_capacity(max_capacity).build().into()
    }

    /// Returns a builder for creating a custom cache configuration.
    pub fn builder() -> CacheConfigBuilder {
        CacheConfig::builder()
    }
}

impl Default for MokaDestinationCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DestinationCache for MokaDestinationCache {
    async fn get(&self, alias: &Alias) -> Result<Option<String>> {
        match self.cache.get(alias).await {
            Some(entry) => {
                trace!(alias = %alias, "Cache hit in Moka");
                Ok(Some(entry.url.to_string()))
            }
            None => {
                trace!(alias = %alias, "Cache miss in Moka");
                Ok(None)
            }
        }
    }

    async fn set(&self, alias: &Alias, destination: &str, ttl: Duration) -> Result<()> {
        let entry = CachedDestination {
            url: Arc::from(destination),
            ttl,
        };
        self.cache.insert(alias.clone(), entry).await;
        debug!(alias = %alias, ttl_secs = ttl.as_secs(), "Cached destination in Moka");
        Ok(())
    }
}

/// Configuration for creating a [`MokaDestinationCache`].
#[derive(Debug, TypedBuilder, Default)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold.
    #[builder(default, setter(strip_option))]
    max_capacity: Option<u64>,
}

impl From<CacheConfig> for MokaDestinationCache {
    fn from(config: CacheConfig) -> Self {
        let mut builder = Cache::builder().expire_after(PerEntryTtl);

        if let Some(capacity) = config.max_capacity {
            builder = builder.max_capacity(capacity);
        }

        MokaDestinationCache {
            cache: builder.build(),
        }
    }
}
