use crate::error::{ResolverError, Result};
use linkpulse_analytics::EventRecorder;
use linkpulse_core::{Alias, AliasStore, DestinationCache, EventLog, RequestMetadata};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, trace, warn};
use typed_builder::TypedBuilder;

/// Tunables for [`ResolverService`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct ResolverSettings {
    /// How long a destination stays cached after a store lookup.
    #[builder(default = Duration::from_secs(24 * 60 * 60))]
    pub cache_ttl: Duration,
    /// Upper bound on every single cache call.
    #[builder(default = Duration::from_millis(50))]
    pub cache_timeout: Duration,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Resolves aliases to destinations and accounts for every resolution.
///
/// The cache only ever answers "where does this alias point". Whether the
/// destination came from the cache or the store, the store counter is
/// incremented and a click event is recorded before the destination is
/// returned. A cache that errors or does not answer within
/// `cache_timeout` is treated as a miss.
pub struct ResolverService<S: ?Sized, C: ?Sized, L: ?Sized> {
    store: Arc<S>,
    cache: Arc<C>,
    recorder: EventRecorder<L>,
    settings: ResolverSettings,
}

impl<S: ?Sized, C: ?Sized, L: ?Sized> Clone for ResolverService<S, C, L> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
            recorder: self.recorder.clone(),
            settings: self.settings.clone(),
        }
    }
}

impl<S, C, L> ResolverService<S, C, L>
where
    S: AliasStore + ?Sized,
    C: DestinationCache + ?Sized,
    L: EventLog + ?Sized,
{
    pub fn new(
        store: Arc<S>,
        cache: Arc<C>,
        recorder: EventRecorder<L>,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            store,
            cache,
            recorder,
            settings,
        }
    }

    pub async fn resolve(&self, alias: &Alias, metadata: &RequestMetadata) -> Result<String> {
        let destination = match self.cached_destination(alias).await {
            Some(destination) => destination,
            None => {
                let link = self
                    .store
                    .lookup(alias)
                    .await
                    .map_err(|e| store_fault(alias, e))?
                    .ok_or_else(|| ResolverError::NotFound(alias.to_string()))?;
                self.populate_cache(alias, &link.destination_url).await;
                link.destination_url
            }
        };

        let counted = self
            .store
            .increment_click(alias)
            .await
            .map_err(|e| store_fault(alias, e))?
            .ok_or_else(|| ResolverError::NotFound(alias.to_string()))?;

        self.recorder
            .record(counted.link_id, metadata)
            .await
            .map_err(|e| store_fault(alias, e))?;

        debug!(alias = %alias, clicks = counted.clicks, "Resolved alias");
        Ok(destination)
    }

    async fn cached_destination(&self, alias: &Alias) -> Option<String> {
        match timeout(self.settings.cache_timeout, self.cache.get(alias)).await {
            Ok(Ok(Some(destination))) => {
                trace!(alias = %alias, "Destination served from cache");
                Some(destination)
            }
            Ok(Ok(None)) => None,
            Ok(Err(e)) => {
                warn!(alias = %alias, error = %e, "Cache lookup failed, falling back to store");
                None
            }
            Err(_) => {
                warn!(
                    alias = %alias,
                    timeout_ms = self.settings.cache_timeout.as_millis() as u64,
                    "Cache lookup timed out, falling back to store"
                );
                None
            }
        }
    }

    async fn populate_cache(&self, alias: &Alias, destination: &str) {
        let set = self.cache.set(alias, destination, self.settings.cache_ttl);
        match timeout(self.settings.cache_timeout, set).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(alias = %alias, error = %e, "Failed to populate cache"),
            Err(_) => warn!(alias = %alias, "Cache populate timed out"),
        }
    }
}

fn store_fault(alias: &Alias, err: linkpulse_core::StorageError) -> ResolverError {
    error!(alias = %alias, error = %err, "Store failure during resolution");
    ResolverError::from(err)
}
