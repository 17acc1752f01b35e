use async_trait::async_trait;
use linkpulse_core::cache::{DestinationCache, Result};
use linkpulse_core::Alias;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// A two-level cache: a fast local L1 (typically Moka) in front of a shared
/// L2 (typically Redis).
///
/// - **Get**: try L1, then L2. An L2 hit is copied into L1 with the
///   configured backfill TTL.
/// - **Set**: write-through to L2, then L1.
/// - **Delete**: remove from L1, then L2.
///
/// A failed L1 backfill is logged and does not turn an L2 hit into an error.
#[derive(Debug, Clone)]
pub struct LayeredCache<L1, L2> {
    l1: L1,
    l2: L2,
    backfill_ttl: Duration,
}

impl<L1, L2> LayeredCache<L1, L2> {
    /// Composes `l1` and `l2`. Entries copied up from L2 live in L1 for
    /// `backfill_ttl`.
    pub fn new(l1: L1, l2: L2, backfill_ttl: Duration) -> Self {
        Self {
            l1,
            l2,
            backfill_ttl,
        }
    }

    pub fn l1(&self) -> &L1 {
        &self.l1
    }

    pub fn l2(&self) -> &L2 {
        &self.l2
    }
}

#[async_trait]
impl<L1, L2> DestinationCache for LayeredCache<L1, L2>
where
    L1: DestinationCache,
    L2: DestinationCache,
{
    async fn get(&self, alias: &Alias) -> Result<Option<String>> {
        if let Some(destination) = self.l1.get(alias).await? {
            trace!(alias = %alias, "L1 cache hit");
            return Ok(Some(destination));
        }

        match self.l2.get(alias).await? {
            Some(destination) => {
                debug!(alias = %alias, "L2 cache hit, backfilling L1");
                if let Err(e) = self.l1.set(alias, &destination, self.backfill_ttl).await {
                    warn!(alias = %alias, error = %e, "Failed to backfill L1 cache");
                }
                Ok(Some(destination))
            }
            None => {
                trace!(alias = %alias, "L2 cache miss");
                Ok(None)
            }
        }
    }

    async fn set(&self, alias: &Alias, destination: &str, ttl: Duration) -> Result<()> {
        self.l2.set(alias, destination, ttl).await?;
        self.l1.set(alias, destination, ttl).await?;
        trace!(alias = %alias, "Stored destination in both cache layers");
        Ok(())
    }
}
