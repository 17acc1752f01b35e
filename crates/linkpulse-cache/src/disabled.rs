use async_trait::async_trait;
use linkpulse_core::cache::{DestinationCache, Result};
use linkpulse_core::Alias;
use std::time::Duration;

/// A cache that never holds anything.
///
/// Every lookup misses, so resolution always goes to the store.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCache;

#[async_trait]
impl DestinationCache for DisabledCache {
    async fn get(&self, _alias: &Alias) -> Result<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _alias: &Alias, _destination: &str, _ttl: Duration) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_misses() {
        let cache = DisabledCache;
        let alias = Alias::new_unchecked("abc123");

        cache
            .set(&alias, "https://example.com", Duration::from_secs(60))
            .await
            .unwrap();

        assert!(cache.get(&alias).await.unwrap().is_none());
    }
}
