//! Requires Docker: run with `cargo test -p linkpulse-cache -- --ignored`.

use std::time::Duration;

use linkpulse_cache::{DestinationCache, LayeredCache, MokaDestinationCache, RedisDestinationCache};
use linkpulse_core::Alias;
use linkpulse_test_infra::redis::RedisServer;
use redis::AsyncCommands;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

struct RedisFixture {
    redis: RedisServer,
    redis_url: String,
}

impl RedisFixture {
    async fn start() -> Self {
        let redis = RedisServer::new().await.expect("start redis");
        let redis_url = redis.redis_url().await.expect("redis url");
        Self { redis, redis_url }
    }

    async fn connection(&self) -> redis::aio::MultiplexedConnection {
        redis::Client::open(self.redis_url.as_str())
            .expect("redis client")
            .get_multiplexed_async_connection()
            .await
            .expect("redis connection")
    }
}

#[tokio::test]
#[ignore = "requires docker"]
async fn get_and_set() {
    let fixture = RedisFixture::start().await;
    let cache = RedisDestinationCache::connect(&fixture.redis_url)
        .await
        .unwrap();
    let alias = Alias::new("test123").unwrap();

    assert!(cache.get(&alias).await.unwrap().is_none());

    cache.set(&alias, "https://example.com", DAY).await.unwrap();
    assert_eq!(
        cache.get(&alias).await.unwrap().as_deref(),
        Some("https://example.com")
    );
}

#[tokio::test]
#[ignore = "requires docker"]
async fn set_applies_ttl_and_prefix() {
    let fixture = RedisFixture::start().await;
    let mut conn = fixture.connection().await;
    let cache = RedisDestinationCache::with_prefix(conn.clone(), "test:");
    let alias = Alias::new("ttl123").unwrap();

    cache.set(&alias, "https://example.com", DAY).await.unwrap();

    let raw: Option<String> = conn.get("test:ttl123").await.unwrap();
    assert_eq!(raw.as_deref(), Some("https://example.com"));

    let ttl: i64 = conn.ttl("test:ttl123").await.unwrap();
    assert!(ttl > 0 && ttl <= DAY.as_secs() as i64);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn layered_cache_backfills_from_redis() {
    let fixture = RedisFixture::start().await;
    let redis = RedisDestinationCache::new(fixture.connection().await);
    let alias = Alias::new("layered1").unwrap();
    redis.set(&alias, "https://example.com", DAY).await.unwrap();

    let cache = LayeredCache::new(MokaDestinationCache::new(), redis, DAY);
    assert_eq!(
        cache.get(&alias).await.unwrap().as_deref(),
        Some("https://example.com")
    );
    assert!(cache.l1().get(&alias).await.unwrap().is_some());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn errors_once_redis_is_gone() {
    let fixture = RedisFixture::start().await;
    let cache = RedisDestinationCache::new(fixture.connection().await);
    let alias = Alias::new("outage1").unwrap();

    fixture.redis.stop().await.unwrap();

    assert!(cache.get(&alias).await.is_err());
}
