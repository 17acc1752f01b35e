//! Destination cache implementations shared across Linkpulse services.

pub mod disabled;
pub mod layered;
pub mod moka;
pub mod redis;

pub use disabled::DisabledCache;
pub use layered::LayeredCache;
pub use linkpulse_core::cache::{DestinationCache, Result};
pub use linkpulse_core::CacheError;
pub use moka::{CacheConfig, MokaDestinationCache};
pub use redis::RedisDestinationCache;
