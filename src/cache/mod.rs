//! Cache Module
//!
//! The cache gateway seam and its implementations: Redis for production,
//! an in-memory TTL map for tests and local runs. Every failure of the
//! backing store surfaces as the soft [`CacheUnavailable`] signal.

mod entry;
mod keys;
mod memory;
mod redis_cache;
mod stats;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

// Re-export public types
pub use entry::CacheEntry;
pub use keys::CacheKey;
pub use memory::MemoryCache;
pub use redis_cache::{RedisCache, RedisSettings};
pub use stats::{CacheMetrics, CacheStats};

// == Public Constants ==
/// TTL applied to every populated key
pub const CACHE_TTL: Duration = Duration::from_secs(60);

// == Cache Unavailable ==
/// Soft failure of the cache store. Callers treat it as "absent" or "no-op".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cache unavailable: {0}")]
pub struct CacheUnavailable(pub String);

impl From<redis::RedisError> for CacheUnavailable {
    fn from(err: redis::RedisError) -> Self {
        CacheUnavailable(err.to_string())
    }
}

// == Cache Gateway ==
/// Key-value operations the coordinator needs from a cache store.
#[async_trait]
pub trait CacheGateway: Send + Sync {
    /// Returns the cached value, or `None` when the key is absent or expired.
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheUnavailable>;

    /// Stores `value` under `key`, expiring after `ttl`.
    async fn set_with_ttl(
        &self,
        key: &CacheKey,
        value: &str,
        ttl: Duration,
    ) -> Result<(), CacheUnavailable>;

    /// Removes `key`. Deleting an absent key succeeds.
    async fn delete(&self, key: &CacheKey) -> Result<(), CacheUnavailable>;

    /// Releases the underlying connection.
    async fn close(&self) -> Result<(), CacheUnavailable>;
}
