//! In-memory cache gateway
//!
//! HashMap storage with per-entry TTL, used by tests and local runs. It can
//! be switched to "unreachable" to exercise the soft-failure paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CacheEntry, CacheGateway, CacheKey, CacheUnavailable};

// == Memory Cache ==
#[derive(Debug)]
pub struct MemoryCache {
    /// Key-value storage, keyed by the rendered cache key
    entries: RwLock<HashMap<String, CacheEntry>>,
    /// When false every operation fails with `CacheUnavailable`
    available: AtomicBool,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulates the cache store going away (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Returns true if a live entry exists for `key`. Ignores availability.
    pub async fn contains(&self, key: &CacheKey) -> bool {
        self.entries
            .read()
            .await
            .get(&key.to_string())
            .is_some_and(|entry| !entry.is_expired())
    }

    /// Raw stored value for `key`, expired or not. Ignores availability.
    pub async fn peek(&self, key: &CacheKey) -> Option<String> {
        self.entries
            .read()
            .await
            .get(&key.to_string())
            .map(|entry| entry.value.clone())
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn ensure_available(&self) -> Result<(), CacheUnavailable> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CacheUnavailable("memory cache offline".to_string()))
        }
    }
}

#[async_trait]
impl CacheGateway for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheUnavailable> {
        self.ensure_available()?;
        let key = key.to_string();

        let mut entries = self.entries.write().await;
        match entries.get(&key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(&key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set_with_ttl(
        &self,
        key: &CacheKey,
        value: &str,
        ttl: Duration,
    ) -> Result<(), CacheUnavailable> {
        self.ensure_available()?;
        self.entries
            .write()
            .await
            .insert(key.to_string(), CacheEntry::new(value.to_string(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<(), CacheUnavailable> {
        self.ensure_available()?;
        self.entries.write().await.remove(&key.to_string());
        Ok(())
    }

    async fn close(&self) -> Result<(), CacheUnavailable> {
        self.set_available(false);
        self.entries.write().await.clear();
        Ok(())
    }
}
