//! Cache-Aside Coordinator
//!
//! Reads check the cache first, fall through to the store on a miss and
//! populate the key with a fixed TTL. Writes go to the store first and
//! invalidate the affected keys only after the mutation has committed.
//!
//! # Consistency
//! A reader that misses after a write has committed sees the new value.
//! A reader that hit before the invalidation landed may see the old one
//! until the delete succeeds or the TTL runs out. A concurrent read-miss
//! that overlaps a write's commit can still repopulate a key with the
//! pre-write value after it was deleted; keys carry no version, so that
//! window stays open and is bounded by the TTL.
//!
//! Absence is never cached: a `NotFound` from the store leaves the cache alone.

mod outcome;


use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::cache::{CacheGateway, CacheKey, CacheMetrics, CacheStats, CacheUnavailable, CACHE_TTL};
use crate::error::Result;
use crate::models::{Item, ItemChanges, ItemId, NewItem};
use crate::store::ItemStore;

pub use outcome::{CacheLookup, Served, SideEffect};

// == Item Coordinator ==
pub struct ItemCoordinator {
    store: Arc<dyn ItemStore>,
    cache: Arc<dyn CacheGateway>,
    metrics: CacheMetrics,
    ttl: Duration,
}

impl ItemCoordinator {
    pub fn new(store: Arc<dyn ItemStore>, cache: Arc<dyn CacheGateway>) -> Self {
        Self {
            store,
            cache,
            metrics: CacheMetrics::new(),
            ttl: CACHE_TTL,
        }
    }

    /// Current cache-aside counters.
    pub fn stats(&self) -> CacheStats {
        self.metrics.snapshot()
    }

    // == Read Path ==

    pub async fn list_all(&self) -> Result<Served<Vec<Item>>> {
        self.read_through(CacheKey::all(), || self.store.list_all())
            .await
    }

    pub async fn get_by_id(&self, id: ItemId) -> Result<Served<Item>> {
        self.read_through(CacheKey::item(id), || self.store.get_by_id(id))
            .await
    }

    // == Write Path ==

    /// No entity key exists for a new item yet, so only the listing is dropped.
    pub async fn create(&self, item: &NewItem) -> Result<Served<Item>> {
        let created = self.store.create(item).await?;
        let effect = self.invalidate(CacheKey::all()).await;
        Ok(Served::write(created, vec![effect]))
    }

    pub async fn update(&self, id: ItemId, changes: &ItemChanges) -> Result<Served<Item>> {
        let updated = self.store.update(id, changes).await?;
        let effects = self.invalidate_item(id).await;
        Ok(Served::write(updated, effects))
    }

    pub async fn delete(&self, id: ItemId) -> Result<Served<Item>> {
        let deleted = self.store.delete_by_id(id).await?;
        let effects = self.invalidate_item(id).await;
        Ok(Served::write(deleted, effects))
    }

    // == Internals ==

    async fn read_through<T, F, Fut>(&self, key: CacheKey, fetch: F) -> Result<Served<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let lookup = match self.cache.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => {
                    debug!(%key, "Cache hit");
                    self.metrics.record_hit();
                    return Ok(Served::read(value, CacheLookup::Hit, Vec::new()));
                }
                Err(err) => {
                    warn!(%key, error = %err, "Unreadable cache entry, falling back to store");
                    self.metrics.record_lookup_error();
                    CacheLookup::Error
                }
            },
            Ok(None) => {
                debug!(%key, "Cache miss");
                self.metrics.record_miss();
                CacheLookup::Miss
            }
            Err(err) => {
                warn!(%key, error = %err, "Cache lookup failed, falling back to store");
                self.metrics.record_lookup_error();
                CacheLookup::Error
            }
        };

        let value = fetch().await?;
        let effect = self.populate(key, &value).await;
        Ok(Served::read(value, lookup, vec![effect]))
    }

    async fn populate<T: Serialize>(&self, key: CacheKey, value: &T) -> SideEffect {
        let result = match serde_json::to_string(value) {
            Ok(raw) => self.cache.set_with_ttl(&key, &raw, self.ttl).await,
            Err(err) => Err(CacheUnavailable(format!("serialization failed: {err}"))),
        };

        match result {
            Ok(()) => {
                self.metrics.record_population();
                SideEffect::Populated(key)
            }
            Err(err) => {
                warn!(%key, error = %err, "Cache population failed");
                self.metrics.record_populate_failure();
                SideEffect::PopulateFailed(key, err)
            }
        }
    }

    /// Drops the entity key and the listing; the two deletes run concurrently.
    async fn invalidate_item(&self, id: ItemId) -> Vec<SideEffect> {
        let (item, all) = tokio::join!(
            self.invalidate(CacheKey::item(id)),
            self.invalidate(CacheKey::all())
        );
        vec![item, all]
    }

    async fn invalidate(&self, key: CacheKey) -> SideEffect {
        match self.cache.delete(&key).await {
            Ok(()) => {
                debug!(%key, "Cache key invalidated");
                self.metrics.record_invalidation();
                SideEffect::Invalidated(key)
            }
            Err(err) => {
                warn!(
                    %key,
                    error = %err,
                    ttl_secs = self.ttl.as_secs(),
                    "Cache invalidation failed, key may serve stale data until expiry"
                );
                self.metrics.record_invalidation_failure();
                SideEffect::InvalidateFailed(key, err)
            }
        }
    }
}
