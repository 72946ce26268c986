//! In-memory item store
//!
//! A BTreeMap behind a lock with the same contract as the Postgres store.
//! Counts calls so tests can tell whether a read reached the store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::ItemStore;
use crate::error::{ItemError, Result};
use crate::models::{validate_title, Item, ItemChanges, ItemId, NewItem, DEFAULT_STATUS};

#[derive(Debug)]
pub struct MemoryItemStore {
    rows: RwLock<BTreeMap<ItemId, Item>>,
    next_id: AtomicI32,
    available: AtomicBool,
    calls: AtomicUsize,
}

impl Default for MemoryItemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI32::new(1),
            available: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
        }
    }

    /// Simulates losing (`false`) or regaining (`true`) the database.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of gateway calls made so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin_call(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ItemError::StoreUnavailable(sqlx::Error::PoolClosed))
        }
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn create(&self, item: &NewItem) -> Result<Item> {
        self.begin_call()?;
        validate_title(&item.title)?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created = Item {
            id,
            title: item.title.clone(),
            description: item.description.clone(),
            status: DEFAULT_STATUS.to_string(),
            created_at: Utc::now(),
        };
        self.rows.write().await.insert(id, created.clone());
        Ok(created)
    }

    async fn list_all(&self) -> Result<Vec<Item>> {
        self.begin_call()?;
        let mut items: Vec<Item> = self.rows.read().await.values().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(items)
    }

    async fn get_by_id(&self, id: ItemId) -> Result<Item> {
        self.begin_call()?;
        self.rows
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(ItemError::NotFound(id))
    }

    async fn update(&self, id: ItemId, changes: &ItemChanges) -> Result<Item> {
        self.begin_call()?;
        validate_title(&changes.title)?;

        let mut rows = self.rows.write().await;
        let row = rows.get_mut(&id).ok_or(ItemError::NotFound(id))?;
        row.title = changes.title.clone();
        row.description = changes.description.clone();
        row.status = changes.status.clone();
        Ok(row.clone())
    }

    async fn delete_by_id(&self, id: ItemId) -> Result<Item> {
        self.begin_call()?;
        self.rows
            .write()
            .await
            .remove(&id)
            .ok_or(ItemError::NotFound(id))
    }

    async fn close(&self) -> Result<()> {
        self.set_available(false);
        Ok(())
    }
}
