//! Store Module
//!
//! The durable-store gateway seam. Postgres is the source of truth in
//! production; the in-memory store backs tests and local runs.

mod memory;
mod postgres;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Item, ItemChanges, ItemId, NewItem};

pub use memory::MemoryItemStore;
pub use postgres::{DatabaseSettings, PgItemStore};

// == Item Store ==
/// CRUD over items. Each mutation is a single atomic statement.
///
/// `get_by_id`, `update` and `delete_by_id` return `ItemError::NotFound` when
/// no row matches; `create` and `update` return `ItemError::Validation` for an
/// empty title; any connectivity or statement failure is
/// `ItemError::StoreUnavailable`. Nothing here retries.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn create(&self, item: &NewItem) -> Result<Item>;

    /// All items, newest first.
    async fn list_all(&self) -> Result<Vec<Item>>;

    async fn get_by_id(&self, id: ItemId) -> Result<Item>;

    async fn update(&self, id: ItemId, changes: &ItemChanges) -> Result<Item>;

    /// Removes the item and returns the row as it was.
    async fn delete_by_id(&self, id: ItemId) -> Result<Item>;

    /// Releases every pooled connection.
    async fn close(&self) -> Result<()>;
}
