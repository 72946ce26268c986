//! Postgres item store
//!
//! Runtime-checked `sqlx` queries against the `items` table.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::info;

use super::ItemStore;
use crate::error::{ItemError, Result};
use crate::models::{validate_title, Item, ItemChanges, ItemId, NewItem};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS items (
        id SERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        status VARCHAR(50) NOT NULL DEFAULT 'pending',
        created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
"#;

const ITEM_COLUMNS: &str = "id, title, description, status, created_at";

/// Connection parameters for the Postgres pool.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl DatabaseSettings {
    fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.name)
            .username(&self.user)
            .password(&self.password)
    }
}

#[derive(Clone)]
pub struct PgItemStore {
    pool: PgPool,
}

impl PgItemStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Builds the pool without opening a connection; connections are made on demand.
    pub fn connect_lazy(settings: &DatabaseSettings) -> Self {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .connect_lazy_with(settings.connect_options());
        Self::new(pool)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the `items` table if it does not exist yet.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE).execute(self.pool()).await?;
        info!("Database schema initialized");
        Ok(())
    }
}

#[async_trait]
impl ItemStore for PgItemStore {
    async fn create(&self, item: &NewItem) -> Result<Item> {
        validate_title(&item.title)?;

        let sql = format!(
            "INSERT INTO items (title, description) VALUES ($1, $2) RETURNING {ITEM_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Item>(&sql)
            .bind(&item.title)
            .bind(&item.description)
            .fetch_one(self.pool())
            .await?;
        Ok(created)
    }

    async fn list_all(&self) -> Result<Vec<Item>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items ORDER BY created_at DESC, id DESC");
        let items = sqlx::query_as::<_, Item>(&sql)
            .fetch_all(self.pool())
            .await?;
        Ok(items)
    }

    async fn get_by_id(&self, id: ItemId) -> Result<Item> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = $1");
        sqlx::query_as::<_, Item>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or(ItemError::NotFound(id))
    }

    async fn update(&self, id: ItemId, changes: &ItemChanges) -> Result<Item> {
        validate_title(&changes.title)?;

        let sql = format!(
            "UPDATE items SET title = $1, description = $2, status = $3 \
             WHERE id = $4 RETURNING {ITEM_COLUMNS}"
        );
        sqlx::query_as::<_, Item>(&sql)
            .bind(&changes.title)
            .bind(&changes.description)
            .bind(&changes.status)
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or(ItemError::NotFound(id))
    }

    async fn delete_by_id(&self, id: ItemId) -> Result<Item> {
        let sql = format!("DELETE FROM items WHERE id = $1 RETURNING {ITEM_COLUMNS}");
        sqlx::query_as::<_, Item>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or(ItemError::NotFound(id))
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        info!("Database pool closed");
        Ok(())
    }
}
