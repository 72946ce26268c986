//! API Handlers
//!
//! Translate HTTP input into coordinator calls and map the results to
//! status codes. Cache outcomes never change a status; reads report theirs
//! in the `x-cache` header.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};

use crate::cache::CacheGateway;
use crate::coordinator::{ItemCoordinator, Served};
use crate::error::{ItemError, Result};
use crate::models::{
    CreateItemRequest, DeleteResponse, HealthResponse, Item, ItemId, StatsResponse,
    UpdateItemRequest,
};
use crate::store::ItemStore;

/// Response header carrying the read path's cache outcome
pub const CACHE_STATUS_HEADER: &str = "x-cache";

type CacheHeader = [(&'static str, String); 1];

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<ItemCoordinator>,
}

impl AppState {
    /// Creates a new AppState with the given coordinator.
    pub fn new(coordinator: ItemCoordinator) -> Self {
        Self {
            coordinator: Arc::new(coordinator),
        }
    }

    /// Wires a coordinator over the given store and cache.
    pub fn from_gateways(store: Arc<dyn ItemStore>, cache: Arc<dyn CacheGateway>) -> Self {
        Self::new(ItemCoordinator::new(store, cache))
    }
}

fn item_id(path: std::result::Result<Path<ItemId>, PathRejection>) -> Result<ItemId> {
    path.map(|Path(id)| id)
        .map_err(|rejection| ItemError::InvalidId(rejection.body_text()))
}

fn json_body<T>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ItemError::Validation(rejection.body_text()))
}

fn with_cache_header<T>(served: Served<T>) -> (CacheHeader, Json<T>) {
    let lookup = served
        .lookup
        .map(|lookup| lookup.to_string())
        .unwrap_or_default();
    ([(CACHE_STATUS_HEADER, lookup)], Json(served.value))
}

/// Handler for POST /items
pub async fn create_item_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<CreateItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Item>)> {
    let new_item = json_body(body)?.into_new_item()?;
    let served = state.coordinator.create(&new_item).await?;

    Ok((StatusCode::CREATED, Json(served.value)))
}

/// Handler for GET /items
pub async fn list_items_handler(
    State(state): State<AppState>,
) -> Result<(CacheHeader, Json<Vec<Item>>)> {
    let served = state.coordinator.list_all().await?;
    Ok(with_cache_header(served))
}

/// Handler for GET /items/:id
pub async fn get_item_handler(
    State(state): State<AppState>,
    path: std::result::Result<Path<ItemId>, PathRejection>,
) -> Result<(CacheHeader, Json<Item>)> {
    let id = item_id(path)?;
    let served = state.coordinator.get_by_id(id).await?;
    Ok(with_cache_header(served))
}

/// Handler for PUT /items/:id
pub async fn update_item_handler(
    State(state): State<AppState>,
    path: std::result::Result<Path<ItemId>, PathRejection>,
    body: std::result::Result<Json<UpdateItemRequest>, JsonRejection>,
) -> Result<Json<Item>> {
    let id = item_id(path)?;
    let changes = json_body(body)?.into_changes()?;
    let served = state.coordinator.update(id, &changes).await?;

    Ok(Json(served.value))
}

/// Handler for DELETE /items/:id
pub async fn delete_item_handler(
    State(state): State<AppState>,
    path: std::result::Result<Path<ItemId>, PathRejection>,
) -> Result<Json<DeleteResponse>> {
    let id = item_id(path)?;
    let served = state.coordinator.delete(id).await?;

    Ok(Json(DeleteResponse::new(served.value.id)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.coordinator.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::store::MemoryItemStore;

    fn test_state() -> AppState {
        AppState::from_gateways(
            Arc::new(MemoryItemStore::new()),
            Arc::new(MemoryCache::new()),
        )
    }

    fn create_body(title: &str) -> std::result::Result<Json<CreateItemRequest>, JsonRejection> {
        Ok(Json(CreateItemRequest {
            title: Some(title.to_string()),
            description: None,
        }))
    }

    #[tokio::test]
    async fn test_create_and_get_handler() {
        let state = test_state();

        let (status, Json(created)) = create_item_handler(State(state.clone()), create_body("A"))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.title, "A");

        let ([(_, lookup)], Json(fetched)) =
            get_item_handler(State(state.clone()), Ok(Path(created.id)))
                .await
                .unwrap();
        assert_eq!(lookup, "MISS");
        assert_eq!(fetched, created);

        let ([(_, lookup)], _) = get_item_handler(State(state), Ok(Path(created.id)))
            .await
            .unwrap();
        assert_eq!(lookup, "HIT");
    }

    #[tokio::test]
    async fn test_create_missing_title() {
        let state = test_state();
        let body = Ok(Json(CreateItemRequest {
            title: None,
            description: Some("d".to_string()),
        }));

        let result = create_item_handler(State(state), body).await;
        assert!(matches!(result, Err(ItemError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_nonexistent_item() {
        let state = test_state();

        let result = get_item_handler(State(state), Ok(Path(404))).await;
        assert!(matches!(result, Err(ItemError::NotFound(404))));
    }

    #[tokio::test]
    async fn test_update_handler() {
        let state = test_state();
        let (_, Json(created)) = create_item_handler(State(state.clone()), create_body("A"))
            .await
            .unwrap();

        let body = Ok(Json(UpdateItemRequest {
            title: Some("B".to_string()),
            description: Some("d".to_string()),
            status: Some("done".to_string()),
        }));
        let Json(updated) = update_item_handler(State(state), Ok(Path(created.id)), body)
            .await
            .unwrap();

        assert_eq!(updated.title, "B");
        assert_eq!(updated.status, "done");
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_delete_handler() {
        let state = test_state();
        let (_, Json(created)) = create_item_handler(State(state.clone()), create_body("A"))
            .await
            .unwrap();

        let Json(response) = delete_item_handler(State(state.clone()), Ok(Path(created.id)))
            .await
            .unwrap();
        assert_eq!(response.id, created.id);

        let result = delete_item_handler(State(state), Ok(Path(created.id))).await;
        assert!(matches!(result, Err(ItemError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = test_state();
        let ([(_, first)], _) = list_items_handler(State(state.clone())).await.unwrap();
        let ([(_, second)], _) = list_items_handler(State(state.clone())).await.unwrap();
        assert_eq!(first, "MISS");
        assert_eq!(second, "HIT");

        let response = stats_handler(State(state)).await;
        assert_eq!(response.hits, 1);
        assert_eq!(response.misses, 1);
        assert_eq!(response.populations, 1);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
