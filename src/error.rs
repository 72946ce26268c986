//! Error types for the item service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::models::ItemId;

// == Item Error Enum ==
/// Unified error type for store and request failures.
///
/// Cache failures never appear here; they are soft and live in
/// [`crate::cache::CacheUnavailable`].
#[derive(Error, Debug)]
pub enum ItemError {
    /// Client input violates a required-field constraint
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No item matches the requested id
    #[error("Item not found: {0}")]
    NotFound(ItemId),

    /// Path id is not an integer, so it cannot match any item
    #[error("Invalid item id: {0}")]
    InvalidId(String),

    /// Durable store unreachable or statement failed
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),
}

// == IntoResponse Implementation ==
impl IntoResponse for ItemError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ItemError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ItemError::NotFound(_) | ItemError::InvalidId(_) => {
                (StatusCode::NOT_FOUND, "Item not found".to_string())
            }
            ItemError::StoreUnavailable(_) => {
                // Detail stays in the operator log
                error!(error = %self, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the item service.
pub type Result<T> = std::result::Result<T, ItemError>;
