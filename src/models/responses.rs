//! Response DTOs for the item API
//!
//! Items themselves are serialized directly; these are the auxiliary bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::models::ItemId;

/// Response body for DELETE /items/:id
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Confirmation message
    pub message: String,
    /// The id that was deleted
    pub id: ItemId,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(id: ItemId) -> Self {
        Self {
            message: "Item successfully deleted".to_string(),
            id,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Reads served from cache
    pub hits: u64,
    /// Reads that fell through to the store
    pub misses: u64,
    /// Cache lookups that failed and were treated as misses
    pub lookup_errors: u64,
    /// Successful read-miss populations
    pub populations: u64,
    /// Populations that failed
    pub populate_failures: u64,
    /// Keys deleted after a mutation
    pub invalidations: u64,
    /// Key deletions that failed; those keys may linger until TTL expiry
    pub invalidation_failures: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            lookup_errors: stats.lookup_errors,
            populations: stats.populations,
            populate_failures: stats.populate_failures,
            invalidations: stats.invalidations,
            invalidation_failures: stats.invalidation_failures,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for failures outside the typed error path
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
