//! Domain and transfer models for the item service
//!
//! `item` holds the entity and the store-facing inputs; `requests` and
//! `responses` define the HTTP request and response bodies.

pub mod item;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use item::{validate_title, Item, ItemChanges, ItemId, NewItem, DEFAULT_STATUS};
pub use requests::{CreateItemRequest, UpdateItemRequest};
pub use responses::{DeleteResponse, ErrorResponse, HealthResponse, StatsResponse};
