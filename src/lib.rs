//! Item Cache - CRUD item service with a cache-aside layer
//!
//! Items live in Postgres; reads are cached in Redis with a fixed TTL and
//! writes invalidate the affected keys once the store has committed.

pub mod api;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod models;
pub mod store;

pub use api::AppState;
pub use config::Config;
pub use coordinator::ItemCoordinator;
