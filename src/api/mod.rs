//! API Module
//!
//! HTTP handlers and routing for the item REST API.
//!
//! # Endpoints
//! - `POST /items` - Create an item
//! - `GET /items` - List all items
//! - `GET /items/:id` - Fetch one item
//! - `PUT /items/:id` - Replace an item's fields
//! - `DELETE /items/:id` - Delete an item
//! - `GET /health` - Health check endpoint
//! - `GET /stats` - Cache-aside counters

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
