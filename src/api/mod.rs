//! API Module
//!
//! HTTP handlers and routing over one shared `ExpiringCache`.
//!
//! # Endpoints
//! - `PUT /set` - Store a key-value pair
//! - `GET /get/:key` - Retrieve a value by key
//! - `DELETE /del/:key` - Delete a key
//! - `GET /keys` - List keys
//! - `DELETE /clear` - Clear the backend
//! - `PUT /config` - Update capacity / max age
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
