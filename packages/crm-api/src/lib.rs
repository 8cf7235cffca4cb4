//! REST API server for the in-memory customer store.
//!
//! Provides the customer CRUD endpoints, the static file fallback,
//! and request routing on top of hyper.

pub mod handlers;
pub mod router;
pub mod server;
