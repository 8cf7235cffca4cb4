//! Core storage for the customer CRUD server.
//!
//! Provides the customer model and seed data, the lock-guarded
//! in-memory record store, and server configuration.

pub mod config;
pub mod customer;
pub mod error;
pub mod store;

pub use customer::Customer;
pub use store::CustomerStore;
