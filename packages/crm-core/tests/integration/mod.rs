//! Integration test suite for the customer store.
//!
//! 1. Lifecycle properties (create, find, replace, delete)
//! 2. Concurrent access

pub mod concurrency_tests;
pub mod lifecycle_tests;
