//! Store error types.

use thiserror::Error;

/// Record store operation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No customer with the requested id
    #[error("Customer with ID {id} not found")]
    CustomerNotFound { id: i64 },

    /// Lock poisoned (RwLock poisoned)
    #[error("Lock poisoned")]
    LockPoisoned,
}
