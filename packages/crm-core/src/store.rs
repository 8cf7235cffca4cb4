//! Lock-guarded in-memory customer store.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::customer::{seed_customers, Customer};
use crate::error::StoreError;

/// Records and id counter, always mutated together.
#[derive(Debug)]
struct StoreInner {
    /// Customers in insertion order
    customers: Vec<Customer>,
    /// Next id to hand out; never decreases
    next_id: i64,
}

impl StoreInner {
    /// Linear scan for the position of `id`.
    fn position(&self, id: i64) -> Option<usize> {
        self.customers.iter().position(|c| c.id == id)
    }

    /// Assigns the next id to `customer` and appends it.
    fn insert(&mut self, mut customer: Customer) -> Customer {
        customer.id = self.next_id;
        self.next_id += 1;
        self.customers.push(customer.clone());
        tracing::debug!(id = customer.id, "customer created");
        customer
    }
}

/// In-memory customer collection shared by all request handlers.
///
/// Every operation runs under a single `RwLock`. Reads take the shared side;
/// create, replace and delete hold the exclusive side for the whole
/// find-then-mutate sequence, so a position found by the lookup is still
/// valid when it is used.
#[derive(Debug)]
pub struct CustomerStore {
    inner: RwLock<StoreInner>,
}

impl Default for CustomerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomerStore {
    /// Creates a store holding the seed customers (ids 1-3, next id 4).
    pub fn new() -> Self {
        Self::with_customers(seed_customers())
    }

    /// Creates a store with no customers; the first id assigned is 1.
    pub fn empty() -> Self {
        Self::with_customers(Vec::new())
    }

    /// Creates a store holding `customers` as given.
    ///
    /// The id counter starts one past the largest existing id.
    pub fn with_customers(customers: Vec<Customer>) -> Self {
        let next_id = customers.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        Self {
            inner: RwLock::new(StoreInner { customers, next_id }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreInner>, StoreError> {
        self.inner.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreInner>, StoreError> {
        self.inner.write().map_err(|_| StoreError::LockPoisoned)
    }

    /// Returns a snapshot of all customers in order.
    pub fn list(&self) -> Result<Vec<Customer>, StoreError> {
        Ok(self.read()?.customers.clone())
    }

    /// Finds a customer by id.
    ///
    /// # Arguments
    /// * `id` - Customer id
    ///
    /// # Returns
    /// `Result<(Customer, usize), StoreError>` with a copy of the record and
    /// its current position.
    pub fn find_by_id(&self, id: i64) -> Result<(Customer, usize), StoreError> {
        let inner = self.read()?;
        inner
            .position(id)
            .map(|index| (inner.customers[index].clone(), index))
            .ok_or(StoreError::CustomerNotFound { id })
    }

    /// Appends a new customer, assigning the next id.
    ///
    /// Any id on `customer` is overwritten.
    ///
    /// # Returns
    /// `Result<Customer, StoreError>` containing the stored record.
    pub fn create(&self, customer: Customer) -> Result<Customer, StoreError> {
        let mut inner = self.write()?;
        Ok(inner.insert(customer))
    }

    /// Appends a new customer and returns it along with the collection as
    /// it stands right after the insert.
    pub fn create_with_snapshot(
        &self,
        customer: Customer,
    ) -> Result<(Customer, Vec<Customer>), StoreError> {
        let mut inner = self.write()?;
        let created = inner.insert(customer);
        Ok((created, inner.customers.clone()))
    }

    /// Replaces every field of customer `id` except the id itself.
    ///
    /// # Arguments
    /// * `id` - Customer id to replace
    /// * `customer` - New field values; its id is ignored
    ///
    /// # Returns
    /// `Result<Customer, StoreError>` containing the updated record.
    pub fn replace(&self, id: i64, mut customer: Customer) -> Result<Customer, StoreError> {
        let mut inner = self.write()?;
        let index = inner
            .position(id)
            .ok_or(StoreError::CustomerNotFound { id })?;
        customer.id = id;
        inner.customers[index] = customer.clone();
        tracing::debug!(id, "customer replaced");
        Ok(customer)
    }

    /// Removes customer `id`, keeping the remaining customers in order.
    ///
    /// # Returns
    /// `Result<Customer, StoreError>` containing the removed record.
    pub fn delete(&self, id: i64) -> Result<Customer, StoreError> {
        let mut inner = self.write()?;
        let index = inner
            .position(id)
            .ok_or(StoreError::CustomerNotFound { id })?;
        let removed = inner.customers.remove(index);
        tracing::debug!(id, "customer deleted");
        Ok(removed)
    }

    /// Returns the number of stored customers.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.customers.len())
    }

    /// Returns true when no customers are stored.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.read()?.customers.is_empty())
    }
}
