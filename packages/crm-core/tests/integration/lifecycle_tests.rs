//! Record lifecycle tests against the public store API.

use crm_core::error::StoreError;
use crm_core::{Customer, CustomerStore};

fn customer(name: &str, contacted: bool) -> Customer {
    Customer::new(0, name, "Role", "mail@example.com", "555", contacted)
}

/// Ids handed out by create always exceed every id seen before.
#[test]
fn test_created_ids_strictly_increase() -> anyhow::Result<()> {
    let store = CustomerStore::new();
    let mut max_seen = store.list()?.iter().map(|c| c.id).max().unwrap_or(0);

    for i in 0..20 {
        let created = store.create(customer(&format!("Customer {}", i), i % 2 == 0))?;
        assert!(created.id > max_seen, "id {} not above {}", created.id, max_seen);
        max_seen = created.id;

        // Interleave deletes so freed ids could be tempting to reuse
        if i % 3 == 0 {
            store.delete(created.id)?;
        }
    }
    Ok(())
}

/// Create, fetch, replace, delete, fetch again.
#[test]
fn test_full_lifecycle() -> anyhow::Result<()> {
    let store = CustomerStore::new();

    let created = store.create(Customer::new(0, "X", "Y", "e", "p", true))?;
    let (fetched, index) = store.find_by_id(created.id)?;
    assert_eq!(fetched, Customer::new(created.id, "X", "Y", "e", "p", true));
    assert_eq!(index, 3);

    let updated = store.replace(created.id, Customer::new(999, "X2", "Y2", "e2", "p2", false))?;
    assert_eq!(updated.id, created.id);
    assert_eq!(store.find_by_id(created.id)?.0, updated);

    store.delete(created.id)?;
    assert_eq!(
        store.find_by_id(created.id),
        Err(StoreError::CustomerNotFound { id: created.id })
    );
    assert_eq!(store.len()?, 3);
    Ok(())
}

/// Deleting an unknown id leaves length and contents untouched.
#[test]
fn test_delete_unknown_is_noop() -> anyhow::Result<()> {
    let store = CustomerStore::new();
    store.create(customer("Extra", false))?;
    let before = store.list()?;

    assert!(matches!(
        store.delete(12345),
        Err(StoreError::CustomerNotFound { id: 12345 })
    ));
    assert_eq!(store.list()?, before);
    Ok(())
}

/// Deleting from the middle keeps relative order of the rest.
#[test]
fn test_delete_middle_keeps_order() -> anyhow::Result<()> {
    let store = CustomerStore::empty();
    for name in ["a", "b", "c", "d", "e"] {
        store.create(customer(name, false))?;
    }
    store.delete(2)?;
    store.delete(4)?;

    let names: Vec<String> = store.list()?.into_iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["a", "c", "e"]);
    Ok(())
}
