//! Concurrent access tests.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use ntest::timeout;
use rayon::prelude::*;

use crm_core::{Customer, CustomerStore};

/// 100 simultaneous creates yield 100 distinct ids and no lost records.
#[timeout(5000)]
#[test]
fn test_concurrent_creates_unique_ids() {
    let store = Arc::new(CustomerStore::new());

    let ids: Vec<i64> = (0..100)
        .into_par_iter()
        .map(|i| {
            store
                .create(Customer::new(0, format!("C{}", i), "", "", "", false))
                .unwrap()
                .id
        })
        .collect();

    let unique: HashSet<i64> = ids.iter().copied().collect();
    assert_eq!(unique.len(), 100);
    assert_eq!(store.len().unwrap(), 103);

    let stored: HashSet<i64> = store.list().unwrap().iter().map(|c| c.id).collect();
    assert!(unique.is_subset(&stored));
    assert_eq!(stored, (1..=103).collect::<HashSet<i64>>());
}

/// Replace and delete racing against creates never corrupt the collection.
#[timeout(10000)]
#[test]
fn test_mixed_writers_keep_store_consistent() {
    let store = Arc::new(CustomerStore::empty());
    for i in 0..50 {
        store
            .create(Customer::new(0, format!("Seed {}", i), "", "", "", false))
            .unwrap();
    }

    let mut handles = Vec::new();

    // Deleters remove even ids
    for t in 0..2 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for id in (2..=50).step_by(2).skip(t) {
                let _ = store.delete(id);
            }
        }));
    }

    // Updaters rewrite odd ids
    for _ in 0..2 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for id in (1..=50).step_by(2) {
                store
                    .replace(id, Customer::new(0, "Updated", "", "", "", true))
                    .unwrap();
            }
        }));
    }

    // Creators append
    for _ in 0..2 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for _ in 0..25 {
                store
                    .create(Customer::new(0, "New", "", "", "", false))
                    .unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let customers = store.list().unwrap();
    // 25 odd seeds survive, 50 new records appended
    assert_eq!(customers.len(), 75);

    let ids: HashSet<i64> = customers.iter().map(|c| c.id).collect();
    assert_eq!(ids.len(), customers.len());

    for customer in customers.iter().filter(|c| c.id <= 50) {
        assert_eq!(customer.id % 2, 1);
        assert_eq!(customer.name, "Updated");
        assert!(customer.contacted);
    }
    assert_eq!(customers.iter().filter(|c| c.id > 50).count(), 50);
}
