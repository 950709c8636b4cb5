//! FileStore persistence tests

use barista_dispatch_core_rs::scheduler::{DispatchScheduler, SchedulerConfig};
use barista_dispatch_core_rs::store::{latest_timestamp, seed_workers, FileStore, Store, StoreError};
use barista_dispatch_core_rs::{DrinkType, LoyaltyTier, OrderStatus};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_missing_file_opens_empty() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path().join("shop.json")).unwrap();

    assert!(store.list_orders(None).unwrap().is_empty());
    assert!(store.list_workers().unwrap().is_empty());
}

#[test]
fn test_round_trip_after_tick() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("shop.json");

    {
        let mut store = FileStore::open(&path).unwrap();
        seed_workers(&mut store, 2).unwrap();

        let mut scheduler = DispatchScheduler::new(SchedulerConfig::default()).unwrap();
        scheduler
            .submit_order(&mut store, "Riya 1234".into(), DrinkType::Latte, LoyaltyTier::Gold, 0.0)
            .unwrap();
        scheduler
            .submit_order(&mut store, "Yash 5678".into(), DrinkType::Mocha, LoyaltyTier::Regular, 0.5)
            .unwrap();
        scheduler.tick(&mut store, 1.0).unwrap();
    }

    let reopened = FileStore::open(&path).unwrap();
    let orders = reopened.list_orders(None).unwrap();
    assert_eq!(orders.len(), 2);
    assert!(orders.iter().all(|o| o.status() == OrderStatus::Preparing));
    assert_eq!(orders[0].customer(), "Riya 1234");
    assert_eq!(orders[0].worker(), Some(1));
    assert!(orders[0].assignment_reason().is_some());

    let workers = reopened.list_workers().unwrap();
    assert_eq!(workers.len(), 2);
    assert!(workers.iter().all(|w| !w.is_available()));
}

#[test]
fn test_ids_continue_after_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("shop.json");

    {
        let mut store = FileStore::open(&path).unwrap();
        store
            .create_order("A".into(), DrinkType::Espresso, LoyaltyTier::Regular, 0.0)
            .unwrap();
        store.reset().unwrap();
    }

    let mut store = FileStore::open(&path).unwrap();
    assert!(store.list_orders(None).unwrap().is_empty());
    let order = store
        .create_order("B".into(), DrinkType::Espresso, LoyaltyTier::Regular, 1.0)
        .unwrap();
    assert_eq!(order.id(), 2);
}

#[test]
fn test_tampered_file_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("shop.json");

    {
        let mut store = FileStore::open(&path).unwrap();
        store
            .create_order("Neha 4821".into(), DrinkType::Latte, LoyaltyTier::Regular, 0.0)
            .unwrap();
    }

    let raw = fs::read_to_string(&path).unwrap();
    fs::write(&path, raw.replace("Neha 4821", "Neha 9999")).unwrap();

    let err = FileStore::open(&path).unwrap_err();
    assert!(matches!(err, StoreError::ChecksumMismatch { .. }));
}

#[test]
fn test_garbage_file_is_a_serialization_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("shop.json");
    fs::write(&path, "not json").unwrap();

    assert!(matches!(
        FileStore::open(&path).unwrap_err(),
        StoreError::Serialization(_)
    ));
}

#[test]
fn test_failed_commit_not_persisted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("shop.json");
    let mut store = FileStore::open(&path).unwrap();
    let order = store
        .create_order("A".into(), DrinkType::Latte, LoyaltyTier::Regular, 0.0)
        .unwrap();
    let before = fs::read_to_string(&path).unwrap();

    // Saving an order the store never created fails without touching disk
    let stranger = barista_dispatch_core_rs::Order::new(
        42,
        "Ghost".into(),
        DrinkType::Mocha,
        LoyaltyTier::Regular,
        0.0,
    );
    assert!(matches!(
        store.save_order(&stranger),
        Err(StoreError::OrderNotFound(42))
    ));
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
    assert_eq!(store.get_order(order.id()).unwrap().unwrap().customer(), "A");
}

#[test]
fn test_reopened_store_resumes_from_persisted_time() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("shop.json");

    {
        let mut store = FileStore::open(&path).unwrap();
        seed_workers(&mut store, 1).unwrap();
        let mut scheduler = DispatchScheduler::new(SchedulerConfig::default()).unwrap();
        scheduler
            .submit_order(&mut store, "Kabir 1020".into(), DrinkType::Mocha, LoyaltyTier::Regular, 59.0)
            .unwrap();
        scheduler.tick(&mut store, 59.5).unwrap();
    }

    let mut store = FileStore::open(&path).unwrap();
    let resume_at = latest_timestamp(&store).unwrap();
    assert_eq!(resume_at, 59.5);

    let mut scheduler = DispatchScheduler::new(SchedulerConfig::default()).unwrap();
    let cold_brew = scheduler
        .submit_order(&mut store, "Isha 3344".into(), DrinkType::ColdBrew, LoyaltyTier::Regular, resume_at)
        .unwrap()
        .id();

    // The Mocha finishes at 65.5, freeing the only barista for the Cold Brew
    for step in 0..=20 {
        scheduler.tick(&mut store, resume_at + step as f64 * 0.5).unwrap();
    }

    let orders = store.list_orders(None).unwrap();
    assert!(orders.iter().all(|o| o.status() == OrderStatus::Completed));
    let order = store.get_order(cold_brew).unwrap().unwrap();
    assert_eq!(order.assigned_at(), Some(65.5));
    assert_eq!(order.wait_minutes(70.0), 6.0);
}
