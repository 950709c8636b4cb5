//! WorkloadBalancer and selection-under-load tests

use barista_dispatch_core_rs::policy::{
    workload_balance_pct, LoadAwarePolicy, PolicyConfig, SelectionPolicy, WorkloadBalancer,
    WorkloadClass,
};
use barista_dispatch_core_rs::{DrinkType, LoyaltyTier, Order, Worker};

fn workers(n: u32) -> Vec<Worker> {
    (1..=n).map(|i| Worker::new(i, format!("Barista {}", i))).collect()
}

fn preparing(id: u64, worker: u32, drink: DrinkType, assigned_at: f64) -> Order {
    let mut order = Order::new(id, format!("Test {}", id), drink, LoyaltyTier::Regular, 0.0);
    order.assign(worker, assigned_at, String::new()).unwrap();
    order
}

#[test]
fn test_three_idle_workers_are_normal() {
    let config = PolicyConfig::default();
    let balancer = WorkloadBalancer::new(&config);
    let mut fleet = workers(3);

    balancer.rebalance(&mut fleet, &[], 0.0);

    for worker in &fleet {
        assert_eq!(worker.current_workload_minutes(), 0.0);
        assert_eq!(worker.workload_ratio(), 1.0);
        assert_eq!(balancer.classify(worker.workload_ratio()), WorkloadClass::Normal);
    }
}

#[test]
fn test_load_is_remaining_prep() {
    let balancer = WorkloadBalancer::new(&PolicyConfig::default());
    let mut fleet = workers(3);
    let orders = vec![
        preparing(1, 1, DrinkType::Mocha, 0.0),
        preparing(2, 2, DrinkType::Espresso, 1.0),
    ];

    balancer.rebalance(&mut fleet, &orders, 2.0);

    // Mocha: 6 - 2 = 4, Espresso: 2 - 1 = 1, idle: 0; average 5/3
    assert_eq!(fleet[0].current_workload_minutes(), 4.0);
    assert_eq!(fleet[1].current_workload_minutes(), 1.0);
    assert_eq!(fleet[2].current_workload_minutes(), 0.0);
    assert!((fleet[0].workload_ratio() - 2.4).abs() < 1e-9);
    assert!((fleet[1].workload_ratio() - 0.6).abs() < 1e-9);
    assert_eq!(fleet[2].workload_ratio(), 0.0);

    assert_eq!(balancer.classify(fleet[0].workload_ratio()), WorkloadClass::Overloaded);
    assert_eq!(balancer.classify(fleet[1].workload_ratio()), WorkloadClass::Underutilized);
}

#[test]
fn test_orphaned_order_contributes_no_load() {
    let balancer = WorkloadBalancer::new(&PolicyConfig::default());
    let mut fleet = workers(2);
    let orders = vec![preparing(1, 9, DrinkType::Latte, 0.0)];

    let orphaned = balancer.rebalance(&mut fleet, &orders, 1.0);

    assert_eq!(orphaned, vec![1]);
    assert!(fleet.iter().all(|w| w.current_workload_minutes() == 0.0));
    assert!(fleet.iter().all(|w| w.workload_ratio() == 1.0));
}

#[test]
fn test_classify_boundaries_are_strict() {
    let balancer = WorkloadBalancer::new(&PolicyConfig::default());
    assert_eq!(balancer.classify(1.2), WorkloadClass::Normal);
    assert_eq!(balancer.classify(1.21), WorkloadClass::Overloaded);
    assert_eq!(balancer.classify(0.8), WorkloadClass::Normal);
    assert_eq!(balancer.classify(0.79), WorkloadClass::Underutilized);
}

#[test]
fn test_overloaded_worker_takes_shortest_drink() {
    let config = PolicyConfig::default();
    let mut worker = Worker::new(1, "Barista 1".into());
    worker.update_workload(6.0, 1.5);

    let mut long = Order::new(1, "A".into(), DrinkType::Mocha, LoyaltyTier::Regular, 0.0);
    let mut short = Order::new(2, "B".into(), DrinkType::Espresso, LoyaltyTier::Regular, 0.0);
    long.set_priority_score(50.0);
    short.set_priority_score(50.0);
    let queue = vec![long, short];

    let pick = LoadAwarePolicy::new().select(&worker, &queue, 1.0, &config);
    assert_eq!(pick, Some(1));
}

#[test]
fn test_normal_worker_takes_highest_score() {
    let config = PolicyConfig::default();
    let worker = Worker::new(1, "Barista 1".into());

    let mut first = Order::new(1, "A".into(), DrinkType::Mocha, LoyaltyTier::Regular, 0.0);
    let mut second = Order::new(2, "B".into(), DrinkType::Espresso, LoyaltyTier::Regular, 0.0);
    first.set_priority_score(30.0);
    second.set_priority_score(60.0);
    let queue = vec![first, second];

    assert_eq!(
        LoadAwarePolicy::new().select(&worker, &queue, 1.0, &config),
        Some(1)
    );
}

#[test]
fn test_force_threshold_beats_overload_rule() {
    let config = PolicyConfig::default();
    let mut worker = Worker::new(1, "Barista 1".into());
    worker.update_workload(6.0, 2.0);

    let old = Order::new(1, "A".into(), DrinkType::Mocha, LoyaltyTier::Regular, 0.0);
    let fresh = Order::new(2, "B".into(), DrinkType::ColdBrew, LoyaltyTier::Regular, 9.0);
    let queue = vec![fresh, old];

    assert_eq!(
        LoadAwarePolicy::new().select(&worker, &queue, 9.5, &config),
        Some(1)
    );
}

#[test]
fn test_balance_percentage() {
    assert_eq!(workload_balance_pct(&[]), 100.0);
    assert_eq!(workload_balance_pct(&[0.0, 0.0, 0.0]), 100.0);
    assert_eq!(workload_balance_pct(&[20.0, 20.0]), 100.0);

    // mean 10, stddev 10: 1 - 10/11
    let pct = workload_balance_pct(&[0.0, 20.0]);
    assert!((pct - (1.0 - 10.0 / 11.0) * 100.0).abs() < 1e-9);
}
