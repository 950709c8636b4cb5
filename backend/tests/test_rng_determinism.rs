//! RNG determinism tests
//!
//! Every random draw in the dispatcher goes through `RngManager`; these tests
//! pin down that a seed fully determines the stream.

use barista_dispatch_core_rs::RngManager;

#[test]
fn test_same_seed_same_sequence() {
    let mut a = RngManager::new(12345);
    let mut b = RngManager::new(12345);

    for _ in 0..1000 {
        assert_eq!(a.next(), b.next());
    }
}

#[test]
fn test_different_seeds_diverge() {
    let mut a = RngManager::new(1);
    let mut b = RngManager::new(2);

    let a_values: Vec<u64> = (0..10).map(|_| a.next()).collect();
    let b_values: Vec<u64> = (0..10).map(|_| b.next()).collect();
    assert_ne!(a_values, b_values);
}

#[test]
fn test_state_replay() {
    let mut rng = RngManager::new(99);
    for _ in 0..50 {
        rng.next();
    }

    // Resuming from a saved state reproduces the remainder of the stream
    let mut resumed = RngManager::new(rng.get_state());
    for _ in 0..100 {
        assert_eq!(rng.next(), resumed.next());
    }
}

#[test]
fn test_range_bounds() {
    let mut rng = RngManager::new(7);
    for _ in 0..10_000 {
        let v = rng.range(1000, 10_000);
        assert!((1000..10_000).contains(&v));
    }
}

#[test]
fn test_unit_intervals() {
    let mut rng = RngManager::new(2024);
    for _ in 0..10_000 {
        let closed_open = rng.next_f64();
        assert!((0.0..1.0).contains(&closed_open));

        let open_closed = rng.next_f64_open();
        assert!(open_closed > 0.0 && open_closed <= 1.0);
    }
}

#[test]
fn test_poisson_reproducible() {
    let draws = |seed| {
        let mut rng = RngManager::new(seed);
        (0..200).map(|_| rng.poisson(1.4)).collect::<Vec<u32>>()
    };
    assert_eq!(draws(42), draws(42));
}

#[test]
fn test_poisson_non_positive_rate() {
    let mut rng = RngManager::new(3);
    assert_eq!(rng.poisson(0.0), 0);
    assert_eq!(rng.poisson(-2.0), 0);
    assert_eq!(rng.poisson(f64::NAN), 0);
}

#[test]
fn test_weighted_index_respects_zero_weights() {
    let mut rng = RngManager::new(5);
    for _ in 0..1000 {
        let idx = rng.weighted_index(&[0, 3, 0, 1]).unwrap();
        assert!(idx == 1 || idx == 3);
    }
    assert_eq!(rng.weighted_index(&[0, 0]), None);
    assert_eq!(rng.weighted_index(&[]), None);
}
