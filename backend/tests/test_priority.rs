//! PriorityEngine tests
//!
//! Score bounds and urgency shape are checked with proptest; the component
//! arithmetic with hand-computed scenarios.

use barista_dispatch_core_rs::models::OrderSnapshot;
use barista_dispatch_core_rs::policy::{PolicyConfig, PriorityEngine};
use barista_dispatch_core_rs::{DrinkType, LoyaltyTier, Order, OrderStatus};
use proptest::prelude::*;

fn engine() -> PriorityEngine {
    PriorityEngine::new(PolicyConfig::default())
}

fn queued_with_counter(
    drink: DrinkType,
    loyalty: LoyaltyTier,
    counter: u32,
    penalty_applied: bool,
) -> Order {
    Order::from(OrderSnapshot {
        id: 1,
        customer: "Test 1".to_string(),
        drink,
        loyalty,
        status: OrderStatus::Queued,
        arrival: 0.0,
        assigned_at: None,
        completed_at: None,
        worker: None,
        priority_score: 0.0,
        later_arrivals_served_first: counter,
        fairness_penalty_applied: penalty_applied,
        alert_sent: false,
        emergency_boost_counted: false,
        assignment_reason: None,
    })
}

fn drink_strategy() -> impl Strategy<Value = DrinkType> {
    prop::sample::select(DrinkType::ALL.to_vec())
}

fn loyalty_strategy() -> impl Strategy<Value = LoyaltyTier> {
    prop_oneof![Just(LoyaltyTier::Regular), Just(LoyaltyTier::Gold)]
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_espresso_nine_minutes_clamped_to_100() {
    // wait 40 (capped) + complexity 20 + loyalty 0 + urgency 75 - penalty 20 = 115
    let order = queued_with_counter(DrinkType::Espresso, LoyaltyTier::Regular, 4, false);
    let breakdown = engine().breakdown(&order, 9.0);

    assert_eq!(breakdown.wait_component, 40.0);
    assert_eq!(breakdown.complexity_component, 20.0);
    assert_eq!(breakdown.loyalty_component, 0.0);
    assert_eq!(breakdown.urgency_component, 75.0);
    assert_eq!(breakdown.fairness_penalty, 20.0);
    assert_eq!(breakdown.total, 100.0);
    assert_eq!(engine().score(&order, 9.0), 100.0);
}

#[test]
fn test_fresh_mocha_scores_zero() {
    let order = Order::new(1, "A".into(), DrinkType::Mocha, LoyaltyTier::Regular, 5.0);
    assert_eq!(engine().score(&order, 5.0), 0.0);
}

#[test]
fn test_penalty_drags_low_score_to_zero() {
    // Mocha at 1 minute: 5 + 0 + 0 + 6.25 = 11.25, minus 20 clamps to 0
    let order = queued_with_counter(DrinkType::Mocha, LoyaltyTier::Regular, 5, false);
    assert_eq!(engine().score(&order, 1.0), 0.0);

    let flagged = queued_with_counter(DrinkType::Mocha, LoyaltyTier::Regular, 5, true);
    assert_eq!(engine().score(&flagged, 1.0), 11.25);
}

#[test]
fn test_gold_outranks_regular_at_equal_wait() {
    let regular = Order::new(1, "A".into(), DrinkType::Latte, LoyaltyTier::Regular, 0.0);
    let gold = Order::new(2, "B".into(), DrinkType::Latte, LoyaltyTier::Gold, 0.0);

    let e = engine();
    assert_eq!(e.score(&gold, 3.0) - e.score(&regular, 3.0), 10.0);
}

#[test]
fn test_custom_emergency_boost() {
    let config = PolicyConfig {
        emergency_boost: 10.0,
        ..PolicyConfig::default()
    };
    let e = PriorityEngine::new(config);
    assert_eq!(e.urgency_component(8.5), 35.0);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_score_within_bounds(
        drink in drink_strategy(),
        loyalty in loyalty_strategy(),
        counter in 0u32..20,
        penalty_applied in any::<bool>(),
        arrival in 0.0f64..500.0,
        elapsed in -50.0f64..500.0,
    ) {
        let mut order = queued_with_counter(drink, loyalty, counter, penalty_applied);
        let mut snapshot = OrderSnapshot::from(&order);
        snapshot.arrival = arrival;
        order = Order::from(snapshot);

        let score = engine().score(&order, arrival + elapsed);
        prop_assert!((0.0..=100.0).contains(&score));
    }

    #[test]
    fn prop_urgency_monotone_within_tiers(a in 0.0f64..30.0, b in 0.0f64..30.0) {
        let tier = |w: f64| if w > 8.0 { 3 } else if w > 6.0 { 2 } else if w > 4.0 { 1 } else { 0 };
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assume!(tier(lo) == tier(hi));

        let e = engine();
        prop_assert!(e.urgency_component(lo) <= e.urgency_component(hi));
    }

    #[test]
    fn prop_urgency_saturates_after_warning(wait in 8.0001f64..1000.0) {
        prop_assert_eq!(engine().urgency_component(wait), 75.0);
    }

    #[test]
    fn prop_score_never_decreases_with_wait_past_six(
        drink in drink_strategy(),
        loyalty in loyalty_strategy(),
        a in 6.0f64..60.0,
        b in 6.0f64..60.0,
    ) {
        let order = Order::new(1, "A".into(), drink, loyalty, 0.0);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let e = engine();
        prop_assert!(e.score(&order, lo) <= e.score(&order, hi));
    }
}
