//! Load-aware selection (default policy)
//!
//! # Behavior
//!
//! For a free worker, in order:
//! 1. The first queued order whose wait reached `max_wait - force_margin`
//! 2. Overloaded worker (ratio > 1.2): the shortest drink, ties broken by
//!    highest score and then queue position
//! 3. Otherwise the highest score, ties broken by earliest arrival
//!
//! Underutilized and normal workers share rule 3. A worker only reaches the
//! selection step when its load is zero, so inside a tick its ratio is 0 or
//! 1.0 and rule 2 applies only to callers that invoke the policy directly.

use super::{PolicyConfig, SelectionPolicy};
use crate::core::time::Minutes;
use crate::models::order::Order;
use crate::models::worker::Worker;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadAwarePolicy;

impl LoadAwarePolicy {
    pub fn new() -> Self {
        Self
    }
}

impl SelectionPolicy for LoadAwarePolicy {
    fn name(&self) -> &'static str {
        "load_aware"
    }

    fn select(
        &self,
        worker: &Worker,
        queue: &[Order],
        now: Minutes,
        config: &PolicyConfig,
    ) -> Option<usize> {
        if queue.is_empty() {
            return None;
        }

        let force_at = config.force_threshold();
        if let Some(idx) = queue.iter().position(|o| o.wait_minutes(now) >= force_at) {
            return Some(idx);
        }

        if worker.workload_ratio() > config.overload_ratio {
            return shortest_prep(queue);
        }

        highest_score(queue)
    }
}

/// Smallest prep time; ties go to the higher score, then the earlier index
fn shortest_prep(queue: &[Order]) -> Option<usize> {
    queue
        .iter()
        .enumerate()
        .min_by(|(ia, a), (ib, b)| {
            a.prep_minutes()
                .total_cmp(&b.prep_minutes())
                .then_with(|| b.priority_score().total_cmp(&a.priority_score()))
                .then_with(|| ia.cmp(ib))
        })
        .map(|(idx, _)| idx)
}

/// Highest score; ties go to the earlier arrival, then the earlier index
fn highest_score(queue: &[Order]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, order) in queue.iter().enumerate() {
        let better = match best {
            None => true,
            Some(b) => {
                let current = &queue[b];
                match order.priority_score().total_cmp(&current.priority_score()) {
                    Ordering::Greater => true,
                    Ordering::Equal => order.arrival() < current.arrival(),
                    Ordering::Less => false,
                }
            }
        };
        if better {
            best = Some(idx);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::{DrinkType, LoyaltyTier};

    fn queued(id: u64, drink: DrinkType, arrival: Minutes, score: f64) -> Order {
        let mut order = Order::new(id, format!("Test {}", id), drink, LoyaltyTier::Regular, arrival);
        order.set_priority_score(score);
        order
    }

    fn worker_with_ratio(ratio: f64) -> Worker {
        let mut worker = Worker::new(1, "Barista 1".into());
        worker.update_workload(0.0, ratio);
        worker
    }

    #[test]
    fn test_empty_queue() {
        let policy = LoadAwarePolicy::new();
        let w = worker_with_ratio(1.0);
        assert_eq!(policy.select(&w, &[], 0.0, &PolicyConfig::default()), None);
    }

    #[test]
    fn test_emergency_beats_score() {
        let policy = LoadAwarePolicy::new();
        let queue = vec![
            queued(1, DrinkType::ColdBrew, 5.0, 90.0),
            queued(2, DrinkType::Mocha, 0.0, 20.0),
        ];
        let w = worker_with_ratio(1.0);
        assert_eq!(policy.select(&w, &queue, 9.6, &PolicyConfig::default()), Some(1));
    }

    #[test]
    fn test_overloaded_prefers_short_drink() {
        let policy = LoadAwarePolicy::new();
        let queue = vec![
            queued(1, DrinkType::Mocha, 0.0, 50.0),
            queued(2, DrinkType::Espresso, 1.0, 50.0),
        ];
        let w = worker_with_ratio(1.5);
        assert_eq!(policy.select(&w, &queue, 2.0, &PolicyConfig::default()), Some(1));
    }

    #[test]
    fn test_overloaded_tie_on_prep_uses_score() {
        let policy = LoadAwarePolicy::new();
        let queue = vec![
            queued(1, DrinkType::Espresso, 0.0, 40.0),
            queued(2, DrinkType::Americano, 1.0, 45.0),
        ];
        let w = worker_with_ratio(1.5);
        assert_eq!(policy.select(&w, &queue, 2.0, &PolicyConfig::default()), Some(1));
    }

    #[test]
    fn test_score_tie_goes_to_earliest_arrival() {
        let policy = LoadAwarePolicy::new();
        // Deliberately not in queue order
        let queue = vec![
            queued(2, DrinkType::Latte, 3.0, 60.0),
            queued(1, DrinkType::Latte, 1.0, 60.0),
            queued(3, DrinkType::Latte, 0.0, 30.0),
        ];
        for ratio in [0.0, 1.0] {
            let w = worker_with_ratio(ratio);
            assert_eq!(policy.select(&w, &queue, 4.0, &PolicyConfig::default()), Some(1));
        }
    }
}
