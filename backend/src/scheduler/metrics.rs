//! Point-in-time shop metrics

use crate::core::time::Minutes;
use crate::models::order::Order;
use crate::policy::PolicyConfig;
use serde::Serialize;

/// Aggregate view over every order in the store
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Mean wait of completed orders
    pub avg_wait_minutes: Minutes,
    pub max_wait_minutes: Minutes,
    /// Completed orders that waited longer than the max wait, as a fraction
    pub timeout_rate: f64,
    /// Orders passed over more than the fairness threshold
    pub fairness_violations: usize,
    /// Every order the store knows about
    pub total_processed: usize,
    pub total_completed: usize,
    pub queue_size: usize,
    pub recorded_at: Minutes,
}

impl MetricsSnapshot {
    /// Compute the snapshot from a full order listing
    pub fn from_orders(orders: &[Order], config: &PolicyConfig, now: Minutes) -> Self {
        let waits: Vec<Minutes> = orders
            .iter()
            .filter(|o| o.is_completed())
            .map(|o| o.wait_minutes(now))
            .collect();

        let total_completed = waits.len();
        let (avg_wait_minutes, max_wait_minutes, timeout_rate) = if waits.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            let n = waits.len() as f64;
            let timeouts = waits.iter().filter(|&&w| w > config.max_wait_minutes).count();
            (
                waits.iter().sum::<f64>() / n,
                waits.iter().copied().fold(0.0, f64::max),
                (timeouts as f64 / n).clamp(0.0, 1.0),
            )
        };

        Self {
            avg_wait_minutes,
            max_wait_minutes,
            timeout_rate,
            fairness_violations: orders
                .iter()
                .filter(|o| o.is_fairness_violation(config.fairness_threshold))
                .count(),
            total_processed: orders.len(),
            total_completed,
            queue_size: orders.iter().filter(|o| o.is_queued()).count(),
            recorded_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::{DrinkType, LoyaltyTier};

    fn completed(id: u64, arrival: Minutes, assigned: Minutes) -> Order {
        let mut order = Order::new(id, "A".into(), DrinkType::ColdBrew, LoyaltyTier::Regular, arrival);
        order.assign(1, assigned, String::new()).unwrap();
        order.complete(assigned + 1.0).unwrap();
        order
    }

    #[test]
    fn test_empty_store() {
        let snapshot = MetricsSnapshot::from_orders(&[], &PolicyConfig::default(), 3.0);
        assert_eq!(snapshot.avg_wait_minutes, 0.0);
        assert_eq!(snapshot.timeout_rate, 0.0);
        assert_eq!(snapshot.total_processed, 0);
        assert_eq!(snapshot.recorded_at, 3.0);
    }

    #[test]
    fn test_waits_and_timeouts() {
        let orders = vec![
            completed(1, 0.0, 2.0),
            completed(2, 0.0, 10.0),
            completed(3, 0.0, 12.0),
            Order::new(4, "B".into(), DrinkType::Latte, LoyaltyTier::Gold, 13.0),
        ];

        let snapshot = MetricsSnapshot::from_orders(&orders, &PolicyConfig::default(), 14.0);

        assert_eq!(snapshot.total_completed, 3);
        assert_eq!(snapshot.total_processed, 4);
        assert_eq!(snapshot.queue_size, 1);
        assert_eq!(snapshot.avg_wait_minutes, 8.0);
        assert_eq!(snapshot.max_wait_minutes, 12.0);
        // exactly 10 minutes is not a timeout
        assert!((snapshot.timeout_rate - 1.0 / 3.0).abs() < 1e-9);
    }
}
