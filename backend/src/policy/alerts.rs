//! Near-timeout alerts
//!
//! Each queued order raises at most one manager alert, the first time its
//! wait reaches the alert threshold.

use super::PolicyConfig;
use crate::core::time::Minutes;
use crate::models::order::{Order, OrderId};
use serde::Serialize;
use tracing::warn;

/// Manager alert for an order about to time out
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub order_id: OrderId,
    pub customer: String,
    pub wait_minutes: Minutes,
    pub max_wait_minutes: Minutes,
}

#[derive(Debug, Clone)]
pub struct AlertMonitor {
    threshold: Minutes,
    max_wait: Minutes,
}

impl AlertMonitor {
    pub fn new(config: &PolicyConfig) -> Self {
        Self {
            threshold: config.emergency_alert_threshold_minutes,
            max_wait: config.max_wait_minutes,
        }
    }

    /// Raise alerts for queued orders that crossed the threshold
    ///
    /// Marks each alerted order so it never fires again.
    pub fn check<'a>(
        &self,
        orders: impl IntoIterator<Item = &'a mut Order>,
        now: Minutes,
    ) -> Vec<Alert> {
        let mut alerts = Vec::new();

        for order in orders {
            if !order.is_queued() || order.alert_sent() {
                continue;
            }
            let wait = order.wait_minutes(now);
            if wait >= self.threshold && order.mark_alert_sent() {
                warn!(
                    order_id = order.id(),
                    customer = order.customer(),
                    wait_minutes = wait,
                    max_wait_minutes = self.max_wait,
                    "order approaching timeout"
                );
                alerts.push(Alert {
                    order_id: order.id(),
                    customer: order.customer().to_string(),
                    wait_minutes: wait,
                    max_wait_minutes: self.max_wait,
                });
            }
        }

        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::{DrinkType, LoyaltyTier};

    #[test]
    fn test_alert_fires_once() {
        let monitor = AlertMonitor::new(&PolicyConfig::default());
        let mut orders = vec![Order::new(
            1,
            "Neha".into(),
            DrinkType::Mocha,
            LoyaltyTier::Regular,
            0.0,
        )];

        assert!(monitor.check(orders.iter_mut(), 9.0).is_empty());

        let alerts = monitor.check(orders.iter_mut(), 9.5);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].customer, "Neha");
        assert_eq!(alerts[0].max_wait_minutes, 10.0);

        assert!(monitor.check(orders.iter_mut(), 12.0).is_empty());
        assert!(orders[0].alert_sent());
    }

    #[test]
    fn test_non_queued_orders_ignored() {
        let monitor = AlertMonitor::new(&PolicyConfig::default());
        let mut order = Order::new(1, "A".into(), DrinkType::Mocha, LoyaltyTier::Regular, 0.0);
        order.assign(1, 0.5, String::new()).unwrap();

        assert!(monitor.check(std::iter::once(&mut order), 20.0).is_empty());
        assert!(!order.alert_sent());
    }
}
