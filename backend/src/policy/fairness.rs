//! Fairness tracking
//!
//! Whenever an order is assigned, every order still waiting that arrived
//! strictly earlier has been passed over once more. Orders passed over more
//! than the threshold count as fairness violations and are flagged for the
//! one-time score penalty.

use crate::models::order::Order;

#[derive(Debug, Clone)]
pub struct FairnessTracker {
    threshold: u32,
}

impl FairnessTracker {
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Record that `assigned` was served ahead of the queued orders in `waiting`
    ///
    /// Returns how many orders were newly flagged for the penalty.
    pub fn record_assignment<'a>(
        &self,
        assigned: &Order,
        waiting: impl IntoIterator<Item = &'a mut Order>,
    ) -> usize {
        let mut newly_flagged = 0;
        for order in waiting {
            if order.is_queued()
                && order.id() != assigned.id()
                && order.arrival() < assigned.arrival()
                && order.record_later_arrival_served(self.threshold)
            {
                newly_flagged += 1;
            }
        }
        newly_flagged
    }

    pub fn is_violation(&self, order: &Order) -> bool {
        order.is_fairness_violation(self.threshold)
    }

    /// Violations among `orders`, counted as of now
    pub fn count_violations<'a>(&self, orders: impl IntoIterator<Item = &'a Order>) -> usize {
        orders.into_iter().filter(|o| self.is_violation(o)).count()
    }
}
