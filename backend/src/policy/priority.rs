//! Priority scoring
//!
//! ```text
//! wait        = max(0, now - arrival)
//! waitC       = min(40, wait * 5)
//! complexityC = complexity * 0.25
//! loyaltyC    = min(10, loyalty boost)
//! urgencyC    = 25 + emergency_boost  if wait > warning
//!               20                    if wait > 6
//!               15                    if wait > 4
//!               wait / 4 * 25         otherwise
//! raw         = sum - fairness_penalty  (counter > threshold, flag unset)
//! score       = clamp(raw, 0, 100)
//! ```
//!
//! The penalty flag itself is owned by the fairness tracker; scoring only
//! reads it.

use super::PolicyConfig;
use crate::core::time::Minutes;
use crate::models::order::Order;
use serde::Serialize;

const WAIT_WEIGHT: f64 = 5.0;
const WAIT_CAP: f64 = 40.0;
const COMPLEXITY_WEIGHT: f64 = 0.25;
const LOYALTY_CAP: f64 = 10.0;
const URGENCY_BASE: f64 = 25.0;

/// Per-component view of a score, for diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorityBreakdown {
    pub wait_minutes: Minutes,
    pub wait_component: f64,
    pub complexity_component: f64,
    pub loyalty_component: f64,
    pub urgency_component: f64,
    pub fairness_penalty: f64,
    pub total: f64,
}

/// Stateless scoring function parameterized by the policy thresholds
///
/// # Example
/// ```
/// use barista_dispatch_core_rs::policy::{PolicyConfig, PriorityEngine};
/// use barista_dispatch_core_rs::{DrinkType, LoyaltyTier, Order};
///
/// let engine = PriorityEngine::new(PolicyConfig::default());
/// let order = Order::new(1, "Test 1".into(), DrinkType::ColdBrew, LoyaltyTier::Gold, 0.0);
///
/// // 2 min wait: 10 + 25 + 10 + 12.5
/// assert_eq!(engine.score(&order, 2.0), 57.5);
/// ```
#[derive(Debug, Clone)]
pub struct PriorityEngine {
    config: PolicyConfig,
}

impl PriorityEngine {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Score in [0, 100]; orders that left the queue keep their frozen score
    pub fn score(&self, order: &Order, now: Minutes) -> f64 {
        if !order.is_queued() {
            return order.priority_score();
        }
        self.breakdown(order, now).total
    }

    /// Every component of the score, computed as if the order were queued
    pub fn breakdown(&self, order: &Order, now: Minutes) -> PriorityBreakdown {
        let wait = order.wait_minutes(now);

        let wait_component = (wait * WAIT_WEIGHT).min(WAIT_CAP);
        let complexity_component = order.drink().complexity_score() as f64 * COMPLEXITY_WEIGHT;
        let loyalty_component = (order.loyalty().boost() as f64).min(LOYALTY_CAP);
        let urgency_component = self.urgency_component(wait);

        let fairness_penalty = if order.later_arrivals_served_first()
            > self.config.fairness_threshold
            && !order.fairness_penalty_applied()
        {
            self.config.fairness_penalty
        } else {
            0.0
        };

        let raw = wait_component + complexity_component + loyalty_component + urgency_component
            - fairness_penalty;

        PriorityBreakdown {
            wait_minutes: wait,
            wait_component,
            complexity_component,
            loyalty_component,
            urgency_component,
            fairness_penalty,
            total: raw.clamp(0.0, 100.0),
        }
    }

    /// Tiered urgency for a given wait
    pub fn urgency_component(&self, wait: Minutes) -> f64 {
        if wait > self.config.warning_threshold_minutes {
            URGENCY_BASE + self.config.emergency_boost
        } else if wait > 6.0 {
            20.0
        } else if wait > 4.0 {
            15.0
        } else {
            (wait / 4.0) * URGENCY_BASE
        }
    }

    /// Order is close enough to timing out to bypass normal selection
    pub fn should_force_assign(&self, order: &Order, now: Minutes) -> bool {
        order.wait_minutes(now) >= self.config.force_threshold()
    }

    /// Order's urgency includes the emergency add-on
    pub fn is_emergency_boost(&self, order: &Order, now: Minutes) -> bool {
        order.wait_minutes(now) > self.config.warning_threshold_minutes
    }
}
