//! Order model
//!
//! Represents one drink order moving through the shop.
//! Each order has:
//! - Customer label, drink type, loyalty tier
//! - Arrival, assignment and completion times (minutes)
//! - Assigned worker and assignment reason
//! - Priority score, recomputed every tick while queued
//! - Fairness, alert and emergency bookkeeping
//! - Status (Queued, Preparing, Completed)
//!
//! CRITICAL: status only moves forward. `assign` and `complete` are the only
//! lifecycle transitions and each sets its timestamp exactly once.

use crate::core::time::{elapsed_minutes, Minutes};
use crate::models::catalog::{DrinkType, LoyaltyTier};
use crate::models::worker::WorkerId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Store-assigned order identifier (monotonically increasing)
pub type OrderId = u64;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Waiting for a barista
    Queued,

    /// Assigned and being prepared
    Preparing,

    /// Handed to the customer
    Completed,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Queued => f.write_str("QUEUED"),
            OrderStatus::Preparing => f.write_str("PREPARING"),
            OrderStatus::Completed => f.write_str("COMPLETED"),
        }
    }
}

/// Errors raised by lifecycle transitions
#[derive(Debug, Error, PartialEq)]
pub enum OrderError {
    #[error("Order {id} cannot be assigned while {status}")]
    NotQueued { id: OrderId, status: OrderStatus },

    #[error("Order {id} cannot be completed while {status}")]
    NotPreparing { id: OrderId, status: OrderStatus },
}

/// A drink order
///
/// # Example
/// ```
/// use barista_dispatch_core_rs::{DrinkType, LoyaltyTier, Order, OrderStatus};
///
/// let mut order = Order::new(1, "Riya".to_string(), DrinkType::Latte, LoyaltyTier::Gold, 0.0);
/// assert_eq!(order.status(), OrderStatus::Queued);
///
/// order.assign(2, 3.0, "Priority=55.0".to_string()).unwrap();
/// assert_eq!(order.wait_minutes(10.0), 3.0); // frozen at assignment
///
/// order.complete(7.0).unwrap();
/// assert_eq!(order.status(), OrderStatus::Completed);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    id: OrderId,
    customer: String,
    drink: DrinkType,
    loyalty: LoyaltyTier,
    status: OrderStatus,

    /// Time the order entered the queue
    arrival: Minutes,

    /// Set once, on Queued -> Preparing
    assigned_at: Option<Minutes>,

    /// Set once, on Preparing -> Completed
    completed_at: Option<Minutes>,

    /// Set on assignment, never cleared
    worker: Option<WorkerId>,

    /// Always within [0, 100]; frozen once assigned
    priority_score: f64,

    /// Times a strictly later arrival was assigned while this order waited
    later_arrivals_served_first: u32,

    fairness_penalty_applied: bool,
    alert_sent: bool,

    /// First tick the wait crossed the warning threshold
    emergency_boost_counted: bool,

    assignment_reason: Option<String>,
}

impl Order {
    /// Create a queued order
    pub fn new(
        id: OrderId,
        customer: String,
        drink: DrinkType,
        loyalty: LoyaltyTier,
        arrival: Minutes,
    ) -> Self {
        Self {
            id,
            customer,
            drink,
            loyalty,
            status: OrderStatus::Queued,
            arrival,
            assigned_at: None,
            completed_at: None,
            worker: None,
            priority_score: 0.0,
            later_arrivals_served_first: 0,
            fairness_penalty_applied: false,
            alert_sent: false,
            emergency_boost_counted: false,
            assignment_reason: None,
        }
    }

    // ========================================================================
    // Getters
    // ========================================================================

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn customer(&self) -> &str {
        &self.customer
    }

    pub fn drink(&self) -> DrinkType {
        self.drink
    }

    pub fn loyalty(&self) -> LoyaltyTier {
        self.loyalty
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn arrival(&self) -> Minutes {
        self.arrival
    }

    pub fn assigned_at(&self) -> Option<Minutes> {
        self.assigned_at
    }

    pub fn completed_at(&self) -> Option<Minutes> {
        self.completed_at
    }

    pub fn worker(&self) -> Option<WorkerId> {
        self.worker
    }

    pub fn priority_score(&self) -> f64 {
        self.priority_score
    }

    pub fn later_arrivals_served_first(&self) -> u32 {
        self.later_arrivals_served_first
    }

    pub fn fairness_penalty_applied(&self) -> bool {
        self.fairness_penalty_applied
    }

    pub fn alert_sent(&self) -> bool {
        self.alert_sent
    }

    pub fn emergency_boost_counted(&self) -> bool {
        self.emergency_boost_counted
    }

    pub fn assignment_reason(&self) -> Option<&str> {
        self.assignment_reason.as_deref()
    }

    pub fn is_queued(&self) -> bool {
        self.status == OrderStatus::Queued
    }

    pub fn is_preparing(&self) -> bool {
        self.status == OrderStatus::Preparing
    }

    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }

    /// Preparation time of the drink, in minutes
    pub fn prep_minutes(&self) -> Minutes {
        self.drink.prep_time_minutes() as Minutes
    }

    // ========================================================================
    // Derived timing
    // ========================================================================

    /// Minutes waited before a barista picked the order up
    ///
    /// Measured up to `now` while queued and frozen at the assignment time
    /// afterwards. Never negative.
    pub fn wait_minutes(&self, now: Minutes) -> Minutes {
        elapsed_minutes(self.arrival, self.assigned_at.unwrap_or(now))
    }

    /// Prep time still outstanding at `now` (zero unless preparing)
    pub fn remaining_prep(&self, now: Minutes) -> Minutes {
        match (self.status, self.assigned_at) {
            (OrderStatus::Preparing, Some(at)) => {
                (self.prep_minutes() - elapsed_minutes(at, now)).max(0.0)
            }
            _ => 0.0,
        }
    }

    /// True once a preparing order has been worked on for its full prep time
    pub fn is_prep_done(&self, now: Minutes) -> bool {
        match (self.status, self.assigned_at) {
            (OrderStatus::Preparing, Some(at)) => now - at >= self.prep_minutes(),
            _ => false,
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Queued -> Preparing
    ///
    /// # Errors
    /// `NotQueued` if the order already left the queue.
    pub fn assign(
        &mut self,
        worker: WorkerId,
        now: Minutes,
        reason: String,
    ) -> Result<(), OrderError> {
        if self.status != OrderStatus::Queued {
            return Err(OrderError::NotQueued {
                id: self.id,
                status: self.status,
            });
        }

        self.status = OrderStatus::Preparing;
        self.assigned_at = Some(now);
        self.worker = Some(worker);
        self.assignment_reason = Some(reason);
        Ok(())
    }

    /// Drop the worker reference of a queued order
    ///
    /// Returns the reference that was cleared. Orders that left the queue
    /// keep theirs.
    pub fn clear_worker(&mut self) -> Option<WorkerId> {
        if self.status != OrderStatus::Queued {
            return None;
        }
        self.worker.take()
    }

    /// Preparing -> Completed
    ///
    /// # Errors
    /// `NotPreparing` unless the order is currently being prepared.
    pub fn complete(&mut self, now: Minutes) -> Result<(), OrderError> {
        if self.status != OrderStatus::Preparing {
            return Err(OrderError::NotPreparing {
                id: self.id,
                status: self.status,
            });
        }

        self.status = OrderStatus::Completed;
        self.completed_at = Some(now);
        Ok(())
    }

    // ========================================================================
    // Scheduler bookkeeping
    // ========================================================================

    /// Store a freshly computed score; ignored once the order left the queue
    pub fn set_priority_score(&mut self, score: f64) {
        if self.status == OrderStatus::Queued {
            self.priority_score = if score.is_nan() {
                0.0
            } else {
                score.clamp(0.0, 100.0)
            };
        }
    }

    /// Count one strictly later arrival served ahead of this order
    ///
    /// Returns true when this call set the fairness penalty flag.
    pub fn record_later_arrival_served(&mut self, threshold: u32) -> bool {
        self.later_arrivals_served_first = self.later_arrivals_served_first.saturating_add(1);
        if self.later_arrivals_served_first > threshold && !self.fairness_penalty_applied {
            self.fairness_penalty_applied = true;
            return true;
        }
        false
    }

    /// Fairness violation: skipped more than `threshold` times
    pub fn is_fairness_violation(&self, threshold: u32) -> bool {
        self.later_arrivals_served_first > threshold
    }

    /// Flag the near-timeout alert; returns false if it was already sent
    pub fn mark_alert_sent(&mut self) -> bool {
        if self.alert_sent {
            return false;
        }
        self.alert_sent = true;
        true
    }

    /// Flag the emergency boost; returns false if it was already counted
    pub fn mark_emergency_boost(&mut self) -> bool {
        if self.emergency_boost_counted {
            return false;
        }
        self.emergency_boost_counted = true;
        true
    }
}

/// Plain serializable mirror of an [`Order`]
///
/// Restores an exact state, bypassing lifecycle checks. Used by the file
/// backend and by tests that need a specific starting point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    pub id: OrderId,
    pub customer: String,
    pub drink: DrinkType,
    pub loyalty: LoyaltyTier,
    pub status: OrderStatus,
    pub arrival: Minutes,
    pub assigned_at: Option<Minutes>,
    pub completed_at: Option<Minutes>,
    pub worker: Option<WorkerId>,
    pub priority_score: f64,
    pub later_arrivals_served_first: u32,
    pub fairness_penalty_applied: bool,
    pub alert_sent: bool,
    pub emergency_boost_counted: bool,
    pub assignment_reason: Option<String>,
}

impl From<&Order> for OrderSnapshot {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            customer: order.customer.clone(),
            drink: order.drink,
            loyalty: order.loyalty,
            status: order.status,
            arrival: order.arrival,
            assigned_at: order.assigned_at,
            completed_at: order.completed_at,
            worker: order.worker,
            priority_score: order.priority_score,
            later_arrivals_served_first: order.later_arrivals_served_first,
            fairness_penalty_applied: order.fairness_penalty_applied,
            alert_sent: order.alert_sent,
            emergency_boost_counted: order.emergency_boost_counted,
            assignment_reason: order.assignment_reason.clone(),
        }
    }
}

impl From<OrderSnapshot> for Order {
    fn from(snapshot: OrderSnapshot) -> Self {
        Self {
            id: snapshot.id,
            customer: snapshot.customer,
            drink: snapshot.drink,
            loyalty: snapshot.loyalty,
            status: snapshot.status,
            arrival: snapshot.arrival,
            assigned_at: snapshot.assigned_at,
            completed_at: snapshot.completed_at,
            worker: snapshot.worker,
            priority_score: snapshot.priority_score.clamp(0.0, 100.0),
            later_arrivals_served_first: snapshot.later_arrivals_served_first,
            fairness_penalty_applied: snapshot.fairness_penalty_applied,
            alert_sent: snapshot.alert_sent,
            emergency_boost_counted: snapshot.emergency_boost_counted,
            assignment_reason: snapshot.assignment_reason,
        }
    }
}
