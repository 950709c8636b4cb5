//! Dispatch Policy Module
//!
//! Everything that decides *which* order a barista takes next.
//!
//! # Overview
//!
//! Every tick the scheduler rescores the queue, refreshes worker load, and
//! then asks a [`SelectionPolicy`] to pick an order for each free barista.
//! The pieces are:
//! - [`PriorityEngine`]: pure scoring function, result in [0, 100]
//! - [`WorkloadBalancer`]: per-worker remaining load and ratio to the fleet
//! - [`FairnessTracker`]: counts how often an order was passed over
//! - [`AlertMonitor`]: one-time near-timeout alerts
//!
//! # Policy Interface
//!
//! All selection policies implement the `SelectionPolicy` trait:
//! ```rust
//! use barista_dispatch_core_rs::policy::{PolicyConfig, SelectionPolicy};
//! use barista_dispatch_core_rs::{Minutes, Order, Worker};
//!
//! struct LastInFirstOut;
//!
//! impl SelectionPolicy for LastInFirstOut {
//!     fn name(&self) -> &'static str {
//!         "lifo"
//!     }
//!
//!     fn select(
//!         &self,
//!         _worker: &Worker,
//!         queue: &[Order],
//!         _now: Minutes,
//!         _config: &PolicyConfig,
//!     ) -> Option<usize> {
//!         queue.len().checked_sub(1)
//!     }
//! }
//! ```
//!
//! Available policies:
//! 1. **LoadAware**: emergency first, then workload-aware choice (default)
//! 2. **Fifo**: earliest arrival first (baseline for comparison)

use crate::config::{require_positive, ConfigError};
use crate::core::time::Minutes;
use crate::models::order::Order;
use crate::models::worker::Worker;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

pub mod alerts;
pub mod fairness;
pub mod fifo;
pub mod priority;
pub mod selection;
pub mod workload;

pub use alerts::{Alert, AlertMonitor};
pub use fairness::FairnessTracker;
pub use fifo::FifoPolicy;
pub use priority::{PriorityBreakdown, PriorityEngine};
pub use selection::LoadAwarePolicy;
pub use workload::{workload_balance_pct, WorkloadBalancer, WorkloadClass};

// ============================================================================
// Configuration
// ============================================================================

/// Thresholds and weights shared by every policy component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Target maximum wait; waits beyond it count as timeouts
    pub max_wait_minutes: Minutes,

    /// Orders this close to the max wait are force-assigned
    pub force_margin_minutes: Minutes,

    /// Waits beyond this get the emergency urgency component
    pub warning_threshold_minutes: Minutes,

    /// Waits at or beyond this raise a manager alert
    pub emergency_alert_threshold_minutes: Minutes,

    /// Ratio above which a worker is overloaded
    pub overload_ratio: f64,

    /// Ratio below which a worker is underutilized
    pub underutilized_ratio: f64,

    /// Skips tolerated before an order counts as unfairly treated
    pub fairness_threshold: u32,

    /// Points subtracted from an unfairly treated order's raw score
    pub fairness_penalty: f64,

    /// Urgency add-on for waits past the warning threshold
    pub emergency_boost: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            max_wait_minutes: 10.0,
            force_margin_minutes: 0.5,
            warning_threshold_minutes: 8.0,
            emergency_alert_threshold_minutes: 9.5,
            overload_ratio: 1.2,
            underutilized_ratio: 0.8,
            fairness_threshold: 3,
            fairness_penalty: 20.0,
            emergency_boost: 50.0,
        }
    }
}

impl PolicyConfig {
    /// Wait at which an order must be assigned regardless of score
    pub fn force_threshold(&self) -> Minutes {
        self.max_wait_minutes - self.force_margin_minutes
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("max_wait_minutes", self.max_wait_minutes)?;
        require_positive("warning_threshold_minutes", self.warning_threshold_minutes)?;
        require_positive(
            "emergency_alert_threshold_minutes",
            self.emergency_alert_threshold_minutes,
        )?;
        if !(self.force_margin_minutes >= 0.0 && self.force_margin_minutes < self.max_wait_minutes)
        {
            return Err(ConfigError::Invalid(format!(
                "force_margin_minutes must be within [0, max_wait_minutes), got {}",
                self.force_margin_minutes
            )));
        }
        if !(self.underutilized_ratio < self.overload_ratio) {
            return Err(ConfigError::Invalid(format!(
                "underutilized_ratio ({}) must be below overload_ratio ({})",
                self.underutilized_ratio, self.overload_ratio
            )));
        }
        if self.fairness_penalty < 0.0 || self.emergency_boost < 0.0 {
            return Err(ConfigError::Invalid(
                "fairness_penalty and emergency_boost must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Selection
// ============================================================================

/// Picks the order a free worker should take next
pub trait SelectionPolicy: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Index into `queue` of the order to give `worker`, or `None`
    ///
    /// `queue` holds only still-queued candidates, sorted by score
    /// descending, arrival ascending, id ascending.
    fn select(
        &self,
        worker: &Worker,
        queue: &[Order],
        now: Minutes,
        config: &PolicyConfig,
    ) -> Option<usize>;
}

/// Serializable choice of selection policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    #[default]
    LoadAware,
    Fifo,
}

impl PolicyKind {
    /// Instantiate the policy
    pub fn build(self) -> Box<dyn SelectionPolicy> {
        match self {
            PolicyKind::LoadAware => Box::new(LoadAwarePolicy::new()),
            PolicyKind::Fifo => Box::new(FifoPolicy::new()),
        }
    }
}

/// Human-readable explanation stored on the order at assignment
///
/// # Example
/// ```
/// use barista_dispatch_core_rs::policy::{assignment_reason, PolicyConfig};
/// use barista_dispatch_core_rs::{DrinkType, LoyaltyTier, Order};
///
/// let mut order = Order::new(1, "Test 1".into(), DrinkType::Mocha, LoyaltyTier::Regular, 0.0);
/// order.set_priority_score(81.0);
///
/// let reason = assignment_reason(&order, 0.5, 9.6, &PolicyConfig::default());
/// assert_eq!(
///     reason,
///     "EMERGENCY: Approaching 10-min timeout. Complex order to utilize underused barista. \
///      Priority=81.0, Wait=9.6 min, Drink=Mocha."
/// );
/// ```
pub fn assignment_reason(
    order: &Order,
    worker_ratio: f64,
    wait: Minutes,
    config: &PolicyConfig,
) -> String {
    let mut reason = String::new();

    if wait >= config.force_threshold() {
        let _ = write!(
            reason,
            "EMERGENCY: Approaching {}-min timeout. ",
            config.max_wait_minutes
        );
    } else if wait >= config.warning_threshold_minutes {
        let _ = write!(
            reason,
            "Urgency: Wait >{} min. ",
            config.warning_threshold_minutes
        );
    }

    if worker_ratio > config.overload_ratio {
        reason.push_str("Short order to balance overloaded barista. ");
    } else if worker_ratio < config.underutilized_ratio {
        reason.push_str("Complex order to utilize underused barista. ");
    }

    let _ = write!(
        reason,
        "Priority={:.1}, Wait={:.1} min, Drink={}.",
        order.priority_score(),
        wait,
        order.drink()
    );
    reason
}
