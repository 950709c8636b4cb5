//! FIFO (First-In-First-Out) Policy
//!
//! Simplest baseline policy: serve the earliest arrival first.
//!
//! # Behavior
//!
//! - Ignores score, workload and emergencies
//! - The scheduler's emergency sweep still runs after the primary pass
//!
//! # Use Case
//!
//! - Baseline for comparison with the load-aware policy
//! - Testing and validation

use super::{PolicyConfig, SelectionPolicy};
use crate::core::time::Minutes;
use crate::models::order::Order;
use crate::models::worker::Worker;

/// FIFO policy: earliest arrival, then lowest id
///
/// # Example
///
/// ```
/// use barista_dispatch_core_rs::policy::{FifoPolicy, PolicyConfig, SelectionPolicy};
/// use barista_dispatch_core_rs::{DrinkType, LoyaltyTier, Order, Worker};
///
/// let policy = FifoPolicy::new();
/// let worker = Worker::new(1, "Barista 1".to_string());
/// let queue = vec![
///     Order::new(2, "B".into(), DrinkType::Latte, LoyaltyTier::Gold, 3.0),
///     Order::new(1, "A".into(), DrinkType::Mocha, LoyaltyTier::Regular, 1.0),
/// ];
///
/// assert_eq!(policy.select(&worker, &queue, 5.0, &PolicyConfig::default()), Some(1));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FifoPolicy;

impl FifoPolicy {
    /// Create new FIFO policy
    pub fn new() -> Self {
        Self
    }
}

impl SelectionPolicy for FifoPolicy {
    fn name(&self) -> &'static str {
        "fifo"
    }

    fn select(
        &self,
        _worker: &Worker,
        queue: &[Order],
        _now: Minutes,
        _config: &PolicyConfig,
    ) -> Option<usize> {
        queue
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.arrival()
                    .total_cmp(&b.arrival())
                    .then_with(|| a.id().cmp(&b.id()))
            })
            .map(|(idx, _)| idx)
    }
}
