//! Workload balancing
//!
//! A worker's load is the prep time still outstanding on the orders it is
//! preparing. Its ratio compares that load to the fleet average, and the
//! ratio decides how the selection policy treats the worker.

use super::PolicyConfig;
use crate::core::time::Minutes;
use crate::models::order::{Order, OrderId};
use crate::models::worker::{Worker, WorkerId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Worker classification by load ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkloadClass {
    Overloaded,
    Normal,
    Underutilized,
}

/// Recomputes load and ratio for every worker
#[derive(Debug, Clone)]
pub struct WorkloadBalancer {
    overload_ratio: f64,
    underutilized_ratio: f64,
}

impl WorkloadBalancer {
    pub fn new(config: &PolicyConfig) -> Self {
        Self {
            overload_ratio: config.overload_ratio,
            underutilized_ratio: config.underutilized_ratio,
        }
    }

    /// Remaining prep per worker id
    ///
    /// Every worker appears in the result, idle ones with zero. Preparing
    /// orders whose worker does not exist are returned separately.
    pub fn loads(
        &self,
        workers: &[Worker],
        preparing: &[Order],
        now: Minutes,
    ) -> (BTreeMap<WorkerId, Minutes>, Vec<OrderId>) {
        let mut loads: BTreeMap<WorkerId, Minutes> =
            workers.iter().map(|w| (w.id(), 0.0)).collect();
        let mut orphaned = Vec::new();

        for order in preparing.iter().filter(|o| o.is_preparing()) {
            match order.worker().and_then(|id| loads.get_mut(&id)) {
                Some(load) => *load += order.remaining_prep(now),
                None => orphaned.push(order.id()),
            }
        }

        (loads, orphaned)
    }

    /// Overwrite every worker's load and ratio
    ///
    /// Returns the ids of preparing orders that reference a missing worker;
    /// they contribute no load.
    pub fn rebalance(
        &self,
        workers: &mut [Worker],
        preparing: &[Order],
        now: Minutes,
    ) -> Vec<OrderId> {
        let (loads, orphaned) = self.loads(workers, preparing, now);

        for order_id in &orphaned {
            warn!(order_id = *order_id, "preparing order references a missing worker; ignoring its load");
        }

        let average = average_load(loads.values().copied());
        for worker in workers.iter_mut() {
            let load = loads.get(&worker.id()).copied().unwrap_or(0.0);
            worker.update_workload(load, ratio(load, average));
        }

        orphaned
    }

    pub fn classify(&self, ratio: f64) -> WorkloadClass {
        if ratio > self.overload_ratio {
            WorkloadClass::Overloaded
        } else if ratio < self.underutilized_ratio {
            WorkloadClass::Underutilized
        } else {
            WorkloadClass::Normal
        }
    }
}

/// Mean of the loads; zero for an empty fleet
pub fn average_load(loads: impl IntoIterator<Item = Minutes>) -> Minutes {
    let (sum, count) = loads
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), load| (sum + load, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Load relative to the average; 1.0 when the average is zero
pub fn ratio(load: Minutes, average: Minutes) -> f64 {
    if average > 0.0 {
        load / average
    } else {
        1.0
    }
}

/// Balance of busy times as a percentage (100 = perfectly even)
///
/// `(1 - min(1, stddev / (mean + 1))) * 100` with the population standard
/// deviation. Fewer than two workers, or no busy time at all, is 100.
///
/// # Example
/// ```
/// use barista_dispatch_core_rs::policy::workload_balance_pct;
///
/// assert_eq!(workload_balance_pct(&[30.0, 30.0, 30.0]), 100.0);
/// assert_eq!(workload_balance_pct(&[12.0]), 100.0);
/// assert!(workload_balance_pct(&[10.0, 50.0]) < 100.0);
/// ```
pub fn workload_balance_pct(busy_minutes: &[Minutes]) -> f64 {
    if busy_minutes.len() < 2 {
        return 100.0;
    }

    let n = busy_minutes.len() as f64;
    let mean = busy_minutes.iter().sum::<f64>() / n;
    if mean <= 0.0 {
        return 100.0;
    }

    let variance = busy_minutes.iter().map(|b| (b - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    (1.0 - (std_dev / (mean + 1.0)).min(1.0)) * 100.0
}
