//! Worker (barista) model
//!
//! A worker prepares at most one order at a time. Its workload fields are
//! recomputed by the scheduler every tick; `current_workload_minutes <= 0`
//! means the worker is free to take a new order.

use crate::core::time::Minutes;
use crate::models::order::OrderId;
use serde::{Deserialize, Serialize};

/// Worker identifier; ascending ids define the fixed worker order
pub type WorkerId = u32;

/// A barista
///
/// # Example
/// ```
/// use barista_dispatch_core_rs::Worker;
///
/// let mut worker = Worker::new(1, "Barista 1".to_string());
/// assert!(worker.is_available());
///
/// worker.start_order(7, 4.0);
/// assert!(!worker.is_available());
/// assert_eq!(worker.current_order(), Some(7));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Worker {
    id: WorkerId,
    name: String,

    /// Remaining prep minutes across the worker's orders
    current_workload_minutes: Minutes,

    /// Load relative to the fleet average (1.0 when the average is zero)
    workload_ratio: f64,

    /// Order currently being prepared
    current_order: Option<OrderId>,
}

impl Worker {
    /// Create an idle worker
    pub fn new(id: WorkerId, name: String) -> Self {
        Self {
            id,
            name,
            current_workload_minutes: 0.0,
            workload_ratio: 1.0,
            current_order: None,
        }
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current_workload_minutes(&self) -> Minutes {
        self.current_workload_minutes
    }

    pub fn workload_ratio(&self) -> f64 {
        self.workload_ratio
    }

    pub fn current_order(&self) -> Option<OrderId> {
        self.current_order
    }

    /// Free to take an order
    pub fn is_available(&self) -> bool {
        self.current_workload_minutes <= 0.0
    }

    /// Overwrite load and ratio with freshly computed values
    pub fn update_workload(&mut self, load_minutes: Minutes, ratio: f64) {
        self.current_workload_minutes = load_minutes.max(0.0);
        self.workload_ratio = ratio;
    }

    /// Take an order; the worker is busy for its full prep time
    pub fn start_order(&mut self, order_id: OrderId, prep_minutes: Minutes) {
        self.current_order = Some(order_id);
        self.current_workload_minutes = prep_minutes;
    }

    /// Release the order if it is the one being prepared
    pub fn finish_order(&mut self, order_id: OrderId) {
        if self.current_order == Some(order_id) {
            self.current_order = None;
        }
    }

    /// Back to idle
    pub fn reset(&mut self) {
        self.current_workload_minutes = 0.0;
        self.workload_ratio = 1.0;
        self.current_order = None;
    }
}

/// Plain serializable mirror of a [`Worker`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerSnapshot {
    pub id: WorkerId,
    pub name: String,
    pub current_workload_minutes: Minutes,
    pub workload_ratio: f64,
    pub current_order: Option<OrderId>,
}

impl From<&Worker> for WorkerSnapshot {
    fn from(worker: &Worker) -> Self {
        Self {
            id: worker.id,
            name: worker.name.clone(),
            current_workload_minutes: worker.current_workload_minutes,
            workload_ratio: worker.workload_ratio,
            current_order: worker.current_order,
        }
    }
}

impl From<WorkerSnapshot> for Worker {
    fn from(snapshot: WorkerSnapshot) -> Self {
        Self {
            id: snapshot.id,
            name: snapshot.name,
            current_workload_minutes: snapshot.current_workload_minutes,
            workload_ratio: snapshot.workload_ratio,
            current_order: snapshot.current_order,
        }
    }
}
