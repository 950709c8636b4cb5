//! State access for orders and workers
//!
//! The scheduler never touches storage directly; it reads through the
//! [`Store`] trait and hands every write of a tick to [`Store::commit`] as a
//! single [`WriteBatch`].
//!
//! # Critical Invariants
//!
//! - **Ordering**: `list_orders` returns arrival ascending, then id;
//!   `list_workers` returns id ascending
//! - **Atomic commit**: a batch is applied completely or not at all
//! - **Monotonic ids**: order ids are assigned by the store and never reused
//!   (not even across `reset`)
//!
//! Two backends ship with the crate:
//! - [`InMemoryStore`]: per-trial state inside the Monte Carlo harness
//! - [`FileStore`]: JSON snapshot on disk, SHA-256 checked on load

use crate::core::time::Minutes;
use crate::models::catalog::{DrinkType, LoyaltyTier};
use crate::models::order::{Order, OrderId, OrderSnapshot, OrderStatus};
use crate::models::worker::{Worker, WorkerId, WorkerSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

mod file;
mod memory;

pub use file::FileStore;
pub use memory::InMemoryStore;

/// Errors raised by store backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("Worker not found: {0}")]
    WorkerNotFound(WorkerId),

    #[error("Store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Snapshot checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// State-access interface used by the scheduler, harness and live feed
pub trait Store {
    /// Create a queued order with the next id
    fn create_order(
        &mut self,
        customer: String,
        drink: DrinkType,
        loyalty: LoyaltyTier,
        arrival: Minutes,
    ) -> Result<Order, StoreError>;

    /// Orders, optionally filtered by status, arrival ascending then id
    fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, StoreError>;

    /// Single order by id
    fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// All workers, id ascending
    fn list_workers(&self) -> Result<Vec<Worker>, StoreError>;

    /// Register an idle worker with the next id
    fn add_worker(&mut self, name: String) -> Result<Worker, StoreError>;

    /// Overwrite an existing order
    fn save_order(&mut self, order: &Order) -> Result<(), StoreError>;

    /// Overwrite an existing worker
    fn save_worker(&mut self, worker: &Worker) -> Result<(), StoreError>;

    /// Apply every write in `batch`, or none of them
    fn commit(&mut self, batch: WriteBatch) -> Result<(), StoreError>;

    /// Drop all orders and return every worker to idle
    fn reset(&mut self) -> Result<(), StoreError>;
}

/// Writes collected during one tick
///
/// Keyed by id, so saving the same record twice keeps the latest version.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    orders: BTreeMap<OrderId, Order>,
    workers: BTreeMap<WorkerId, Worker>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_order(&mut self, order: Order) {
        self.orders.insert(order.id(), order);
    }

    pub fn put_worker(&mut self, worker: Worker) {
        self.workers.insert(worker.id(), worker);
    }

    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    pub fn workers(&self) -> impl Iterator<Item = &Worker> {
        self.workers.values()
    }

    /// Number of records in the batch
    pub fn len(&self) -> usize {
        self.orders.len() + self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty() && self.workers.is_empty()
    }

    pub(crate) fn into_parts(self) -> (BTreeMap<OrderId, Order>, BTreeMap<WorkerId, Worker>) {
        (self.orders, self.workers)
    }
}

/// Complete serializable store state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub next_order_id: OrderId,
    pub next_worker_id: WorkerId,
    pub orders: Vec<OrderSnapshot>,
    pub workers: Vec<WorkerSnapshot>,
}

/// Create `"Barista 1"..="Barista n"` if the store has no workers yet
///
/// Returns the store's workers either way.
///
/// # Example
/// ```
/// use barista_dispatch_core_rs::store::{seed_workers, InMemoryStore, Store};
///
/// let mut store = InMemoryStore::new();
/// seed_workers(&mut store, 3).unwrap();
/// seed_workers(&mut store, 5).unwrap(); // no-op, workers already exist
/// assert_eq!(store.list_workers().unwrap().len(), 3);
/// ```
pub fn seed_workers<S: Store + ?Sized>(store: &mut S, n: usize) -> Result<Vec<Worker>, StoreError> {
    if store.list_workers()?.is_empty() {
        for i in 1..=n {
            store.add_worker(format!("Barista {}", i))?;
        }
    }
    store.list_workers()
}

/// Latest arrival, assignment or completion time recorded in the store
///
/// A run resuming over persisted state starts its clock here so earlier
/// orders keep their elapsed times. Empty stores report 0.
pub fn latest_timestamp<S: Store + ?Sized>(store: &S) -> Result<Minutes, StoreError> {
    Ok(store
        .list_orders(None)?
        .iter()
        .flat_map(|o| [Some(o.arrival()), o.assigned_at(), o.completed_at()])
        .flatten()
        .fold(0.0, f64::max))
}

/// Shared ordering for `list_orders`
pub(crate) fn by_arrival_then_id(a: &Order, b: &Order) -> std::cmp::Ordering {
    a.arrival()
        .total_cmp(&b.arrival())
        .then_with(|| a.id().cmp(&b.id()))
}
