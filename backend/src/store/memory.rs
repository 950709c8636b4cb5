//! In-memory store backend

use super::{by_arrival_then_id, Store, StoreError, StoreSnapshot, WriteBatch};
use crate::core::time::Minutes;
use crate::models::catalog::{DrinkType, LoyaltyTier};
use crate::models::order::{Order, OrderId, OrderStatus};
use crate::models::worker::{Worker, WorkerId};
use std::collections::BTreeMap;

/// Store backed by ordered maps
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    orders: BTreeMap<OrderId, Order>,
    workers: BTreeMap<WorkerId, Worker>,
    next_order_id: OrderId,
    next_worker_id: WorkerId,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            orders: BTreeMap::new(),
            workers: BTreeMap::new(),
            next_order_id: 1,
            next_worker_id: 1,
        }
    }

    /// Rebuild a store from a snapshot, exactly as captured
    ///
    /// Id counters never go backwards past records already present.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let orders: BTreeMap<OrderId, Order> = snapshot
            .orders
            .into_iter()
            .map(|s| (s.id, Order::from(s)))
            .collect();
        let workers: BTreeMap<WorkerId, Worker> = snapshot
            .workers
            .into_iter()
            .map(|s| (s.id, Worker::from(s)))
            .collect();

        let next_order_id = orders
            .keys()
            .next_back()
            .map_or(1, |id| id + 1)
            .max(snapshot.next_order_id);
        let next_worker_id = workers
            .keys()
            .next_back()
            .map_or(1, |id| id + 1)
            .max(snapshot.next_worker_id);

        Self {
            orders,
            workers,
            next_order_id,
            next_worker_id,
        }
    }

    /// Capture the complete state
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            next_order_id: self.next_order_id,
            next_worker_id: self.next_worker_id,
            orders: self.orders.values().map(Into::into).collect(),
            workers: self.workers.values().map(Into::into).collect(),
        }
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }
}

impl Store for InMemoryStore {
    fn create_order(
        &mut self,
        customer: String,
        drink: DrinkType,
        loyalty: LoyaltyTier,
        arrival: Minutes,
    ) -> Result<Order, StoreError> {
        let id = self.next_order_id;
        self.next_order_id += 1;

        let order = Order::new(id, customer, drink, loyalty, arrival);
        self.orders.insert(id, order.clone());
        Ok(order)
    }

    fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self
            .orders
            .values()
            .filter(|o| status.map_or(true, |s| o.status() == s))
            .cloned()
            .collect();
        orders.sort_by(by_arrival_then_id);
        Ok(orders)
    }

    fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.get(&id).cloned())
    }

    fn list_workers(&self) -> Result<Vec<Worker>, StoreError> {
        Ok(self.workers.values().cloned().collect())
    }

    fn add_worker(&mut self, name: String) -> Result<Worker, StoreError> {
        let id = self.next_worker_id;
        self.next_worker_id += 1;

        let worker = Worker::new(id, name);
        self.workers.insert(id, worker.clone());
        Ok(worker)
    }

    fn save_order(&mut self, order: &Order) -> Result<(), StoreError> {
        match self.orders.get_mut(&order.id()) {
            Some(slot) => {
                *slot = order.clone();
                Ok(())
            }
            None => Err(StoreError::OrderNotFound(order.id())),
        }
    }

    fn save_worker(&mut self, worker: &Worker) -> Result<(), StoreError> {
        match self.workers.get_mut(&worker.id()) {
            Some(slot) => {
                *slot = worker.clone();
                Ok(())
            }
            None => Err(StoreError::WorkerNotFound(worker.id())),
        }
    }

    fn commit(&mut self, batch: WriteBatch) -> Result<(), StoreError> {
        let (orders, workers) = batch.into_parts();

        // Validate everything before touching state
        if let Some(id) = orders.keys().find(|id| !self.orders.contains_key(id)) {
            return Err(StoreError::OrderNotFound(*id));
        }
        if let Some(id) = workers.keys().find(|id| !self.workers.contains_key(id)) {
            return Err(StoreError::WorkerNotFound(*id));
        }

        self.orders.extend(orders);
        self.workers.extend(workers);
        Ok(())
    }

    fn reset(&mut self) -> Result<(), StoreError> {
        self.orders.clear();
        for worker in self.workers.values_mut() {
            worker.reset();
        }
        Ok(())
    }
}
