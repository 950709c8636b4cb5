//! Dispatch Scheduler Engine
//!
//! One atomic `tick(now)` over the store:
//!
//! ```text
//! 1. Advance    - finished preparing orders become Completed
//! 2. Rebalance  - recompute every worker's load and ratio
//! 3. Score      - rescore queued orders, sort by score/arrival/id
//! 4. Primary    - each free worker (ascending id) takes the policy's pick
//! 5. Emergency  - near-timeout orders go to any worker still free
//! 6. Alerts     - one-time manager alerts for near-timeout orders
//! 7. Commit     - every write handed to the store as one batch
//! ```
//!
//! # Critical Invariants
//!
//! - **Atomicity**: a tick either commits all of its writes or none; events
//!   are appended to the log only after a successful commit
//! - **One order per worker**: a worker is busy from assignment until its
//!   order completes
//! - **Forward-only lifecycle**: transitions go through `Order::assign` and
//!   `Order::complete` only
//!
//! # Example
//!
//! ```rust
//! use barista_dispatch_core_rs::scheduler::{DispatchScheduler, SchedulerConfig};
//! use barista_dispatch_core_rs::store::{seed_workers, InMemoryStore, Store};
//! use barista_dispatch_core_rs::{DrinkType, LoyaltyTier};
//!
//! let mut store = InMemoryStore::new();
//! seed_workers(&mut store, 3).unwrap();
//!
//! let mut scheduler = DispatchScheduler::new(SchedulerConfig::default()).unwrap();
//! scheduler
//!     .submit_order(&mut store, "Aarav".into(), DrinkType::Latte, LoyaltyTier::Gold, 0.0)
//!     .unwrap();
//!
//! let result = scheduler.tick(&mut store, 0.5).unwrap();
//! assert_eq!(result.assigned, 1);
//! ```

use crate::config::ConfigError;
use crate::core::time::Minutes;
use crate::models::catalog::{DrinkType, LoyaltyTier};
use crate::models::event::{Event, EventLog};
use crate::models::order::{Order, OrderError, OrderId, OrderStatus};
use crate::models::worker::{Worker, WorkerId};
use crate::policy::{
    assignment_reason, Alert, AlertMonitor, FairnessTracker, PolicyConfig, PolicyKind,
    PriorityEngine, SelectionPolicy, WorkloadBalancer, WorkloadClass,
};
use crate::scheduler::metrics::MetricsSnapshot;
use crate::store::{Store, StoreError, WriteBatch};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, warn};

/// Assumed average prep per queue slot when estimating waits
const ESTIMATE_SLOT_MINUTES: f64 = 3.0;

// ============================================================================
// Configuration Types
// ============================================================================

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Scoring, workload and fairness thresholds
    pub policy: PolicyConfig,

    /// Which selection policy free workers use
    pub selection: PolicyKind,

    /// Seconds between ticks when driven by a `Ticker`
    pub cadence_seconds: u64,

    /// Most recent events kept in memory; `None` keeps them all
    pub event_log_limit: Option<usize>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            policy: PolicyConfig::default(),
            selection: PolicyKind::default(),
            cadence_seconds: 30,
            event_log_limit: Some(10_000),
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.policy.validate()?;
        if self.cadence_seconds == 0 {
            return Err(ConfigError::Invalid(
                "cadence_seconds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Results and Errors
// ============================================================================

/// Summary of one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickResult {
    /// Time the tick ran at
    pub now: Minutes,

    /// Orders that finished prep this tick
    pub completed: usize,

    /// Orders assigned this tick (primary pass and emergency sweep)
    pub assigned: usize,

    /// Of `assigned`, those placed by the emergency sweep
    pub forced: usize,

    /// Alerts raised this tick
    pub alerts: Vec<Alert>,

    /// Queued orders left out because of a bad worker reference
    pub skipped: usize,

    /// Orders whose wait crossed the warning threshold this tick
    pub emergency_boosts: usize,

    /// Orders still queued after the tick
    pub queue_size: usize,
}

/// Scheduler error types
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Order lifecycle error: {0}")]
    Order(#[from] OrderError),
}

/// A worker together with what it is doing right now
#[derive(Debug, Clone, Serialize)]
pub struct WorkerView {
    pub worker: Worker,
    pub available: bool,
    pub class: WorkloadClass,
    pub current_orders: Vec<Order>,
}

/// Queue ordering: score descending, arrival ascending, id ascending
pub(crate) fn queue_order(a: &Order, b: &Order) -> Ordering {
    b.priority_score()
        .total_cmp(&a.priority_score())
        .then_with(|| a.arrival().total_cmp(&b.arrival()))
        .then_with(|| a.id().cmp(&b.id()))
}

// ============================================================================
// Scheduler
// ============================================================================

/// Owns the dispatch policy and the event log; state lives in the store
pub struct DispatchScheduler {
    config: SchedulerConfig,
    engine: PriorityEngine,
    balancer: WorkloadBalancer,
    fairness: FairnessTracker,
    alerts: AlertMonitor,
    selection: Box<dyn SelectionPolicy>,
    event_log: EventLog,
    ticks_run: u64,
}

impl std::fmt::Debug for DispatchScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchScheduler")
            .field("config", &self.config)
            .field("selection", &self.selection.name())
            .field("events", &self.event_log.len())
            .field("ticks_run", &self.ticks_run)
            .finish()
    }
}

impl DispatchScheduler {
    /// Create a scheduler with the configured selection policy
    ///
    /// # Errors
    /// `SchedulerError::Config` if the configuration does not validate.
    pub fn new(config: SchedulerConfig) -> Result<Self, SchedulerError> {
        let selection = config.selection.build();
        Self::with_policy(config, selection)
    }

    /// Create a scheduler with a caller-supplied selection policy
    pub fn with_policy(
        config: SchedulerConfig,
        selection: Box<dyn SelectionPolicy>,
    ) -> Result<Self, SchedulerError> {
        config.validate()?;

        Ok(Self {
            engine: PriorityEngine::new(config.policy.clone()),
            balancer: WorkloadBalancer::new(&config.policy),
            fairness: FairnessTracker::new(config.policy.fairness_threshold),
            alerts: AlertMonitor::new(&config.policy),
            selection,
            event_log: match config.event_log_limit {
                Some(limit) => EventLog::bounded(limit),
                None => EventLog::new(),
            },
            ticks_run: 0,
            config,
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn priority_engine(&self) -> &PriorityEngine {
        &self.engine
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// Successful ticks so far
    pub fn ticks_run(&self) -> u64 {
        self.ticks_run
    }

    /// Create a queued order and record its arrival
    pub fn submit_order<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        customer: String,
        drink: DrinkType,
        loyalty: LoyaltyTier,
        arrival: Minutes,
    ) -> Result<Order, SchedulerError> {
        let order = store.create_order(customer, drink, loyalty, arrival)?;
        self.event_log.log(Event::OrderArrived {
            time: arrival,
            order_id: order.id(),
            customer: order.customer().to_string(),
            drink: order.drink(),
            loyalty: order.loyalty(),
        });
        Ok(order)
    }

    // ========================================================================
    // Tick Loop Implementation
    // ========================================================================

    /// Run one dispatch tick at `now`
    ///
    /// # Errors
    /// Store read or commit failures. Nothing is written and no events are
    /// logged when an error is returned; the next tick starts from the
    /// store's last committed state.
    pub fn tick<S: Store + ?Sized>(
        &mut self,
        store: &mut S,
        now: Minutes,
    ) -> Result<TickResult, SchedulerError> {
        let mut preparing = store.list_orders(Some(OrderStatus::Preparing))?;
        let mut queued = store.list_orders(Some(OrderStatus::Queued))?;
        let mut workers = store.list_workers()?;
        let mut events = Vec::new();

        // STEP 1: ADVANCE
        let mut completed = 0;
        for order in preparing.iter_mut().filter(|o| o.is_prep_done(now)) {
            order.complete(now)?;
            if let Some(worker) = order
                .worker()
                .and_then(|id| workers.iter_mut().find(|w| w.id() == id))
            {
                worker.finish_order(order.id());
            }
            events.push(Event::OrderCompleted {
                time: now,
                order_id: order.id(),
                worker_id: order.worker(),
                wait_minutes: order.wait_minutes(now),
                prep_minutes: order.prep_minutes(),
            });
            completed += 1;
        }

        // STEP 2: REBALANCE
        self.balancer.rebalance(&mut workers, &preparing, now);

        // STEP 3: SCORE
        let mut emergency_boosts = 0;
        for order in queued.iter_mut() {
            order.set_priority_score(self.engine.score(order, now));
            if self.engine.is_emergency_boost(order, now) && order.mark_emergency_boost() {
                emergency_boosts += 1;
                events.push(Event::EmergencyBoost {
                    time: now,
                    order_id: order.id(),
                    wait_minutes: order.wait_minutes(now),
                });
            }
        }
        queued.sort_by(queue_order);

        let known: BTreeSet<WorkerId> = workers.iter().map(|w| w.id()).collect();
        let (mut candidates, mut excluded): (Vec<Order>, Vec<Order>) = queued
            .into_iter()
            .partition(|o| o.worker().map_or(true, |id| known.contains(&id)));

        // Left out this tick; the cleared reference lets the order rejoin
        // the candidates on the next one.
        for order in excluded.iter_mut() {
            let worker_id = order.clear_worker().unwrap_or_default();
            warn!(
                order_id = order.id(),
                worker_id, "queued order references a missing worker; skipping"
            );
            events.push(Event::AssignmentSkipped {
                time: now,
                order_id: order.id(),
                worker_id,
                reason: format!("Worker {} not found", worker_id),
            });
        }

        // STEP 4: PRIMARY PASS
        let mut assigned = Vec::new();
        for worker in workers.iter_mut() {
            if candidates.is_empty() {
                break;
            }
            if !worker.is_available() {
                continue;
            }

            let pick = self
                .selection
                .select(worker, &candidates, now, &self.config.policy)
                .filter(|&idx| idx < candidates.len());
            if let Some(idx) = pick {
                let order = candidates.remove(idx);
                let order = self.assign(order, worker, now, false, &mut events)?;
                self.fairness
                    .record_assignment(&order, candidates.iter_mut().chain(excluded.iter_mut()));
                assigned.push(order);
            }
        }

        // STEP 5: EMERGENCY SWEEP
        let force_at = self.config.policy.force_threshold();
        let mut forced = 0;
        let mut idx = 0;
        while idx < candidates.len() {
            if candidates[idx].wait_minutes(now) < force_at {
                idx += 1;
                continue;
            }
            let Some(worker) = workers.iter_mut().find(|w| w.is_available()) else {
                break;
            };
            let order = candidates.remove(idx);
            let order = self.assign(order, worker, now, true, &mut events)?;
            self.fairness
                .record_assignment(&order, candidates.iter_mut().chain(excluded.iter_mut()));
            assigned.push(order);
            forced += 1;
        }

        // STEP 6: ALERTS
        let alerts = self
            .alerts
            .check(candidates.iter_mut().chain(excluded.iter_mut()), now);
        for alert in &alerts {
            events.push(Event::ManagerAlert {
                time: now,
                order_id: alert.order_id,
                customer: alert.customer.clone(),
                wait_minutes: alert.wait_minutes,
                max_wait_minutes: alert.max_wait_minutes,
            });
        }

        // STEP 7: COMMIT
        let queue_size = candidates.len() + excluded.len();
        let num_assigned = assigned.len();
        let skipped = excluded.len();

        let mut batch = WriteBatch::new();
        for order in preparing
            .into_iter()
            .chain(assigned)
            .chain(candidates)
            .chain(excluded)
        {
            batch.put_order(order);
        }
        for worker in workers {
            batch.put_worker(worker);
        }
        store.commit(batch)?;

        self.event_log.extend(events);
        self.ticks_run += 1;

        debug!(
            now,
            completed,
            assigned = num_assigned,
            forced,
            alerts = alerts.len(),
            queue_size,
            "tick complete"
        );

        Ok(TickResult {
            now,
            completed,
            assigned: num_assigned,
            forced,
            alerts,
            skipped,
            emergency_boosts,
            queue_size,
        })
    }

    /// Hand `order` to `worker` and record the assignment
    fn assign(
        &self,
        mut order: Order,
        worker: &mut Worker,
        now: Minutes,
        forced: bool,
        events: &mut Vec<Event>,
    ) -> Result<Order, SchedulerError> {
        let wait = order.wait_minutes(now);
        let reason = assignment_reason(&order, worker.workload_ratio(), wait, &self.config.policy);

        order.assign(worker.id(), now, reason.clone())?;
        worker.start_order(order.id(), order.prep_minutes());

        debug!(
            order_id = order.id(),
            worker = worker.name(),
            forced,
            reason = reason.as_str(),
            "order assigned"
        );
        events.push(Event::OrderAssigned {
            time: now,
            order_id: order.id(),
            worker_id: worker.id(),
            priority_score: order.priority_score(),
            wait_minutes: wait,
            forced,
            reason,
        });
        Ok(order)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Queued orders scored at `now`, in dispatch order (nothing is written)
    pub fn prioritized_queue<S: Store + ?Sized>(
        &self,
        store: &S,
        now: Minutes,
    ) -> Result<Vec<Order>, SchedulerError> {
        let mut queue = store.list_orders(Some(OrderStatus::Queued))?;
        for order in queue.iter_mut() {
            order.set_priority_score(self.engine.score(order, now));
        }
        queue.sort_by(queue_order);
        Ok(queue)
    }

    pub fn metrics_snapshot<S: Store + ?Sized>(
        &self,
        store: &S,
        now: Minutes,
    ) -> Result<MetricsSnapshot, SchedulerError> {
        let orders = store.list_orders(None)?;
        Ok(MetricsSnapshot::from_orders(&orders, &self.config.policy, now))
    }

    /// Estimated minutes until the order is ready to be picked up
    ///
    /// Completed orders are 0, preparing orders report their remaining prep,
    /// queued orders assume three minutes per slot of `workers` orders ahead.
    /// Unknown ids return `None`.
    pub fn estimate_wait<S: Store + ?Sized>(
        &self,
        store: &S,
        order_id: OrderId,
        now: Minutes,
    ) -> Result<Option<Minutes>, SchedulerError> {
        let Some(order) = store.get_order(order_id)? else {
            return Ok(None);
        };

        let estimate = match order.status() {
            OrderStatus::Completed => 0.0,
            OrderStatus::Preparing => order.remaining_prep(now),
            OrderStatus::Queued => {
                let queue = self.prioritized_queue(store, now)?;
                match queue.iter().position(|o| o.id() == order_id) {
                    Some(pos) => {
                        let workers = store.list_workers()?.len().max(1);
                        ((pos / workers) + 1) as f64 * ESTIMATE_SLOT_MINUTES
                    }
                    None => order.prep_minutes(),
                }
            }
        };
        Ok(Some(estimate))
    }

    /// Every worker with its live load and the orders it is preparing
    pub fn worker_views<S: Store + ?Sized>(
        &self,
        store: &S,
        now: Minutes,
    ) -> Result<Vec<WorkerView>, SchedulerError> {
        let preparing = store.list_orders(Some(OrderStatus::Preparing))?;
        let mut workers = store.list_workers()?;
        self.balancer.rebalance(&mut workers, &preparing, now);

        Ok(workers
            .into_iter()
            .map(|worker| {
                let current_orders: Vec<Order> = preparing
                    .iter()
                    .filter(|o| o.worker() == Some(worker.id()))
                    .cloned()
                    .collect();
                WorkerView {
                    available: worker.is_available(),
                    class: self.balancer.classify(worker.workload_ratio()),
                    worker,
                    current_orders,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{seed_workers, InMemoryStore};

    fn setup(workers: usize) -> (DispatchScheduler, InMemoryStore) {
        let mut store = InMemoryStore::new();
        seed_workers(&mut store, workers).unwrap();
        let scheduler = DispatchScheduler::new(SchedulerConfig::default()).unwrap();
        (scheduler, store)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SchedulerConfig {
            cadence_seconds: 0,
            ..SchedulerConfig::default()
        };
        assert!(matches!(
            DispatchScheduler::new(config),
            Err(SchedulerError::Config(_))
        ));
    }

    #[test]
    fn test_event_log_limit_applies() {
        let mut store = InMemoryStore::new();
        seed_workers(&mut store, 1).unwrap();
        let mut scheduler = DispatchScheduler::new(SchedulerConfig {
            event_log_limit: Some(3),
            ..SchedulerConfig::default()
        })
        .unwrap();

        for i in 0..5 {
            scheduler
                .submit_order(&mut store, "A".into(), DrinkType::Espresso, LoyaltyTier::Regular, i as f64)
                .unwrap();
        }

        assert_eq!(scheduler.event_log().len(), 3);
        assert_eq!(scheduler.event_log().dropped(), 2);
    }

    #[test]
    fn test_empty_tick() {
        let (mut scheduler, mut store) = setup(3);
        let result = scheduler.tick(&mut store, 0.0).unwrap();

        assert_eq!(result.assigned, 0);
        assert_eq!(result.queue_size, 0);
        assert_eq!(scheduler.ticks_run(), 1);
    }

    #[test]
    fn test_worker_busy_until_prep_done() {
        let (mut scheduler, mut store) = setup(1);
        scheduler
            .submit_order(&mut store, "A".into(), DrinkType::Espresso, LoyaltyTier::Regular, 0.0)
            .unwrap();
        scheduler
            .submit_order(&mut store, "B".into(), DrinkType::Espresso, LoyaltyTier::Regular, 0.0)
            .unwrap();

        assert_eq!(scheduler.tick(&mut store, 0.0).unwrap().assigned, 1);
        assert_eq!(scheduler.tick(&mut store, 1.5).unwrap().assigned, 0);

        let result = scheduler.tick(&mut store, 2.0).unwrap();
        assert_eq!(result.completed, 1);
        assert_eq!(result.assigned, 1);
        assert_eq!(result.queue_size, 0);
    }

    #[test]
    fn test_estimate_wait() {
        let (mut scheduler, mut store) = setup(1);
        for i in 0..3 {
            scheduler
                .submit_order(&mut store, format!("Test {}", i), DrinkType::Latte, LoyaltyTier::Regular, 0.0)
                .unwrap();
        }
        scheduler.tick(&mut store, 0.0).unwrap();

        // order 1 preparing, 2 and 3 queued behind one worker
        assert_eq!(scheduler.estimate_wait(&store, 1, 1.0).unwrap(), Some(3.0));
        assert_eq!(scheduler.estimate_wait(&store, 2, 1.0).unwrap(), Some(3.0));
        assert_eq!(scheduler.estimate_wait(&store, 3, 1.0).unwrap(), Some(6.0));
        assert_eq!(scheduler.estimate_wait(&store, 99, 1.0).unwrap(), None);
    }

    #[test]
    fn test_worker_views() {
        let (mut scheduler, mut store) = setup(2);
        scheduler
            .submit_order(&mut store, "A".into(), DrinkType::Mocha, LoyaltyTier::Regular, 0.0)
            .unwrap();
        scheduler.tick(&mut store, 0.0).unwrap();

        let views = scheduler.worker_views(&store, 1.0).unwrap();
        assert_eq!(views.len(), 2);
        assert!(!views[0].available);
        assert_eq!(views[0].current_orders.len(), 1);
        assert_eq!(views[0].worker.current_workload_minutes(), 5.0);
        assert!(views[1].available);
    }

    #[test]
    fn test_prioritized_queue_does_not_write() {
        let (mut scheduler, mut store) = setup(0);
        scheduler
            .submit_order(&mut store, "A".into(), DrinkType::ColdBrew, LoyaltyTier::Gold, 0.0)
            .unwrap();

        let queue = scheduler.prioritized_queue(&store, 2.0).unwrap();
        assert_eq!(queue[0].priority_score(), 57.5);
        assert_eq!(store.get_order(1).unwrap().unwrap().priority_score(), 0.0);
    }
}
