//! Live arrival feed
//!
//! A start/stop switch over the per-minute Poisson arrival stream. While
//! running, every whole minute elapsed since `start` draws `Poisson(λ)` new
//! orders and submits them stamped with the polling time.

use crate::arrivals::{ArrivalConfig, ArrivalGenerator};
use crate::config::ConfigError;
use crate::core::time::Minutes;
use crate::models::order::Order;
use crate::rng::RngManager;
use crate::scheduler::{DispatchScheduler, SchedulerError, SharedScheduler};
use crate::store::Store;
use tracing::{debug, info};

/// Seeded random order feed for a running shop
///
/// # Example
/// ```
/// use barista_dispatch_core_rs::arrivals::ArrivalConfig;
/// use barista_dispatch_core_rs::scheduler::{DispatchScheduler, SchedulerConfig};
/// use barista_dispatch_core_rs::simulation::LiveFeed;
/// use barista_dispatch_core_rs::store::InMemoryStore;
///
/// let mut store = InMemoryStore::new();
/// let mut scheduler = DispatchScheduler::new(SchedulerConfig::default()).unwrap();
/// let mut feed = LiveFeed::new(ArrivalConfig::default(), 42).unwrap();
///
/// // Not started: nothing arrives
/// assert!(feed.poll(&mut scheduler, &mut store, 5.0).unwrap().is_empty());
///
/// feed.start(5.0);
/// feed.poll(&mut scheduler, &mut store, 65.0).unwrap();
/// assert!(feed.is_running());
/// ```
#[derive(Debug, Clone)]
pub struct LiveFeed {
    generator: ArrivalGenerator,
    rng: RngManager,
    next_minute: Option<Minutes>,
}

impl LiveFeed {
    pub fn new(config: ArrivalConfig, seed: u64) -> Result<Self, ConfigError> {
        Ok(Self {
            generator: ArrivalGenerator::new(config)?,
            rng: RngManager::new(seed),
            next_minute: None,
        })
    }

    /// Start producing arrivals; the first batch is due one minute after `now`
    ///
    /// Starting a running feed is a no-op.
    pub fn start(&mut self, now: Minutes) {
        if self.next_minute.is_none() {
            self.next_minute = Some(now + 1.0);
            info!(now, "live feed started");
        }
    }

    pub fn stop(&mut self) {
        if self.next_minute.take().is_some() {
            info!("live feed stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.next_minute.is_some()
    }

    /// Submit the arrivals due by `now`
    ///
    /// Each whole minute that elapsed since the last poll contributes one
    /// Poisson draw. Returns the created orders.
    pub fn poll<S: Store + ?Sized>(
        &mut self,
        scheduler: &mut DispatchScheduler,
        store: &mut S,
        now: Minutes,
    ) -> Result<Vec<Order>, SchedulerError> {
        let mut created = Vec::new();
        let Some(mut due) = self.next_minute else {
            return Ok(created);
        };

        while due <= now {
            for spec in self.generator.arrivals_this_tick(now, &mut self.rng) {
                created.push(scheduler.submit_order(
                    store,
                    spec.customer,
                    spec.drink,
                    spec.loyalty,
                    spec.arrival,
                )?);
            }
            due += 1.0;
            self.next_minute = Some(due);
        }

        if !created.is_empty() {
            debug!(now, arrivals = created.len(), "live arrivals submitted");
        }
        Ok(created)
    }

    /// `poll` under the shared scheduler's lock
    pub fn poll_shared<S: Store>(
        &mut self,
        shared: &SharedScheduler<S>,
        now: Minutes,
    ) -> Result<Vec<Order>, SchedulerError> {
        shared.with(|scheduler, store| self.poll(scheduler, store, now))
    }
}
