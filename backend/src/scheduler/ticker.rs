//! Periodic triggering and mutual exclusion
//!
//! The engine only exposes `tick(now)`. This module supplies the pieces a
//! running shop needs around it:
//! - [`Clock`]: where `now` comes from ([`SystemClock`], [`ManualClock`])
//! - [`SharedScheduler`]: scheduler + store behind one lock, so ticks and
//!   order creation never interleave
//! - [`Ticker`]: a dedicated thread calling `tick_now` on a fixed cadence,
//!   owned by the returned [`TickerHandle`]
//!
//! A failed tick is logged and simply retried at the next trigger.

use crate::core::time::Minutes;
use crate::models::catalog::{DrinkType, LoyaltyTier};
use crate::models::order::Order;
use crate::scheduler::engine::{DispatchScheduler, SchedulerConfig, SchedulerError, TickResult};
use crate::store::Store;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

// ============================================================================
// Clocks
// ============================================================================

/// Source of the scheduler timeline
pub trait Clock: Send + Sync {
    fn now(&self) -> Minutes;
}

/// Wall clock: minutes since the Unix epoch
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Minutes {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64() / 60.0)
            .unwrap_or(0.0)
    }
}

/// Clock that only moves when told to
///
/// # Example
/// ```
/// use barista_dispatch_core_rs::scheduler::{Clock, ManualClock};
///
/// let clock = ManualClock::new(0.0);
/// clock.advance(1.5);
/// assert_eq!(clock.now(), 1.5);
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Minutes>,
}

impl ManualClock {
    pub fn new(start: Minutes) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, now: Minutes) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, minutes: Minutes) {
        *self.now.lock() += minutes;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Minutes {
        *self.now.lock()
    }
}

// ============================================================================
// Shared scheduler
// ============================================================================

struct Inner<S> {
    scheduler: DispatchScheduler,
    store: S,
}

/// Scheduler and store behind a single mutex
///
/// Cloning is cheap; all clones share the same state.
pub struct SharedScheduler<S: Store> {
    inner: Arc<Mutex<Inner<S>>>,
}

impl<S: Store> Clone for SharedScheduler<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Store> SharedScheduler<S> {
    pub fn new(scheduler: DispatchScheduler, store: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner { scheduler, store })),
        }
    }

    /// Tick at an explicit time
    pub fn tick_at(&self, now: Minutes) -> Result<TickResult, SchedulerError> {
        let mut guard = self.inner.lock();
        let Inner { scheduler, store } = &mut *guard;
        scheduler.tick(store, now)
    }

    /// Tick at the clock's current time
    pub fn tick_now(&self, clock: &dyn Clock) -> Result<TickResult, SchedulerError> {
        self.tick_at(clock.now())
    }

    /// Create an order arriving at `arrival`
    pub fn create_order(
        &self,
        customer: String,
        drink: DrinkType,
        loyalty: LoyaltyTier,
        arrival: Minutes,
    ) -> Result<Order, SchedulerError> {
        let mut guard = self.inner.lock();
        let Inner { scheduler, store } = &mut *guard;
        scheduler.submit_order(store, customer, drink, loyalty, arrival)
    }

    /// Run `f` with exclusive access to the scheduler and store
    pub fn with<R>(&self, f: impl FnOnce(&mut DispatchScheduler, &mut S) -> R) -> R {
        let mut guard = self.inner.lock();
        let Inner { scheduler, store } = &mut *guard;
        f(scheduler, store)
    }
}

// ============================================================================
// Ticker
// ============================================================================

/// Fixed-cadence tick trigger
#[derive(Debug, Clone, Copy)]
pub struct Ticker {
    cadence: Duration,
}

impl Ticker {
    pub fn new(cadence: Duration) -> Self {
        Self { cadence }
    }

    /// Cadence from `cadence_seconds`
    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self::new(Duration::from_secs(config.cadence_seconds))
    }

    pub fn cadence(&self) -> Duration {
        self.cadence
    }

    /// Start ticking on a dedicated thread; the first tick runs immediately
    pub fn spawn<S, C>(self, shared: SharedScheduler<S>, clock: Arc<C>) -> std::io::Result<TickerHandle>
    where
        S: Store + Send + 'static,
        C: Clock + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let cadence = self.cadence;

        let thread = thread::Builder::new()
            .name("dispatch-ticker".to_string())
            .spawn(move || {
                info!(cadence_ms = cadence.as_millis() as u64, "ticker started");
                while !stop_flag.load(Ordering::Acquire) {
                    match shared.tick_now(clock.as_ref()) {
                        Ok(result) => debug!(
                            now = result.now,
                            assigned = result.assigned,
                            queue_size = result.queue_size,
                            "scheduled tick"
                        ),
                        Err(err) => warn!(error = %err, "tick failed; retrying next cycle"),
                    }
                    thread::park_timeout(cadence);
                }
                info!("ticker stopped");
            })?;

        Ok(TickerHandle {
            stop,
            thread: Some(thread),
        })
    }
}

/// Owns the ticker thread; stopping or dropping it joins the thread
#[derive(Debug)]
pub struct TickerHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl TickerHandle {
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().map_or(false, |t| !t.is_finished())
    }

    /// Signal the thread and wait for it to exit
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            thread.thread().unpark();
            if thread.join().is_err() {
                warn!("ticker thread panicked");
            }
        }
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
