//! Time management for the dispatcher
//!
//! All timestamps are `Minutes` (f64) on a single timeline. Inside the Monte
//! Carlo harness the timeline starts at 0 and advances in fixed ticks; in a
//! live shop it is minutes since the Unix epoch (see `scheduler::ticker`).

use serde::{Deserialize, Serialize};

/// A point on (or a span of) the scheduler timeline, in minutes.
pub type Minutes = f64;

/// Non-negative elapsed time between two timestamps.
///
/// Clock skew (a `to` earlier than `from`) reads as zero elapsed time.
pub fn elapsed_minutes(from: Minutes, to: Minutes) -> Minutes {
    (to - from).max(0.0)
}

/// Simulated clock advancing in fixed ticks up to a horizon
///
/// # Example
/// ```
/// use barista_dispatch_core_rs::SimClock;
///
/// let mut clock = SimClock::new(0.5, 180.0);
/// assert_eq!(clock.now(), 0.0);
///
/// clock.advance_tick();
/// assert_eq!(clock.now(), 0.5);
/// assert_eq!(clock.ticks_elapsed(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimClock {
    /// Ticks elapsed since the clock started
    ticks_elapsed: u64,
    /// Length of one tick
    tick_minutes: Minutes,
    /// Time at which the run stops
    horizon: Minutes,
}

impl SimClock {
    /// Create a clock at time zero
    ///
    /// # Panics
    /// Panics if `tick_minutes` is not strictly positive.
    pub fn new(tick_minutes: Minutes, horizon: Minutes) -> Self {
        assert!(tick_minutes > 0.0, "tick_minutes must be positive");
        Self {
            ticks_elapsed: 0,
            tick_minutes,
            horizon,
        }
    }

    /// Advance time by one tick
    pub fn advance_tick(&mut self) {
        self.ticks_elapsed += 1;
    }

    /// Current simulated time
    ///
    /// Computed from the tick count rather than accumulated, so long runs do
    /// not drift.
    pub fn now(&self) -> Minutes {
        self.ticks_elapsed as f64 * self.tick_minutes
    }

    /// Ticks elapsed since start
    pub fn ticks_elapsed(&self) -> u64 {
        self.ticks_elapsed
    }

    /// True once the clock has reached the horizon
    ///
    /// # Example
    /// ```
    /// use barista_dispatch_core_rs::SimClock;
    ///
    /// let mut clock = SimClock::new(1.0, 2.0);
    /// clock.advance_tick();
    /// assert!(!clock.is_past_horizon());
    /// clock.advance_tick();
    /// assert!(clock.is_past_horizon());
    /// ```
    pub fn is_past_horizon(&self) -> bool {
        self.now() >= self.horizon
    }

    /// Length of one tick
    pub fn tick_minutes(&self) -> Minutes {
        self.tick_minutes
    }

    /// Horizon of the run
    pub fn horizon(&self) -> Minutes {
        self.horizon
    }
}
