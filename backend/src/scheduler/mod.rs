//! Dispatch scheduler - the per-tick dispatch loop and its drivers
//!
//! See `engine.rs` for the tick algorithm and `ticker.rs` for periodic
//! triggering.

pub mod engine;
pub mod metrics;
pub mod ticker;

pub use engine::{
    DispatchScheduler, SchedulerConfig, SchedulerError, TickResult, WorkerView,
};
pub use metrics::MetricsSnapshot;
pub use ticker::{Clock, ManualClock, SharedScheduler, SystemClock, Ticker, TickerHandle};
