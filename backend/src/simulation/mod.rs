//! Simulation drivers
//!
//! - [`MonteCarloHarness`]: K seeded trials of the dispatch loop on a
//!   simulated clock, aggregated into a [`MonteCarloResult`]
//! - [`LiveFeed`]: random arrivals for a running shop

pub mod harness;
pub mod live;
pub mod stats;

pub use harness::{MonteCarloConfig, MonteCarloHarness, TrialError};
pub use live::LiveFeed;
pub use stats::{round2, MonteCarloResult, TrialResult, WorkerSummary};
