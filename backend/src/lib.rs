//! Barista Dispatch Core - Rust Engine
//!
//! Priority-based order dispatch for a coffee shop with deterministic
//! Monte Carlo evaluation.
//!
//! # Architecture
//!
//! - **core**: Simulated time
//! - **models**: Domain types (Order, Worker, DrinkType, Event)
//! - **policy**: Scoring, workload, fairness, alerts and selection policies
//! - **scheduler**: The per-tick dispatch loop and its periodic driver
//! - **store**: State access trait with in-memory and file backends
//! - **arrivals**: Poisson arrival generation
//! - **simulation**: Monte Carlo harness and live arrival feed
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. Priority scores are always within [0, 100]
//! 2. An order moves Queued → Preparing → Completed and never backwards
//! 3. A tick commits all of its writes or none of them
//! 4. All randomness is deterministic (seeded RNG)

// Module declarations
pub mod arrivals;
pub mod config;
pub mod core;
pub mod models;
pub mod policy;
pub mod rng;
pub mod scheduler;
pub mod simulation;
pub mod store;

// Re-exports for convenience
pub use arrivals::{ArrivalConfig, ArrivalGenerator, OrderSpec};
pub use config::{load_json, ConfigError};
pub use crate::core::time::{Minutes, SimClock};
pub use models::{
    catalog::{CatalogError, DrinkType, LoyaltyTier},
    event::{Event, EventLog},
    order::{Order, OrderError, OrderId, OrderStatus},
    worker::{Worker, WorkerId},
};
pub use policy::{PolicyConfig, PolicyKind, PriorityEngine};
pub use rng::RngManager;
pub use scheduler::{DispatchScheduler, SchedulerConfig, SchedulerError, TickResult};
pub use simulation::{MonteCarloConfig, MonteCarloHarness, MonteCarloResult, TrialResult};
pub use store::{FileStore, InMemoryStore, Store, StoreError};
