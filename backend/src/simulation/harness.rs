//! Monte Carlo harness
//!
//! Runs K independent trials of the full dispatch loop and aggregates their
//! metrics.
//!
//! ```text
//! For trial i (seed = base_seed + i):
//! 1. Generate N arrivals (exponential gaps, weighted drinks)
//! 2. Fresh store with the configured workers, fresh scheduler
//! 3. For now = 0, tick, 2*tick, ... while now < horizon:
//!    a. inject every arrival with arrival <= now
//!    b. tick(now)
//!    c. stop once all N orders are completed
//! 4. Measure the final state
//! ```
//!
//! # Critical Invariants
//!
//! - **Determinism**: a trial depends only on its seed and the config, so
//!   parallel and sequential runs produce identical results
//! - **Isolation**: a failing trial is logged and excluded; the run goes on

use crate::arrivals::{ArrivalConfig, ArrivalGenerator};
use crate::config::{require_positive, ConfigError};
use crate::core::time::{Minutes, SimClock};
use crate::policy::{PolicyConfig, PolicyKind};
use crate::rng::RngManager;
use crate::scheduler::{DispatchScheduler, SchedulerConfig, SchedulerError};
use crate::simulation::stats::{MonteCarloResult, TrialResult};
use crate::store::{seed_workers, InMemoryStore, Store, StoreError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that abort a single trial
#[derive(Debug, Error)]
pub enum TrialError {
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Monte Carlo run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    pub num_trials: usize,
    pub orders_per_trial: usize,
    pub tick_minutes: Minutes,
    pub horizon_minutes: Minutes,
    pub num_workers: usize,

    /// Trial i is seeded with `base_seed + i`
    pub base_seed: u64,

    /// Run trials on the rayon thread pool
    pub parallel: bool,

    pub policy: PolicyConfig,
    pub selection: PolicyKind,
    pub arrivals: ArrivalConfig,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            num_trials: 10,
            orders_per_trial: 250,
            tick_minutes: 0.5,
            horizon_minutes: 180.0,
            num_workers: 3,
            base_seed: 0,
            parallel: true,
            policy: PolicyConfig::default(),
            selection: PolicyKind::default(),
            arrivals: ArrivalConfig::default(),
        }
    }
}

impl MonteCarloConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("tick_minutes", self.tick_minutes)?;
        require_positive("horizon_minutes", self.horizon_minutes)?;
        if self.num_workers == 0 {
            return Err(ConfigError::Invalid(
                "num_workers must be at least 1".to_string(),
            ));
        }
        self.policy.validate()?;
        self.arrivals.validate()
    }

    /// Scheduler configuration used by every trial
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            policy: self.policy.clone(),
            selection: self.selection,
            ..SchedulerConfig::default()
        }
    }

    /// Seed of trial `index`
    pub fn trial_seed(&self, index: usize) -> u64 {
        self.base_seed.wrapping_add(index as u64)
    }
}

/// Runs seeded trials and aggregates the results
///
/// # Example
/// ```
/// use barista_dispatch_core_rs::simulation::{MonteCarloConfig, MonteCarloHarness};
///
/// let harness = MonteCarloHarness::new(MonteCarloConfig {
///     num_trials: 2,
///     orders_per_trial: 20,
///     ..MonteCarloConfig::default()
/// })
/// .unwrap();
///
/// let result = harness.run();
/// assert_eq!(result.per_trial_results.len(), 2);
/// assert_eq!(result.failed_trials, 0);
/// ```
#[derive(Debug, Clone)]
pub struct MonteCarloHarness {
    config: MonteCarloConfig,
    generator: ArrivalGenerator,
}

impl MonteCarloHarness {
    pub fn new(config: MonteCarloConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let generator = ArrivalGenerator::new(config.arrivals.clone())?;
        Ok(Self { config, generator })
    }

    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Run every trial against a fresh in-memory store
    pub fn run(&self) -> MonteCarloResult {
        self.run_with_store(|_| InMemoryStore::new())
    }

    /// Run every trial against a store built by `make_store(trial_index)`
    pub fn run_with_store<S, F>(&self, make_store: F) -> MonteCarloResult
    where
        S: Store,
        F: Fn(usize) -> S + Sync,
    {
        let k = self.config.num_trials;
        info!(
            trials = k,
            orders_per_trial = self.config.orders_per_trial,
            parallel = self.config.parallel,
            "starting monte carlo run"
        );

        let run_one = |index: usize| {
            let mut store = make_store(index);
            self.run_trial_on(index, &mut store)
        };
        let outcomes: Vec<Result<TrialResult, TrialError>> = if self.config.parallel {
            (0..k).into_par_iter().map(run_one).collect()
        } else {
            (0..k).map(run_one).collect()
        };

        let mut results = Vec::with_capacity(k);
        let mut failed = 0;
        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(result) => results.push(result),
                Err(err) => {
                    failed += 1;
                    warn!(trial = index, error = %err, "trial failed; excluded from aggregation");
                }
            }
        }

        let aggregate =
            MonteCarloResult::aggregate(k, self.config.orders_per_trial, results, failed);
        info!(
            avg_wait_minutes = aggregate.avg_wait_minutes,
            avg_timeout_rate = aggregate.avg_timeout_rate,
            failed_trials = failed,
            "monte carlo run finished"
        );
        aggregate
    }

    /// Run a single trial on a fresh in-memory store
    pub fn run_trial(&self, index: usize) -> Result<TrialResult, TrialError> {
        let mut store = InMemoryStore::new();
        self.run_trial_on(index, &mut store)
    }

    fn run_trial_on<S: Store + ?Sized>(
        &self,
        index: usize,
        store: &mut S,
    ) -> Result<TrialResult, TrialError> {
        let n = self.config.orders_per_trial;
        let seed = self.config.trial_seed(index);
        let mut rng = RngManager::new(seed);
        let timeline = self.generator.trial_timeline(n, &mut rng);

        seed_workers(store, self.config.num_workers)?;
        let mut scheduler = DispatchScheduler::new(self.config.scheduler_config())?;
        let mut clock = SimClock::new(self.config.tick_minutes, self.config.horizon_minutes);

        let mut injected = 0;
        let mut completed = 0;
        while !clock.is_past_horizon() {
            let now = clock.now();
            while injected < n && timeline[injected].arrival <= now {
                let spec = &timeline[injected];
                scheduler.submit_order(
                    store,
                    spec.customer.clone(),
                    spec.drink,
                    spec.loyalty,
                    spec.arrival,
                )?;
                injected += 1;
            }

            completed += scheduler.tick(store, now)?.completed;
            clock.advance_tick();
            if completed >= n {
                break;
            }
        }

        let orders = store.list_orders(None)?;
        let workers = store.list_workers()?;

        Ok(TrialResult::from_final_state(
            index,
            seed,
            &orders,
            &workers,
            &self.config.policy,
            n,
            scheduler.ticks_run(),
        ))
    }
}
