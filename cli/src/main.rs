//! `barista-sim` - command line driver for the barista dispatcher
//!
//! ```text
//! barista-sim monte-carlo --trials 20 --orders 300 --policy fifo
//! barista-sim live --minutes 90 --store shop.json
//! ```
//!
//! Results are printed as JSON on stdout; logs go to stderr and follow
//! `RUST_LOG`.

use anyhow::{Context, Result};
use barista_dispatch_core_rs::arrivals::ArrivalConfig;
use barista_dispatch_core_rs::load_json;
use barista_dispatch_core_rs::policy::PolicyKind;
use barista_dispatch_core_rs::scheduler::{
    Clock, DispatchScheduler, ManualClock, SchedulerConfig, SharedScheduler, SystemClock, Ticker,
};
use barista_dispatch_core_rs::simulation::{LiveFeed, MonteCarloConfig, MonteCarloHarness};
use barista_dispatch_core_rs::store::{
    latest_timestamp, seed_workers, FileStore, InMemoryStore, Store,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Barista order dispatch simulator
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run seeded Monte Carlo trials and print the aggregate result
    MonteCarlo(MonteCarloArgs),

    /// Run the dispatcher against a random arrival feed
    Live(LiveArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Selection {
    LoadAware,
    Fifo,
}

impl From<Selection> for PolicyKind {
    fn from(selection: Selection) -> Self {
        match selection {
            Selection::LoadAware => PolicyKind::LoadAware,
            Selection::Fifo => PolicyKind::Fifo,
        }
    }
}

#[derive(Args, Debug)]
struct MonteCarloArgs {
    /// JSON config file (fields not named keep their defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of trials
    #[arg(long)]
    trials: Option<usize>,

    /// Orders generated per trial
    #[arg(long)]
    orders: Option<usize>,

    /// Baristas per trial
    #[arg(long)]
    workers: Option<usize>,

    /// Seed of trial 0; trial i uses seed + i
    #[arg(long)]
    seed: Option<u64>,

    /// Arrivals per minute
    #[arg(long)]
    rate: Option<f64>,

    /// Selection policy
    #[arg(long, value_enum)]
    policy: Option<Selection>,

    /// Run trials one after another instead of on the thread pool
    #[arg(long)]
    sequential: bool,

    /// Omit per-trial results from the output
    #[arg(long)]
    summary_only: bool,
}

#[derive(Args, Debug)]
struct LiveArgs {
    /// JSON scheduler config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Persist state to this file instead of keeping it in memory
    #[arg(long)]
    store: Option<PathBuf>,

    /// Baristas to create when the store has none
    #[arg(long, default_value = "3")]
    workers: usize,

    /// Arrivals per minute
    #[arg(long, default_value = "1.4")]
    rate: f64,

    /// Feed seed
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Simulated minutes to run
    #[arg(long, default_value = "60")]
    minutes: f64,

    /// Simulated minutes between ticks
    #[arg(long, default_value = "0.5")]
    tick_minutes: f64,

    /// Use the wall clock and the background ticker for this many seconds
    #[arg(long)]
    realtime_secs: Option<u64>,

    /// Selection policy
    #[arg(long, value_enum)]
    policy: Option<Selection>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::MonteCarlo(args) => run_monte_carlo(args),
        Command::Live(args) => match args.store.clone() {
            Some(path) => {
                let store = FileStore::open(&path)
                    .with_context(|| format!("Failed to open store {}", path.display()))?;
                run_live(args, store)
            }
            None => run_live(args, InMemoryStore::new()),
        },
    }
}

fn run_monte_carlo(args: MonteCarloArgs) -> Result<()> {
    let mut config: MonteCarloConfig = match &args.config {
        Some(path) => load_json(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => MonteCarloConfig::default(),
    };
    if let Some(trials) = args.trials {
        config.num_trials = trials;
    }
    if let Some(orders) = args.orders {
        config.orders_per_trial = orders;
    }
    if let Some(workers) = args.workers {
        config.num_workers = workers;
    }
    if let Some(seed) = args.seed {
        config.base_seed = seed;
    }
    if let Some(rate) = args.rate {
        config.arrivals.rate_per_minute = rate;
    }
    if let Some(policy) = args.policy {
        config.selection = policy.into();
    }
    if args.sequential {
        config.parallel = false;
    }

    let harness = MonteCarloHarness::new(config).context("Invalid Monte Carlo config")?;
    let started = Instant::now();
    let mut result = harness.run();
    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        "monte carlo complete"
    );

    if args.summary_only {
        result.per_trial_results.clear();
    }
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn run_live<S: Store + Send + 'static>(args: LiveArgs, mut store: S) -> Result<()> {
    let mut config: SchedulerConfig = match &args.config {
        Some(path) => load_json(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SchedulerConfig::default(),
    };
    if let Some(policy) = args.policy {
        config.selection = policy.into();
    }

    seed_workers(&mut store, args.workers).context("Failed to create workers")?;
    let resume_at = latest_timestamp(&store).context("Failed to read stored orders")?;
    let scheduler = DispatchScheduler::new(config).context("Invalid scheduler config")?;
    let shared = SharedScheduler::new(scheduler, store);
    let mut feed = LiveFeed::new(
        ArrivalConfig {
            rate_per_minute: args.rate,
            ..ArrivalConfig::default()
        },
        args.seed,
    )
    .context("Invalid arrival config")?;

    let now = match args.realtime_secs {
        Some(secs) => {
            let clock = Arc::new(SystemClock);
            let ticker = shared.with(|scheduler, _| Ticker::from_config(scheduler.config()));
            feed.start(clock.now());
            let handle = ticker.spawn(shared.clone(), Arc::clone(&clock))?;

            let deadline = Instant::now() + Duration::from_secs(secs);
            while Instant::now() < deadline {
                feed.poll_shared(&shared, clock.now())?;
                std::thread::sleep(Duration::from_secs(1));
            }
            feed.stop();
            handle.stop();
            clock.now()
        }
        None => {
            anyhow::ensure!(args.tick_minutes > 0.0, "--tick-minutes must be positive");
            // Persisted orders carry absolute times; continue after them
            let clock = ManualClock::new(resume_at);
            if resume_at > 0.0 {
                info!(resume_at, "resuming simulated clock from stored state");
            }
            let end = resume_at + args.minutes;
            feed.start(clock.now());
            while clock.now() < end {
                feed.poll_shared(&shared, clock.now())?;
                shared.tick_now(&clock)?;
                clock.advance(args.tick_minutes);
            }
            feed.stop();
            clock.now()
        }
    };

    let report = shared.with(|scheduler, store| -> Result<serde_json::Value> {
        Ok(json!({
            "metrics": scheduler.metrics_snapshot(store, now)?,
            "workers": scheduler.worker_views(store, now)?,
            "queue": scheduler.prioritized_queue(store, now)?,
            "events": scheduler.event_log().len(),
            "eventsDropped": scheduler.event_log().dropped(),
        }))
    })?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
