//! Per-trial and cross-trial statistics

use crate::core::time::Minutes;
use crate::models::order::Order;
use crate::models::worker::{Worker, WorkerId};
use crate::policy::{workload_balance_pct, PolicyConfig};
use serde::Serialize;

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One barista's share of a trial
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerSummary {
    pub worker_id: WorkerId,
    pub name: String,
    pub orders_completed: usize,
    /// Sum of prep time over completed orders
    pub busy_minutes: f64,
    pub avg_wait_minutes: f64,
    pub final_ratio: f64,
}

/// Outcome of one trial
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialResult {
    pub trial_index: usize,
    pub seed: u64,
    pub avg_wait_minutes: Minutes,
    pub max_wait_minutes: Minutes,
    pub timeout_rate: f64,
    pub fairness_violations: usize,
    pub alerts_sent: usize,
    pub exceeded_max_wait: usize,
    pub emergency_boosts: usize,
    pub workload_balance_pct: f64,
    pub total_completed: usize,
    pub ticks_run: u64,
    pub workers: Vec<WorkerSummary>,
}

impl TrialResult {
    /// Measure a trial from its final orders and workers
    ///
    /// Waits are measured arrival to assignment over completed orders. Counts
    /// are capped at `orders_per_trial`.
    pub fn from_final_state(
        trial_index: usize,
        seed: u64,
        orders: &[Order],
        workers: &[Worker],
        config: &PolicyConfig,
        orders_per_trial: usize,
        ticks_run: u64,
    ) -> Self {
        let completed: Vec<&Order> = orders.iter().filter(|o| o.is_completed()).collect();
        let waits: Vec<Minutes> = completed
            .iter()
            .filter_map(|o| o.assigned_at().map(|at| (at - o.arrival()).max(0.0)))
            .collect();

        let exceeded_max_wait = waits.iter().filter(|&&w| w > config.max_wait_minutes).count();
        let (avg_wait_minutes, max_wait_minutes, timeout_rate) = if completed.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            let n = completed.len() as f64;
            (
                waits.iter().sum::<f64>() / n,
                waits.iter().copied().fold(0.0, f64::max),
                (exceeded_max_wait as f64 / n).min(1.0),
            )
        };

        let workers_summary: Vec<WorkerSummary> = workers
            .iter()
            .map(|w| {
                let served: Vec<&&Order> = completed
                    .iter()
                    .filter(|o| o.worker() == Some(w.id()))
                    .collect();
                let busy: f64 = served.iter().map(|o| o.prep_minutes()).sum();
                let total_wait: f64 = served
                    .iter()
                    .filter_map(|o| o.assigned_at().map(|at| (at - o.arrival()).max(0.0)))
                    .sum();
                WorkerSummary {
                    worker_id: w.id(),
                    name: w.name().to_string(),
                    orders_completed: served.len(),
                    busy_minutes: round2(busy),
                    avg_wait_minutes: if served.is_empty() {
                        0.0
                    } else {
                        round2(total_wait / served.len() as f64)
                    },
                    final_ratio: round2(w.workload_ratio()),
                }
            })
            .collect();

        let busy_times: Vec<f64> = workers
            .iter()
            .map(|w| {
                completed
                    .iter()
                    .filter(|o| o.worker() == Some(w.id()))
                    .map(|o| o.prep_minutes())
                    .sum()
            })
            .collect();

        Self {
            trial_index,
            seed,
            avg_wait_minutes,
            max_wait_minutes,
            timeout_rate,
            fairness_violations: orders
                .iter()
                .filter(|o| o.is_fairness_violation(config.fairness_threshold))
                .count()
                .min(orders_per_trial),
            alerts_sent: orders
                .iter()
                .filter(|o| o.alert_sent())
                .count()
                .min(orders_per_trial),
            exceeded_max_wait,
            emergency_boosts: orders
                .iter()
                .filter(|o| o.emergency_boost_counted())
                .count()
                .min(orders_per_trial),
            workload_balance_pct: workload_balance_pct(&busy_times),
            total_completed: completed.len(),
            ticks_run,
            workers: workers_summary,
        }
    }
}

/// Aggregate over all trials
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonteCarloResult {
    pub num_trials: usize,
    pub orders_per_trial: usize,
    pub avg_wait_minutes: Minutes,
    pub avg_timeout_rate: f64,
    pub avg_workload_balance_pct: f64,
    pub total_fairness_violations: usize,
    pub total_alerts: usize,
    pub total_exceeded_max_wait: usize,
    pub total_emergency_boosts: usize,
    /// Trials that errored and were left out of every figure above
    pub failed_trials: usize,
    pub per_trial_results: Vec<TrialResult>,
}

impl MonteCarloResult {
    /// Combine successful trials; sums are capped at `num_trials * orders_per_trial`
    pub fn aggregate(
        num_trials: usize,
        orders_per_trial: usize,
        results: Vec<TrialResult>,
        failed_trials: usize,
    ) -> Self {
        let cap = num_trials.saturating_mul(orders_per_trial);
        let mean = |f: fn(&TrialResult) -> f64, empty: f64| {
            if results.is_empty() {
                empty
            } else {
                results.iter().map(f).sum::<f64>() / results.len() as f64
            }
        };
        let total = |f: fn(&TrialResult) -> usize| results.iter().map(f).sum::<usize>().min(cap);

        Self {
            num_trials,
            orders_per_trial,
            avg_wait_minutes: mean(|r| r.avg_wait_minutes, 0.0),
            avg_timeout_rate: mean(|r| r.timeout_rate, 0.0).clamp(0.0, 1.0),
            avg_workload_balance_pct: mean(|r| r.workload_balance_pct, 100.0),
            total_fairness_violations: total(|r| r.fairness_violations),
            total_alerts: total(|r| r.alerts_sent),
            total_exceeded_max_wait: total(|r| r.exceeded_max_wait),
            total_emergency_boosts: total(|r| r.emergency_boosts),
            failed_trials,
            per_trial_results: results,
        }
    }
}
