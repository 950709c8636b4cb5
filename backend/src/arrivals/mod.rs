//! Arrival generation module for deterministic order creation.
//!
//! This module creates synthetic orders according to a configured arrival
//! rate and drink mix. All generation is deterministic given the caller's
//! RNG.
//!
//! # Key Principles
//!
//! 1. **Determinism**: Same seed + same config → same arrivals
//! 2. **Poisson Arrivals**: Per-tick counts are Poisson; trial timelines use
//!    exponential inter-arrival gaps
//! 3. **Weighted Catalog**: Drinks drawn by catalog weight, loyalty by a
//!    fixed Gold probability
//!
//! # Example
//!
//! ```
//! use barista_dispatch_core_rs::arrivals::{ArrivalConfig, ArrivalGenerator};
//! use barista_dispatch_core_rs::rng::RngManager;
//!
//! let generator = ArrivalGenerator::new(ArrivalConfig::default()).unwrap();
//! let mut rng = RngManager::new(42);
//!
//! let timeline = generator.trial_timeline(250, &mut rng);
//! assert_eq!(timeline.len(), 250);
//! assert_eq!(timeline[0].customer, "Test 1");
//! ```

use crate::config::{require_positive, require_probability, ConfigError};
use crate::core::time::Minutes;
use crate::models::catalog::{DrinkType, LoyaltyTier};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};

/// Floor for the uniform draw feeding `ln` in the exponential gap
pub const MIN_UNIFORM: f64 = 1e-10;

/// First names used for live-feed customers
const CUSTOMER_NAMES: [&str; 21] = [
    "Ashutosh", "Aarav", "Aditi", "Aman", "Ananya", "Arjun", "Deepak", "Ishita", "Karan", "Neha",
    "Rahul", "Riya", "Rohit", "Sakshi", "Sanjay", "Shreya", "Siddharth", "Sneha", "Varun",
    "Vikram", "Yash",
];

/// Arrival rate and order mix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrivalConfig {
    /// Expected arrivals per minute (Poisson λ)
    pub rate_per_minute: f64,

    /// Probability that a customer is Gold
    pub gold_probability: f64,

    /// Relative weight of each drink, in `DrinkType::ALL` order
    pub drink_weights: [u32; 6],
}

impl Default for ArrivalConfig {
    fn default() -> Self {
        Self {
            rate_per_minute: 1.4,
            gold_probability: 0.2,
            drink_weights: DrinkType::ARRIVAL_WEIGHTS,
        }
    }
}

impl ArrivalConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("rate_per_minute", self.rate_per_minute)?;
        require_probability("gold_probability", self.gold_probability)?;
        if self.drink_weights.iter().all(|&w| w == 0) {
            return Err(ConfigError::Invalid(
                "drink_weights must contain at least one non-zero weight".to_string(),
            ));
        }
        Ok(())
    }
}

/// A generated order, not yet in any store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSpec {
    pub customer: String,
    pub drink: DrinkType,
    pub loyalty: LoyaltyTier,
    pub arrival: Minutes,
}

/// Generator for synthetic orders
///
/// Holds no RNG of its own; every call draws from the `RngManager` passed
/// in, so the caller controls seeding.
#[derive(Debug, Clone)]
pub struct ArrivalGenerator {
    config: ArrivalConfig,
}

impl ArrivalGenerator {
    /// Create a generator
    ///
    /// # Errors
    /// `ConfigError::Invalid` for a non-positive rate, a probability outside
    /// [0, 1] or all-zero drink weights.
    pub fn new(config: ArrivalConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ArrivalConfig {
        &self.config
    }

    /// Number of arrivals in one minute, `Poisson(λ)`
    pub fn sample_count(&self, rng: &mut RngManager) -> u32 {
        rng.poisson(self.config.rate_per_minute)
    }

    /// Drink drawn by catalog weight
    pub fn sample_drink(&self, rng: &mut RngManager) -> DrinkType {
        rng.weighted_index(&self.config.drink_weights)
            .map_or(DrinkType::ColdBrew, |idx| DrinkType::ALL[idx])
    }

    pub fn sample_loyalty(&self, rng: &mut RngManager) -> LoyaltyTier {
        if rng.chance(self.config.gold_probability) {
            LoyaltyTier::Gold
        } else {
            LoyaltyTier::Regular
        }
    }

    /// Exponential inter-arrival gap, `-ln(U) / λ`
    pub fn sample_gap(&self, rng: &mut RngManager) -> Minutes {
        let u = rng.next_f64_open().max(MIN_UNIFORM);
        -u.ln() / self.config.rate_per_minute
    }

    /// Random customer label such as `"Neha 4821"`
    pub fn sample_customer(&self, rng: &mut RngManager) -> String {
        let name = CUSTOMER_NAMES[rng.range(0, CUSTOMER_NAMES.len() as i64) as usize];
        format!("{} {}", name, rng.range(1000, 10_000))
    }

    /// Orders arriving during one minute of a live feed, all stamped `now`
    pub fn arrivals_this_tick(&self, now: Minutes, rng: &mut RngManager) -> Vec<OrderSpec> {
        let count = self.sample_count(rng);
        (0..count)
            .map(|_| {
                let customer = self.sample_customer(rng);
                let drink = self.sample_drink(rng);
                let loyalty = self.sample_loyalty(rng);
                OrderSpec {
                    customer,
                    drink,
                    loyalty,
                    arrival: now,
                }
            })
            .collect()
    }

    /// `n` orders with exponential gaps starting from time zero
    ///
    /// Draw order per arrival: gap, drink, loyalty. Customers are labelled
    /// `"Test 1"`, `"Test 2"`, ...
    pub fn trial_timeline(&self, n: usize, rng: &mut RngManager) -> Vec<OrderSpec> {
        let mut clock = 0.0;
        (1..=n)
            .map(|i| {
                clock += self.sample_gap(rng);
                let drink = self.sample_drink(rng);
                let loyalty = self.sample_loyalty(rng);
                OrderSpec {
                    customer: format!("Test {}", i),
                    drink,
                    loyalty,
                    arrival: clock,
                }
            })
            .collect()
    }
}
