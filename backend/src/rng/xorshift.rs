//! xorshift64* random number generator
//!
//! Fast, deterministic PRNG used for every random draw in the dispatcher:
//! arrival counts, inter-arrival gaps, drink and loyalty sampling.
//!
//! # Algorithm
//!
//! xorshift64* passes TestU01's BigCrush with 64-bit state and 64-bit output.
//!
//! # Determinism
//!
//! Same seed → same sequence. Each Monte Carlo trial owns its own instance,
//! seeded from the trial index, so trials reproduce independently of the
//! order (or thread) they run on.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use barista_dispatch_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let value = rng.next();
/// let range_value = rng.range(0, 100); // [0, 100)
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    /// Internal state (64-bit)
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// A zero seed is mapped to 1 (xorshift state must never be zero).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Generate random value in range [min, max)
    ///
    /// # Panics
    /// Panics if min >= max
    pub fn range(&mut self, min: i64, max: i64) -> i64 {
        assert!(min < max, "min must be less than max");

        let value = self.next();
        let range_size = (max - min) as u64;
        min + (value % range_size) as i64
    }

    /// Get current RNG state (for checkpointing/replay)
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Generate random f64 in range [0.0, 1.0)
    ///
    /// # Example
    /// ```
    /// use barista_dispatch_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(12345);
    /// let probability = rng.next_f64();
    /// assert!(probability >= 0.0 && probability < 1.0);
    /// ```
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Generate random f64 in range (0.0, 1.0]
    ///
    /// Safe to feed into `ln` as long as callers floor tiny values.
    pub fn next_f64_open(&mut self) -> f64 {
        1.0 - self.next_f64()
    }

    /// Bernoulli draw: true with probability `p`
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Sample a Poisson-distributed count with mean `lambda`
    ///
    /// Knuth's method: multiply uniforms until the product falls to or below
    /// `e^{-lambda}`. Non-positive (or NaN) rates yield zero.
    ///
    /// # Example
    /// ```
    /// use barista_dispatch_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(7);
    /// assert_eq!(rng.poisson(0.0), 0);
    /// let _arrivals = rng.poisson(1.4);
    /// ```
    pub fn poisson(&mut self, lambda: f64) -> u32 {
        if !(lambda > 0.0) {
            return 0;
        }

        let limit = (-lambda).exp();
        let mut k: u32 = 0;
        let mut p = 1.0;
        loop {
            k += 1;
            p *= self.next_f64();
            if p <= limit {
                break;
            }
        }
        k - 1
    }

    /// Pick an index with probability proportional to `weights[i]`
    ///
    /// Returns `None` when the weights are empty or sum to zero.
    pub fn weighted_index(&mut self, weights: &[u32]) -> Option<usize> {
        let total: u64 = weights.iter().map(|&w| w as u64).sum();
        if total == 0 {
            return None;
        }

        let roll = self.range(0, total as i64) as u64;
        let mut acc = 0u64;
        for (i, &w) in weights.iter().enumerate() {
            acc += w as u64;
            if roll < acc {
                return Some(i);
            }
        }
        Some(weights.len() - 1)
    }
}
