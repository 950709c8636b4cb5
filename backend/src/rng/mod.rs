//! Deterministic random number generation
//!
//! Uses xorshift64* for fast, reproducible draws.
//! CRITICAL: All randomness in the dispatcher MUST go through an explicit
//! `RngManager` instance; there is no shared global generator.

mod xorshift;

pub use xorshift::RngManager;
