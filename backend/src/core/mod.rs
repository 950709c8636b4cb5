//! Core primitives shared by every layer

pub mod time;

pub use time::{elapsed_minutes, Minutes, SimClock};
