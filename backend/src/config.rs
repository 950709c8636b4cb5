//! Configuration loading and validation
//!
//! Every tunable lives in a plain struct with a `Default` impl carrying the
//! documented value and a `validate()` method. Structs are
//! `#[serde(default)]`, so a JSON file only needs to name the fields it
//! overrides:
//!
//! ```json
//! { "num_trials": 25, "policy": { "max_wait_minutes": 12.0 } }
//! ```

use serde::de::DeserializeOwned;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Load a JSON config file into any deserializable config struct
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Reject non-finite or non-positive values
pub(crate) fn require_positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{} must be a positive number, got {}",
            name, value
        )))
    }
}

/// Reject values outside [0, 1]
pub(crate) fn require_probability(name: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_positive() {
        assert!(require_positive("x", 0.5).is_ok());
        assert!(require_positive("x", 0.0).is_err());
        assert!(require_positive("x", f64::INFINITY).is_err());
        assert!(require_positive("x", f64::NAN).is_err());
    }

    #[test]
    fn test_require_probability() {
        assert!(require_probability("p", 0.0).is_ok());
        assert!(require_probability("p", 1.0).is_ok());
        assert!(require_probability("p", 1.01).is_err());
    }
}
