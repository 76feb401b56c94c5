//! Scaling admission configuration.

use super::parse::{env_opt, env_parse};
use super::ConfigError;
use crate::system::ProbeStrategy;

/// Default fraction of CPU capacity below which scaling is allowed.
pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.7;

/// Which capacity probe to consult and at what threshold.
#[derive(Clone, Debug, PartialEq)]
pub struct GateConfig {
    /// Probe strategy (CAPACITY_PROBE: system, process, combined).
    pub strategy: ProbeStrategy,
    /// Threshold as a fraction of logical CPUs (MAX_LOAD_FACTOR).
    pub max_load_factor: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            strategy: ProbeStrategy::default(),
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
        }
    }
}

impl GateConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let strategy = match env_opt("CAPACITY_PROBE") {
            Some(raw) => raw.parse::<ProbeStrategy>().map_err(|error| ConfigError::Parse {
                key: "CAPACITY_PROBE".into(),
                value: raw,
                error,
            })?,
            None => ProbeStrategy::default(),
        };

        let max_load_factor = env_parse("MAX_LOAD_FACTOR", DEFAULT_MAX_LOAD_FACTOR)?;
        Self::validate_factor(max_load_factor)?;

        Ok(Self {
            strategy,
            max_load_factor,
        })
    }

    fn validate_factor(factor: f64) -> Result<(), ConfigError> {
        if factor.is_finite() && factor > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::Invalid {
                key: "MAX_LOAD_FACTOR".into(),
                message: format!("must be a positive number, got {}", factor),
            })
        }
    }
}
