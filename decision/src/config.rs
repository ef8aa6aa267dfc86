//! Orchestrator configuration, fixed for the lifetime of an orchestrator.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::fallback::FallbackStrategy;

/// Default minimum confidence for accepting a prediction.
pub const DEFAULT_THRESHOLD: f64 = 0.70;

/// Validated decision configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionConfig {
    /// Minimum confidence to accept without escalation, in `[0, 1]`
    pub threshold: f64,
    pub strategy: FallbackStrategy,
}

impl DecisionConfig {
    /// Build a configuration, rejecting thresholds outside `[0, 1]`.
    pub fn new(threshold: f64, strategy: FallbackStrategy) -> Result<Self, ConfigError> {
        let config = Self {
            threshold,
            strategy,
        };
        config.validate()?;
        Ok(config)
    }

    /// Build from a strategy name as found in config files or flags.
    pub fn parse(threshold: f64, strategy: &str) -> Result<Self, ConfigError> {
        Self::new(threshold, strategy.parse()?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        Ok(())
    }
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            strategy: FallbackStrategy::default(),
        }
    }
}
