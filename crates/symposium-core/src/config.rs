//! # Ring Configuration
//!
//! Configuration for a table of philosophers, loadable from environment
//! variables and overridable through the builder.
//!
//! ## Environment Variables
//!
//! - `SYMPOSIUM_SEATS` - Number of philosophers (default: 16)
//! - `SYMPOSIUM_EAT_MS` - Milliseconds spent in the critical section (default: 0)
//! - `SYMPOSIUM_THINK_MS` - Milliseconds spent idle between meals (default: 0)
//! - `SYMPOSIUM_PLAN` - Ownership plan, `reversed-last` or `uniform` (default: `reversed-last`)

use crate::ownership::OwnershipPlan;
use std::{env, time::Duration};

/// Default number of philosophers
pub const DEFAULT_SEATS: usize = 16;
/// Largest table the builder accepts
pub const MAX_SEATS: usize = 4096;
/// Longest think or eat delay the builder accepts
pub const MAX_PAUSE: Duration = Duration::from_secs(60);

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid environment variable '{key}': {message}")]
    InvalidEnvVar { key: String, message: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Validated ring configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingConfig {
    pub seats: usize,
    pub eat_time: Duration,
    pub think_time: Duration,
    pub plan: OwnershipPlan,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            seats: DEFAULT_SEATS,
            eat_time: Duration::ZERO,
            think_time: Duration::ZERO,
            plan: OwnershipPlan::ReversedLast,
        }
    }
}

/// Builder for `RingConfig` with environment variable support
#[derive(Debug, Clone, Default)]
pub struct RingConfigBuilder {
    config: RingConfig,
}

impl RingConfigBuilder {
    /// Create a new builder with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if any variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = Self::default();

        if let Some(seats) = get_env_usize("SYMPOSIUM_SEATS")? {
            builder = builder.seats(seats);
        }
        if let Some(ms) = get_env_u64("SYMPOSIUM_EAT_MS")? {
            builder = builder.eat_time(Duration::from_millis(ms));
        }
        if let Some(ms) = get_env_u64("SYMPOSIUM_THINK_MS")? {
            builder = builder.think_time(Duration::from_millis(ms));
        }
        if let Ok(plan) = env::var("SYMPOSIUM_PLAN") {
            let plan = plan.parse().map_err(|e| ConfigError::InvalidEnvVar {
                key: "SYMPOSIUM_PLAN".to_string(),
                message: format!("{e}"),
            })?;
            builder = builder.plan(plan);
        }

        Ok(builder)
    }

    /// Set the number of philosophers
    #[must_use]
    pub fn seats(mut self, seats: usize) -> Self {
        self.config.seats = seats;
        self
    }

    /// Set the time spent eating
    #[must_use]
    pub fn eat_time(mut self, eat_time: Duration) -> Self {
        self.config.eat_time = eat_time;
        self
    }

    /// Set the time spent thinking
    #[must_use]
    pub fn think_time(mut self, think_time: Duration) -> Self {
        self.config.think_time = think_time;
        self
    }

    /// Set the ownership plan
    #[must_use]
    pub fn plan(mut self, plan: OwnershipPlan) -> Self {
        self.config.plan = plan;
        self
    }

    /// Validate configuration and build `RingConfig`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if the configuration is invalid.
    pub fn build(self) -> Result<RingConfig, ConfigError> {
        self.validate()?;
        Ok(self.config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.config.seats < 2 {
            return Err(ConfigError::ValidationError(
                "seats must be at least 2".to_string(),
            ));
        }
        if self.config.seats > MAX_SEATS {
            return Err(ConfigError::ValidationError(format!(
                "seats must be <= {MAX_SEATS}"
            )));
        }
        if self.config.eat_time > MAX_PAUSE {
            return Err(ConfigError::ValidationError(
                "eat_time must be <= 60s".to_string(),
            ));
        }
        if self.config.think_time > MAX_PAUSE {
            return Err(ConfigError::ValidationError(
                "think_time must be <= 60s".to_string(),
            ));
        }
        Ok(())
    }
}

// Environment variable helper functions

fn get_env_u64(key: &str) -> Result<Option<u64>, ConfigError> {
    match env::var(key) {
        Ok(val) => val
            .parse::<u64>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!("invalid u64 value '{val}': {e}"),
            }),
        Err(_) => Ok(None),
    }
}

fn get_env_usize(key: &str) -> Result<Option<usize>, ConfigError> {
    match env::var(key) {
        Ok(val) => val
            .parse::<usize>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!("invalid usize value '{val}': {e}"),
            }),
        Err(_) => Ok(None),
    }
}
