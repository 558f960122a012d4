//! CLI error type

use symposium_core::{ConfigError, RingError};
use symposium_testing::SimulationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ring(#[from] RingError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to listen for interrupt: {0}")]
    Signal(#[from] std::io::Error),

    #[error("Simulated ring deadlocked after {step} steps")]
    Deadlocked { step: u64 },

    #[error("Found a deadlocking schedule of {length} steps")]
    DeadlockFound { length: usize },
}
