//! Error types for simulation runs

use symposium_core::{RingError, SeatId};
use thiserror::Error;

/// Result type for simulation operations
pub type SimResult<T> = Result<T, SimulationError>;

/// Errors that stop a simulation
///
/// A deadlock is not an error: it is reported as an outcome.
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Ring could not be built
    #[error(transparent)]
    Ring(#[from] RingError),

    /// Conservation or mutual exclusion broke
    #[error("Invariant violated at step {step}: {detail}")]
    InvariantViolated { step: u64, detail: String },

    /// A scheduler picked a seat that cannot move
    #[error("Schedule picked {seat} at step {step}, but it cannot move")]
    InvalidSchedule { step: u64, seat: SeatId },

    /// Report could not be serialized
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
