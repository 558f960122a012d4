//! Error types for ring construction and philosopher execution

use crate::config::ConfigError;
use crate::types::{SeatId, Side};
use thiserror::Error;

/// Result type for ring operations
pub type RingResult<T> = Result<T, RingError>;

/// Errors raised while building or running a ring
///
/// None of these are recoverable: a ring either starts with every edge
/// carrying one fork, or it does not start at all, and a broken channel
/// means a neighbor is gone for good.
#[derive(Error, Debug)]
pub enum RingError {
    /// A ring needs at least two seats
    #[error("Invalid seat count {seats}: a ring needs at least 2 philosophers")]
    InvalidSeatCount { seats: usize },

    /// An ownership plan that does not place exactly one fork per edge
    #[error("Unbalanced ownership plan: edge {edge} starts with {tokens} forks (expected 1)")]
    UnbalancedPlan { edge: usize, tokens: usize },

    /// The neighbor dropped its sending half; no fork will ever arrive
    #[error("End of stream on {side} channel of {seat}")]
    EndOfStream { seat: SeatId, side: Side },

    /// The neighbor dropped its receiving half; the fork cannot be returned
    #[error("Channel closed while {seat} was releasing its {side} fork")]
    ChannelClosed { seat: SeatId, side: Side },

    /// Release attempted without holding both forks
    #[error("{seat} tried to release without both forks (left: {holds_left}, right: {holds_right})")]
    ReleaseWithoutForks {
        seat: SeatId,
        holds_left: bool,
        holds_right: bool,
    },

    /// Critical section entered without both forks
    #[error("{seat} tried to eat without both forks (left: {holds_left}, right: {holds_right})")]
    EatWithoutForks {
        seat: SeatId,
        holds_left: bool,
        holds_right: bool,
    },

    /// No runtime was available to host the philosophers
    #[error("Failed to spawn philosophers: {0}")]
    SpawnFailed(String),

    /// A philosopher task panicked
    #[error("{seat} panicked: {message}")]
    AgentPanicked { seat: SeatId, message: String },

    /// The ring was joined with no philosopher task left to wait on
    #[error("Ring has no running philosophers")]
    NoPhilosophers,

    /// A philosopher task was cancelled from outside the ring
    #[error("Philosopher task was cancelled")]
    Cancelled,

    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
}
