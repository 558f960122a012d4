//! Core identifiers shared by the runtime and the simulator

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a philosopher around the table, `0 <= index < seats`
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SeatId(usize);

impl SeatId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Zero-based ring index
    pub const fn index(self) -> usize {
        self.0
    }

    /// One-based number used in human-readable traces
    pub const fn ordinal(self) -> usize {
        self.0 + 1
    }
}

impl From<usize> for SeatId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "philosopher {}", self.ordinal())
    }
}

/// Which neighbor a fork is shared with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

/// Phase of the philosopher loop
///
/// `Idle -> WaitingResources -> CriticalSection -> Releasing -> Idle`, forever.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    #[default]
    Idle,
    WaitingResources,
    CriticalSection,
    Releasing,
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::WaitingResources => "waiting",
            Self::CriticalSection => "eating",
            Self::Releasing => "releasing",
        };
        f.write_str(name)
    }
}
