//! Initial fork ownership and acquisition order
//!
//! The default plan is the deadlock-avoidance table: philosopher 0 starts
//! with both forks, the last philosopher starts with none and reaches for
//! its right fork first, everyone else starts with their right fork only.
//! Changing any single entry can close the wait cycle around the table.

use crate::error::{RingError, RingResult};
use crate::ring::wrap;
use crate::types::{SeatId, Side};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Order in which missing forks are requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionOrder {
    LeftThenRight,
    RightThenLeft,
}

impl AcquisitionOrder {
    /// Sides in the order they are acquired
    pub const fn sides(self) -> [Side; 2] {
        match self {
            Self::LeftThenRight => [Side::Left, Side::Right],
            Self::RightThenLeft => [Side::Right, Side::Left],
        }
    }

    pub const fn first(self) -> Side {
        self.sides()[0]
    }
}

/// Where a fork sits when the ring starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// In this philosopher's hand
    Held,
    /// Already in flight toward this philosopher
    Incoming,
    /// With the neighbor, or in flight toward the neighbor
    Away,
}

impl Placement {
    /// Whether this side accounts for the edge's fork
    pub const fn carries_fork(self) -> bool {
        matches!(self, Self::Held | Self::Incoming)
    }
}

/// Starting position of one philosopher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatAssignment {
    pub left: Placement,
    pub right: Placement,
    pub order: AcquisitionOrder,
}

impl SeatAssignment {
    pub const fn placement(&self, side: Side) -> Placement {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub const fn holds_left(&self) -> bool {
        matches!(self.left, Placement::Held)
    }

    pub const fn holds_right(&self) -> bool {
        matches!(self.right, Placement::Held)
    }
}

/// Table deciding every seat's starting forks and acquisition order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OwnershipPlan {
    /// The last philosopher acquires in reverse order
    #[default]
    ReversedLast,
    /// Everyone acquires left first with their left fork in reach.
    /// Deadlocks by construction; kept as a regression guard.
    Uniform,
}

impl OwnershipPlan {
    /// Starting position of `seat` in a ring of `seats`
    pub fn assign(self, seat: SeatId, seats: usize) -> SeatAssignment {
        match self {
            Self::ReversedLast => {
                if seat.index() == 0 {
                    SeatAssignment {
                        left: Placement::Held,
                        right: Placement::Held,
                        order: AcquisitionOrder::LeftThenRight,
                    }
                } else if seat.index() + 1 == seats {
                    SeatAssignment {
                        left: Placement::Away,
                        right: Placement::Away,
                        order: AcquisitionOrder::RightThenLeft,
                    }
                } else {
                    SeatAssignment {
                        left: Placement::Away,
                        right: Placement::Held,
                        order: AcquisitionOrder::LeftThenRight,
                    }
                }
            }
            Self::Uniform => SeatAssignment {
                left: Placement::Incoming,
                right: Placement::Away,
                order: AcquisitionOrder::LeftThenRight,
            },
        }
    }

    /// Assignments for every seat, in ring order
    pub fn table(self, seats: usize) -> Vec<SeatAssignment> {
        (0..seats)
            .map(|index| self.assign(SeatId::new(index), seats))
            .collect()
    }

    /// Check that every edge starts with exactly one fork
    ///
    /// Edge `e` joins seat `e` (its right side) and seat `e + 1` (its left side).
    pub fn validate(self, seats: usize) -> RingResult<()> {
        if seats < 2 {
            return Err(RingError::InvalidSeatCount { seats });
        }

        let table = self.table(seats);
        for edge in 0..seats {
            let next = wrap(edge as isize + 1, seats);
            let tokens = usize::from(table[edge].right.carries_fork())
                + usize::from(table[next].left.carries_fork());
            if tokens != 1 {
                return Err(RingError::UnbalancedPlan { edge, tokens });
            }
        }

        Ok(())
    }

    /// Whether any seat reaches for its right fork first
    pub fn has_reversed_seat(self, seats: usize) -> bool {
        self.table(seats)
            .iter()
            .any(|a| a.order == AcquisitionOrder::RightThenLeft)
    }
}

impl fmt::Display for OwnershipPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReversedLast => f.write_str("reversed-last"),
            Self::Uniform => f.write_str("uniform"),
        }
    }
}

/// Unknown plan name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown ownership plan '{0}', expected 'reversed-last' or 'uniform'")]
pub struct ParsePlanError(pub String);

impl FromStr for OwnershipPlan {
    type Err = ParsePlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reversed-last" | "reversed_last" | "reversed" => Ok(Self::ReversedLast),
            "uniform" | "naive" => Ok(Self::Uniform),
            _ => Err(ParsePlanError(s.to_string())),
        }
    }
}
