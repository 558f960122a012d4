//! Ring topology
//!
//! Edge `e` joins seat `e` (on its right) and seat `e + 1 mod N` (on its
//! left), so seat `i` reaches its left neighbor through edge `i - 1 mod N`
//! and its right neighbor through edge `i`.

use crate::agent::{Pacing, Philosopher};
use crate::channel::{Endpoint, link};
use crate::error::{RingError, RingResult};
use crate::ownership::{OwnershipPlan, Placement};
use crate::token::Fork;
use crate::trace::TraceSink;
use crate::types::SeatId;
use std::sync::Arc;
use tracing::debug;

/// Remainder in `[0, seats)`, also for negative `index`
pub fn wrap(index: isize, seats: usize) -> usize {
    let n = seats as isize;
    (((index % n) + n) % n) as usize
}

pub fn left_neighbor(seat: SeatId, seats: usize) -> SeatId {
    SeatId::new(wrap(seat.index() as isize - 1, seats))
}

pub fn right_neighbor(seat: SeatId, seats: usize) -> SeatId {
    SeatId::new(wrap(seat.index() as isize + 1, seats))
}

/// Edge shared with the left neighbor
pub fn left_edge(seat: SeatId, seats: usize) -> usize {
    wrap(seat.index() as isize - 1, seats)
}

/// Edge shared with the right neighbor
pub fn right_edge(seat: SeatId, seats: usize) -> usize {
    wrap(seat.index() as isize, seats)
}

/// Channel endpoints owned by one seat
#[derive(Debug)]
pub struct SeatWiring {
    pub seat: SeatId,
    pub left: Endpoint,
    pub right: Endpoint,
}

/// A validated table of `seats` philosophers under one ownership plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ring {
    seats: usize,
    plan: OwnershipPlan,
}

impl Ring {
    /// Validate the seat count and plan before anything is allocated
    pub fn new(seats: usize, plan: OwnershipPlan) -> RingResult<Self> {
        if seats < 2 {
            return Err(RingError::InvalidSeatCount { seats });
        }
        plan.validate(seats)?;
        Ok(Self { seats, plan })
    }

    pub fn seats(&self) -> usize {
        self.seats
    }

    pub fn plan(&self) -> OwnershipPlan {
        self.plan
    }

    /// Allocate one link per edge and hand each seat its two endpoints
    ///
    /// Forks the plan marks `Incoming` are already in flight when this returns.
    pub fn wire(&self) -> RingResult<Vec<SeatWiring>> {
        let n = self.seats;
        let table = self.plan.table(n);

        // rights[e] belongs to seat e, lefts[e] to seat e + 1
        let (rights, mut lefts): (Vec<Endpoint>, Vec<Endpoint>) = (0..n).map(|_| link()).unzip();

        for edge in 0..n {
            let next = wrap(edge as isize + 1, n);
            if table[edge].right == Placement::Incoming {
                lefts[edge]
                    .preload(Fork::new())
                    .map_err(|_| RingError::UnbalancedPlan { edge, tokens: 2 })?;
            }
            if table[next].left == Placement::Incoming {
                rights[edge]
                    .preload(Fork::new())
                    .map_err(|_| RingError::UnbalancedPlan { edge, tokens: 2 })?;
            }
        }

        lefts.rotate_right(1);

        let wiring = rights
            .into_iter()
            .zip(lefts)
            .enumerate()
            .map(|(index, (right, left))| SeatWiring {
                seat: SeatId::new(index),
                left,
                right,
            })
            .collect::<Vec<_>>();

        debug!(seats = n, plan = %self.plan, "Wired ring");
        Ok(wiring)
    }

    /// Wire the ring and seat a philosopher at every position
    pub fn seat(&self, pacing: Pacing, sink: Arc<dyn TraceSink>) -> RingResult<Vec<Philosopher>> {
        let philosophers = self
            .wire()?
            .into_iter()
            .map(|wiring| {
                let assignment = self.plan.assign(wiring.seat, self.seats);
                Philosopher::new(wiring, assignment, pacing, Arc::clone(&sink))
            })
            .collect();
        Ok(philosophers)
    }
}
