//! The philosopher state machine
//!
//! Each philosopher owns its two endpoints outright. A fork is held iff the
//! matching `Option<Fork>` slot is `Some`; acquiring moves a fork out of the
//! inbound stream into the slot, releasing moves it back onto the outbound
//! stream. The channel is the lock.

use crate::channel::Endpoint;
use crate::error::{RingError, RingResult};
use crate::ownership::{AcquisitionOrder, SeatAssignment};
use crate::ring::SeatWiring;
use crate::token::Fork;
use crate::trace::{TraceEvent, TraceSink, Transition};
use crate::types::{AgentState, SeatId, Side};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Optional delays around the critical section
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pacing {
    /// Time spent idle before asking for forks
    pub think_time: Duration,
    /// Time spent inside the critical section
    pub eat_time: Duration,
}

/// One seat at the table
pub struct Philosopher {
    seat: SeatId,
    left: Endpoint,
    right: Endpoint,
    left_fork: Option<Fork>,
    right_fork: Option<Fork>,
    order: AcquisitionOrder,
    state: AgentState,
    pacing: Pacing,
    sink: Arc<dyn TraceSink>,
    meals: u64,
}

impl Philosopher {
    /// Seat a philosopher with the forks its assignment marks as held
    pub fn new(
        wiring: SeatWiring,
        assignment: SeatAssignment,
        pacing: Pacing,
        sink: Arc<dyn TraceSink>,
    ) -> Self {
        Self {
            seat: wiring.seat,
            left: wiring.left,
            right: wiring.right,
            left_fork: assignment.holds_left().then(Fork::new),
            right_fork: assignment.holds_right().then(Fork::new),
            order: assignment.order,
            state: AgentState::Idle,
            pacing,
            sink,
            meals: 0,
        }
    }

    pub fn seat(&self) -> SeatId {
        self.seat
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn order(&self) -> AcquisitionOrder {
        self.order
    }

    pub fn holds_left(&self) -> bool {
        self.left_fork.is_some()
    }

    pub fn holds_right(&self) -> bool {
        self.right_fork.is_some()
    }

    pub fn holds(&self, side: Side) -> bool {
        match side {
            Side::Left => self.holds_left(),
            Side::Right => self.holds_right(),
        }
    }

    /// Completed trips through the critical section
    pub fn meals(&self) -> u64 {
        self.meals
    }

    fn enter(&mut self, next: AgentState) {
        let transition = match (self.state, next) {
            (AgentState::Idle, AgentState::WaitingResources) => Some(Transition::Waiting),
            (AgentState::WaitingResources, AgentState::CriticalSection) => {
                Some(Transition::Eating)
            }
            (AgentState::CriticalSection, AgentState::Releasing) => Some(Transition::Finished),
            _ => None,
        };
        self.state = next;
        if let Some(transition) = transition {
            self.sink.record(TraceEvent::new(self.seat, transition));
        }
    }

    /// Take the fork on `side` unless it is already in hand
    pub async fn acquire(&mut self, side: Side) -> RingResult<()> {
        if self.holds(side) {
            return Ok(());
        }

        let seat = self.seat;
        let (endpoint, slot) = match side {
            Side::Left => (&mut self.left, &mut self.left_fork),
            Side::Right => (&mut self.right, &mut self.right_fork),
        };
        let fork = endpoint
            .take()
            .await
            .ok_or(RingError::EndOfStream { seat, side })?;
        *slot = Some(fork);
        Ok(())
    }

    /// Take both forks in this seat's fixed order
    pub async fn acquire_all(&mut self) -> RingResult<()> {
        for side in self.order.sides() {
            self.acquire(side).await?;
        }
        Ok(())
    }

    /// Hand both forks back to the neighbors they came from
    ///
    /// Refuses to run unless both forks are held; a partial release would
    /// drop a fork on the floor.
    pub async fn release(&mut self) -> RingResult<()> {
        let (left, right) = match (self.left_fork.take(), self.right_fork.take()) {
            (Some(left), Some(right)) => (left, right),
            (left, right) => {
                self.left_fork = left;
                self.right_fork = right;
                return Err(self.missing_forks());
            }
        };

        self.left.give(left).await.map_err(|_| RingError::ChannelClosed {
            seat: self.seat,
            side: Side::Left,
        })?;
        self.right
            .give(right)
            .await
            .map_err(|_| RingError::ChannelClosed {
                seat: self.seat,
                side: Side::Right,
            })?;
        Ok(())
    }

    fn missing_forks(&self) -> RingError {
        RingError::ReleaseWithoutForks {
            seat: self.seat,
            holds_left: self.holds_left(),
            holds_right: self.holds_right(),
        }
    }

    async fn pause(duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }

    /// Critical section; both forks must already be in hand
    pub async fn eat(&mut self) -> RingResult<()> {
        if !(self.holds_left() && self.holds_right()) {
            return Err(RingError::EatWithoutForks {
                seat: self.seat,
                holds_left: self.holds_left(),
                holds_right: self.holds_right(),
            });
        }
        self.enter(AgentState::CriticalSection);
        self.meals += 1;
        Self::pause(self.pacing.eat_time).await;
        Ok(())
    }

    /// One trip around the loop: wait, eat, release, back to idle
    pub async fn cycle(&mut self) -> RingResult<()> {
        Self::pause(self.pacing.think_time).await;

        self.enter(AgentState::WaitingResources);
        self.acquire_all().await?;
        self.eat().await?;

        self.enter(AgentState::Releasing);
        self.release().await?;

        self.enter(AgentState::Idle);
        Ok(())
    }

    /// Loop forever; only returns when a neighbor has gone away
    pub async fn run(mut self) -> RingResult<Infallible> {
        debug!(
            seat = self.seat.index(),
            order = ?self.order,
            holds_left = self.holds_left(),
            holds_right = self.holds_right(),
            "Philosopher seated"
        );
        loop {
            self.cycle().await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ownership::OwnershipPlan;
    use crate::ring::Ring;
    use crate::trace::RecordingSink;
    use tokio::time::timeout;

    fn seat_ring(seats: usize, sink: Arc<RecordingSink>) -> Vec<Philosopher> {
        Ring::new(seats, OwnershipPlan::ReversedLast)
            .unwrap()
            .seat(Pacing::default(), sink)
            .unwrap()
    }

    #[tokio::test]
    async fn first_seat_eats_without_waiting() {
        let sink = Arc::new(RecordingSink::new());
        let mut ring = seat_ring(3, sink.clone());
        let first = &mut ring[0];

        assert!(first.holds_left() && first.holds_right());
        timeout(Duration::from_millis(100), first.cycle())
            .await
            .expect("seat 0 owns both forks")
            .unwrap();

        assert_eq!(first.meals(), 1);
        assert_eq!(first.state(), AgentState::Idle);
        assert!(!first.holds_left() && !first.holds_right());

        let transitions: Vec<_> = sink.events().iter().map(|e| e.transition).collect();
        assert_eq!(
            transitions,
            vec![Transition::Waiting, Transition::Eating, Transition::Finished]
        );
    }

    #[tokio::test]
    async fn last_seat_blocks_until_first_releases() {
        let sink = Arc::new(RecordingSink::new());
        let mut ring = seat_ring(2, sink.clone());
        let mut last = ring.pop().unwrap();
        let mut first = ring.pop().unwrap();

        assert_eq!(last.order(), AcquisitionOrder::RightThenLeft);
        let blocked = timeout(Duration::from_millis(20), last.cycle()).await;
        assert!(blocked.is_err(), "seat 1 has no forks yet");
        assert_eq!(last.state(), AgentState::WaitingResources);

        first.cycle().await.unwrap();
        timeout(Duration::from_millis(100), last.cycle())
            .await
            .expect("forks were released to seat 1")
            .unwrap();

        assert_eq!(last.meals(), 1);
        assert_eq!(sink.eating_order(), vec![SeatId::new(0), SeatId::new(1)]);
    }

    #[tokio::test]
    async fn release_without_forks_is_refused() {
        let mut ring = seat_ring(3, Arc::new(RecordingSink::new()));
        let middle = &mut ring[1];

        assert!(!middle.holds_left() && middle.holds_right());
        let err = middle.release().await.unwrap_err();
        assert!(matches!(
            err,
            RingError::ReleaseWithoutForks {
                holds_left: false,
                holds_right: true,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn eating_needs_both_forks() {
        let mut ring = seat_ring(3, Arc::new(RecordingSink::new()));

        assert!(matches!(
            ring[2].eat().await,
            Err(RingError::EatWithoutForks {
                holds_left: false,
                holds_right: false,
                ..
            })
        ));
        assert_eq!(ring[2].meals(), 0);

        ring[0].eat().await.unwrap();
        assert_eq!(ring[0].state(), AgentState::CriticalSection);
        assert_eq!(ring[0].meals(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cycle_thinks_then_eats_for_the_configured_time() {
        let pacing = Pacing {
            think_time: Duration::from_secs(2),
            eat_time: Duration::from_secs(5),
        };
        let mut ring = Ring::new(3, OwnershipPlan::ReversedLast)
            .unwrap()
            .seat(pacing, Arc::new(RecordingSink::new()))
            .unwrap();

        let start = tokio::time::Instant::now();
        ring[0].cycle().await.unwrap();

        assert_eq!(start.elapsed(), Duration::from_secs(7));
        assert_eq!(ring[0].meals(), 1);
    }

    #[tokio::test]
    async fn acquire_skips_a_fork_already_held() {
        let mut ring = seat_ring(3, Arc::new(RecordingSink::new()));
        let first = &mut ring[0];
        timeout(Duration::from_millis(50), first.acquire_all())
            .await
            .expect("nothing to wait for")
            .unwrap();
    }

    #[tokio::test]
    async fn vanished_neighbor_ends_the_stream() {
        let mut ring = seat_ring(3, Arc::new(RecordingSink::new()));
        let mut middle = ring.remove(1);
        drop(ring);

        let err = middle.acquire(Side::Left).await.unwrap_err();
        assert!(matches!(
            err,
            RingError::EndOfStream {
                side: Side::Left,
                ..
            }
        ));
    }
}
