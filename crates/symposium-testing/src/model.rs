//! Step-level model of the ring
//!
//! Every philosopher advances one action at a time and every directional
//! stream is a single slot. A slot is `true` while a fork is in flight on it.

use crate::error::{SimResult, SimulationError};
use symposium_core::{
    AcquisitionOrder, AgentState, OwnershipPlan, Placement, Ring, SeatId, Side, left_edge, wrap,
};

/// One indivisible step of a philosopher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// idle -> waiting
    StartWaiting,
    /// Read the fork on this side from its inbound slot
    Take(Side),
    /// waiting -> eating, both forks in hand
    Eat,
    /// eating -> releasing
    Finish,
    /// Write the fork on this side to its outbound slot
    Give(Side),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SeatSnapshot {
    pub state: AgentState,
    pub holds_left: bool,
    pub holds_right: bool,
}

impl SeatSnapshot {
    pub fn holds(&self, side: Side) -> bool {
        match side {
            Side::Left => self.holds_left,
            Side::Right => self.holds_right,
        }
    }

    fn set(&mut self, side: Side, held: bool) {
        match side {
            Side::Left => self.holds_left = held,
            Side::Right => self.holds_right = held,
        }
    }
}

/// Everything that changes while the ring runs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RingState {
    seats: Vec<SeatSnapshot>,
    // edge e: in flight from seat e to seat e + 1
    toward_right: Vec<bool>,
    // edge e: in flight from seat e + 1 to seat e
    toward_left: Vec<bool>,
}

impl RingState {
    pub fn seat(&self, seat: usize) -> &SeatSnapshot {
        &self.seats[seat]
    }

    pub fn seats(&self) -> &[SeatSnapshot] {
        &self.seats
    }

    /// Forks currently in flight
    pub fn in_flight(&self) -> usize {
        self.toward_right.iter().chain(&self.toward_left).filter(|&&f| f).count()
    }

    /// Forks currently in hand
    pub fn in_hand(&self) -> usize {
        self.seats
            .iter()
            .map(|s| usize::from(s.holds_left) + usize::from(s.holds_right))
            .sum()
    }
}

/// Which slot a seat reads from or writes to on a side
#[derive(Debug, Clone, Copy)]
enum Slot {
    TowardRight(usize),
    TowardLeft(usize),
}

/// Static description of a ring: size and acquisition orders
#[derive(Debug, Clone)]
pub struct RingModel {
    seats: usize,
    plan: OwnershipPlan,
    orders: Vec<AcquisitionOrder>,
}

impl RingModel {
    pub fn new(seats: usize, plan: OwnershipPlan) -> SimResult<Self> {
        Ring::new(seats, plan)?;
        let orders = plan.table(seats).iter().map(|a| a.order).collect();
        Ok(Self {
            seats,
            plan,
            orders,
        })
    }

    pub fn seats(&self) -> usize {
        self.seats
    }

    pub fn plan(&self) -> OwnershipPlan {
        self.plan
    }

    pub fn order(&self, seat: usize) -> AcquisitionOrder {
        self.orders[seat]
    }

    /// State at the moment every philosopher has been seated
    pub fn initial_state(&self) -> RingState {
        let n = self.seats;
        let mut state = RingState {
            seats: vec![SeatSnapshot::default(); n],
            toward_right: vec![false; n],
            toward_left: vec![false; n],
        };

        for (seat, assignment) in self.plan.table(n).iter().enumerate() {
            for side in [Side::Left, Side::Right] {
                match assignment.placement(side) {
                    Placement::Held => state.seats[seat].set(side, true),
                    Placement::Incoming => self.set_slot(&mut state, self.inbound(seat, side), true),
                    Placement::Away => {}
                }
            }
        }

        state
    }

    fn inbound(&self, seat: usize, side: Side) -> Slot {
        match side {
            Side::Left => Slot::TowardRight(left_edge(SeatId::new(seat), self.seats)),
            Side::Right => Slot::TowardLeft(seat),
        }
    }

    fn outbound(&self, seat: usize, side: Side) -> Slot {
        match side {
            Side::Left => Slot::TowardLeft(left_edge(SeatId::new(seat), self.seats)),
            Side::Right => Slot::TowardRight(seat),
        }
    }

    fn slot(&self, state: &RingState, slot: Slot) -> bool {
        match slot {
            Slot::TowardRight(edge) => state.toward_right[edge],
            Slot::TowardLeft(edge) => state.toward_left[edge],
        }
    }

    fn set_slot(&self, state: &mut RingState, slot: Slot, full: bool) {
        match slot {
            Slot::TowardRight(edge) => state.toward_right[edge] = full,
            Slot::TowardLeft(edge) => state.toward_left[edge] = full,
        }
    }

    /// The action `seat` would perform next, if it is not blocked
    pub fn next_action(&self, state: &RingState, seat: usize) -> Option<Action> {
        let snapshot = &state.seats[seat];
        match snapshot.state {
            AgentState::Idle => Some(Action::StartWaiting),
            AgentState::WaitingResources => {
                match self.orders[seat]
                    .sides()
                    .into_iter()
                    .find(|&side| !snapshot.holds(side))
                {
                    Some(side) => self
                        .slot(state, self.inbound(seat, side))
                        .then_some(Action::Take(side)),
                    None => Some(Action::Eat),
                }
            }
            AgentState::CriticalSection => Some(Action::Finish),
            AgentState::Releasing => [Side::Left, Side::Right]
                .into_iter()
                .find(|&side| snapshot.holds(side))
                .filter(|&side| !self.slot(state, self.outbound(seat, side)))
                .map(Action::Give),
        }
    }

    /// Seats that can move, in ascending order
    pub fn enabled(&self, state: &RingState) -> Vec<usize> {
        (0..self.seats)
            .filter(|&seat| self.next_action(state, seat).is_some())
            .collect()
    }

    /// Advance `seat` by one action
    ///
    /// Returns `None` when the seat is blocked.
    pub fn apply(&self, state: &mut RingState, seat: usize) -> Result<Option<Action>, String> {
        let Some(action) = self.next_action(state, seat) else {
            return Ok(None);
        };

        match action {
            Action::StartWaiting => state.seats[seat].state = AgentState::WaitingResources,
            Action::Take(side) => {
                self.set_slot(state, self.inbound(seat, side), false);
                state.seats[seat].set(side, true);
            }
            Action::Eat => state.seats[seat].state = AgentState::CriticalSection,
            Action::Finish => {
                let snapshot = state.seats[seat];
                if !(snapshot.holds_left && snapshot.holds_right) {
                    return Err(format!(
                        "seat {seat} entered releasing holding left={} right={}",
                        snapshot.holds_left, snapshot.holds_right
                    ));
                }
                state.seats[seat].state = AgentState::Releasing;
            }
            Action::Give(side) => {
                self.set_slot(state, self.outbound(seat, side), true);
                let snapshot = &mut state.seats[seat];
                snapshot.set(side, false);
                if !snapshot.holds_left && !snapshot.holds_right {
                    snapshot.state = AgentState::Idle;
                }
            }
        }

        Ok(Some(action))
    }

    /// Conservation and mutual exclusion
    pub fn check(&self, state: &RingState) -> Result<(), String> {
        let n = self.seats;
        for edge in 0..n {
            let next = wrap(edge as isize + 1, n);
            let tokens = usize::from(state.seats[edge].holds_right)
                + usize::from(state.seats[next].holds_left)
                + usize::from(state.toward_right[edge])
                + usize::from(state.toward_left[edge]);
            if tokens != 1 {
                return Err(format!("edge {edge} carries {tokens} forks"));
            }
            if state.seats[edge].state == AgentState::CriticalSection
                && state.seats[next].state == AgentState::CriticalSection
            {
                return Err(format!("seats {edge} and {next} eat side by side"));
            }
        }

        for (seat, snapshot) in state.seats.iter().enumerate() {
            if snapshot.state == AgentState::CriticalSection
                && !(snapshot.holds_left && snapshot.holds_right)
            {
                return Err(format!("seat {seat} eats without both forks"));
            }
        }

        let total = state.in_hand() + state.in_flight();
        if total != n {
            return Err(format!("{total} forks on a table of {n}"));
        }
        Ok(())
    }

    /// Like [`check`](Self::check), tagged with the step it ran at
    pub fn verify(&self, state: &RingState, step: u64) -> SimResult<()> {
        self.check(state)
            .map_err(|detail| SimulationError::InvariantViolated { step, detail })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_conserves_forks() {
        for plan in [OwnershipPlan::ReversedLast, OwnershipPlan::Uniform] {
            let model = RingModel::new(5, plan).unwrap();
            let state = model.initial_state();
            assert!(model.check(&state).is_ok());
            assert_eq!(state.in_hand() + state.in_flight(), 5);
        }
    }

    #[test]
    fn only_first_seat_can_eat_at_start() {
        let model = RingModel::new(4, OwnershipPlan::ReversedLast).unwrap();
        let mut state = model.initial_state();

        // everyone leaves idle
        for seat in 0..4 {
            assert_eq!(model.apply(&mut state, seat).unwrap(), Some(Action::StartWaiting));
        }
        assert_eq!(model.enabled(&state), vec![0]);
        assert_eq!(model.next_action(&state, 0), Some(Action::Eat));
    }

    #[test]
    fn last_seat_waits_on_its_right_first() {
        let model = RingModel::new(3, OwnershipPlan::ReversedLast).unwrap();
        assert_eq!(model.order(2), AcquisitionOrder::RightThenLeft);

        let mut state = model.initial_state();
        for action in [Action::StartWaiting, Action::Eat, Action::Finish] {
            assert_eq!(model.apply(&mut state, 0).unwrap(), Some(action));
        }
        assert_eq!(model.apply(&mut state, 0).unwrap(), Some(Action::Give(Side::Left)));
        model.apply(&mut state, 2).unwrap();
        assert_eq!(model.next_action(&state, 2), Some(Action::Take(Side::Right)));
    }

    #[test]
    fn blocked_seat_does_not_move() {
        let model = RingModel::new(3, OwnershipPlan::ReversedLast).unwrap();
        let mut state = model.initial_state();
        model.apply(&mut state, 2).unwrap();

        let before = state.clone();
        assert_eq!(model.apply(&mut state, 2).unwrap(), None);
        assert_eq!(state, before);
    }

    #[test]
    fn check_catches_a_duplicated_fork() {
        let model = RingModel::new(3, OwnershipPlan::ReversedLast).unwrap();
        let mut state = model.initial_state();
        state.toward_right[1] = true;

        let err = model.check(&state).unwrap_err();
        assert!(err.contains("edge 1"));
    }
}
