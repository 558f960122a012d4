//! # Ring Simulation
//!
//! Runs a [`RingModel`] under a [`Scheduler`], one action per step, checking
//! conservation and mutual exclusion after every step. Deadlock (no seat can
//! move) ends the run and is reported as an outcome.

use crate::error::{SimResult, SimulationError};
use crate::model::{Action, RingModel, RingState, SeatSnapshot};
use crate::scheduler::Scheduler;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use symposium_core::{NullSink, OwnershipPlan, SeatId, TraceEvent, TraceSink, Transition};
use tracing::{debug, warn};

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// Step budget used up with the ring still moving
    Completed,
    /// No seat could move after `step` steps
    Deadlocked { step: u64 },
    /// The scheduler stopped choosing
    ScheduleExhausted { step: u64 },
}

/// Summary of one simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub seats: usize,
    pub plan: OwnershipPlan,
    pub scheduler: String,
    pub steps: u64,
    pub outcome: Outcome,
    pub meals: Vec<u64>,
    /// Longest stretch, in steps, between waiting and eating
    pub longest_wait: Vec<u64>,
    /// Step at which each seat first ate
    pub first_meal: Vec<Option<u64>>,
}

impl SimulationReport {
    pub fn total_meals(&self) -> u64 {
        self.meals.iter().sum()
    }

    pub fn everyone_ate(&self) -> bool {
        self.meals.iter().all(|&m| m > 0)
    }

    pub fn is_deadlocked(&self) -> bool {
        matches!(self.outcome, Outcome::Deadlocked { .. })
    }

    /// Largest meal-count difference between two neighbors
    pub fn max_neighbor_gap(&self) -> u64 {
        let n = self.meals.len();
        (0..n)
            .map(|i| self.meals[i].abs_diff(self.meals[(i + 1) % n]))
            .max()
            .unwrap_or(0)
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match &self.outcome {
            Outcome::Completed => "COMPLETED".to_string(),
            Outcome::Deadlocked { step } => format!("DEADLOCK at step {step}"),
            Outcome::ScheduleExhausted { step } => format!("SCRIPT ENDED at step {step}"),
        };
        writeln!(
            f,
            "[{}] {} seats, plan {}, scheduler {}, {} steps, {} meals",
            status,
            self.seats,
            self.plan,
            self.scheduler,
            self.steps,
            self.total_meals()
        )?;
        for seat in 0..self.seats {
            writeln!(
                f,
                "  Philosopher {:>3}: {:>6} meals, longest wait {:>5} steps",
                seat + 1,
                self.meals[seat],
                self.longest_wait[seat]
            )?;
        }
        Ok(())
    }
}

/// A ring being stepped by hand or by a scheduler
pub struct Simulation {
    model: RingModel,
    state: RingState,
    step: u64,
    actions: Vec<u64>,
    meals: Vec<u64>,
    waiting_since: Vec<Option<u64>>,
    longest_wait: Vec<u64>,
    first_meal: Vec<Option<u64>>,
    sink: Arc<dyn TraceSink>,
}

impl Simulation {
    pub fn new(seats: usize, plan: OwnershipPlan) -> SimResult<Self> {
        let model = RingModel::new(seats, plan)?;
        let state = model.initial_state();
        model.verify(&state, 0)?;

        Ok(Self {
            model,
            state,
            step: 0,
            actions: vec![0; seats],
            meals: vec![0; seats],
            waiting_since: vec![None; seats],
            longest_wait: vec![0; seats],
            first_meal: vec![None; seats],
            sink: Arc::new(NullSink),
        })
    }

    /// Send trace events to `sink` as seats change phase
    pub fn with_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn seats(&self) -> usize {
        self.model.seats()
    }

    pub fn model(&self) -> &RingModel {
        &self.model
    }

    pub fn state(&self) -> &RingState {
        &self.state
    }

    pub fn seat(&self, seat: usize) -> &SeatSnapshot {
        self.state.seat(seat)
    }

    /// Steps taken so far
    pub fn steps(&self) -> u64 {
        self.step
    }

    /// Actions taken by `seat` so far
    pub fn actions(&self, seat: usize) -> u64 {
        self.actions[seat]
    }

    pub fn meals(&self, seat: usize) -> u64 {
        self.meals[seat]
    }

    pub fn enabled(&self) -> Vec<usize> {
        self.model.enabled(&self.state)
    }

    pub fn is_deadlocked(&self) -> bool {
        self.enabled().is_empty()
    }

    /// Advance `seat` by one action and re-check the invariants
    pub fn step(&mut self, seat: usize) -> SimResult<Action> {
        let step = self.step + 1;
        if seat >= self.seats() {
            return Err(SimulationError::InvalidSchedule {
                step,
                seat: SeatId::new(seat),
            });
        }

        let action = self
            .model
            .apply(&mut self.state, seat)
            .map_err(|detail| SimulationError::InvariantViolated { step, detail })?
            .ok_or(SimulationError::InvalidSchedule {
                step,
                seat: SeatId::new(seat),
            })?;

        self.step = step;
        self.actions[seat] += 1;

        let id = SeatId::new(seat);
        match action {
            Action::StartWaiting => {
                self.waiting_since[seat] = Some(step);
                self.sink.record(TraceEvent::new(id, Transition::Waiting));
            }
            Action::Eat => {
                self.meals[seat] += 1;
                if let Some(since) = self.waiting_since[seat].take() {
                    self.longest_wait[seat] = self.longest_wait[seat].max(step - since);
                }
                self.first_meal[seat].get_or_insert(step);
                self.sink.record(TraceEvent::new(id, Transition::Eating));
            }
            Action::Finish => self.sink.record(TraceEvent::new(id, Transition::Finished)),
            Action::Take(_) | Action::Give(_) => {}
        }

        self.model.verify(&self.state, step)?;
        Ok(action)
    }

    /// Let `scheduler` drive the ring for at most `max_steps` more steps
    pub fn run(
        &mut self,
        scheduler: &mut dyn Scheduler,
        max_steps: u64,
    ) -> SimResult<SimulationReport> {
        let limit = self.step + max_steps;
        let outcome = loop {
            if self.step >= limit {
                break Outcome::Completed;
            }
            let enabled = self.enabled();
            if enabled.is_empty() {
                warn!(step = self.step, seats = self.seats(), "Simulated ring deadlocked");
                break Outcome::Deadlocked { step: self.step };
            }
            let Some(seat) = scheduler.pick(self, &enabled) else {
                break Outcome::ScheduleExhausted { step: self.step };
            };
            self.step(seat)?;
        };

        debug!(
            scheduler = scheduler.name(),
            steps = self.step,
            outcome = ?outcome,
            "Simulation finished"
        );
        Ok(self.report(scheduler.name(), outcome))
    }

    pub fn report(&self, scheduler: &str, outcome: Outcome) -> SimulationReport {
        SimulationReport {
            seats: self.seats(),
            plan: self.model.plan(),
            scheduler: scheduler.to_string(),
            steps: self.step,
            outcome,
            meals: self.meals.clone(),
            longest_wait: self.longest_wait.clone(),
            first_meal: self.first_meal.clone(),
        }
    }
}
