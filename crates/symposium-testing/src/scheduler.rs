//! Controllable schedulers
//!
//! A scheduler decides which runnable seat moves next. Deterministic
//! schedulers make interleavings reproducible; `Seeded` explores random
//! ones reproducibly from a seed.

use crate::simulation::Simulation;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// Picks the next seat to advance
pub trait Scheduler {
    fn name(&self) -> &'static str;

    /// Choose one of `enabled` (ascending, never empty), or `None` to stop
    fn pick(&mut self, sim: &Simulation, enabled: &[usize]) -> Option<usize>;
}

/// Cycles through the seats, skipping the blocked ones
#[derive(Debug, Default, Clone)]
pub struct RoundRobin {
    cursor: usize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for RoundRobin {
    fn name(&self) -> &'static str {
        "round-robin"
    }

    fn pick(&mut self, sim: &Simulation, enabled: &[usize]) -> Option<usize> {
        let seat = enabled
            .iter()
            .copied()
            .find(|&s| s >= self.cursor)
            .or_else(|| enabled.first().copied())?;
        self.cursor = (seat + 1) % sim.seats();
        Some(seat)
    }
}

/// Uniformly random choice from a seeded generator
#[derive(Debug, Clone)]
pub struct Seeded {
    rng: StdRng,
}

impl Seeded {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Scheduler for Seeded {
    fn name(&self) -> &'static str {
        "random"
    }

    fn pick(&mut self, _sim: &Simulation, enabled: &[usize]) -> Option<usize> {
        if enabled.is_empty() {
            return None;
        }
        Some(enabled[self.rng.random_range(0..enabled.len())])
    }
}

/// Keeps every seat at the same number of actions
///
/// The seat with the fewest actions so far always moves next, so all seats
/// leave idle together, then all take their first fork together, and so on.
#[derive(Debug, Default, Clone, Copy)]
pub struct Lockstep;

impl Scheduler for Lockstep {
    fn name(&self) -> &'static str {
        "lockstep"
    }

    fn pick(&mut self, sim: &Simulation, enabled: &[usize]) -> Option<usize> {
        enabled
            .iter()
            .copied()
            .min_by_key(|&seat| (sim.actions(seat), seat))
    }
}

/// Replays a fixed sequence of seats
#[derive(Debug, Default, Clone)]
pub struct Scripted {
    script: VecDeque<usize>,
}

impl Scripted {
    pub fn new(script: impl IntoIterator<Item = usize>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Scheduler for Scripted {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn pick(&mut self, _sim: &Simulation, _enabled: &[usize]) -> Option<usize> {
        self.script.pop_front()
    }
}

/// Scheduler choice for command lines and reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchedulerKind {
    #[default]
    RoundRobin,
    Random,
    Lockstep,
}

impl SchedulerKind {
    /// Build the scheduler; `seed` only matters for `Random`
    pub fn build(self, seed: u64) -> Box<dyn Scheduler> {
        match self {
            Self::RoundRobin => Box::new(RoundRobin::new()),
            Self::Random => Box::new(Seeded::new(seed)),
            Self::Lockstep => Box::new(Lockstep),
        }
    }
}

impl fmt::Display for SchedulerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoundRobin => f.write_str("round-robin"),
            Self::Random => f.write_str("random"),
            Self::Lockstep => f.write_str("lockstep"),
        }
    }
}

impl FromStr for SchedulerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "round-robin" | "rr" => Ok(Self::RoundRobin),
            "random" | "seeded" => Ok(Self::Random),
            "lockstep" => Ok(Self::Lockstep),
            other => Err(format!(
                "unknown scheduler '{other}', expected round-robin, random or lockstep"
            )),
        }
    }
}
