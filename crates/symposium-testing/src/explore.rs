//! Exhaustive interleaving search
//!
//! Breadth-first over every reachable ring state, deduplicated by state.
//! Meal counters are not part of the state, so the reachable space of a
//! small ring is finite and the search terminates on its own; the limits
//! only matter for large rings.

use crate::error::{SimResult, SimulationError};
use crate::model::{RingModel, RingState};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use symposium_core::OwnershipPlan;
use tracing::debug;

/// Bounds on the search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExploreLimits {
    pub max_depth: usize,
    pub max_states: usize,
}

impl Default for ExploreLimits {
    fn default() -> Self {
        Self {
            max_depth: 512,
            max_states: 1_000_000,
        }
    }
}

/// Result of a search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exploration {
    pub seats: usize,
    pub plan: OwnershipPlan,
    /// Distinct states visited
    pub states: usize,
    /// Transitions taken
    pub transitions: usize,
    /// Deepest schedule examined
    pub depth: usize,
    /// Every reachable state was visited
    pub complete: bool,
    /// Shortest schedule that ends with no seat able to move
    pub deadlock: Option<Vec<usize>>,
}

impl Exploration {
    pub fn is_deadlock_free(&self) -> bool {
        self.complete && self.deadlock.is_none()
    }
}

/// Search every interleaving of `seats` philosophers under `plan`
///
/// Stops at the first deadlock, which is therefore a shortest one.
/// Invariant violations in any reachable state are returned as errors.
pub fn explore(seats: usize, plan: OwnershipPlan, limits: ExploreLimits) -> SimResult<Exploration> {
    let model = RingModel::new(seats, plan)?;
    let initial = model.initial_state();

    let mut visited: HashSet<RingState> = HashSet::new();
    let mut queue: VecDeque<(RingState, Vec<usize>)> = VecDeque::new();
    visited.insert(initial.clone());
    queue.push_back((initial, Vec::new()));

    let mut exploration = Exploration {
        seats,
        plan,
        states: 0,
        transitions: 0,
        depth: 0,
        complete: true,
        deadlock: None,
    };

    while let Some((state, path)) = queue.pop_front() {
        exploration.states += 1;
        exploration.depth = exploration.depth.max(path.len());
        model.verify(&state, path.len() as u64)?;

        let enabled = model.enabled(&state);
        if enabled.is_empty() {
            debug!(seats, depth = path.len(), "Found deadlocking schedule");
            exploration.deadlock = Some(path);
            return Ok(exploration);
        }
        if path.len() >= limits.max_depth {
            exploration.complete = false;
            continue;
        }

        for seat in enabled {
            let mut next = state.clone();
            model
                .apply(&mut next, seat)
                .map_err(|detail| SimulationError::InvariantViolated {
                    step: path.len() as u64 + 1,
                    detail,
                })?;
            exploration.transitions += 1;

            if visited.contains(&next) {
                continue;
            }
            if visited.len() >= limits.max_states {
                exploration.complete = false;
                continue;
            }
            visited.insert(next.clone());
            let mut next_path = path.clone();
            next_path.push(seat);
            queue.push_back((next, next_path));
        }
    }

    debug!(
        seats,
        states = exploration.states,
        complete = exploration.complete,
        "Exploration finished"
    );
    Ok(exploration)
}
