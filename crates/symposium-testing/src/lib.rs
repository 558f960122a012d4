//! # Symposium Testing
//!
//! Deterministic harness for symposium rings. Instead of tokio tasks it
//! steps a model of the ring one action at a time under a chosen
//! scheduler, so interleavings are reproducible and every intermediate
//! state can be checked.
//!
//! ## Components
//!
//! - **Model**: per-seat state machine and single-slot streams
//! - **Schedulers**: round-robin, seeded random, lockstep and scripted
//! - **Simulation**: runs a scheduler, checks invariants, reports meals and waits
//! - **Explorer**: breadth-first search over all interleavings of small rings
//!
//! ## Usage
//!
//! ```rust
//! use symposium_core::OwnershipPlan;
//! use symposium_testing::{Lockstep, Outcome, Simulation};
//!
//! let mut sim = Simulation::new(3, OwnershipPlan::Uniform).unwrap();
//! let report = sim.run(&mut Lockstep, 100).unwrap();
//! assert_eq!(report.outcome, Outcome::Deadlocked { step: 6 });
//! ```

/// Error types
pub mod error;
/// Exhaustive interleaving search
pub mod explore;
/// Step-level ring model
pub mod model;
/// Controllable schedulers
pub mod scheduler;
/// Scheduler-driven runs and reports
pub mod simulation;

pub use error::{SimResult, SimulationError};
pub use explore::{ExploreLimits, Exploration, explore};
pub use model::{Action, RingModel, RingState, SeatSnapshot};
pub use scheduler::{Lockstep, RoundRobin, Scheduler, SchedulerKind, Scripted, Seeded};
pub use simulation::{Outcome, Simulation, SimulationReport};
