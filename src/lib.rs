//! # Symposium
//!
//! Dining philosophers over capacity-1 channels, plus the tools to check
//! them. This crate re-exports the workspace so applications depend on one
//! name.
//!
//! ## Components
//!
//! - **[Supervisor]**: seats a ring of [Philosopher] tasks on tokio
//! - **[OwnershipPlan]**: initial fork placement; the default one cannot deadlock
//! - **[TraceSink]**: where "is waiting", "is now eating" and "is finished" lines go
//! - **[Simulation]** and [explore]: deterministic stepping and exhaustive search
//!
//! ## Quick Start
//!
//! ```rust
//! use symposium::{OwnershipPlan, RoundRobin, Simulation};
//!
//! let mut sim = Simulation::new(5, OwnershipPlan::ReversedLast).unwrap();
//! let report = sim.run(&mut RoundRobin::new(), 1_000).unwrap();
//! assert!(report.everyone_ate());
//! ```

pub use symposium_core::*;

pub mod testing {
    pub use symposium_testing::*;
}

pub use symposium_testing::{
    ExploreLimits, Exploration, Lockstep, Outcome, RoundRobin, Scheduler, SchedulerKind,
    Scripted, Seeded, Simulation, SimulationError, SimulationReport, explore,
};
