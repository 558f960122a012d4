//! # Symposium Core
//!
//! Dining philosophers over message passing. `N` philosophers sit in a
//! ring; each pair of neighbors shares one fork, carried over a link made of
//! two capacity-1 streams. A philosopher eats only while holding both of its
//! forks and hands them straight back to its neighbors afterwards.
//!
//! Deadlock is avoided by the initial ownership table alone: philosopher 0
//! starts with both forks, the last philosopher starts empty-handed and
//! reaches right first, everyone else starts with their right fork. There is
//! no timeout, retry or deadlock detector at runtime.
//!
//! ## Example
//!
//! ```rust,no_run
//! use symposium_core::{RingConfigBuilder, Supervisor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RingConfigBuilder::from_env()?.seats(16).build()?;
//!
//!     // Parks forever unless a philosopher fails
//!     let never = Supervisor::new(config).run().await?;
//!     match never {}
//! }
//! ```

pub mod agent;
pub mod channel;
pub mod config;
pub mod error;
pub mod ownership;
pub mod ring;
pub mod supervisor;
pub mod token;
pub mod trace;
pub mod types;

pub use agent::{Pacing, Philosopher};
pub use channel::{Endpoint, LINK_CAPACITY, link};
pub use config::{ConfigError, DEFAULT_SEATS, RingConfig, RingConfigBuilder};
pub use error::{RingError, RingResult};
pub use ownership::{AcquisitionOrder, OwnershipPlan, ParsePlanError, Placement, SeatAssignment};
pub use ring::{Ring, SeatWiring, left_edge, left_neighbor, right_edge, right_neighbor, wrap};
pub use supervisor::{RingHandle, Supervisor};
pub use token::Fork;
pub use trace::{
    FanoutSink, NullSink, RecordingSink, TraceEvent, TraceSink, TracingSink, Transition,
};
pub use types::{AgentState, SeatId, Side};
