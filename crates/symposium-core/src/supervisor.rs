//! Supervisor: lay the table, seat everyone, then park
//!
//! Philosophers run as independent tokio tasks held in a `JoinSet`. Under
//! normal operation none of them ever finishes, so [`RingHandle::join`]
//! parks forever. The first philosopher to stop, for any reason, is fatal
//! for the whole ring.

use crate::agent::Pacing;
use crate::config::RingConfig;
use crate::error::{RingError, RingResult};
use crate::ring::Ring;
use crate::trace::{TraceSink, TracingSink};
use crate::types::SeatId;
use futures::FutureExt;
use std::any::Any;
use std::convert::Infallible;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

type SeatOutcome = (SeatId, Result<RingResult<Infallible>, Box<dyn Any + Send>>);

/// Builds the ring and starts one task per seat
pub struct Supervisor {
    config: RingConfig,
    sink: Arc<dyn TraceSink>,
}

impl Supervisor {
    /// Supervisor that traces through `tracing`
    pub fn new(config: RingConfig) -> Self {
        Self {
            config,
            sink: Arc::new(TracingSink),
        }
    }

    /// Replace the trace sink
    pub fn with_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &RingConfig {
        &self.config
    }

    /// Seat every philosopher on the current tokio runtime
    ///
    /// Fails before any philosopher runs if the ring cannot be built or no
    /// runtime is available.
    pub fn spawn(&self) -> RingResult<RingHandle> {
        let runtime = Handle::try_current().map_err(|e| RingError::SpawnFailed(e.to_string()))?;
        let ring = Ring::new(self.config.seats, self.config.plan)?;
        let pacing = Pacing {
            think_time: self.config.think_time,
            eat_time: self.config.eat_time,
        };

        let mut tasks = JoinSet::new();
        for philosopher in ring.seat(pacing, Arc::clone(&self.sink))? {
            let seat = philosopher.seat();
            tasks.spawn_on(
                async move {
                    let outcome = AssertUnwindSafe(philosopher.run()).catch_unwind().await;
                    (seat, outcome)
                },
                &runtime,
            );
            debug!(seat = seat.index(), "Spawned philosopher");
        }

        info!(
            seats = ring.seats(),
            plan = %ring.plan(),
            "Ring seated"
        );

        Ok(RingHandle {
            tasks,
            seats: ring.seats(),
        })
    }

    /// Spawn the ring and park until it fails
    pub async fn run(self) -> RingResult<Infallible> {
        self.spawn()?.join().await
    }
}

/// The running set of philosopher tasks
///
/// Dropping the handle aborts every philosopher.
pub struct RingHandle {
    tasks: JoinSet<SeatOutcome>,
    seats: usize,
}

impl RingHandle {
    pub fn seats(&self) -> usize {
        self.seats
    }

    /// Philosopher tasks still running
    pub fn running(&self) -> usize {
        self.tasks.len()
    }

    /// Park until any philosopher stops, then tear the ring down
    pub async fn join(mut self) -> RingResult<Infallible> {
        let failure = match self.tasks.join_next().await {
            Some(Ok((_, Ok(Ok(never))))) => match never {},
            Some(Ok((_, Ok(Err(err))))) => err,
            Some(Ok((seat, Err(payload)))) => RingError::AgentPanicked {
                seat,
                message: panic_message(payload.as_ref()),
            },
            Some(Err(_)) => RingError::Cancelled,
            None => RingError::NoPhilosophers,
        };

        error!(error = %failure, "Philosopher stopped; tearing down ring");
        self.tasks.abort_all();
        Err(failure)
    }

    /// Abort every philosopher without waiting
    pub fn shutdown(mut self) {
        self.tasks.abort_all();
        info!(seats = self.seats, "Ring shut down");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RingConfigBuilder;
    use crate::ownership::OwnershipPlan;
    use crate::trace::RecordingSink;
    use std::time::Duration;
    use tokio::time::timeout;

    fn config(seats: usize) -> RingConfig {
        RingConfigBuilder::new().seats(seats).build().unwrap()
    }

    #[test]
    fn spawn_outside_a_runtime_fails_cleanly() {
        let supervisor = Supervisor::new(config(3));
        assert!(matches!(
            supervisor.spawn(),
            Err(RingError::SpawnFailed(_))
        ));
    }

    #[tokio::test]
    async fn every_seat_eats() {
        let sink = Arc::new(RecordingSink::counting());
        let handle = Supervisor::new(config(5))
            .with_sink(sink.clone())
            .spawn()
            .unwrap();
        assert_eq!(handle.running(), 5);

        timeout(Duration::from_secs(5), sink.wait_for_meals(5, 3))
            .await
            .expect("all philosophers should eat");
        handle.shutdown();
    }

    #[tokio::test]
    async fn join_parks_while_the_ring_is_healthy() {
        let handle = Supervisor::new(config(3))
            .with_sink(Arc::new(RecordingSink::counting()))
            .spawn()
            .unwrap();

        let parked = timeout(Duration::from_millis(100), handle.join()).await;
        assert!(parked.is_err(), "join should never return on a healthy ring");
    }

    #[tokio::test]
    async fn uniform_plan_never_reaches_the_table() {
        let sink = Arc::new(RecordingSink::new());
        let config = RingConfigBuilder::new()
            .seats(4)
            .plan(OwnershipPlan::Uniform)
            .build()
            .unwrap();
        let handle = Supervisor::new(config)
            .with_sink(sink.clone())
            .spawn()
            .unwrap();

        let stalled = timeout(Duration::from_millis(200), sink.wait_for_meals(1, 1)).await;
        assert!(stalled.is_err(), "uniform plan must deadlock");
        assert_eq!(sink.total_meals(), 0);
        handle.shutdown();
    }

    #[tokio::test]
    async fn join_on_an_empty_ring_reports_no_philosophers() {
        let handle = RingHandle {
            tasks: JoinSet::new(),
            seats: 0,
        };
        assert!(matches!(
            handle.join().await,
            Err(RingError::NoPhilosophers)
        ));
    }

    #[test]
    fn panic_payloads_become_messages() {
        assert_eq!(panic_message(&"boom"), "boom");
        assert_eq!(panic_message(&String::from("bang")), "bang");
        assert_eq!(panic_message(&42u8), "non-string panic payload");
    }
}
