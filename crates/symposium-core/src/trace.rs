//! Observational trace of philosopher transitions
//!
//! Sinks are fire-and-forget. Nothing recorded here feeds back into the
//! protocol, and no ordering is promised across philosophers.

use crate::types::SeatId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::info;

/// Transition announced by a philosopher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// idle -> waiting
    Waiting,
    /// waiting -> eating
    Eating,
    /// eating -> releasing
    Finished,
}

/// One line of the trace stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceEvent {
    pub seat: SeatId,
    pub transition: Transition,
}

impl TraceEvent {
    pub fn new(seat: SeatId, transition: Transition) -> Self {
        Self { seat, transition }
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.transition {
            Transition::Waiting => "is waiting to eat",
            Transition::Eating => "is now eating",
            Transition::Finished => "is finished eating",
        };
        write!(f, "Philosopher {} {}", self.seat.ordinal(), what)
    }
}

/// Destination for trace events
pub trait TraceSink: Send + Sync {
    fn record(&self, event: TraceEvent);
}

/// Emits every event through `tracing` at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn record(&self, event: TraceEvent) {
        info!(
            seat = event.seat.index(),
            transition = ?event.transition,
            "{}",
            event
        );
    }
}

/// Drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn record(&self, _event: TraceEvent) {}
}

/// Forwards each event to several sinks
#[derive(Default, Clone)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn TraceSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl TraceSink for FanoutSink {
    fn record(&self, event: TraceEvent) {
        for sink in &self.sinks {
            sink.record(event);
        }
    }
}

#[derive(Debug, Default)]
struct Recorded {
    events: Vec<TraceEvent>,
    meals: Vec<u64>,
}

/// Keeps events in memory and counts meals per seat
///
/// Tests and the CLI use it to wait for progress without polling.
pub struct RecordingSink {
    recorded: Mutex<Recorded>,
    retain_events: bool,
    progress: watch::Sender<u64>,
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSink {
    /// Record every event
    pub fn new() -> Self {
        Self {
            recorded: Mutex::new(Recorded::default()),
            retain_events: true,
            progress: watch::Sender::new(0),
        }
    }

    /// Count meals only; events are not kept
    pub fn counting() -> Self {
        Self {
            retain_events: false,
            ..Self::new()
        }
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.recorded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy of all retained events, in recording order
    pub fn events(&self) -> Vec<TraceEvent> {
        self.lock().events.clone()
    }

    /// Seats in the order they started eating
    pub fn eating_order(&self) -> Vec<SeatId> {
        self.lock()
            .events
            .iter()
            .filter(|e| e.transition == Transition::Eating)
            .map(|e| e.seat)
            .collect()
    }

    pub fn meals(&self, seat: SeatId) -> u64 {
        self.lock().meals.get(seat.index()).copied().unwrap_or(0)
    }

    /// Meal counts for seats `0..seats`
    pub fn meals_per_seat(&self, seats: usize) -> Vec<u64> {
        let recorded = self.lock();
        (0..seats)
            .map(|i| recorded.meals.get(i).copied().unwrap_or(0))
            .collect()
    }

    pub fn total_meals(&self) -> u64 {
        self.lock().meals.iter().sum()
    }

    /// Wait until each of `seats` has eaten at least `min_meals` times
    pub async fn wait_for_meals(&self, seats: usize, min_meals: u64) {
        let mut progress = self.progress.subscribe();
        loop {
            if self.meals_per_seat(seats).iter().all(|&m| m >= min_meals) {
                return;
            }
            if progress.changed().await.is_err() {
                return;
            }
        }
    }
}

impl TraceSink for RecordingSink {
    fn record(&self, event: TraceEvent) {
        let mut recorded = self.lock();
        if self.retain_events {
            recorded.events.push(event);
        }
        if event.transition == Transition::Eating {
            let index = event.seat.index();
            if recorded.meals.len() <= index {
                recorded.meals.resize(index + 1, 0);
            }
            recorded.meals[index] += 1;
            drop(recorded);
            self.progress.send_modify(|count| *count += 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn display_matches_classic_wording() {
        let seat = SeatId::new(2);
        assert_eq!(
            TraceEvent::new(seat, Transition::Waiting).to_string(),
            "Philosopher 3 is waiting to eat"
        );
        assert_eq!(
            TraceEvent::new(seat, Transition::Eating).to_string(),
            "Philosopher 3 is now eating"
        );
        assert_eq!(
            TraceEvent::new(seat, Transition::Finished).to_string(),
            "Philosopher 3 is finished eating"
        );
    }

    #[test]
    fn recording_sink_counts_meals() {
        let sink = RecordingSink::new();
        let seat = SeatId::new(1);
        sink.record(TraceEvent::new(seat, Transition::Waiting));
        sink.record(TraceEvent::new(seat, Transition::Eating));
        sink.record(TraceEvent::new(seat, Transition::Finished));

        assert_eq!(sink.events().len(), 3);
        assert_eq!(sink.meals(seat), 1);
        assert_eq!(sink.meals_per_seat(3), vec![0, 1, 0]);
        assert_eq!(sink.eating_order(), vec![seat]);
    }

    #[test]
    fn counting_sink_keeps_no_events() {
        let sink = RecordingSink::counting();
        sink.record(TraceEvent::new(SeatId::new(0), Transition::Eating));
        assert!(sink.events().is_empty());
        assert_eq!(sink.total_meals(), 1);
    }

    #[test]
    fn fanout_reaches_every_sink() {
        let a = Arc::new(RecordingSink::new());
        let b = Arc::new(RecordingSink::counting());
        let fanout = FanoutSink::new()
            .with(a.clone())
            .with(b.clone())
            .with(Arc::new(NullSink));

        fanout.record(TraceEvent::new(SeatId::new(0), Transition::Eating));
        assert_eq!(a.total_meals(), 1);
        assert_eq!(b.total_meals(), 1);
    }

    #[tokio::test]
    async fn wait_for_meals_wakes_on_progress() {
        let sink = Arc::new(RecordingSink::new());
        let writer = sink.clone();

        tokio::spawn(async move {
            for seat in 0..2 {
                tokio::time::sleep(Duration::from_millis(5)).await;
                writer.record(TraceEvent::new(SeatId::new(seat), Transition::Eating));
            }
        });

        tokio::time::timeout(Duration::from_secs(1), sink.wait_for_meals(2, 1))
            .await
            .expect("both seats should have eaten");
    }
}
