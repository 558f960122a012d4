//! `symposium run`: a live ring on the tokio runtime

use crate::RunArgs;
use crate::error::CliError;
use std::sync::Arc;
use std::time::Duration;
use symposium_core::{
    FanoutSink, RecordingSink, RingConfigBuilder, Supervisor, TraceSink, TracingSink,
};
use tracing::info;

pub async fn run_ring(args: RunArgs) -> Result<(), CliError> {
    let mut builder = RingConfigBuilder::from_env()?;
    if let Some(seats) = args.seats {
        builder = builder.seats(seats);
    }
    if let Some(ms) = args.eat_ms {
        builder = builder.eat_time(Duration::from_millis(ms));
    }
    if let Some(ms) = args.think_ms {
        builder = builder.think_time(Duration::from_millis(ms));
    }
    if let Some(plan) = args.plan {
        builder = builder.plan(plan);
    }
    let config = builder.build()?;
    let seats = config.seats;

    let recorder = Arc::new(RecordingSink::counting());
    let sink: Arc<dyn TraceSink> = if args.quiet {
        recorder.clone()
    } else {
        Arc::new(
            FanoutSink::new()
                .with(Arc::new(TracingSink))
                .with(recorder.clone()),
        )
    };

    let handle = Supervisor::new(config).with_sink(sink).spawn()?;

    let reason = tokio::select! {
        result = handle.join() => match result {
            Ok(never) => match never {},
            Err(e) => return Err(e.into()),
        },
        _ = meal_target(&recorder, seats, args.meals) => "meal target reached",
        signal = tokio::signal::ctrl_c() => {
            signal?;
            "interrupted"
        }
    };

    info!(reason, total_meals = recorder.total_meals(), "Ring stopped");
    for (seat, meals) in recorder.meals_per_seat(seats).iter().enumerate() {
        println!("Philosopher {:>4}: {meals} meals", seat + 1);
    }
    Ok(())
}

async fn meal_target(recorder: &RecordingSink, seats: usize, meals: Option<u64>) {
    match meals {
        Some(min) => recorder.wait_for_meals(seats, min).await,
        None => std::future::pending().await,
    }
}
