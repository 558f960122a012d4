//! `symposium simulate` and `symposium explore`

use crate::error::CliError;
use crate::{ExploreArgs, SimulateArgs};
use std::sync::Arc;
use symposium_core::{NullSink, TraceSink, TracingSink};
use symposium_testing::{ExploreLimits, Outcome, Simulation, explore};
use tracing::info;

pub fn run_simulation(args: SimulateArgs) -> Result<(), CliError> {
    let sink: Arc<dyn TraceSink> = if args.trace {
        Arc::new(TracingSink)
    } else {
        Arc::new(NullSink)
    };
    let mut sim = Simulation::new(args.seats, args.plan)?.with_sink(sink);
    let mut scheduler = args.scheduler.build(args.seed);

    info!(
        seats = args.seats,
        plan = %args.plan,
        scheduler = %args.scheduler,
        seed = args.seed,
        "Starting simulation"
    );
    let report = sim.run(scheduler.as_mut(), args.steps)?;

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{report}");
    }

    match report.outcome {
        Outcome::Deadlocked { step } => Err(CliError::Deadlocked { step }),
        _ => Ok(()),
    }
}

pub fn run_explore(args: ExploreArgs) -> Result<(), CliError> {
    let limits = ExploreLimits {
        max_depth: args.depth,
        max_states: args.max_states,
    };
    let result = explore(args.seats, args.plan, limits)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "{} seats, plan {}: {} states, {} transitions, depth {}{}",
            result.seats,
            result.plan,
            result.states,
            result.transitions,
            result.depth,
            if result.complete { "" } else { " (incomplete)" }
        );
        match &result.deadlock {
            Some(schedule) => {
                let seats: Vec<String> = schedule.iter().map(|s| (s + 1).to_string()).collect();
                println!("Deadlocking schedule: {}", seats.join(" "));
            }
            None if result.complete => println!("No reachable deadlock"),
            None => println!("No deadlock within limits"),
        }
    }

    match result.deadlock {
        Some(schedule) => Err(CliError::DeadlockFound {
            length: schedule.len(),
        }),
        None => Ok(()),
    }
}
