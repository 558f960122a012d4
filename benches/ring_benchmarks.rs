//! Ring Throughput Benchmarks
//!
//! Live rings on a multi-threaded tokio runtime, and the step rate of the
//! deterministic model for comparison.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;
use symposium::{
    OwnershipPlan, RecordingSink, RingConfigBuilder, RoundRobin, Simulation, Supervisor,
};

const MEALS_PER_SEAT: u64 = 200;

/// Time until every philosopher of a live ring has eaten `MEALS_PER_SEAT` times
fn bench_live_ring(c: &mut Criterion) {
    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Skipping live ring benchmarks: {e}");
            return;
        }
    };

    let mut group = c.benchmark_group("live_ring");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    for seats in [2usize, 16, 64] {
        group.throughput(Throughput::Elements(seats as u64 * MEALS_PER_SEAT));
        group.bench_with_input(BenchmarkId::new("meals", seats), &seats, |b, &seats| {
            b.to_async(&runtime).iter(|| async move {
                let sink = Arc::new(RecordingSink::counting());
                let config = RingConfigBuilder::new().seats(seats).build().unwrap();
                let handle = Supervisor::new(config)
                    .with_sink(sink.clone())
                    .spawn()
                    .unwrap();
                sink.wait_for_meals(seats, MEALS_PER_SEAT).await;
                handle.shutdown();
                black_box(sink.total_meals())
            })
        });
    }

    group.finish();
}

/// Model steps per second under round-robin
fn bench_simulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation");
    const STEPS: u64 = 10_000;
    group.throughput(Throughput::Elements(STEPS));

    for seats in [2usize, 16, 256] {
        group.bench_with_input(BenchmarkId::new("round_robin", seats), &seats, |b, &seats| {
            b.iter(|| {
                let mut sim = Simulation::new(seats, OwnershipPlan::ReversedLast).unwrap();
                black_box(sim.run(&mut RoundRobin::new(), STEPS).unwrap())
            })
        });
    }

    group.bench_function("explore_four_seats", |b| {
        b.iter(|| {
            black_box(
                symposium::explore(
                    black_box(4),
                    OwnershipPlan::ReversedLast,
                    symposium::ExploreLimits::default(),
                )
                .unwrap(),
            )
        })
    });

    group.finish();
}

criterion_group!(benches, bench_live_ring, bench_simulation);
criterion_main!(benches);
