//! Benchmarking utilities
//!
//! Please consider using the [`criterion_benchmark!`](crate::criterion_benchmark)
//! macro instead of calling these implementation details directly.

use crate::{Simulate, SimulateCreate};
use clap::{Args, Command, FromArgMatches};
use criterion::{BenchmarkId, Criterion, Throughput};
use data::{
    field::InitialCondition,
    parameters::{Parameters, DEFAULT_SAFETY_FACTOR},
};
use std::{hint::black_box, sync::Once};

/// Re-export criterion for the criterion_benchmark macro
pub use criterion;

// Make sure env_logger is only initialized once
fn init_logger() {
    static INIT_LOGGER: Once = Once::new();
    INIT_LOGGER.call_once(env_logger::init);
}

/// Common criterion benchmark for all compute backends
pub fn criterion_benchmark<Simulation: Simulate + SimulateCreate>(
    c: &mut Criterion,
    backend_name: &str,
) {
    init_logger();

    let args = Simulation::CliArgs::from_arg_matches(
        &Simulation::CliArgs::augment_args(Command::default().no_binary_name(true))
            .get_matches_from(None::<&str>),
    )
    .expect("Failed to parse arguments from defaults & environment");

    let mut group = c.benchmark_group(backend_name.to_owned());
    for size_pow2 in 4..=16 {
        let point_count = 2usize.pow(size_pow2);
        let params = Parameters {
            point_count,
            ..Parameters::default()
        };
        let dt = params
            .stable_time_step(DEFAULT_SAFETY_FACTOR)
            .expect("Default parameters should be valid");
        let initial = InitialCondition::Ramp {
            from: -10.0,
            to: 10.0,
        }
        .make(&params.grid().expect("Default parameters should be valid"));

        let sim = Simulation::new(black_box(params), args.clone())
            .expect("Failed to set up the simulation");
        let mut field = sim
            .make_field(initial.view())
            .expect("Initial state should match the grid");

        for num_steps_pow2 in [0, 4, 8] {
            let num_steps = 2usize.pow(num_steps_pow2);
            group.throughput(Throughput::Elements((point_count * num_steps) as u64));
            group.bench_function(
                BenchmarkId::from_parameter(format!("{point_count}points,{num_steps}steps")),
                |b| {
                    b.iter(|| {
                        sim.perform_steps(&mut field, black_box(dt), num_steps)
                            .expect("Simulation steps should not fail")
                    });
                },
            );
        }
        black_box(field);
    }
    group.finish();
}
