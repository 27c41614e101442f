use clap::Parser;
use compute::{Simulate, SimulateBase, SimulateCreate};
use compute_selector::Simulation;
use data::{
    diagnostics::Summary,
    field::SimulationResult,
    hdf5::{self, Writer},
};
use eyre::Result;
use log::{info, warn};
use std::{num::NonZeroUsize, path::PathBuf};
use ui::SharedArgs;

/// Perform threshold-switched diffusion simulation
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CLI arguments describing the diffusion problem
    #[command(flatten)]
    shared: SharedArgs<Simulation>,

    /// Number of simulation steps between two progress updates
    #[arg(long, default_value = "1000")]
    steps_per_update: NonZeroUsize,

    /// Path to an HDF5 file where the initial and final state will be saved
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Enable logging to syslog
    ui::init_syslog();

    // Parse CLI arguments and handle clap-incompatible defaults
    let args = Args::parse();
    let params = args.shared.parameters();
    let grid = params.grid()?;
    let dt = args.shared.time_step(&params)?;
    let stability_limit = params.stability_limit()?;
    let initial = args.shared.initial_condition().make(&grid);
    let num_steps = args.shared.nbstep;
    println!("Using time step dt = {dt:.6}");
    if dt > stability_limit {
        warn!("Time step {dt} exceeds the explicit stability limit {stability_limit}");
        println!("WARNING: time step exceeds the stability limit {stability_limit:.6}");
    }

    // Set up the simulation
    let simulation = Simulation::new(params, args.shared.backend)?;
    let mut field = simulation.make_field(initial.view())?;
    info!("Running {num_steps} steps of duration {dt} on {} points", grid.len());

    // Run the simulation, reporting progress along the way
    let progress = ui::init_progress_reporting("Running simulation step", num_steps);
    let mut remaining = num_steps;
    while remaining > 0 {
        let batch = remaining.min(args.steps_per_update.get());
        simulation.perform_steps(&mut field, dt, batch)?;
        progress.inc(batch as u64);
        remaining -= batch;
    }
    progress.finish();
    let result = SimulationResult {
        initial,
        last: field.into_input(),
    };

    // Report on the outcome
    let summary = Summary::new(&result);
    if summary.is_unstable() {
        warn!(
            "Final state contains {} non-finite values",
            summary.non_finite
        );
        println!("WARNING: NaN values detected in final solution!");
        println!("This might indicate numerical instability.");
        println!("Try reducing the time step further or increasing the number of grid points.");
    }
    let [initial_min, initial_max] = summary.initial_range;
    let [final_min, final_max] = summary.final_range;
    println!("Initial state range: {initial_min:.2} to {initial_max:.2}");
    println!("Final state range: {final_min:.2} to {final_max:.2}");
    println!("Maximum change in state: {:.2}", summary.max_change);
    println!("Initial vertical average: {:.2}", summary.initial_average);
    println!("Final vertical average: {:.2}", summary.final_average);
    println!("Change in vertical average: {:.2}", summary.average_change());

    // Save the initial and final state if requested
    if let Some(file_name) = args.output {
        let mut writer = Writer::create(
            hdf5::Config {
                file_name: &file_name,
                dataset_name: None,
            },
            &grid,
        )?;
        writer.write(&result)?;
        writer.close()?;
        info!("Saved initial and final state to {}", file_name.display());
    }
    Ok(())
}
