//! This crate collects elements that are shared between the CLI programs of
//! this project: model arguments and terminal user interface setup.

#[cfg(feature = "simulation")]
use clap::{Args, ValueEnum};
#[cfg(feature = "simulation")]
use compute::SimulateBase;
#[cfg(feature = "simulation")]
use data::{
    coefficient::CoefficientSource,
    field::InitialCondition,
    parameters::{ParameterError, Parameters, DEFAULT_SAFETY_FACTOR},
    Precision,
};
#[cfg(feature = "tui")]
use indicatif::{ProgressBar, ProgressFinish, ProgressStyle};
#[cfg(feature = "tui")]
use log::LevelFilter;
#[cfg(feature = "tui")]
use std::time::Duration;

/// CLI arguments describing the diffusion problem to be simulated
#[cfg(feature = "simulation")]
#[derive(Args)]
pub struct SharedArgs<Simulation: SimulateBase> {
    /// Number of grid points
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub nbpoint: usize,

    /// Distance between two consecutive grid points
    #[arg(short = 'z', long, default_value_t = 0.1)]
    pub spacing: Precision,

    /// Diffusion coefficient where the state is above the threshold
    #[arg(short = 'a', long, default_value_t = 1.0)]
    pub kappa_above: Precision,

    /// Diffusion coefficient where the state is at or below the threshold
    #[arg(short = 'b', long, default_value_t = 0.1)]
    pub kappa_below: Precision,

    /// State value that switches between both diffusion coefficients
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub threshold: Precision,

    /// Simulated time interval on each simulation step
    ///
    /// Defaults to a safe fraction of the explicit stability limit.
    #[arg(short = 't', long, allow_negative_numbers = true)]
    pub deltat: Option<Precision>,

    /// Number of simulation steps to perform
    #[arg(short = 's', long, default_value_t = 1_000_000)]
    pub nbstep: usize,

    /// Shape of the initial state profile
    #[arg(long, value_enum, default_value_t = InitialShape::Ramp)]
    pub initial: InitialShape,

    /// Initial state at the bottom of the grid
    #[arg(long, default_value_t = -10.0, allow_negative_numbers = true)]
    pub low: Precision,

    /// Initial state at the top of the grid
    #[arg(long, default_value_t = 10.0, allow_negative_numbers = true)]
    pub high: Precision,

    /// Backend-specific CLI arguments
    #[command(flatten)]
    pub backend: Simulation::CliArgs,
}
//
#[cfg(feature = "simulation")]
impl<Simulation: SimulateBase> SharedArgs<Simulation> {
    /// Simulation parameters
    pub fn parameters(&self) -> Parameters {
        Parameters {
            point_count: self.nbpoint,
            spacing: self.spacing,
            above: CoefficientSource::Constant(self.kappa_above),
            below: CoefficientSource::Constant(self.kappa_below),
            threshold: self.threshold,
        }
    }

    /// Time step, from the CLI or from the stability limit of `params`
    pub fn time_step(&self, params: &Parameters) -> Result<Precision, ParameterError> {
        match self.deltat {
            Some(dt) => Ok(dt),
            None => params.stable_time_step(DEFAULT_SAFETY_FACTOR),
        }
    }

    /// Initial state profile
    pub fn initial_condition(&self) -> InitialCondition {
        match self.initial {
            InitialShape::Ramp => InitialCondition::Ramp {
                from: self.low,
                to: self.high,
            },
            InitialShape::Step => InitialCondition::Step {
                low: self.low,
                high: self.high,
            },
        }
    }
}

/// Initial state profiles that can be selected from the CLI
#[cfg(feature = "simulation")]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, ValueEnum)]
pub enum InitialShape {
    /// Linear ramp from `low` to `high`
    #[default]
    Ramp,

    /// `low` on the lower half of the grid, `high` on the upper half
    Step,
}

/// Set up logging to syslog
///
/// Logs go nowhere if syslog is not reachable, which is reported on stderr.
#[cfg(feature = "tui")]
pub fn init_syslog() {
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Err(e) = syslog::init(syslog::Facility::default(), level, None) {
        eprintln!("Failed to initialize syslog, logs will be discarded: {e}");
    }
}

/// Set up a progress bar over `len` units of work
#[cfg(feature = "tui")]
pub fn init_progress_reporting(message: &'static str, len: usize) -> ProgressBar {
    let progress = ProgressBar::new(len as u64)
        .with_message(message)
        .with_style(
            ProgressStyle::with_template("{msg} {pos}/{len} {wide_bar} {elapsed}/~{duration}")
                .expect("Failed to parse style"),
        )
        .with_finish(ProgressFinish::AndClear);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}
