//! Parallel implementation of the threshold-switched diffusion simulation
//!
//! This crate implements a parallel version of the simulation based on domain
//! decomposition and fork-join parallelism. Each time step is recursively
//! split into sub-grids that a sequential backend then processes, so results
//! are identical to those of that backend.

use clap::Args;
use compute::{
    cpu::{CpuGrid, SimulateCpu},
    SimulateBase, SimulateCreate,
};
use data::{grid::Grid, parameters::Parameters, Precision};
use log::debug;
use rayon::{prelude::*, ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use std::num::NonZeroUsize;
use thiserror::Error;

/// Threshold-switched diffusion simulation
pub type Simulation = ParallelSimulation<compute_regular::Simulation>;

/// Default number of processed bytes per parallel task
const DEFAULT_SEQ_BLOCK_SIZE: usize = 16 * 1024;

/// Parameters are tunable via CLI args and environment variables
#[derive(Args, Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct CliArgs<BackendArgs: Args> {
    /// Number of processing threads [default: all CPUs]
    #[arg(short = 'j', long, env)]
    num_threads: Option<NonZeroUsize>,

    /// Number of processed bytes per parallel task [default: 16384]
    ///
    /// There is a granularity compromise between exposing opportunities for
    /// parallelism and keeping individual sequential tasks efficient. This
    /// is the tuning knob that lets you adjust it. Something between half the
    /// L1 cache and the L2 cache of a CPU core is usually a good start.
    #[arg(long, env)]
    seq_block_size: Option<NonZeroUsize>,

    /// Expose backend arguments too
    #[command(flatten)]
    backend: BackendArgs,
}

/// Simulation wrapper that enforces parallel iteration
#[derive(Debug)]
pub struct ParallelSimulation<Backend: SimulateCpu + Sync> {
    /// Number of state values below which parallelism is not worthwhile
    sequential_len_threshold: usize,

    /// Dedicated thread pool, if a thread count was requested
    thread_pool: Option<ThreadPool>,

    /// Underlying sequential compute backend
    backend: Backend,
}
//
impl<Backend: SimulateCpu + Sync> SimulateBase for ParallelSimulation<Backend> {
    type CliArgs = CliArgs<Backend::CliArgs>;

    type Error = Error<<Backend as SimulateBase>::Error>;

    fn grid(&self) -> &Grid {
        self.backend.grid()
    }
}
//
impl<Backend: SimulateCpu + SimulateCreate + Sync> SimulateCreate for ParallelSimulation<Backend> {
    fn new(params: Parameters, args: Self::CliArgs) -> Result<Self, Self::Error> {
        let thread_pool = args
            .num_threads
            .map(|num_threads| {
                ThreadPoolBuilder::new()
                    .num_threads(num_threads.into())
                    .build()
                    .map_err(Error::ThreadPool)
            })
            .transpose()?;

        let sequential_len_threshold =
            args.seq_block_size.map_or(DEFAULT_SEQ_BLOCK_SIZE, usize::from)
                / std::mem::size_of::<Precision>();
        debug!(
            "Parallel simulation will process at most {sequential_len_threshold} values per task \
            on {} threads",
            thread_pool
                .as_ref()
                .map_or_else(rayon::current_num_threads, ThreadPool::current_num_threads)
        );

        Ok(Self {
            sequential_len_threshold,
            thread_pool,
            backend: Backend::new(params, args.backend).map_err(Error::Backend)?,
        })
    }
}
//
impl<Backend: SimulateCpu + Sync> SimulateCpu for ParallelSimulation<Backend> {
    fn unchecked_step_impl(&self, grid: CpuGrid<'_, '_>, dt: Precision) {
        let step = || {
            rayon::iter::split(grid, |subgrid| {
                if Self::grid_len(&subgrid) <= self.sequential_len_threshold
                    || subgrid.output.len() < 2
                {
                    (subgrid, None)
                } else {
                    let [half1, half2] = Self::split_grid(subgrid);
                    (half1, Some(half2))
                }
            })
            .for_each(|subgrid| {
                self.backend.step_impl(subgrid, dt);
            });
        };
        match &self.thread_pool {
            Some(pool) => pool.install(step),
            None => step(),
        }
    }
}

/// Things that can go wrong when performing parallel simulation
#[derive(Debug, Error)]
pub enum Error<BackendError: std::error::Error> {
    /// Error from the underlying compute backend
    #[error(transparent)]
    Backend(BackendError),

    /// Input was rejected before reaching the backend
    #[error(transparent)]
    Compute(#[from] compute::Error),

    /// Failed to configure thread pool
    #[error("failed to configure thread pool")]
    ThreadPool(#[source] ThreadPoolBuildError),
}
