//! Common facilities shared by all compute backends

#[cfg(feature = "criterion")]
pub mod benchmark;
#[cfg(feature = "cpu")]
pub mod cpu;

use clap::Args;
use data::{
    field::{Evolving, ShapeError, SimulationResult, StateField, StateFieldView},
    grid::Grid,
    parameters::{ParameterError, Parameters},
    Precision,
};
use std::{fmt::Debug, num::NonZeroUsize};
use thiserror::Error;

/// Commonalities between all ways to set up a simulation
pub trait SimulateBase: Sized {
    /// Supplementary CLI arguments allowing fine-tuning of this backend
    ///
    /// To honor the principle of least surprise and make criterion
    /// microbenchmarks work smoothly, any argument you add must have a default
    /// value and should also be configurable through environment variables.
    type CliArgs: Args + Clone + Debug;

    /// Error type used by simulation operations
    ///
    /// Simulation steps never fail on numerical grounds: unstable time steps
    /// show up as diverging or non-finite values in the results. Errors are
    /// only about rejecting malformed inputs, plus backend setup issues.
    type Error: std::error::Error + From<Error> + Send + Sync + 'static;

    /// Grid on which the simulation takes place
    fn grid(&self) -> &Grid;

    /// Set up state storage, starting from a copy of `initial`
    fn make_field(&self, initial: StateFieldView<'_>) -> Result<Evolving, Self::Error> {
        self.grid().check_field(initial).map_err(Error::from)?;
        Ok(Evolving::new(initial))
    }
}

/// Simulation backend that can be set up from parameters and CLI arguments
pub trait SimulateCreate: SimulateBase {
    /// Set up the simulation
    ///
    /// Invalid parameters are rejected here, before any step is performed.
    fn new(params: Parameters, args: Self::CliArgs) -> Result<Self, Self::Error>;
}

/// Simulation backend that can perform time steps
pub trait Simulate: SimulateBase {
    /// Perform `steps` explicit time steps of duration `dt`
    ///
    /// Steps are performed in order, each one starting from the state produced
    /// by the previous one. On success, the input state of `field` is the state
    /// after the last step. Zero steps leave `field` untouched.
    fn perform_steps(
        &self,
        field: &mut Evolving,
        dt: Precision,
        steps: usize,
    ) -> Result<(), Self::Error>;

    /// Perform a single time step from state `theta`
    fn step(&self, theta: StateFieldView<'_>, dt: Precision) -> Result<StateField, Self::Error> {
        let mut field = self.make_field(theta)?;
        self.perform_steps(&mut field, dt, 1)?;
        Ok(field.into_input())
    }

    /// Perform `num_steps` time steps, keeping only the initial and final state
    fn run(
        &self,
        initial: StateFieldView<'_>,
        dt: Precision,
        num_steps: usize,
    ) -> Result<SimulationResult, Self::Error> {
        let mut field = self.make_field(initial)?;
        self.perform_steps(&mut field, dt, num_steps)?;
        Ok(SimulationResult {
            initial: initial.to_owned(),
            last: field.into_input(),
        })
    }

    /// Like [`run()`](Self::run), but also keep every `stride`-th state
    ///
    /// The output starts with the initial state and always ends with the final
    /// state, even when `num_steps` is not a multiple of `stride`.
    fn run_with_history(
        &self,
        initial: StateFieldView<'_>,
        dt: Precision,
        num_steps: usize,
        stride: NonZeroUsize,
    ) -> Result<Vec<StateField>, Self::Error> {
        let mut field = self.make_field(initial)?;
        let mut history = Vec::with_capacity(num_steps.div_ceil(stride.get()) + 1);
        history.push(field.input().clone());
        let mut remaining = num_steps;
        while remaining > 0 {
            let batch = remaining.min(stride.get());
            self.perform_steps(&mut field, dt, batch)?;
            history.push(field.input().clone());
            remaining -= batch;
        }
        Ok(history)
    }
}

/// Things that can go wrong in any simulation backend
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum Error {
    /// Simulation parameters were rejected
    #[error(transparent)]
    Parameters(#[from] ParameterError),

    /// A state field does not match the simulation grid
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Placeholder for backends that have no CLI arguments
#[derive(Args, Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct NoArgs {}

/// Macro that generates a complete criterion benchmark harness for you
#[macro_export]
#[cfg(feature = "criterion")]
macro_rules! criterion_benchmark {
    ($backend:ident) => {
        fn criterion_benchmark(c: &mut $crate::benchmark::criterion::Criterion) {
            $crate::benchmark::criterion_benchmark::<$backend::Simulation>(
                c,
                stringify!($backend),
            )
        }
        $crate::benchmark::criterion::criterion_group!(benches, criterion_benchmark);
        $crate::benchmark::criterion::criterion_main!(benches);
    };
}
