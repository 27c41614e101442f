//! State field storage

use crate::{grid::Grid, Precision};
use ndarray::{Array1, ArrayView1};
use thiserror::Error;

/// Value of the diffused quantity at each grid point
pub type StateField = Array1<Precision>;

/// Borrowed view of a [`StateField`]
pub type StateFieldView<'a> = ArrayView1<'a, Precision>;

/// A state field does not have one value per grid point
#[derive(Clone, Copy, Debug, Error, Eq, Hash, PartialEq)]
#[error("state field has {actual} values, but the grid has {expected} points")]
pub struct ShapeError {
    /// Number of grid points
    pub expected: usize,

    /// Number of values in the state field
    pub actual: usize,
}

/// Pair of StateFields where one acts as an input and the other as an output
///
/// Simulation steps read the input and write the output, then [`flip()`]
/// makes the freshly computed output become the next input.
///
/// [`flip()`]: Evolving::flip
#[derive(Clone, Debug, PartialEq)]
pub struct Evolving([StateField; 2]);
//
impl Evolving {
    /// Set up storage whose input is a copy of `initial`
    pub fn new(initial: StateFieldView<'_>) -> Self {
        Self([initial.to_owned(), StateField::zeros(initial.len())])
    }

    /// Number of values in each state field
    pub fn len(&self) -> usize {
        self.0[0].len()
    }

    /// Truth that the state fields hold no value
    pub fn is_empty(&self) -> bool {
        self.0[0].is_empty()
    }

    /// Access the input state
    pub fn input(&self) -> &StateField {
        &self.0[0]
    }

    /// Access the input and output state
    pub fn in_out(&mut self) -> (&StateField, &mut StateField) {
        let [input, output] = &mut self.0;
        (input, output)
    }

    /// Make the output state become the input one
    pub fn flip(&mut self) {
        let [input, output] = &mut self.0;
        std::mem::swap(input, output);
    }

    /// Extract the input state, discarding the output buffer
    pub fn into_input(self) -> StateField {
        let [input, _output] = self.0;
        input
    }
}

/// Start and end point of a simulation run
///
/// Intermediate states are not kept.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationResult {
    /// State before any simulation step
    pub initial: StateField,

    /// State after the last simulation step
    pub last: StateField,
}

/// Analytical initial conditions
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InitialCondition {
    /// Evenly spaced values from `from` at the bottom to `to` at the top
    Ramp { from: Precision, to: Precision },

    /// `low` on the lower half of the grid, `high` on the upper half
    Step { low: Precision, high: Precision },
}
//
impl InitialCondition {
    /// Tabulate this initial condition on a grid
    pub fn make(&self, grid: &Grid) -> StateField {
        let len = grid.len();
        match *self {
            Self::Ramp { from, to } => StateField::linspace(from, to, len),
            Self::Step { low, high } => {
                StateField::from_shape_fn(len, |idx| if idx < len / 2 { low } else { high })
            }
        }
    }
}
