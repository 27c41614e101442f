//! Scalar diagnostics of state fields

use crate::{
    field::{SimulationResult, StateFieldView},
    Precision,
};
use ndarray::Zip;

/// Arithmetic mean of a state field over the vertical
///
/// The state field should not be empty. If it is, the result is NaN.
pub fn vertical_average(theta: StateFieldView<'_>) -> Precision {
    theta.mean().unwrap_or(Precision::NAN)
}

/// Smallest and largest value of a state field, ignoring NaNs
pub fn range(theta: StateFieldView<'_>) -> [Precision; 2] {
    theta.fold(
        [Precision::INFINITY, Precision::NEG_INFINITY],
        |[min, max], &value| [min.min(value), max.max(value)],
    )
}

/// Number of NaN or infinite values in a state field
pub fn count_non_finite(theta: StateFieldView<'_>) -> usize {
    theta.iter().filter(|value| !value.is_finite()).count()
}

/// Largest absolute difference between two state fields
///
/// NaN differences are ignored, check [`count_non_finite()`] for those.
pub fn max_abs_change(before: StateFieldView<'_>, after: StateFieldView<'_>) -> Precision {
    Zip::from(&before)
        .and(&after)
        .fold(0.0, |acc: Precision, &before, &after| {
            acc.max((after - before).abs())
        })
}

/// Summary statistics of a simulation run
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    /// Smallest and largest value of the initial state
    pub initial_range: [Precision; 2],

    /// Smallest and largest value of the final state
    pub final_range: [Precision; 2],

    /// Largest pointwise change between the initial and final state
    pub max_change: Precision,

    /// Vertical average of the initial state
    pub initial_average: Precision,

    /// Vertical average of the final state
    pub final_average: Precision,

    /// Number of NaN or infinite values in the final state
    pub non_finite: usize,
}
//
impl Summary {
    /// Compute summary statistics
    pub fn new(result: &SimulationResult) -> Self {
        let initial = result.initial.view();
        let last = result.last.view();
        Self {
            initial_range: range(initial),
            final_range: range(last),
            max_change: max_abs_change(initial, last),
            initial_average: vertical_average(initial),
            final_average: vertical_average(last),
            non_finite: count_non_finite(last),
        }
    }

    /// Change in vertical average over the run
    pub fn average_change(&self) -> Precision {
        self.final_average - self.initial_average
    }

    /// Truth that the final state went non-finite, a sign of instability
    pub fn is_unstable(&self) -> bool {
        self.non_finite > 0
    }
}
