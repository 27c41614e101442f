//! Regularized implementation of the threshold-switched diffusion simulation
//!
//! The naive algorithm evaluates coefficient sources on every step, and decides
//! at every point whether it is looking at a boundary. Both are wasteful: the
//! sources only depend on the grid, which does not change, and the boundary
//! formulas are only needed for the two end points of the grid. This version
//! tabulates the sources once, and processes the bulk of the grid and its
//! edges separately.
//!
//! Results are bit-for-bit identical to those of the naive implementation.

use compute::{
    cpu::{self, CpuGrid, SimulateCpu},
    Error, NoArgs, SimulateBase, SimulateCreate,
};
use data::{coefficient::CoefficientTable, grid::Grid, parameters::Parameters, Precision};
use log::debug;
use ndarray::s;

/// Threshold-switched diffusion simulation
#[derive(Debug)]
pub struct Simulation {
    /// Simulation grid
    grid: Grid,

    /// Coefficients of both regimes at each grid point
    table: CoefficientTable,
}
//
impl SimulateBase for Simulation {
    type CliArgs = NoArgs;

    type Error = Error;

    fn grid(&self) -> &Grid {
        &self.grid
    }
}
//
impl SimulateCreate for Simulation {
    fn new(params: Parameters, _args: NoArgs) -> Result<Self, Error> {
        let grid = params.grid()?;
        let table = params.coefficients().tabulate(&grid);
        debug!(
            "Tabulated coefficients on {} points, largest is {}",
            table.len(),
            table.max()
        );
        Ok(Self { grid, table })
    }
}
//
impl SimulateCpu for Simulation {
    fn unchecked_step_impl(&self, grid: CpuGrid<'_, '_>, dt: Precision) {
        let CpuGrid {
            offset,
            input,
            mut output,
            boundaries: [bottom, top],
        } = grid;
        let spacing_squared = self.grid.spacing() * self.grid.spacing();

        // Edges, where no flux crosses the domain boundary
        if bottom {
            let [first, second] = [input[0], input[1]];
            let kappa_second = self.table.select(offset + 1, second);
            let divergence = cpu::bottom_divergence([first, second], kappa_second, spacing_squared);
            output[0] = first + dt * divergence;
        }
        if top {
            let last_in = input.len() - 1;
            let [before_last, last] = [input[last_in - 1], input[last_in]];
            let kappa_before_last = self.table.select(offset + last_in - 1, before_last);
            let divergence =
                cpu::top_divergence([before_last, last], kappa_before_last, spacing_squared);
            let last_out = output.len() - 1;
            output[last_out] = last + dt * divergence;
        }

        // Bulk, where every output point has both neighbors in the input.
        // Whatever the halo, the first bulk point is centered on input[1].
        let bulk_end = output.len() - usize::from(top);
        let bulk = output.slice_mut(s![usize::from(bottom)..bulk_end]);
        for ((out, window), center_idx) in bulk
            .into_iter()
            .zip(input.windows(3))
            .zip(offset + 1..)
        {
            let [prev, center, next] = [window[0], window[1], window[2]];
            let kappa = [
                self.table.select(center_idx, center),
                self.table.select(center_idx + 1, next),
            ];
            let divergence =
                cpu::interior_divergence([prev, center, next], kappa, spacing_squared);
            *out = center + dt * divergence;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compute::Simulate;
    use data::coefficient::CoefficientSource;
    use ndarray::{array, Array1};
    use proptest::prelude::*;

    fn params(point_count: usize, spacing: Precision, threshold: Precision) -> Parameters {
        Parameters {
            point_count,
            spacing,
            above: CoefficientSource::positional(|z| 1.0 + 0.5 * z),
            below: CoefficientSource::Constant(0.1),
            threshold,
        }
    }

    #[test]
    fn reference_step() {
        let sim = Simulation::new(
            Parameters {
                point_count: 5,
                spacing: 1.0,
                above: CoefficientSource::Constant(1.0),
                below: CoefficientSource::Constant(0.1),
                threshold: 0.0,
            },
            NoArgs {},
        )
        .unwrap();
        let theta = array![-2.0, -1.0, 0.0, 1.0, 2.0];
        let new_theta = sim.step(theta.view(), 0.05).unwrap();
        for (actual, expected) in new_theta.iter().zip([-1.995, -1.0, 0.045, 1.0, 1.95]) {
            assert!((actual - expected).abs() < 1e-12, "{actual} != {expected}");
        }
    }

    #[test]
    fn smallest_grid() {
        let params = params(3, 0.5, 0.0);
        let naive = compute_naive::Simulation::new(params.clone(), NoArgs {}).unwrap();
        let regular = Simulation::new(params, NoArgs {}).unwrap();
        let theta = array![1.0, -1.0, 0.5];
        assert_eq!(
            regular.step(theta.view(), 0.01),
            naive.step(theta.view(), 0.01)
        );
    }

    proptest! {
        #[test]
        fn matches_naive(
            theta in proptest::collection::vec(-10.0..10.0f64, 3..64),
            spacing in 0.05..2.0f64,
            threshold in -5.0..5.0f64,
            dt in 0.0..0.01f64,
            steps in 0usize..8,
        ) {
            let params = params(theta.len(), spacing, threshold);
            let naive = compute_naive::Simulation::new(params.clone(), NoArgs {}).unwrap();
            let regular = Simulation::new(params, NoArgs {}).unwrap();
            let theta = Array1::from(theta);
            prop_assert_eq!(
                regular.run(theta.view(), dt, steps).unwrap(),
                naive.run(theta.view(), dt, steps).unwrap()
            );
        }
    }
}
