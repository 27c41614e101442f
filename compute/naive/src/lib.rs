//! Naive implementation of the threshold-switched diffusion simulation
//!
//! This version follows the textbook description of the numerical scheme. On
//! every step, the coefficient field is evaluated from the coefficient sources,
//! then the flux divergence operator is applied to the state, and the result is
//! used for a forward Euler update. It is slow, but easy to check, which makes
//! it the reference that faster backends are compared against.

use compute::{
    cpu::{self, CpuGrid, SimulateCpu},
    Error, NoArgs, SimulateBase, SimulateCreate,
};
use data::{coefficient::Coefficients, grid::Grid, parameters::Parameters, Precision};
use log::debug;
use ndarray::s;

/// Threshold-switched diffusion simulation
#[derive(Debug)]
pub struct Simulation {
    /// Simulation grid
    grid: Grid,

    /// Diffusion coefficient sources and threshold
    coefficients: Coefficients,
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
        let coefficients = params.coefficients();
        debug!(
            "Set up naive simulation with {} points spaced by {} and coefficients {coefficients:?}",
            grid.len(),
            grid.spacing(),
        );
        Ok(Self { grid, coefficients })
    }
}
//
impl SimulateCpu for Simulation {
    fn unchecked_step_impl(&self, grid: CpuGrid<'_, '_>, dt: Precision) {
        let [halo_start, halo_end] = grid.halo();
        let CpuGrid {
            offset,
            input,
            mut output,
            boundaries,
        } = grid;

        // Evaluate the diffusion coefficients at the input points
        let coordinates = (self.grid.coordinates()).slice_move(s![offset..offset + input.len()]);
        let kappa = self.coefficients.field(input, coordinates);

        // Compute the flux divergence, then turn it into the new state
        cpu::flux_divergence_into(
            input,
            kappa.view(),
            self.grid.spacing(),
            boundaries,
            output.view_mut(),
        );
        let center = input.slice_move(s![halo_start..input.len() - halo_end]);
        cpu::explicit_update(center, output, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compute::Simulate;
    use data::{
        coefficient::CoefficientSource,
        diagnostics,
        field::{InitialCondition, ShapeError},
        parameters::{ParameterError, DEFAULT_SAFETY_FACTOR},
    };
    use ndarray::{array, Array1};
    use proptest::prelude::*;

    fn reference_simulation() -> Simulation {
        Simulation::new(
            Parameters {
                point_count: 5,
                spacing: 1.0,
                above: CoefficientSource::Constant(1.0),
                below: CoefficientSource::Constant(0.1),
                threshold: 0.0,
            },
            NoArgs {},
        )
        .unwrap()
    }

    #[test]
    fn reference_step() {
        let sim = reference_simulation();
        let theta = array![-2.0, -1.0, 0.0, 1.0, 2.0];
        let dt = 0.05;

        // Coefficients are [0.1, 0.1, 0.1, 1.0, 1.0]: theta = 0 is not above 0
        let divergence = [
            0.1 * (-1.0 - -2.0),
            0.1 * (0.0 - -1.0) - 0.1 * (-1.0 - -2.0),
            1.0 * (1.0 - 0.0) - 0.1 * (0.0 - -1.0),
            1.0 * (2.0 - 1.0) - 1.0 * (1.0 - 0.0),
            -1.0 * (2.0 - 1.0),
        ];
        let expected = Array1::from_iter(
            theta
                .iter()
                .zip(divergence)
                .map(|(theta, divergence)| theta + dt * divergence),
        );
        assert_eq!(sim.step(theta.view(), dt), Ok(expected));

        let approx = [-1.995, -1.0, 0.045, 1.0, 1.95];
        let actual = sim.step(theta.view(), dt).unwrap();
        for (actual, approx) in actual.iter().zip(approx) {
            assert!((actual - approx).abs() < 1e-12, "{actual} != {approx}");
        }
    }

    #[test]
    fn zero_steps() {
        let sim = reference_simulation();
        let initial = array![0.3, -1.7, 2.2, 0.0, 5.5];
        let result = sim.run(initial.view(), 0.1, 0).unwrap();
        assert_eq!(result.initial, initial);
        assert_eq!(result.last, initial);
    }

    #[test]
    fn run_chains_steps() {
        let sim = reference_simulation();
        let initial = array![-2.0, -1.0, 0.5, 1.0, 2.0];
        let dt = 0.1;
        let mut expected = initial.clone();
        for _ in 0..3 {
            expected = sim.step(expected.view(), dt).unwrap();
        }
        let result = sim.run(initial.view(), dt, 3).unwrap();
        assert_eq!(result.initial, initial);
        assert_eq!(result.last, expected);
    }

    #[test]
    fn positional_coefficients() {
        let params = Parameters {
            point_count: 6,
            spacing: 0.5,
            above: CoefficientSource::positional(|z| 1.0 + z),
            below: CoefficientSource::positional(|z| 0.1 * (1.0 + z)),
            threshold: 0.25,
        };
        let grid = params.grid().unwrap();
        let coefficients = params.coefficients();
        let sim = Simulation::new(params, NoArgs {}).unwrap();

        let theta = array![1.0, -0.5, 0.25, 0.75, 0.0, 2.0];
        let dt = 0.01;
        let kappa = coefficients.field(theta.view(), grid.coordinates());
        let expected = &theta + &(cpu::flux_divergence(theta.view(), kappa.view(), 0.5) * dt);
        assert_eq!(sim.step(theta.view(), dt), Ok(expected));
    }

    #[test]
    fn invalid_parameters() {
        let result = Simulation::new(
            Parameters {
                point_count: 2,
                ..Parameters::default()
            },
            NoArgs {},
        );
        assert_eq!(
            result.unwrap_err(),
            Error::Parameters(ParameterError::TooFewPoints(2))
        );

        let result = Simulation::new(
            Parameters {
                spacing: 0.0,
                ..Parameters::default()
            },
            NoArgs {},
        );
        assert_eq!(
            result.unwrap_err(),
            Error::Parameters(ParameterError::InvalidSpacing(0.0))
        );
    }

    #[test]
    fn mismatched_state() {
        let sim = reference_simulation();
        let theta = array![0.0, 1.0, 2.0];
        let expected = Error::Shape(ShapeError {
            expected: 5,
            actual: 3,
        });
        assert_eq!(sim.step(theta.view(), 0.1), Err(expected));
        assert_eq!(sim.run(theta.view(), 0.1, 10), Err(expected));
    }

    #[test]
    fn stability_boundary() {
        let params = Parameters {
            point_count: 41,
            spacing: 0.1,
            above: CoefficientSource::Constant(1.0),
            below: CoefficientSource::Constant(1.0),
            threshold: 0.5,
        };
        let limit = params.stability_limit().unwrap();
        assert!((limit - 0.005).abs() < 1e-15);
        let initial = InitialCondition::Step {
            low: 0.0,
            high: 1.0,
        }
        .make(&params.grid().unwrap());
        let sim = Simulation::new(params, NoArgs {}).unwrap();

        let stable = sim
            .run(initial.view(), DEFAULT_SAFETY_FACTOR * limit, 2000)
            .unwrap();
        let [min, max] = diagnostics::range(stable.last.view());
        assert_eq!(diagnostics::count_non_finite(stable.last.view()), 0);
        assert!(min >= -1e-12 && max <= 1.0 + 1e-12);

        let unstable = sim.run(initial.view(), 1.5 * limit, 2000).unwrap();
        let non_finite = diagnostics::count_non_finite(unstable.last.view());
        let growth = diagnostics::max_abs_change(unstable.initial.view(), unstable.last.view());
        assert!(non_finite > 0 || growth > 1e6);
    }

    #[test]
    fn non_finite_coefficients_propagate() {
        let sim = Simulation::new(
            Parameters {
                point_count: 4,
                spacing: 1.0,
                above: CoefficientSource::positional(|_| Precision::NAN),
                below: CoefficientSource::Constant(0.1),
                threshold: 0.0,
            },
            NoArgs {},
        )
        .unwrap();
        let theta = array![-1.0, -1.0, 1.0, 1.0];
        let result = sim.step(theta.view(), 0.1).unwrap();

        // The bottom point only sees the coefficient of its upper neighbor,
        // which is finite and multiplies a zero gradient
        assert_eq!(result[0], -1.0);
        assert!(result.slice(s![1..]).iter().all(|value| value.is_nan()));
        assert_eq!(diagnostics::count_non_finite(result.view()), 3);
    }

    proptest! {
        #[test]
        fn linear_in_dt(
            theta in proptest::collection::vec(-10.0..10.0f64, 5),
            dt in 1e-4..1e-1f64,
        ) {
            let sim = reference_simulation();
            let theta = Array1::from(theta);
            let single = sim.step(theta.view(), dt).unwrap() - &theta;
            let triple = sim.step(theta.view(), 3.0 * dt).unwrap() - &theta;
            for (single, triple) in single.iter().zip(&triple) {
                let scale = single.abs().max(triple.abs());
                prop_assert!((3.0 * single - triple).abs() <= 1e-9 * scale + 1e-12);
            }
        }

        #[test]
        fn uniform_state_is_steady(value in -100.0..100.0f64, dt in 0.0..10.0f64) {
            let sim = reference_simulation();
            let theta = Array1::from_elem(5, value);
            prop_assert_eq!(sim.step(theta.view(), dt).unwrap(), theta);
        }
    }
}
