//! Simulation parameters

use crate::{
    coefficient::{CoefficientSource, Coefficients},
    grid::Grid,
    Precision,
};
use thiserror::Error;

/// Fraction of the explicit stability limit used when picking a time step
pub const DEFAULT_SAFETY_FACTOR: Precision = 0.4;

/// Simulation parameters
#[derive(Clone, Debug)]
pub struct Parameters {
    /// Number of grid points
    pub point_count: usize,

    /// Distance between two consecutive grid points
    pub spacing: Precision,

    /// Diffusion coefficient where the state is above the threshold
    pub above: CoefficientSource,

    /// Diffusion coefficient where the state is at or below the threshold
    pub below: CoefficientSource,

    /// State value that switches between both diffusion coefficients
    pub threshold: Precision,
}
//
impl Default for Parameters {
    fn default() -> Self {
        Self {
            point_count: 1000,
            spacing: 0.1,
            above: CoefficientSource::Constant(1.0),
            below: CoefficientSource::Constant(0.1),
            threshold: 0.0,
        }
    }
}
//
impl Parameters {
    /// Check that the parameters can be used to set up a simulation
    pub fn validate(&self) -> Result<(), ParameterError> {
        self.grid().map(drop)
    }

    /// Check the parameters and build the associated grid
    pub fn grid(&self) -> Result<Grid, ParameterError> {
        Grid::new(self.point_count, self.spacing)
    }

    /// Diffusion coefficient sources and threshold
    pub fn coefficients(&self) -> Coefficients {
        Coefficients {
            above: self.above.clone(),
            below: self.below.clone(),
            threshold: self.threshold,
        }
    }

    /// Largest time step for which explicit integration remains stable
    ///
    /// This is `spacing² / (2 κmax)`, where `κmax` is the largest coefficient
    /// that either source takes on the grid. Infinite if no point diffuses.
    pub fn stability_limit(&self) -> Result<Precision, ParameterError> {
        let grid = self.grid()?;
        let max_coefficient = self.coefficients().tabulate(&grid).max();
        Ok(stability_limit(grid.spacing(), max_coefficient))
    }

    /// Fraction `safety` of the [stability limit](Self::stability_limit)
    pub fn stable_time_step(&self, safety: Precision) -> Result<Precision, ParameterError> {
        Ok(safety * self.stability_limit()?)
    }
}

/// Explicit stability limit for a given grid spacing and largest coefficient
pub fn stability_limit(spacing: Precision, max_coefficient: Precision) -> Precision {
    if max_coefficient > 0.0 {
        0.5 * spacing * spacing / max_coefficient
    } else {
        Precision::INFINITY
    }
}

/// Things that can be wrong with simulation parameters
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum ParameterError {
    /// The flux divergence operator needs at least 3 grid points
    #[error("need at least {min} grid points, got {0}", min = Grid::MIN_POINTS)]
    TooFewPoints(usize),

    /// Grid spacing must be finite and positive
    #[error("grid spacing must be finite and positive, got {0}")]
    InvalidSpacing(Precision),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let params = Parameters::default();
        assert_eq!(params.validate(), Ok(()));
        let grid = params.grid().unwrap();
        assert_eq!(grid.len(), 1000);
        assert_eq!(grid.spacing(), 0.1);

        let coefficients = params.coefficients();
        assert_eq!(coefficients.threshold, 0.0);
        assert_eq!(coefficients.select(1.0, 0.0), 1.0);
        assert_eq!(coefficients.select(0.0, 0.0), 0.1);
    }

    #[test]
    fn invalid_parameters() {
        let params = Parameters {
            point_count: 2,
            ..Default::default()
        };
        assert_eq!(params.validate(), Err(ParameterError::TooFewPoints(2)));
        assert_eq!(params.grid(), Err(ParameterError::TooFewPoints(2)));
        assert_eq!(params.stability_limit(), Err(ParameterError::TooFewPoints(2)));

        let params = Parameters {
            spacing: -0.1,
            ..Default::default()
        };
        assert_eq!(params.grid(), Err(ParameterError::InvalidSpacing(-0.1)));
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ParameterError::TooFewPoints(1).to_string(),
            "need at least 3 grid points, got 1"
        );
        assert_eq!(
            ParameterError::InvalidSpacing(0.0).to_string(),
            "grid spacing must be finite and positive, got 0"
        );
    }

    #[test]
    fn default_time_step() {
        // Matches 0.4 * dz² / (2 * max(kappa_above, kappa_below))
        let params = Parameters::default();
        let expected = 0.4 * (0.1 * 0.1) / (2.0 * 1.0);
        let actual = params.stable_time_step(DEFAULT_SAFETY_FACTOR).unwrap();
        assert!((actual - expected).abs() <= 1e-15);
    }

    #[test]
    fn positional_stability_limit() {
        let params = Parameters {
            point_count: 11,
            spacing: 1.0,
            above: CoefficientSource::Constant(0.5),
            below: CoefficientSource::positional(|z| 0.2 * z),
            threshold: 0.0,
        };
        // Largest coefficient is 0.2 * 10 at the top of the grid
        assert_eq!(params.stability_limit().unwrap(), 0.25);
    }

    #[test]
    fn no_diffusion() {
        assert_eq!(stability_limit(0.1, 0.0), Precision::INFINITY);
        assert_eq!(stability_limit(1.0, 2.0), 0.25);
    }
}
