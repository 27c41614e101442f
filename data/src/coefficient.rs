//! State-dependent diffusion coefficients
//!
//! The diffusion coefficient at a grid point is picked from one of two
//! sources, depending on whether the local state lies strictly above a
//! threshold. Each source is either a constant or a profile of height.

use crate::{field::StateFieldView, grid::Grid, Precision};
use ndarray::{Array1, ArrayView1, Zip};
use std::{fmt, sync::Arc};

/// Diffusion coefficient as a function of height
pub type Profile = Arc<dyn Fn(Precision) -> Precision + Send + Sync>;

/// Where the diffusion coefficient values of one regime come from
#[derive(Clone)]
pub enum CoefficientSource {
    /// Same coefficient at every height
    Constant(Precision),

    /// Coefficient that varies with height
    Positional(Profile),
}
//
impl CoefficientSource {
    /// Wrap a height profile into a coefficient source
    pub fn positional(profile: impl Fn(Precision) -> Precision + Send + Sync + 'static) -> Self {
        Self::Positional(Arc::new(profile))
    }

    /// Coefficient at height `z`
    ///
    /// Non-finite profile outputs are passed through as-is.
    #[inline]
    pub fn evaluate(&self, z: Precision) -> Precision {
        match self {
            Self::Constant(value) => *value,
            Self::Positional(profile) => profile(z),
        }
    }

    /// Evaluate this source at every point of a grid
    pub fn tabulate(&self, grid: &Grid) -> Array1<Precision> {
        grid.coordinates().mapv(|z| self.evaluate(z))
    }
}
//
impl From<Precision> for CoefficientSource {
    fn from(value: Precision) -> Self {
        Self::Constant(value)
    }
}
//
impl fmt::Debug for CoefficientSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::Positional(_) => f.write_str("Positional(..)"),
        }
    }
}

/// Coefficient sources of both regimes and the threshold between them
#[derive(Clone, Debug)]
pub struct Coefficients {
    /// Source used where the state is strictly above `threshold`
    pub above: CoefficientSource,

    /// Source used where the state is at or below `threshold`
    pub below: CoefficientSource,

    /// State value that separates both regimes
    pub threshold: Precision,
}
//
impl Coefficients {
    /// Coefficient at a point of state `theta` and height `z`
    ///
    /// A state equal to the threshold selects the `below` source.
    #[inline]
    pub fn select(&self, theta: Precision, z: Precision) -> Precision {
        if theta > self.threshold {
            self.above.evaluate(z)
        } else {
            self.below.evaluate(z)
        }
    }

    /// Evaluate the coefficient field associated with a state field
    ///
    /// `theta` and `coordinates` must have the same length, and the result is
    /// aligned with them index for index.
    pub fn field(
        &self,
        theta: StateFieldView<'_>,
        coordinates: ArrayView1<'_, Precision>,
    ) -> Array1<Precision> {
        assert_eq!(
            theta.len(),
            coordinates.len(),
            "state and coordinates should be aligned"
        );
        Zip::from(&theta)
            .and(&coordinates)
            .map_collect(|&theta, &z| self.select(theta, z))
    }

    /// Tabulate both sources on a grid, for repeated use on that grid
    pub fn tabulate(&self, grid: &Grid) -> CoefficientTable {
        CoefficientTable {
            above: self.above.tabulate(grid),
            below: self.below.tabulate(grid),
            threshold: self.threshold,
        }
    }
}

/// Coefficient sources evaluated once and for all on a fixed grid
///
/// Gives the same coefficients as [`Coefficients::select()`], without
/// re-evaluating position-dependent profiles on every simulation step.
#[derive(Clone, Debug, PartialEq)]
pub struct CoefficientTable {
    /// Coefficients above the threshold, one per grid point
    above: Array1<Precision>,

    /// Coefficients at or below the threshold, one per grid point
    below: Array1<Precision>,

    /// State value that separates both regimes
    threshold: Precision,
}
//
impl CoefficientTable {
    /// Coefficient at grid point `index` for a local state `theta`
    #[inline]
    pub fn select(&self, index: usize, theta: Precision) -> Precision {
        if theta > self.threshold {
            self.above[index]
        } else {
            self.below[index]
        }
    }

    /// Number of grid points covered by the table
    pub fn len(&self) -> usize {
        self.above.len()
    }

    /// Truth that the table covers no grid point
    pub fn is_empty(&self) -> bool {
        self.above.is_empty()
    }

    /// Largest coefficient that either regime can produce on the grid
    ///
    /// NaN entries are ignored. Returns negative infinity for an empty table.
    pub fn max(&self) -> Precision {
        self.above
            .iter()
            .chain(self.below.iter())
            .copied()
            .fold(Precision::NEG_INFINITY, Precision::max)
    }
}
