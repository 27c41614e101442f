//! Vertical grid on which the state field is tabulated

use crate::{
    field::{ShapeError, StateFieldView},
    parameters::ParameterError,
    Precision,
};
use ndarray::{Array1, ArrayView1};

/// Fixed 1D grid of evenly spaced points
///
/// Point `i` sits at height `i * spacing`. The grid never changes once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    /// Distance between two consecutive points
    spacing: Precision,

    /// Height of each grid point
    coordinates: Array1<Precision>,
}
//
impl Grid {
    /// Smallest number of points that the flux divergence operator handles
    pub const MIN_POINTS: usize = 3;

    /// Set up a grid of `point_count` points separated by `spacing`
    pub fn new(point_count: usize, spacing: Precision) -> Result<Self, ParameterError> {
        if point_count < Self::MIN_POINTS {
            return Err(ParameterError::TooFewPoints(point_count));
        }
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(ParameterError::InvalidSpacing(spacing));
        }
        let coordinates = Array1::from_shape_fn(point_count, |i| i as Precision * spacing);
        Ok(Self {
            spacing,
            coordinates,
        })
    }

    /// Number of grid points
    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    /// Truth that the grid has no point (never happens for a constructed grid)
    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// Distance between two consecutive points
    pub fn spacing(&self) -> Precision {
        self.spacing
    }

    /// Height of each grid point, in increasing order
    pub fn coordinates(&self) -> ArrayView1<'_, Precision> {
        self.coordinates.view()
    }

    /// Check that a state field has one value per grid point
    pub fn check_field(&self, field: StateFieldView<'_>) -> Result<(), ShapeError> {
        if field.len() == self.len() {
            Ok(())
        } else {
            Err(ShapeError {
                expected: self.len(),
                actual: field.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn coordinates_start_at_zero() {
        let grid = Grid::new(4, 0.5).unwrap();
        assert_eq!(grid.len(), 4);
        assert_eq!(grid.spacing(), 0.5);
        assert_eq!(grid.coordinates(), array![0.0, 0.5, 1.0, 1.5]);
    }

    #[test]
    fn coordinates_strictly_increase() {
        let grid = Grid::new(1000, 0.1).unwrap();
        assert!(grid.coordinates().windows(2).into_iter().all(|w| w[0] < w[1]));
        assert_eq!(grid.coordinates()[999], 999.0 * 0.1);
    }

    #[test]
    fn too_few_points() {
        assert_eq!(Grid::new(2, 1.0), Err(ParameterError::TooFewPoints(2)));
        assert_eq!(Grid::new(0, 1.0), Err(ParameterError::TooFewPoints(0)));
        assert!(Grid::new(3, 1.0).is_ok());
    }

    #[test]
    fn bad_spacing() {
        for spacing in [0.0, -1.0, Precision::INFINITY] {
            assert_eq!(
                Grid::new(10, spacing),
                Err(ParameterError::InvalidSpacing(spacing))
            );
        }
        assert!(matches!(
            Grid::new(10, Precision::NAN),
            Err(ParameterError::InvalidSpacing(_))
        ));
    }

    #[test]
    fn field_length_check() {
        let grid = Grid::new(3, 1.0).unwrap();
        assert_eq!(grid.check_field(array![1.0, 2.0, 3.0].view()), Ok(()));
        assert_eq!(
            grid.check_field(array![1.0, 2.0].view()),
            Err(ShapeError {
                expected: 3,
                actual: 2
            })
        );
    }
}
