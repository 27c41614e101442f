//! Facilities that are specific to CPU implementations

use crate::{Error, Simulate, SimulateBase};
use data::{
    field::{Evolving, StateFieldView},
    Precision,
};
use log::trace;
use ndarray::{s, Array1, ArrayView1, ArrayViewMut1, Axis, Zip};

/// Simplified version of Simulate that simulates a single time step at a time
///
/// If you implement this, then a [`Simulate`] implementation that loops while
/// flipping the state arrays will be automatically provided.
pub trait SimulateStep: SimulateBase {
    /// Perform a single simulation time step
    ///
    /// At the end of the step, the output state of `field` contains the new
    /// state. It is the job of the caller to flip the states if they want the
    /// result to be their input.
    fn perform_step(&self, field: &mut Evolving, dt: Precision) -> Result<(), Self::Error>;
}
//
impl<T: SimulateStep> Simulate for T {
    fn perform_steps(
        &self,
        field: &mut Evolving,
        dt: Precision,
        steps: usize,
    ) -> Result<(), Self::Error> {
        self.grid()
            .check_field(field.input().view())
            .map_err(Error::from)?;
        trace!("Performing {steps} steps with dt = {dt}");
        for _ in 0..steps {
            self.perform_step(field, dt)?;
            field.flip();
        }
        Ok(())
    }
}

/// Lower-level grid-based interface to a CPU compute backend
///
/// Backends that implement this can process any contiguous subset of the
/// grid, which is what the parallel backend builds upon to slice each time
/// step into independent sub-computations.
///
/// If you implement this, then `Simulate` will be implemented automatically
pub trait SimulateCpu: SimulateBase {
    /// Perform one simulation time step on the full grid or a subset thereof
    ///
    /// This method does not check the grid for consistency, but is used to
    /// implement `step_impl` that does perform some sanity checks.
    fn unchecked_step_impl(&self, grid: CpuGrid<'_, '_>, dt: Precision);

    /// Check that the CpuGrid seems correct
    ///
    /// Note that full correctness checking would involve making sure that the
    /// input and output array views point to the same region of the full grid,
    /// which cannot be done. Therefore, this is only a partial sanity check.
    fn check_grid(grid: &CpuGrid<'_, '_>) {
        let [halo_start, halo_end] = grid.halo();
        debug_assert!(!grid.output.is_empty());
        debug_assert_eq!(grid.input.len(), grid.output.len() + halo_start + halo_end);
        debug_assert!(grid.input.len() >= 2);
    }

    /// Like `unchecked_step_impl()`, but with some sanity checks
    #[inline]
    fn step_impl(&self, grid: CpuGrid<'_, '_>, dt: Precision) {
        Self::check_grid(&grid);
        self.unchecked_step_impl(grid, dt);
    }

    /// Count the number of state values which `step_impl()` would manipulate
    #[inline]
    fn grid_len(grid: &CpuGrid<'_, '_>) -> usize {
        Self::check_grid(grid);
        grid.input.len() + grid.output.len()
    }

    /// Split the grid on which `step_impl()` operates into two halves
    #[inline]
    fn split_grid<'input, 'output>(
        grid: CpuGrid<'input, 'output>,
    ) -> [CpuGrid<'input, 'output>; 2] {
        Self::check_grid(&grid);
        let split_point = grid.output.len() / 2;
        grid.split(split_point)
    }
}
//
impl<T: SimulateCpu> SimulateStep for T {
    fn perform_step(&self, field: &mut Evolving, dt: Precision) -> Result<(), Self::Error> {
        let (input, output) = field.in_out();
        self.step_impl(CpuGrid::new(input.view(), output.view_mut()), dt);
        Ok(())
    }
}

/// Low-level representation of the simulation grid used by SimulateCpu
///
/// The output covers a contiguous range of grid points. The input covers the
/// same range, extended by one neighbor on each side that is not a domain
/// boundary: output point `i` matches input point `i + halo()[0]`.
#[derive(Debug)]
pub struct CpuGrid<'input, 'output> {
    /// Index of the first input point within the full grid
    pub offset: usize,

    /// Input state of the output points and their neighbors
    pub input: StateFieldView<'input>,

    /// Output state
    pub output: ArrayViewMut1<'output, Precision>,

    /// Truth that the output starts at the bottom / ends at the top of the grid
    pub boundaries: [bool; 2],
}
//
impl<'input, 'output> CpuGrid<'input, 'output> {
    /// Full grid, from the input and output state of a simulation step
    pub fn new(
        input: StateFieldView<'input>,
        output: ArrayViewMut1<'output, Precision>,
    ) -> Self {
        assert_eq!(input.len(), output.len(), "input and output should match");
        Self {
            offset: 0,
            input,
            output,
            boundaries: [true, true],
        }
    }

    /// Number of input points before and after the points being updated
    pub fn halo(&self) -> [usize; 2] {
        self.boundaries.map(|boundary| usize::from(!boundary))
    }

    /// Split the grid into the output points before `at` and those after it
    ///
    /// Both halves keep the input neighbors they need.
    pub fn split(self, at: usize) -> [Self; 2] {
        let Self {
            offset,
            input,
            output,
            boundaries: [bottom, top],
        } = self;
        assert!(
            at > 0 && at < output.len(),
            "split point should leave output points on both sides"
        );

        // Splitting the output slice is easy
        let (output_1, output_2) = output.split_at(Axis(0), at);

        // On the input side, we must mind the neighbors
        let input_split_point = at + usize::from(!bottom);
        let input_1 = input.slice_move(s![..input_split_point + 1]);
        let input_2 = input.slice_move(s![input_split_point - 1..]);
        [
            Self {
                offset,
                input: input_1,
                output: output_1,
                boundaries: [bottom, false],
            },
            Self {
                offset: offset + input_split_point - 1,
                input: input_2,
                output: output_2,
                boundaries: [false, top],
            },
        ]
    }
}

/// Flux divergence at a point that has neighbors on both sides
///
/// The flux from `prev` to `center` uses the coefficient at `center`, and the
/// flux from `center` to `next` uses the coefficient at `next`.
#[inline(always)]
pub fn interior_divergence(
    [prev, center, next]: [Precision; 3],
    [kappa_center, kappa_next]: [Precision; 2],
    spacing_squared: Precision,
) -> Precision {
    (kappa_next * (next - center) - kappa_center * (center - prev)) / spacing_squared
}

/// Flux divergence at the bottom of the grid, with no flux through it
#[inline(always)]
pub fn bottom_divergence(
    [first, second]: [Precision; 2],
    kappa_second: Precision,
    spacing_squared: Precision,
) -> Precision {
    (kappa_second * (second - first)) / spacing_squared
}

/// Flux divergence at the top of the grid, with no flux through it
#[inline(always)]
pub fn top_divergence(
    [before_last, last]: [Precision; 2],
    kappa_before_last: Precision,
    spacing_squared: Precision,
) -> Precision {
    (-kappa_before_last * (last - before_last)) / spacing_squared
}

/// Apply the flux divergence operator to a [`CpuGrid`]-shaped window
///
/// `theta` and `kappa` are the state and diffusion coefficients of the input
/// points, `boundaries` tells which ends of `out` are domain boundaries.
pub fn flux_divergence_into(
    theta: ArrayView1<'_, Precision>,
    kappa: ArrayView1<'_, Precision>,
    spacing: Precision,
    boundaries: [bool; 2],
    mut out: ArrayViewMut1<'_, Precision>,
) {
    let halo_start = usize::from(!boundaries[0]);
    debug_assert_eq!(theta.len(), kappa.len());
    debug_assert_eq!(
        theta.len(),
        out.len() + halo_start + usize::from(!boundaries[1])
    );
    let spacing_squared = spacing * spacing;
    let last = out.len() - 1;
    for (idx, out) in out.iter_mut().enumerate() {
        let center = idx + halo_start;
        *out = if idx == 0 && boundaries[0] {
            bottom_divergence(
                [theta[center], theta[center + 1]],
                kappa[center + 1],
                spacing_squared,
            )
        } else if idx == last && boundaries[1] {
            top_divergence(
                [theta[center - 1], theta[center]],
                kappa[center - 1],
                spacing_squared,
            )
        } else {
            interior_divergence(
                [theta[center - 1], theta[center], theta[center + 1]],
                [kappa[center], kappa[center + 1]],
                spacing_squared,
            )
        };
    }
}

/// Apply the flux divergence operator to a full state field
///
/// `kappa` holds the diffusion coefficient of each point of `theta`.
///
/// # Panics
///
/// If `theta` and `kappa` have different lengths, or fewer than 3 points.
pub fn flux_divergence(
    theta: ArrayView1<'_, Precision>,
    kappa: ArrayView1<'_, Precision>,
    spacing: Precision,
) -> Array1<Precision> {
    assert_eq!(theta.len(), kappa.len(), "state and coefficients should be aligned");
    assert!(theta.len() >= 3, "flux divergence needs at least 3 points");
    let mut out = Array1::zeros(theta.len());
    flux_divergence_into(theta, kappa, spacing, [true, true], out.view_mut());
    out
}

/// Turn a flux divergence into the explicitly updated state, in place
///
/// `state` is the state at the points where `divergence` was computed.
#[inline]
pub fn explicit_update(
    state: ArrayView1<'_, Precision>,
    divergence: ArrayViewMut1<'_, Precision>,
    dt: Precision,
) {
    Zip::from(divergence)
        .and(state)
        .for_each(|out, &theta| *out = theta + dt * *out);
}
