//! Data format used by the threshold-switched diffusion simulation

pub mod coefficient;
pub mod diagnostics;
pub mod field;
pub mod grid;
#[cfg(feature = "hdf5")]
pub mod hdf5;
pub mod parameters;

/// Computation precision
pub type Precision = f64;
