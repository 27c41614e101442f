//! Moving simulation results to and from HDF5 files
//!
//! A file holds the grid coordinates and a `[2, point_count]` dataset whose
//! rows are the initial and final state of a simulation run.

use crate::{
    field::{SimulationResult, StateField},
    grid::Grid,
    Precision,
};
use hdf5::{Dataset, File};
use ndarray::Array1;
use std::path::Path;

pub use hdf5::Result;

/// Name of the dataset holding grid coordinates
const COORDINATES: &str = "coordinates";

/// Common configuration for reading and writing to HDF5 files
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Config<'dsname, FileName: AsRef<Path>> {
    /// Name of the HDF5 file to be accessed
    pub file_name: FileName,

    /// Name of the state dataset within the file
    pub dataset_name: Option<&'dsname str>,
}
//
impl<'dsname, FileName: AsRef<Path>> Config<'dsname, FileName> {
    fn dataset_name(&self) -> &'dsname str {
        self.dataset_name.unwrap_or("profiles")
    }
}

/// Mechanism to write simulation results into an HDF5 file
pub struct Writer {
    /// File handle
    file: File,

    /// Initial and final state
    dataset: Dataset,
}
//
impl Writer {
    /// Create or truncate a file, and record the grid coordinates into it
    pub fn create(config: Config<'_, impl AsRef<Path>>, grid: &Grid) -> Result<Self> {
        let dataset_name = config.dataset_name();
        let file = File::create(config.file_name)?;
        file.new_dataset::<Precision>()
            .shape([grid.len()])
            .create(COORDINATES)?
            .write(grid.coordinates())?;
        let dataset = file
            .new_dataset::<Precision>()
            .shape([2, grid.len()])
            .create(dataset_name)?;
        Ok(Self { file, dataset })
    }

    /// Write down the initial and final state of a simulation run
    pub fn write(&mut self, result: &SimulationResult) -> Result<()> {
        self.dataset.write_slice(result.initial.view(), (0, ..))?;
        self.dataset.write_slice(result.last.view(), (1, ..))?;
        Ok(())
    }

    /// Flush the file to the underlying storage medium and close it
    ///
    /// This should automatically happen on Drop, but doing it manually allows
    /// you to catch and handle errors, instead of letting them lead to panics.
    pub fn close(self) -> Result<()> {
        self.file.close()
    }
}

/// Mechanism to read simulation results back from an HDF5 file
pub struct Reader {
    /// File handle, kept open as long as the dataset is used
    _file: File,

    /// Grid coordinates
    coordinates: Array1<Precision>,

    /// Initial and final state
    dataset: Dataset,
}
//
impl Reader {
    /// Open an existing file
    pub fn open(config: Config<'_, impl AsRef<Path>>) -> Result<Self> {
        let dataset_name = config.dataset_name();
        let file = File::open(config.file_name)?;
        let coordinates = file.dataset(COORDINATES)?.read_1d()?;
        let dataset = file.dataset(dataset_name)?;
        Ok(Self {
            _file: file,
            coordinates,
            dataset,
        })
    }

    /// Height of each grid point
    pub fn coordinates(&self) -> &Array1<Precision> {
        &self.coordinates
    }

    /// Read the initial and final state back
    pub fn read(&self) -> Result<SimulationResult> {
        let initial: StateField = self.dataset.read_slice_1d((0, ..))?;
        let last: StateField = self.dataset.read_slice_1d((1, ..))?;
        Ok(SimulationResult { initial, last })
    }
}
