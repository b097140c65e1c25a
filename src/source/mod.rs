// romsrs-reader/src/source/mod.rs

mod memory;
#[cfg(feature = "netcdf")]
mod netcdf_source;

pub use memory::MemoryGridSource;
#[cfg(feature = "netcdf")]
pub use netcdf_source::NetcdfGridSource;

use ndarray::{ArrayD, ShapeError};
use std::ops::Range;
use thiserror::Error;

/// Read access to the named arrays of one model output dataset.
///
/// Hyperslabs give one half-open range per dimension and come back with
/// exactly that shape, in standard layout.
pub trait GridSource {
    /// Path or other identifier the dataset was opened from.
    fn location(&self) -> &str;

    fn variable_names(&self) -> Vec<String>;

    fn dimension_len(&self, name: &str) -> Option<usize>;

    fn variable_shape(&self, name: &str) -> Result<Vec<usize>, GridSourceError>;

    fn attribute_string(&self, variable: &str, attribute: &str) -> Option<String>;

    fn read_hyperslab(&self, name: &str, slab: &[Range<usize>])
        -> Result<ArrayD<f64>, GridSourceError>;

    fn has_variable(&self, name: &str) -> bool {
        self.variable_shape(name).is_ok()
    }

    fn read_all(&self, name: &str) -> Result<ArrayD<f64>, GridSourceError> {
        let slab: Vec<Range<usize>> = self
            .variable_shape(name)?
            .into_iter()
            .map(|len| 0..len)
            .collect();
        self.read_hyperslab(name, &slab)
    }

    /// First element, for scalar parameters stored as 0-d or length-1 variables.
    fn read_scalar(&self, name: &str) -> Result<f64, GridSourceError> {
        self.read_all(name)?
            .iter()
            .next()
            .cloned()
            .ok_or_else(|| GridSourceError::EmptyVariable(name.to_string()))
    }
}

/// Checks a hyperslab against a variable shape before it is read.
pub(crate) fn validate_hyperslab(
    name: &str,
    shape: &[usize],
    slab: &[Range<usize>],
) -> Result<(), GridSourceError> {
    if shape.len() != slab.len() {
        return Err(GridSourceError::RankMismatch(
            name.to_string(),
            shape.len(),
            slab.len(),
        ));
    }
    for (axis, (range, &len)) in slab.iter().zip(shape).enumerate() {
        if range.start > range.end || range.end > len {
            return Err(GridSourceError::OutOfBounds(
                name.to_string(),
                axis,
                range.clone(),
                len,
            ));
        }
    }
    Ok(())
}

#[derive(Error, Debug)]
pub enum GridSourceError {
    #[error("Could not open {0}: {1}")]
    OpenError(String, String),
    #[error("Variable not found in dataset: {0}")]
    MissingVariable(String),
    #[error("Dimension not found in dataset: {0}")]
    MissingDimension(String),
    #[error("Variable {0} holds no values")]
    EmptyVariable(String),
    #[error("Variable {0} has {1} dimensions but the hyperslab has {2}")]
    RankMismatch(String, usize, usize),
    #[error("Hyperslab {2:?} on axis {1} of variable {0} exceeds its length {3}")]
    OutOfBounds(String, usize, Range<usize>, usize),
    #[error(transparent)]
    ShapeError(#[from] ShapeError),
    #[cfg(feature = "netcdf")]
    #[error("NetCDF error: {0}")]
    NetCDF(#[from] netcdf::Error),
}
