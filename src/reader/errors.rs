// romsrs-reader/src/reader/errors.rs

use crate::grid::GridError;
use crate::query::QueryError;
use crate::source::GridSourceError;
use ndarray::ShapeError;
use ndarray_stats::errors::MinMaxError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RomsReaderBuilderError {
    #[error("Unitialized field on RomsReaderBuilder: {0}")]
    UninitializedFieldError(String),
    #[error("Could not open {0}")]
    OpenError(String, #[source] GridSourceError),
    #[error("Cannot open {0}: built without the netcdf feature")]
    NetcdfSupportDisabled(String),
    #[error(transparent)]
    GridError(#[from] GridError),
}

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error(transparent)]
    QueryError(#[from] QueryError),
    #[error("Variable not found in catalog: {0}")]
    UnknownVariable(String),
    #[error("Wrong dimension of variable: {0} has {1} dimensions")]
    UnsupportedDimensionality(String, usize),
    #[error(transparent)]
    GridSourceError(#[from] GridSourceError),
    #[error(transparent)]
    GridError(#[from] GridError),
    #[error("Could not bracket requested depths: {0}")]
    MinMaxError(#[from] MinMaxError),
    #[error(transparent)]
    ShapeError(#[from] ShapeError),
}
