// romsrs-reader/src/query.rs

use crate::catalog::VariableCatalog;
use crate::grid::Grid;
pub use crate::time::NearestTime;
use chrono::NaiveDateTime;
use ndarray::Array1;
use thiserror::Error;

/// A request for variables at a time and a set of positions.
///
/// `x` and `y` are grid-relative (column, row) coordinates; `z` is depth in
/// meters, 0 at the surface and negative below. An empty `z` means surface
/// and a single `z` applies to every point.
#[derive(Clone, Debug)]
pub struct Query {
    pub variables: Vec<String>,
    pub time: Option<NaiveDateTime>,
    pub x: Array1<f64>,
    pub y: Array1<f64>,
    pub z: Array1<f64>,
    pub block: bool,
}

impl Query {
    pub fn new<S: AsRef<str>>(variables: &[S], x: Array1<f64>, y: Array1<f64>) -> Self {
        Self {
            variables: variables.iter().map(|v| v.as_ref().to_string()).collect(),
            time: None,
            x,
            y,
            z: Array1::zeros(0),
            block: false,
        }
    }

    pub fn time(mut self, time: NaiveDateTime) -> Self {
        self.time = Some(time);
        self
    }

    pub fn z(mut self, z: Array1<f64>) -> Self {
        self.z = z;
        self
    }

    pub fn block(mut self, block: bool) -> Self {
        self.block = block;
        self
    }
}

/// Query after validation: every array has one entry per point.
#[derive(Clone, Debug)]
pub struct NormalizedQuery {
    pub variables: Vec<String>,
    pub time: NaiveDateTime,
    pub x: Array1<f64>,
    pub y: Array1<f64>,
    pub z: Array1<f64>,
    pub outside: Array1<bool>,
}

impl NormalizedQuery {
    pub fn npoints(&self) -> usize {
        self.x.len()
    }
}

/// Validates raw queries against a grid and resolves requested times.
pub trait QueryNormalizer {
    fn check_arguments(
        &self,
        grid: &Grid,
        catalog: &VariableCatalog,
        query: &Query,
    ) -> Result<NormalizedQuery, QueryError>;

    fn nearest_time(&self, grid: &Grid, time: NaiveDateTime) -> NearestTime;
}

/// Flags points outside the horizontal extent and picks the closest time sample.
#[derive(Clone, Copy, Debug, Default)]
pub struct DomainNormalizer;

impl QueryNormalizer for DomainNormalizer {
    fn check_arguments(
        &self,
        grid: &Grid,
        catalog: &VariableCatalog,
        query: &Query,
    ) -> Result<NormalizedQuery, QueryError> {
        for name in &query.variables {
            if !catalog.contains(name) {
                return Err(QueryError::UnknownVariable(name.clone()));
            }
        }
        let npoints = query.x.len();
        if npoints == 0 {
            return Err(QueryError::EmptyQuery);
        }
        if query.y.len() != npoints {
            return Err(QueryError::LengthMismatch("y", query.y.len(), npoints));
        }
        let z = match query.z.len() {
            0 => Array1::zeros(npoints),
            1 => Array1::from_elem(npoints, query.z[0]),
            n if n == npoints => query.z.clone(),
            n => return Err(QueryError::LengthMismatch("z", n, npoints)),
        };
        let extent = grid.extent();
        let outside = query
            .x
            .iter()
            .zip(query.y.iter())
            .map(|(&x, &y)| !extent.contains(x, y))
            .collect();
        Ok(NormalizedQuery {
            variables: query.variables.clone(),
            time: query.time.unwrap_or_else(|| grid.times().start_time()),
            x: query.x.clone(),
            y: query.y.clone(),
            z,
            outside,
        })
    }

    fn nearest_time(&self, grid: &Grid, time: NaiveDateTime) -> NearestTime {
        grid.times().nearest(time)
    }
}

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Variable not available from this reader: {0}")]
    UnknownVariable(String),
    #[error("Query has no points")]
    EmptyQuery,
    #[error("Query {0} has {1} values but x has {2}")]
    LengthMismatch(&'static str, usize, usize),
}
