// romsrs-reader/src/grid/mod.rs

mod discovery;
mod extent;

pub use discovery::GridError;
pub use extent::HorizontalExtent;

use crate::source::GridSource;
use crate::time::TimeAxis;
use crate::transforms::{StretchingParams, TransformFamily, ZProfiles};
use log::debug;
use ndarray::{Array1, Array2, Ix2};
use std::fmt;

/// Static description of one ROMS dataset, fixed when the dataset is opened.
#[derive(Clone, Debug)]
pub struct Grid {
    lon: Array2<f64>,
    lat: Array2<f64>,
    angle: Array2<f64>,
    sigma: Array1<f64>,
    transform: TransformFamily,
    stretching: StretchingParams,
    extent: HorizontalExtent,
    times: TimeAxis,
    // read on the first query below the surface
    sea_floor_depth: Option<Array2<f64>>,
}

impl Grid {
    pub fn lon(&self) -> &Array2<f64> {
        &self.lon
    }

    pub fn lat(&self) -> &Array2<f64> {
        &self.lat
    }

    /// Rotation from grid x to true east, radians.
    pub fn angle(&self) -> &Array2<f64> {
        &self.angle
    }

    /// Layer centers, bottom (-1) to surface (0).
    pub fn sigma(&self) -> &Array1<f64> {
        &self.sigma
    }

    pub fn num_layers(&self) -> usize {
        self.sigma.len()
    }

    pub fn surface_layer(&self) -> usize {
        self.sigma.len() - 1
    }

    pub fn transform(&self) -> TransformFamily {
        self.transform
    }

    pub fn stretching(&self) -> &StretchingParams {
        &self.stretching
    }

    pub fn extent(&self) -> &HorizontalExtent {
        &self.extent
    }

    pub fn times(&self) -> &TimeAxis {
        &self.times
    }

    pub fn is_sea_floor_depth_cached(&self) -> bool {
        self.sea_floor_depth.is_some()
    }

    /// Bottom depth per column, read from `h` once and kept for the grid's lifetime.
    pub fn sea_floor_depth(&mut self, source: &dyn GridSource) -> Result<&Array2<f64>, GridError> {
        let depth = match self.sea_floor_depth.take() {
            Some(depth) => depth,
            None => {
                debug!("Reading sea floor depth...");
                source.read_all("h")?.into_dimensionality::<Ix2>()?
            }
        };
        Ok(&*self.sea_floor_depth.insert(depth))
    }

    /// Layer-center depths below the given columns.
    pub fn z_profiles(&self, depths: &Array1<f64>) -> ZProfiles {
        self.transform
            .z_profiles(depths, &self.sigma, &self.stretching)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>16}: {} x {} (eta x xi)\n", "grid", self.extent.nrows(), self.extent.ncols())?;
        write!(f, "{:>16}: {}\n", "layers", self.num_layers())?;
        write!(f, "{:>16}: {}\n", "transform", self.transform)?;
        write!(
            f,
            "{:>16}: theta_s = {}, theta_b = {}, Tcline = {}\n",
            "stretching", self.stretching.theta_s, self.stretching.theta_b, self.stretching.tcline
        )?;
        write!(f, "{:>16}: {}\n", "time", self.times)
    }
}
