// romsrs-reader/src/grid/discovery.rs

use super::{Grid, HorizontalExtent};
use crate::source::{GridSource, GridSourceError};
use crate::time::{TimeAxis, TimeAxisError, TimeUnits, DEFAULT_TIME_UNITS};
use crate::transforms::{synthesize_sigma, StretchingParams, TransformFamily};
use log::{debug, info, warn};
use ndarray::{Array1, Array2, Ix2, ShapeError};
use thiserror::Error;

impl Grid {
    /// Reads the grid description of a ROMS native output dataset.
    ///
    /// Only the coordinates and the time axis are required; missing vertical
    /// metadata falls back to defaults with a warning.
    pub fn from_source(source: &dyn GridSource) -> Result<Self, GridError> {
        let sigma = read_sigma(source)?;
        let transform = read_transform_family(source);
        let stretching = read_stretching_params(source);

        let lat = read_2d(source, "lat_rho")?;
        let lon = read_2d(source, "lon_rho")?;
        let angle = match read_2d(source, "angle") {
            Ok(angle) => angle,
            Err(e) => {
                warn!("Grid angle not available ({}), assuming grid x points east", e);
                Array2::zeros(lon.raw_dim())
            }
        };
        let extent = read_extent(source, &lon);
        let times = read_time_axis(source)?;

        info!(
            "Grid of {} x {} columns with {} layers, {}",
            extent.nrows(),
            extent.ncols(),
            sigma.len(),
            transform
        );

        Ok(Self {
            lon,
            lat,
            angle,
            sigma,
            transform,
            stretching,
            extent,
            times,
            sea_floor_depth: None,
        })
    }
}

/// Layer centers from `s_rho`, or synthesized from the `s_rho` dimension length.
pub(crate) fn read_sigma(source: &dyn GridSource) -> Result<Array1<f64>, GridError> {
    match source.read_all("s_rho") {
        Ok(values) if values.len() > 0 => return Ok(values.iter().cloned().collect()),
        Ok(_) => debug!("s_rho holds no values"),
        Err(e) => debug!("s_rho not readable: {}", e),
    }
    match source.dimension_len("s_rho") {
        Some(num_sigma) if num_sigma > 0 => {
            warn!(
                "s_rho not available in dataset, constructing from number of layers ({}).",
                num_sigma
            );
            Ok(synthesize_sigma(num_sigma))
        }
        _ => Err(GridError::MissingLayerCount(source.location().to_string())),
    }
}

pub(crate) fn read_transform_family(source: &dyn GridSource) -> TransformFamily {
    let vtransform = source.read_scalar("Vtransform");
    let vstretching = source.read_scalar("Vstretching");
    match (vtransform, vstretching) {
        (Ok(vtransform), Ok(vstretching)) => {
            let family = match (as_flag(vtransform), as_flag(vstretching)) {
                (Some(vtransform), Some(vstretching)) => {
                    TransformFamily::from_params(vtransform, vstretching)
                }
                _ => None,
            };
            family.unwrap_or_else(|| {
                warn!(
                    "Sigma-coordinate transformation unknown for Vtransform = {} and Vstretching = {}. Defaulting to {}",
                    vtransform,
                    vstretching,
                    TransformFamily::default()
                );
                TransformFamily::default()
            })
        }
        _ => {
            warn!(
                "Sigma-information not available, defaulting to {}",
                TransformFamily::default()
            );
            TransformFamily::default()
        }
    }
}

/// Integral flag values only; 2.4 is not Vtransform = 2.
fn as_flag(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.).then_some(value as i64)
}

pub(crate) fn read_stretching_params(source: &dyn GridSource) -> StretchingParams {
    let params = (|| -> Result<StretchingParams, GridSourceError> {
        Ok(StretchingParams {
            theta_s: source.read_scalar("theta_s")?,
            theta_b: source.read_scalar("theta_b")?,
            tcline: source.read_scalar("Tcline")?,
        })
    })();
    params.unwrap_or_else(|e| {
        let defaults = StretchingParams::default();
        warn!(
            "Missing sigma stretching parameters ({}), using theta_s = {}, theta_b = {}, Tcline = {}",
            e, defaults.theta_s, defaults.theta_b, defaults.tcline
        );
        defaults
    })
}

fn read_2d(source: &dyn GridSource, name: &str) -> Result<Array2<f64>, GridError> {
    Ok(source.read_all(name)?.into_dimensionality::<Ix2>()?)
}

fn read_extent(source: &dyn GridSource, lon: &Array2<f64>) -> HorizontalExtent {
    let nrows = source.dimension_len("eta_rho").unwrap_or_else(|| lon.nrows());
    let ncols = source.dimension_len("xi_rho").unwrap_or_else(|| lon.ncols());
    HorizontalExtent::unprojected(nrows, ncols)
}

fn read_time_axis(source: &dyn GridSource) -> Result<TimeAxis, GridError> {
    let values: Vec<f64> = source.read_all("ocean_time")?.iter().cloned().collect();
    let units = match source.attribute_string("ocean_time", "units") {
        Some(units) => TimeUnits::parse(&units).unwrap_or_else(|e| {
            warn!("Could not decode ocean_time units ({}), assuming '{}'", e, DEFAULT_TIME_UNITS);
            TimeUnits::default()
        }),
        None => {
            warn!("ocean_time has no units, assuming '{}'", DEFAULT_TIME_UNITS);
            TimeUnits::default()
        }
    };
    Ok(TimeAxis::decode(&values, &units)?)
}

#[derive(Error, Debug)]
pub enum GridError {
    #[error(transparent)]
    GridSourceError(#[from] GridSourceError),
    #[error("Number of sigma layers unknown: {0} has neither s_rho values nor an s_rho dimension")]
    MissingLayerCount(String),
    #[error(transparent)]
    ShapeError(#[from] ShapeError),
    #[error(transparent)]
    TimeAxisError(#[from] TimeAxisError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryGridSource;
    use ndarray::{arr1, Array3};

    fn minimal_source() -> MemoryGridSource {
        let mut source = MemoryGridSource::new("minimal");
        source
            .dimension("s_rho", 4)
            .dimension("eta_rho", 3)
            .dimension("xi_rho", 5)
            .variable("lat_rho", Array2::from_elem((3, 5), 60.))
            .variable("lon_rho", Array2::from_elem((3, 5), 5.))
            .variable("ocean_time", arr1(&[0., 3600.]))
            .attribute("ocean_time", "units", "seconds since 2020-01-01 00:00:00");
        source
    }

    #[test]
    fn test_defaults_when_vertical_metadata_is_missing() {
        let grid = Grid::from_source(&minimal_source()).unwrap();
        assert_eq!(grid.sigma(), &synthesize_sigma(4));
        assert_eq!(grid.transform(), TransformFamily::SongHaidvogel1994);
        assert_eq!(grid.stretching(), &StretchingParams::default());
        assert_eq!(grid.angle(), &Array2::<f64>::zeros((3, 5)));
        assert_eq!(grid.extent().xmax, 4.);
        assert_eq!(grid.extent().ymax, 2.);
        assert!(!grid.is_sea_floor_depth_cached());
    }

    #[test]
    fn test_explicit_vertical_metadata() {
        let mut source = minimal_source();
        source
            .variable("s_rho", arr1(&[-0.8, -0.4, -0.2, -0.05]))
            .variable("Vtransform", arr1(&[2.]))
            .variable("Vstretching", arr1(&[4.]))
            .variable("theta_s", arr1(&[7.]))
            .variable("theta_b", arr1(&[0.1]))
            .variable("Tcline", arr1(&[250.]));
        let grid = Grid::from_source(&source).unwrap();
        assert_eq!(grid.sigma(), &arr1(&[-0.8, -0.4, -0.2, -0.05]));
        assert_eq!(grid.transform(), TransformFamily::Shchepetkin2010);
        assert_eq!(grid.stretching().tcline, 250.);
        assert_eq!(grid.stretching().theta_s, 7.);
    }

    #[test]
    fn test_unknown_transform_pair_falls_back() {
        for (vt, vs) in [(1., 2.), (2., 1.), (2., 3.), (2., 5.), (3., 3.)] {
            let mut source = minimal_source();
            source
                .variable("Vtransform", arr1(&[vt]))
                .variable("Vstretching", arr1(&[vs]));
            let grid = Grid::from_source(&source).unwrap();
            assert_eq!(grid.transform(), TransformFamily::SongHaidvogel1994);
        }
    }

    #[test]
    fn test_non_integral_transform_flags_fall_back() {
        for (vt, vs) in [(2.4, 2.), (2., 3.6), (1.5, 1.), (f64::NAN, 1.)] {
            let mut source = minimal_source();
            source
                .variable("Vtransform", arr1(&[vt]))
                .variable("Vstretching", arr1(&[vs]));
            let grid = Grid::from_source(&source).unwrap();
            assert_eq!(grid.transform(), TransformFamily::SongHaidvogel1994);
        }
    }

    #[test]
    fn test_partial_stretching_params_use_all_defaults() {
        let mut source = minimal_source();
        source.variable("theta_s", arr1(&[7.]));
        let grid = Grid::from_source(&source).unwrap();
        assert_eq!(grid.stretching(), &StretchingParams::default());
    }

    #[test]
    fn test_time_axis() {
        let grid = Grid::from_source(&minimal_source()).unwrap();
        assert_eq!(grid.times().len(), 2);
        assert_eq!(grid.times().time_step(), Some(chrono::Duration::hours(1)));
    }

    #[test]
    fn test_missing_units_assume_unix_epoch() {
        let mut source = minimal_source();
        source.variable("ocean_time", arr1(&[0.]));
        let grid = Grid::from_source(&source).unwrap();
        assert_eq!(grid.times().start_time(), TimeUnits::default().epoch());
        assert_eq!(grid.times().time_step(), None);
    }

    #[test]
    fn test_missing_layer_count_is_fatal() {
        let mut source = MemoryGridSource::new("no-layers");
        source
            .variable("lat_rho", Array2::<f64>::zeros((2, 2)))
            .variable("lon_rho", Array2::<f64>::zeros((2, 2)))
            .variable("ocean_time", arr1(&[0.]));
        assert!(matches!(
            Grid::from_source(&source),
            Err(GridError::MissingLayerCount(_))
        ));
    }

    #[test]
    fn test_coordinates_must_be_2d() {
        let mut source = minimal_source();
        source.variable("lon_rho", Array3::<f64>::zeros((1, 3, 5)));
        assert!(matches!(
            Grid::from_source(&source),
            Err(GridError::ShapeError(_))
        ));
    }

    #[test]
    fn test_sea_floor_depth_is_cached() {
        let mut source = minimal_source();
        source.variable("h", Array2::from_elem((3, 5), 42.));
        let mut grid = Grid::from_source(&source).unwrap();
        assert_eq!(grid.sea_floor_depth(&source).unwrap()[[1, 1]], 42.);
        assert!(grid.is_sea_floor_depth_cached());

        // later reads come from the cache even if the source changes
        source.variable("h", Array2::from_elem((3, 5), 7.));
        assert_eq!(grid.sea_floor_depth(&source).unwrap()[[1, 1]], 42.);
    }
}
