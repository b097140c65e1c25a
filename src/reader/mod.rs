// romsrs-reader/src/reader/mod.rs

mod builder;
mod errors;
mod extraction;

pub use builder::RomsReaderBuilder;
pub use errors::{ExtractionError, RomsReaderBuilderError};
pub use extraction::{
    bisect_left, covering_range, horizontal_indices, vertical_layer_range, CoordinateEcho,
    DepthEcho, Extraction, FieldValues, MaskedPoints, VerticalSelection, ZBUFFER,
};

use crate::catalog::{VariableCatalog, LAND_BINARY_MASK};
use crate::grid::Grid;
use crate::query::{Query, QueryNormalizer};
use crate::source::GridSource;
use crate::transforms::ZProfiles;
use extraction::{clamp_index, ColumnSlab};
use log::{debug, trace};
use ndarray::{Array1, Array2, Array3};
use ndarray_stats::QuantileExt;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

/// Resolves (variable, time, position, depth) queries against ROMS native output.
pub struct RomsReader {
    name: String,
    source: Box<dyn GridSource>,
    grid: Grid,
    catalog: VariableCatalog,
    normalizer: Box<dyn QueryNormalizer>,
    buffer: usize,
}

impl RomsReader {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn catalog(&self) -> &VariableCatalog {
        &self.catalog
    }

    /// Standard names that can be requested.
    pub fn variables(&self) -> Vec<&str> {
        self.catalog.standard_names()
    }

    pub fn buffer(&self) -> usize {
        self.buffer
    }

    pub fn set_buffer(&mut self, buffer: usize) {
        self.buffer = buffer;
    }

    /// Values of the requested variables at the nearest time sample.
    ///
    /// Point mode returns one masked column per query point; block mode
    /// returns the raw sub-block covering every point plus the spatial buffer.
    pub fn get_variables(&mut self, query: &Query) -> Result<Extraction, ExtractionError> {
        let normalized = self
            .normalizer
            .check_arguments(&self.grid, &self.catalog, query)?;
        let nearest = self.normalizer.nearest_time(&self.grid, normalized.time);
        trace!(
            "Requested {} resolved to {} (index {})",
            normalized.time,
            nearest.nearest,
            nearest.index
        );

        let extent = *self.grid.extent();
        let mut indx = horizontal_indices(&normalized.x, extent.xmin, extent.delta_x);
        let mut indy = horizontal_indices(&normalized.y, extent.ymin, extent.delta_y);

        let (vertical, z) = self.resolve_vertical(&indx, &indy, &normalized.z)?;

        let (rows, cols) = if query.block {
            (
                covering_range(&indy, self.buffer, extent.nrows()),
                covering_range(&indx, self.buffer, extent.ncols()),
            )
        } else {
            for (p, &outside) in normalized.outside.iter().enumerate() {
                if outside {
                    // masked below
                    indx[p] = 0;
                    indy[p] = 0;
                }
            }
            (
                indy.iter().map(|&i| clamp_index(i, extent.nrows())).collect(),
                indx.iter().map(|&i| clamp_index(i, extent.ncols())).collect(),
            )
        };

        let mut variables = BTreeMap::new();
        for name in &normalized.variables {
            let slab = self.read_variable(name, nearest.index, &vertical, &rows, &cols)?;
            let values = if query.block {
                FieldValues::Block(slab.block(&rows, &cols))
            } else {
                let data = slab.paired(&rows, &cols);
                let mask = Array2::from_shape_fn(data.raw_dim(), |(_, p)| normalized.outside[p]);
                FieldValues::Points(MaskedPoints { data, mask })
            };
            variables.insert(name.clone(), values);
        }
        if let Some(mask) = variables.get_mut(LAND_BINARY_MASK) {
            mask.invert_land_mask();
        }

        let angle = self.grid.angle();
        let angle_between_x_and_east = Array2::from_shape_fn((cols.len(), rows.len()), |(i, j)| {
            angle[[
                rows[j].min(angle.nrows() - 1),
                cols[i].min(angle.ncols() - 1),
            ]]
            .to_degrees()
        });

        let (x, y) = if query.block {
            (CoordinateEcho::Indices(cols), CoordinateEcho::Indices(rows))
        } else {
            // one-cell offset kept for consumers that expect it
            (
                CoordinateEcho::Physical(
                    indx.iter()
                        .map(|&i| extent.xmin + (i as f64 - 1.) * extent.delta_x)
                        .collect(),
                ),
                CoordinateEcho::Physical(
                    indy.iter()
                        .map(|&i| extent.ymin + (i as f64 - 1.) * extent.delta_y)
                        .collect(),
                ),
            )
        };

        Ok(Extraction {
            time: nearest.nearest,
            x,
            y,
            z,
            angle_between_x_and_east,
            variables,
        })
    }

    /// Layer-center depths below the cells containing the given positions.
    pub fn z_profiles(
        &mut self,
        x: &Array1<f64>,
        y: &Array1<f64>,
    ) -> Result<ZProfiles, ExtractionError> {
        let extent = *self.grid.extent();
        let indx = horizontal_indices(x, extent.xmin, extent.delta_x);
        let indy = horizontal_indices(y, extent.ymin, extent.delta_y);
        self.z_profiles_at(&indx, &indy)
    }

    fn z_profiles_at(&mut self, indx: &[isize], indy: &[isize]) -> Result<ZProfiles, ExtractionError> {
        let depth = self.grid.sea_floor_depth(self.source.as_ref())?;
        let (nrows, ncols) = depth.dim();
        let depths: Array1<f64> = indy
            .iter()
            .zip(indx)
            .map(|(&row, &col)| depth[[clamp_index(row, nrows), clamp_index(col, ncols)]])
            .collect();
        Ok(self.grid.z_profiles(&depths))
    }

    fn resolve_vertical(
        &mut self,
        indx: &[isize],
        indy: &[isize],
        z: &Array1<f64>,
    ) -> Result<(VerticalSelection, DepthEcho), ExtractionError> {
        if z.iter().all(|&depth| depth == 0.) {
            return Ok((
                VerticalSelection::Surface(self.grid.surface_layer()),
                DepthEcho::Requested(z.clone()),
            ));
        }
        let profiles = self.z_profiles_at(indx, indy)?;
        let (zmins, zmaxs) = profiles.layer_extrema()?;
        let layers = vertical_layer_range(&zmins, &zmaxs, *z.min()?, *z.max()?);
        debug!(
            "Depths [{}, {}] covered by layers {:?}",
            z.min()?,
            z.max()?,
            layers
        );
        let z_echo = profiles.layers(layers.clone());
        Ok((VerticalSelection::Layers(layers), DepthEcho::Profiles(z_echo)))
    }

    /// Reads the bounding box of the selected cells for one variable,
    /// dispatching on its rank.
    fn read_variable(
        &self,
        name: &str,
        time_index: usize,
        vertical: &VerticalSelection,
        rows: &[usize],
        cols: &[usize],
    ) -> Result<ColumnSlab, ExtractionError> {
        let roms_name = self
            .catalog
            .roms_name(name)
            .ok_or_else(|| ExtractionError::UnknownVariable(name.to_string()))?;
        let shape = self.source.variable_shape(roms_name)?;
        let mut slab: Vec<Range<usize>> = match shape.len() {
            2 => vec![],
            3 => vec![time_index..time_index + 1],
            4 => vec![time_index..time_index + 1, vertical.range()],
            ndim => {
                return Err(ExtractionError::UnsupportedDimensionality(
                    roms_name.to_string(),
                    ndim,
                ))
            }
        };
        let nrows = shape[shape.len() - 2];
        let ncols = shape[shape.len() - 1];
        if nrows == 0 || ncols == 0 {
            return Err(crate::source::GridSourceError::EmptyVariable(roms_name.to_string()).into());
        }
        let row0 = rows.iter().map(|&r| r.min(nrows - 1)).min().unwrap_or(0);
        let row1 = rows.iter().map(|&r| r.min(nrows - 1)).max().unwrap_or(0);
        let col0 = cols.iter().map(|&c| c.min(ncols - 1)).min().unwrap_or(0);
        let col1 = cols.iter().map(|&c| c.min(ncols - 1)).max().unwrap_or(0);
        slab.push(row0..row1 + 1);
        slab.push(col0..col1 + 1);

        let raw = self.source.read_hyperslab(roms_name, &slab)?;
        let nlayers: usize = slab[..slab.len() - 2].iter().map(|r| r.len()).product();
        let values = Array3::from_shape_vec(
            (nlayers, row1 - row0 + 1, col1 - col0 + 1),
            raw.iter().cloned().collect(),
        )?;
        Ok(ColumnSlab {
            values,
            row0,
            col0,
            nrows,
            ncols,
        })
    }
}

impl fmt::Display for RomsReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>16}: {}", "reader", self.name)?;
        write!(f, "{}", self.grid)?;
        writeln!(f, "{:>16}: {}", "buffer", self.buffer)?;
        writeln!(f, "{:>16}: {}", "variables", self.variables().join(", "))
    }
}
