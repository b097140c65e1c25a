// romsrs-reader/src/reader/extraction.rs

use chrono::NaiveDateTime;
use ndarray::{Array1, Array2, Array3};
use std::collections::BTreeMap;
use std::ops::{Range, RangeInclusive};

/// Extra layers fetched above and below the layers bracketing the requested depths.
pub const ZBUFFER: usize = 1;

/// Layers read from 4-dimensional variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerticalSelection {
    /// Topmost layer only; every requested depth was at the surface.
    Surface(usize),
    /// Contiguous layers covering every requested depth at every point.
    Layers(RangeInclusive<usize>),
}

impl VerticalSelection {
    pub fn range(&self) -> Range<usize> {
        match self {
            VerticalSelection::Surface(layer) => *layer..*layer + 1,
            VerticalSelection::Layers(layers) => *layers.start()..*layers.end() + 1,
        }
    }

    pub fn len(&self) -> usize {
        self.range().len()
    }
}

/// Per-point values shaped (layers, points), masked where the point lies
/// outside the domain.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskedPoints {
    pub data: Array2<f64>,
    pub mask: Array2<bool>,
}

impl MaskedPoints {
    /// `None` for masked entries.
    pub fn get(&self, layer: usize, point: usize) -> Option<f64> {
        match self.mask.get((layer, point)) {
            Some(false) => self.data.get((layer, point)).copied(),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FieldValues {
    Points(MaskedPoints),
    /// Raw sub-block shaped (layers, rows, columns).
    Block(Array3<f64>),
}

impl FieldValues {
    pub fn as_points(&self) -> Option<&MaskedPoints> {
        match self {
            FieldValues::Points(points) => Some(points),
            FieldValues::Block(_) => None,
        }
    }

    pub fn as_block(&self) -> Option<&Array3<f64>> {
        match self {
            FieldValues::Block(block) => Some(block),
            FieldValues::Points(_) => None,
        }
    }

    /// Swaps the 1 = water convention of ROMS masks for 1 = land.
    pub fn invert_land_mask(&mut self) {
        match self {
            FieldValues::Points(points) => points.data.mapv_inplace(|v| 1. - v),
            FieldValues::Block(block) => block.mapv_inplace(|v| 1. - v),
        }
    }
}

/// Horizontal positions echoed back with the values.
#[derive(Clone, Debug, PartialEq)]
pub enum CoordinateEcho {
    /// Point mode: coordinates rebuilt from the cell indices.
    Physical(Array1<f64>),
    /// Block mode: the covered index range.
    Indices(Vec<usize>),
}

/// Depths echoed back with the values.
#[derive(Clone, Debug, PartialEq)]
pub enum DepthEcho {
    /// Surface-only queries echo the requested depths.
    Requested(Array1<f64>),
    /// Layer-center depths of the selected layers, shaped (layers, points).
    Profiles(Array2<f64>),
}

/// Everything returned by one extraction call.
#[derive(Clone, Debug)]
pub struct Extraction {
    pub time: NaiveDateTime,
    pub x: CoordinateEcho,
    pub y: CoordinateEcho,
    pub z: DepthEcho,
    /// Degrees, shaped (x indices, y indices).
    pub angle_between_x_and_east: Array2<f64>,
    pub variables: BTreeMap<String, FieldValues>,
}

impl Extraction {
    pub fn get(&self, name: &str) -> Option<&FieldValues> {
        self.variables.get(name)
    }

    pub fn points(&self, name: &str) -> Option<&MaskedPoints> {
        self.get(name).and_then(FieldValues::as_points)
    }

    pub fn block(&self, name: &str) -> Option<&Array3<f64>> {
        self.get(name).and_then(FieldValues::as_block)
    }
}

/// Lower cell index of each coordinate: floor((coord - min) / delta).
pub fn horizontal_indices(coords: &Array1<f64>, min: f64, delta: f64) -> Vec<isize> {
    coords
        .iter()
        .map(|&coord| ((coord - min) / delta).floor() as isize)
        .collect()
}

pub fn clamp_index(index: isize, len: usize) -> usize {
    index.clamp(0, len.saturating_sub(1) as isize) as usize
}

/// Every index between the extremes of `indices`, widened by `buffer` on both
/// sides and clamped to [0, len - 1]. Never empty for non-empty input.
pub fn covering_range(indices: &[isize], buffer: usize, len: usize) -> Vec<usize> {
    let (lowest, highest) = match (indices.iter().min(), indices.iter().max()) {
        (Some(&lowest), Some(&highest)) => (lowest, highest),
        _ => return Vec::new(),
    };
    let buffer = buffer as isize;
    let start = clamp_index(lowest.saturating_sub(buffer), len);
    let end = clamp_index(highest.saturating_add(buffer), len);
    (start..=end).collect()
}

/// Leftmost insertion point of `x` in an ascending slice.
pub fn bisect_left(sorted: &[f64], x: f64) -> usize {
    sorted.partition_point(|&value| value < x)
}

/// Layers covering every depth in [zmin, zmax] at every column.
///
/// `zmins`/`zmaxs` are the per-layer extremes across columns, ordered bottom
/// to surface. The layer just below each insertion point brackets the depth,
/// and [`ZBUFFER`] more layers are added on each side.
pub fn vertical_layer_range(
    zmins: &[f64],
    zmaxs: &[f64],
    zmin: f64,
    zmax: f64,
) -> RangeInclusive<usize> {
    let top = zmins.len().saturating_sub(1);
    let lower = bisect_left(zmaxs, zmin).saturating_sub(ZBUFFER + 1);
    let upper = (bisect_left(zmins, zmax) + ZBUFFER + 1).min(top);
    lower..=upper
}

/// Variable values over the bounding box of the selected cells, shaped
/// (layers, rows, columns). Cell indices are clamped to the variable's own
/// horizontal shape, which is smaller than the rho grid for staggered fields.
pub(crate) struct ColumnSlab {
    pub(crate) values: Array3<f64>,
    pub(crate) row0: usize,
    pub(crate) col0: usize,
    pub(crate) nrows: usize,
    pub(crate) ncols: usize,
}

impl ColumnSlab {
    fn cell(&self, layer: usize, row: usize, col: usize) -> f64 {
        let row = row.min(self.nrows - 1) - self.row0;
        let col = col.min(self.ncols - 1) - self.col0;
        self.values[[layer, row, col]]
    }

    /// One value per (row, col) pair, rather than the outer product of rows and columns.
    pub(crate) fn paired(&self, rows: &[usize], cols: &[usize]) -> Array2<f64> {
        let nlayers = self.values.len_of(ndarray::Axis(0));
        Array2::from_shape_fn((nlayers, rows.len()), |(k, p)| self.cell(k, rows[p], cols[p]))
    }

    pub(crate) fn block(&self, rows: &[usize], cols: &[usize]) -> Array3<f64> {
        let nlayers = self.values.len_of(ndarray::Axis(0));
        Array3::from_shape_fn((nlayers, rows.len(), cols.len()), |(k, i, j)| {
            self.cell(k, rows[i], cols[j])
        })
    }
}
