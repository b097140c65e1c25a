use ndarray::{s, Array2, Axis};
use ndarray_stats::errors::MinMaxError;
use ndarray_stats::QuantileExt;
use plotly::color::NamedColor;
use plotly::common::{Line, Marker, Mode};
use plotly::{Plot, Scatter};
use std::ops::RangeInclusive;

/// Layer-center depths below a set of columns, shaped (layers, columns).
#[derive(Clone, Debug)]
pub struct ZProfiles {
    z_r: Array2<f64>,
}

impl ZProfiles {
    pub fn new(z_r: Array2<f64>) -> Self {
        Self { z_r }
    }

    pub fn z_r(&self) -> &Array2<f64> {
        &self.z_r
    }

    pub fn into_inner(self) -> Array2<f64> {
        self.z_r
    }

    pub fn nlayers(&self) -> usize {
        self.z_r.nrows()
    }

    pub fn ncolumns(&self) -> usize {
        self.z_r.ncols()
    }

    /// Shallowest and deepest value of each layer across all columns, as
    /// (zmins, zmaxs). Both inherit the bottom-to-surface ordering of the layers.
    pub fn layer_extrema(&self) -> Result<(Vec<f64>, Vec<f64>), MinMaxError> {
        let mut zmins = Vec::with_capacity(self.nlayers());
        let mut zmaxs = Vec::with_capacity(self.nlayers());
        for layer in self.z_r.axis_iter(Axis(0)) {
            zmins.push(*layer.min()?);
            zmaxs.push(*layer.max()?);
        }
        Ok((zmins, zmaxs))
    }

    /// Rows for the given layers only.
    pub fn layers(&self, layers: RangeInclusive<usize>) -> Array2<f64> {
        self.z_r.slice(s![layers, ..]).to_owned()
    }

    pub fn make_profile_plot(&self) -> Result<Plot, MinMaxError> {
        let mut plot = Plot::new();
        for column in self.z_r.axis_iter(Axis(1)) {
            let bottom = *column.min()?;
            let trace = Scatter::new(vec![bottom; column.len()], column.to_vec())
                .mode(Mode::LinesMarkers)
                .line(Line::new().color(NamedColor::Blue))
                .marker(Marker::new().color(NamedColor::Black));
            plot.add_trace(trace);
        }
        Ok(plot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_layer_extrema() {
        let profiles = ZProfiles::new(array![[-90.0, -45.0], [-50.0, -25.0], [-10.0, -5.0]]);
        let (zmins, zmaxs) = profiles.layer_extrema().unwrap();
        assert_eq!(zmins, vec![-90.0, -50.0, -10.0]);
        assert_eq!(zmaxs, vec![-45.0, -25.0, -5.0]);
    }

    #[test]
    fn test_layer_slice() {
        let profiles = ZProfiles::new(array![[-90.0], [-50.0], [-10.0]]);
        let sliced = profiles.layers(1..=2);
        assert_eq!(sliced, array![[-50.0], [-10.0]]);
    }

    #[test]
    fn test_extrema_rejects_empty_columns() {
        let profiles = ZProfiles::new(Array2::zeros((3, 0)));
        assert!(profiles.layer_extrema().is_err());
    }
}
