/// Horizontal domain in grid-index space. Datasets are treated as
/// unprojected, so x is the column (xi) and y the row (eta).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HorizontalExtent {
    pub xmin: f64,
    pub xmax: f64,
    pub delta_x: f64,
    pub ymin: f64,
    pub ymax: f64,
    pub delta_y: f64,
}

impl HorizontalExtent {
    pub fn unprojected(nrows: usize, ncols: usize) -> Self {
        Self {
            xmin: 0.,
            xmax: ncols as f64 - 1.,
            delta_x: 1.,
            ymin: 0.,
            ymax: nrows as f64 - 1.,
            delta_y: 1.,
        }
    }

    pub fn ncols(&self) -> usize {
        ((self.xmax - self.xmin) / self.delta_x).round() as usize + 1
    }

    pub fn nrows(&self) -> usize {
        ((self.ymax - self.ymin) / self.delta_y).round() as usize + 1
    }

    /// False for non-finite coordinates.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.xmin && x <= self.xmax && y >= self.ymin && y <= self.ymax
    }
}
