// romsrs-reader/src/transforms/mod.rs

pub use traits::ZProfiles;
pub use transforms::TransformFamily;

pub mod shchepetkin2005;
pub mod shchepetkin2010;
pub mod song_haidvogel1994;
pub mod traits;
pub mod transforms;

use ndarray::Array1;

/// Shape parameters shared by every stretching family.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StretchingParams {
    /// Surface refinement [0, 10]
    pub theta_s: f64,
    /// Bottom refinement [0, 4]
    pub theta_b: f64,
    /// Critical (thermocline) depth
    pub tcline: f64,
}

impl Default for StretchingParams {
    fn default() -> Self {
        Self {
            theta_s: 3.0,
            theta_b: 0.4,
            tcline: 10.0,
        }
    }
}

/// Evenly spaced layer centers covering (-1, 0), ordered bottom to surface.
pub fn synthesize_sigma(num_sigma: usize) -> Array1<f64> {
    let n = num_sigma as f64;
    Array1::from_shape_fn(num_sigma, |i| (i as f64 + 0.5 - n) / n)
}
