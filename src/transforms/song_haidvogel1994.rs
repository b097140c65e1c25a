// romsrs-reader/src/transforms/song_haidvogel1994.rs
//
// Implements ROMS/Rutgers VTRANSFORM=1, VSTRETCHING=1: Song and Haidvogel (1994)
//
// Reference:
//   Song, Y. and D. B. Haidvogel, 1994: A semi-implicit ocean circulation model
//   using a generalized topography-following coordinate system, J. Comp. Physics,
//   115 (1), 228-244.
//
// See: https://www.myroms.org/wiki/Vertical_S-coordinate

use super::StretchingParams;
use libm::{sinh, tanh};
use ndarray::{Array1, Array2};

/// Stretching curve Cs evaluated at every layer center.
///
/// if theta_s > 0:
///     Cs = (1 - theta_b) * sinh(theta_s * s) / sinh(theta_s)
///        + theta_b * (tanh(theta_s * (s + 0.5)) / (2 * tanh(0.5 * theta_s)) - 0.5)
/// else:
///     Cs = s
pub fn stretching(sigma: &Array1<f64>, params: &StretchingParams) -> Array1<f64> {
    let theta_s = params.theta_s;
    let theta_b = params.theta_b;
    if theta_s <= 0.0 {
        return sigma.clone();
    }
    sigma.mapv(|s| {
        let ptheta = sinh(theta_s * s) / sinh(theta_s);
        let rtheta = tanh(theta_s * (s + 0.5)) / (2.0 * tanh(0.5 * theta_s)) - 0.5;
        (1.0 - theta_b) * ptheta + theta_b * rtheta
    })
}

/// Depth of every layer center at every column, shaped (layers, columns).
///
/// The critical depth is the shallower of Tcline and the shallowest column:
///     hc = min(min(h), Tcline)
///     z = hc * s + (h - hc) * Cs
pub fn z_r(depths: &Array1<f64>, sigma: &Array1<f64>, params: &StretchingParams) -> Array2<f64> {
    let shallowest = depths.iter().cloned().fold(f64::INFINITY, f64::min);
    let hc = shallowest.min(params.tcline);
    let cs = stretching(sigma, params);
    Array2::from_shape_fn((sigma.len(), depths.len()), |(k, m)| {
        hc * sigma[k] + (depths[m] - hc) * cs[k]
    })
}
