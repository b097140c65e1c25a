// romsrs-reader/src/transforms/shchepetkin2010.rs
//
// Implements ROMS/Rutgers VTRANSFORM=2, VSTRETCHING=4: A. Shchepetkin (2010) UCLA-ROMS
// Double vertical stretching function
//
// See: https://www.myroms.org/wiki/Vertical_S-coordinate

use super::StretchingParams;
use libm::{cosh, exp};
use ndarray::{Array1, Array2};

/// Stretching curve Cs evaluated at every layer center.
///
/// if theta_s > 0:
///     Csur = (1 - cosh(theta_s * s)) / (cosh(theta_s) - 1)
/// else:
///     Csur = -s^2
/// if theta_b > 0:
///     Cs = (exp(theta_b * Csur) - 1) / (1 - exp(-theta_b))
/// else:
///     Cs = Csur
pub fn stretching(sigma: &Array1<f64>, params: &StretchingParams) -> Array1<f64> {
    let theta_s = params.theta_s;
    let theta_b = params.theta_b;
    sigma.mapv(|s| {
        let csur = if theta_s > 0.0 {
            (1.0 - cosh(theta_s * s)) / (cosh(theta_s) - 1.0)
        } else {
            -s * s
        };
        if theta_b > 0.0 {
            (exp(theta_b * csur) - 1.0) / (1.0 - exp(-theta_b))
        } else {
            csur
        }
    })
}

/// Depth of every layer center at every column, shaped (layers, columns).
///     hc = Tcline
///     z = h * (hc * s + h * Cs) / (hc + h)
pub fn z_r(depths: &Array1<f64>, sigma: &Array1<f64>, params: &StretchingParams) -> Array2<f64> {
    let hc = params.tcline;
    let cs = stretching(sigma, params);
    Array2::from_shape_fn((sigma.len(), depths.len()), |(k, m)| {
        let h = depths[m];
        h * (hc * sigma[k] + h * cs[k]) / (hc + h)
    })
}
