// romsrs-reader/src/transforms/shchepetkin2005.rs
//
// Implements ROMS/Rutgers VTRANSFORM=2, VSTRETCHING=2: A. Shchepetkin (2005) UCLA-ROMS
//
// Reference:
//   Shchepetkin, A.F. and J.C. McWilliams, 2005: The regional oceanic
//   modeling system (ROMS): a split-explicit, free-surface,
//   topography-following-coordinate oceanic model, Ocean Modelling, 9, 347-404.
//
// See: https://www.myroms.org/wiki/Vertical_S-coordinate

use super::StretchingParams;
use libm::{cosh, sinh};
use ndarray::{Array1, Array2};

const AWEIGHT: f64 = 1.0;
const BWEIGHT: f64 = 1.0;

/// Stretching curve Cs evaluated at every layer center.
///
/// Blends a surface refinement Csur with a bottom refinement Cbot:
///     Csur = (1 - cosh(theta_s * s)) / (cosh(theta_s) - 1)
///     Cbot = sinh(theta_b * (s + 1)) / sinh(theta_b) - 1
///     Cweight = (s + 1)^A * (1 + (A / B) * (1 - (s + 1)^B))
///     Cs = Cweight * Csur + (1 - Cweight) * Cbot
pub fn stretching(sigma: &Array1<f64>, params: &StretchingParams) -> Array1<f64> {
    let theta_s = params.theta_s;
    let theta_b = params.theta_b;
    if theta_s <= 0.0 {
        return sigma.clone();
    }
    sigma.mapv(|s| {
        let csur = (1.0 - cosh(theta_s * s)) / (cosh(theta_s) - 1.0);
        if theta_b > 0.0 {
            let cbot = sinh(theta_b * (s + 1.0)) / sinh(theta_b) - 1.0;
            let sigma_plus_1 = s + 1.0;
            let cweight = sigma_plus_1.powf(AWEIGHT)
                * (1.0 + (AWEIGHT / BWEIGHT) * (1.0 - sigma_plus_1.powf(BWEIGHT)));
            cweight * csur + (1.0 - cweight) * cbot
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
        let hinv = 1.0 / (hc + h);
        (hc * sigma[k] + cs[k] * h) * hinv * h
    })
}
