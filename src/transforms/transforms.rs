use super::traits::ZProfiles;
use super::{shchepetkin2005, shchepetkin2010, song_haidvogel1994, StretchingParams};
use ndarray::Array1;
use std::fmt;

/// Vertical transform/stretching pair used by a ROMS dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformFamily {
    /// Vtransform = 1, Vstretching = 1
    SongHaidvogel1994,
    /// Vtransform = 2, Vstretching = 2
    Shchepetkin2005,
    /// Vtransform = 2, Vstretching = 4
    Shchepetkin2010,
}

impl Default for TransformFamily {
    fn default() -> Self {
        TransformFamily::SongHaidvogel1994
    }
}

impl TransformFamily {
    /// Exact match on the (Vtransform, Vstretching) pair; anything else is unknown.
    pub fn from_params(vtransform: i64, vstretching: i64) -> Option<Self> {
        match (vtransform, vstretching) {
            (1, 1) => Some(TransformFamily::SongHaidvogel1994),
            (2, 2) => Some(TransformFamily::Shchepetkin2005),
            (2, 4) => Some(TransformFamily::Shchepetkin2010),
            _ => None,
        }
    }

    pub fn vtransform(&self) -> i64 {
        match self {
            TransformFamily::SongHaidvogel1994 => 1,
            TransformFamily::Shchepetkin2005 | TransformFamily::Shchepetkin2010 => 2,
        }
    }

    pub fn vstretching(&self) -> i64 {
        match self {
            TransformFamily::SongHaidvogel1994 => 1,
            TransformFamily::Shchepetkin2005 => 2,
            TransformFamily::Shchepetkin2010 => 4,
        }
    }

    /// Depth of every layer center below every requested column.
    ///
    /// `depths` are positive bottom depths, one per column. The result is shaped
    /// (layers, columns) with layer 0 at the bottom.
    pub fn z_profiles(
        &self,
        depths: &Array1<f64>,
        sigma: &Array1<f64>,
        params: &StretchingParams,
    ) -> ZProfiles {
        let z_r = match self {
            TransformFamily::SongHaidvogel1994 => song_haidvogel1994::z_r(depths, sigma, params),
            TransformFamily::Shchepetkin2005 => shchepetkin2005::z_r(depths, sigma, params),
            TransformFamily::Shchepetkin2010 => shchepetkin2010::z_r(depths, sigma, params),
        };
        ZProfiles::new(z_r)
    }
}

impl fmt::Display for TransformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Vtransform = {}, Vstretching = {}",
            self.vtransform(),
            self.vstretching()
        )
    }
}
