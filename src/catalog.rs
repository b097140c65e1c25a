// romsrs-reader/src/catalog.rs

use std::collections::HashMap;

/// ROMS native variable names and the CF standard names they are served under.
pub const ROMS_VARIABLE_MAPPING: [(&str, &str); 11] = [
    ("mask_psi", "land_binary_mask"),
    ("h", "sea_floor_depth"),
    ("zeta", "sea_surface_height"),
    ("u", "x_sea_water_velocity"),
    ("v", "y_sea_water_velocity"),
    ("temp", "sea_water_temperature"),
    ("salt", "sea_water_salinity"),
    ("uice", "sea_ice_x_velocity"),
    ("vice", "sea_ice_y_velocity"),
    ("aice", "sea_ice_area_fraction"),
    ("hice", "sea_ice_thickness"),
];

/// Stored as 1 = water in ROMS files, served as 1 = land.
pub const LAND_BINARY_MASK: &str = "land_binary_mask";

/// Variables a dataset can serve, indexed both ways.
#[derive(Clone, Debug, Default)]
pub struct VariableCatalog {
    by_standard_name: HashMap<String, String>,
    by_roms_name: HashMap<String, String>,
}

impl VariableCatalog {
    /// Keeps only the dataset variables that have a known standard name.
    pub fn from_variable_names<I, S>(variable_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mapping: HashMap<&str, &str> = ROMS_VARIABLE_MAPPING.iter().cloned().collect();
        let mut catalog = Self::default();
        for name in variable_names {
            let name = name.as_ref();
            if let Some(standard_name) = mapping.get(name) {
                catalog
                    .by_standard_name
                    .insert(standard_name.to_string(), name.to_string());
                catalog
                    .by_roms_name
                    .insert(name.to_string(), standard_name.to_string());
            }
        }
        catalog
    }

    pub fn roms_name(&self, standard_name: &str) -> Option<&str> {
        self.by_standard_name.get(standard_name).map(String::as_str)
    }

    pub fn standard_name(&self, roms_name: &str) -> Option<&str> {
        self.by_roms_name.get(roms_name).map(String::as_str)
    }

    pub fn contains(&self, standard_name: &str) -> bool {
        self.by_standard_name.contains_key(standard_name)
    }

    /// Sorted, so listings are stable.
    pub fn standard_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_standard_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.by_standard_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_standard_name.is_empty()
    }
}
