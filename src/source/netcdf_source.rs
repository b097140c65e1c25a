use super::{validate_hyperslab, GridSource, GridSourceError};
use log::debug;
use ndarray::{ArrayD, IxDyn};
use netcdf::{AttributeValue, Extent};
use std::ops::Range;
use std::path::Path;

/// Grid source reading ROMS native output through the netCDF C library.
pub struct NetcdfGridSource {
    location: String,
    file: netcdf::File,
}

impl NetcdfGridSource {
    pub fn open(path: &Path) -> Result<Self, GridSourceError> {
        let location = path.display().to_string();
        let file = netcdf::open(path)
            .map_err(|e| GridSourceError::OpenError(location.clone(), e.to_string()))?;
        Ok(Self { location, file })
    }

    fn variable(&self, name: &str) -> Result<netcdf::Variable<'_>, GridSourceError> {
        self.file
            .variable(name)
            .ok_or_else(|| GridSourceError::MissingVariable(name.to_string()))
    }

    /// Applies `scale_factor`/`add_offset` and turns `_FillValue` into NaN.
    fn unpack(var: &netcdf::Variable, values: &mut [f64]) {
        let fill_value = get_f64_attr(var, "_FillValue");
        let scale_factor = get_f64_attr(var, "scale_factor").unwrap_or(1.0);
        let add_offset = get_f64_attr(var, "add_offset").unwrap_or(0.0);
        for value in values.iter_mut() {
            if fill_value.map_or(false, |fill| *value == fill) {
                *value = f64::NAN;
            } else {
                *value = *value * scale_factor + add_offset;
            }
        }
    }
}

impl GridSource for NetcdfGridSource {
    fn location(&self) -> &str {
        &self.location
    }

    fn variable_names(&self) -> Vec<String> {
        self.file.variables().map(|var| var.name()).collect()
    }

    fn dimension_len(&self, name: &str) -> Option<usize> {
        self.file.dimension(name).map(|dim| dim.len())
    }

    fn variable_shape(&self, name: &str) -> Result<Vec<usize>, GridSourceError> {
        Ok(self
            .variable(name)?
            .dimensions()
            .iter()
            .map(|dim| dim.len())
            .collect())
    }

    fn attribute_string(&self, variable: &str, attribute: &str) -> Option<String> {
        let var = self.file.variable(variable)?;
        if !has_attr(&var, attribute) {
            return None;
        }
        match var.attribute_value(attribute)?.ok()? {
            AttributeValue::Str(value) => Some(value),
            _ => None,
        }
    }

    fn read_hyperslab(
        &self,
        name: &str,
        slab: &[Range<usize>],
    ) -> Result<ArrayD<f64>, GridSourceError> {
        let var = self.variable(name)?;
        let shape: Vec<usize> = var.dimensions().iter().map(|dim| dim.len()).collect();
        validate_hyperslab(name, &shape, slab)?;
        debug!("Reading {} hyperslab {:?}", name, slab);
        let extents: Vec<Extent> = slab.iter().cloned().map(Extent::from).collect();
        let mut values: Vec<f64> = var.get_values(extents)?;
        Self::unpack(&var, &mut values);
        let dims: Vec<usize> = slab.iter().map(|range| range.len()).collect();
        Ok(ArrayD::from_shape_vec(IxDyn(&dims), values)?)
    }

    fn read_all(&self, name: &str) -> Result<ArrayD<f64>, GridSourceError> {
        let var = self.variable(name)?;
        let dims: Vec<usize> = var.dimensions().iter().map(|dim| dim.len()).collect();
        let mut values: Vec<f64> = var.get_values(..)?;
        Self::unpack(&var, &mut values);
        Ok(ArrayD::from_shape_vec(IxDyn(&dims), values)?)
    }
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}
