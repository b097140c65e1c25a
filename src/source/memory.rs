use super::{validate_hyperslab, GridSource, GridSourceError};
use ndarray::{Array, ArrayD, Dimension, Slice};
use std::collections::{BTreeMap, HashMap};
use std::ops::Range;

struct MemoryVariable {
    data: ArrayD<f64>,
    attributes: HashMap<String, String>,
}

/// Grid source backed by arrays held in memory.
///
/// Used for synthetic grids and for datasets already decoded elsewhere.
#[derive(Default)]
pub struct MemoryGridSource {
    location: String,
    dimensions: HashMap<String, usize>,
    variables: BTreeMap<String, MemoryVariable>,
}

impl MemoryGridSource {
    pub fn new(location: &str) -> Self {
        Self {
            location: location.to_string(),
            ..Default::default()
        }
    }

    pub fn dimension(&mut self, name: &str, len: usize) -> &mut Self {
        self.dimensions.insert(name.to_string(), len);
        self
    }

    pub fn variable<D: Dimension>(&mut self, name: &str, data: Array<f64, D>) -> &mut Self {
        self.variables.insert(
            name.to_string(),
            MemoryVariable {
                data: data.into_dyn(),
                attributes: HashMap::new(),
            },
        );
        self
    }

    /// Ignored when the variable has not been added yet.
    pub fn attribute(&mut self, variable: &str, attribute: &str, value: &str) -> &mut Self {
        if let Some(var) = self.variables.get_mut(variable) {
            var.attributes
                .insert(attribute.to_string(), value.to_string());
        }
        self
    }

    fn get(&self, name: &str) -> Result<&MemoryVariable, GridSourceError> {
        self.variables
            .get(name)
            .ok_or_else(|| GridSourceError::MissingVariable(name.to_string()))
    }
}

impl GridSource for MemoryGridSource {
    fn location(&self) -> &str {
        &self.location
    }

    fn variable_names(&self) -> Vec<String> {
        self.variables.keys().cloned().collect()
    }

    fn dimension_len(&self, name: &str) -> Option<usize> {
        self.dimensions.get(name).copied()
    }

    fn variable_shape(&self, name: &str) -> Result<Vec<usize>, GridSourceError> {
        Ok(self.get(name)?.data.shape().to_vec())
    }

    fn attribute_string(&self, variable: &str, attribute: &str) -> Option<String> {
        self.variables
            .get(variable)
            .and_then(|var| var.attributes.get(attribute))
            .cloned()
    }

    fn read_hyperslab(
        &self,
        name: &str,
        slab: &[Range<usize>],
    ) -> Result<ArrayD<f64>, GridSourceError> {
        let var = self.get(name)?;
        validate_hyperslab(name, var.data.shape(), slab)?;
        let view = var
            .data
            .slice_each_axis(|axis| Slice::from(slab[axis.axis.index()].clone()));
        Ok(view.as_standard_layout().into_owned())
    }
}
