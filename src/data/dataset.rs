//! In-memory labeled dataset.
//!
//! A [`Dataset`] is an ordered collection of named [`Variable`]s sharing a
//! set of named dimensions. Some variables are flagged as coordinates. A
//! coordinate whose name equals one of its dimensions is *indexed*: its
//! values label that dimension.

use super::array::DataArray;
use crate::error::{EkmanError, Result};
use ndarray::{ArrayD, IxDyn};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tracing::warn;

/// A named n-dimensional variable with attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Variable name.
    pub name: String,
    /// Dimension names, one per axis.
    pub dims: Vec<String>,
    /// Values, widened to f64.
    pub values: ArrayD<f64>,
    /// Attributes, rendered as text.
    pub attrs: BTreeMap<String, String>,
    /// Storage type as read from the source.
    pub dtype: String,
}

impl Variable {
    /// Create a variable, checking that every axis is named.
    pub fn new(name: impl Into<String>, dims: &[&str], values: ArrayD<f64>) -> Result<Self> {
        let name = name.into();
        if dims.len() != values.ndim() {
            return Err(EkmanError::shape_mismatch(
                name,
                format!("{} dims for {}-d data", dims.len(), values.ndim()),
            ));
        }
        Ok(Self {
            name,
            dims: dims.iter().map(|d| d.to_string()).collect(),
            values,
            attrs: BTreeMap::new(),
            dtype: "f64".to_string(),
        })
    }

    /// Create a variable from a flat vector in row-major order.
    pub fn from_vec(name: impl Into<String>, dims: &[&str], shape: &[usize], values: Vec<f64>) -> Result<Self> {
        let name = name.into();
        let values = ArrayD::from_shape_vec(IxDyn(shape), values)
            .map_err(|e| EkmanError::shape_mismatch(&name, e.to_string()))?;
        Self::new(name, dims, values)
    }

    /// Add an attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Set the storage type name.
    pub fn with_dtype(mut self, dtype: impl Into<String>) -> Self {
        self.dtype = dtype.into();
        self
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Shape of the data.
    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    /// Check whether the values were stored as integers.
    pub fn is_integer(&self) -> bool {
        self.dtype.starts_with('i') || self.dtype.starts_with('u')
    }

    /// Copy out as an array.
    pub fn to_array(&self) -> DataArray {
        DataArray {
            name: self.name.clone(),
            dims: self.dims.clone(),
            values: self.values.clone(),
        }
    }
}

/// Ordered collection of variables over shared dimensions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    variables: Vec<Variable>,
    coords: BTreeSet<String>,
    /// Global attributes.
    pub attrs: BTreeMap<String, String>,
    /// File the dataset was read from, if any.
    pub source: Option<PathBuf>,
}

impl Dataset {
    /// Create an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a global attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Add a data variable. A variable named after its only dimension is
    /// always an (indexed) coordinate.
    pub fn insert(&mut self, var: Variable) -> Result<()> {
        for (dim, &len) in var.dims.iter().zip(var.shape()) {
            if let Some(existing) = self.dim_size(dim) {
                if existing != len && !self.is_sole_user(dim, &var.name) {
                    return Err(EkmanError::shape_mismatch(
                        &var.name,
                        format!("dimension '{}' has length {}, expected {}", dim, len, existing),
                    ));
                }
            }
        }

        if var.dims.len() == 1 && var.dims[0] == var.name {
            self.coords.insert(var.name.clone());
        }
        match self.variables.iter_mut().find(|v| v.name == var.name) {
            Some(slot) => *slot = var,
            None => self.variables.push(var),
        }
        Ok(())
    }

    /// Add a coordinate variable.
    pub fn insert_coord(&mut self, var: Variable) -> Result<()> {
        let name = var.name.clone();
        self.insert(var)?;
        self.coords.insert(name);
        Ok(())
    }

    fn is_sole_user(&self, dim: &str, name: &str) -> bool {
        self.variables
            .iter()
            .filter(|v| v.dims.iter().any(|d| d == dim))
            .all(|v| v.name == name)
    }

    /// Look up a variable.
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Look up a variable, failing if it is missing.
    pub fn get(&self, name: &str) -> Result<&Variable> {
        self.variable(name)
            .ok_or_else(|| EkmanError::variable_not_found(name))
    }

    /// Check whether the dataset holds a variable.
    pub fn contains(&self, name: &str) -> bool {
        self.variable(name).is_some()
    }

    /// All variable names, in declaration order.
    pub fn variable_names(&self) -> Vec<String> {
        self.variables.iter().map(|v| v.name.clone()).collect()
    }

    /// Names of variables that are not coordinates, in declaration order.
    pub fn data_var_names(&self) -> Vec<String> {
        self.variables
            .iter()
            .filter(|v| !self.coords.contains(&v.name))
            .map(|v| v.name.clone())
            .collect()
    }

    /// Check whether the dataset has no variables.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Dimension names, in order of first appearance.
    pub fn dims(&self) -> Vec<String> {
        let mut dims: Vec<String> = Vec::new();
        for var in &self.variables {
            for dim in &var.dims {
                if !dims.contains(dim) {
                    dims.push(dim.clone());
                }
            }
        }
        dims
    }

    /// Check whether `name` is a dimension.
    pub fn is_dim(&self, name: &str) -> bool {
        self.variables
            .iter()
            .any(|v| v.dims.iter().any(|d| d == name))
    }

    /// Length of a dimension.
    pub fn dim_size(&self, dim: &str) -> Option<usize> {
        self.variables.iter().find_map(|v| {
            v.dims
                .iter()
                .position(|d| d == dim)
                .map(|axis| v.shape()[axis])
        })
    }

    /// Coordinate names, sorted.
    pub fn coord_names(&self) -> Vec<String> {
        self.coords.iter().cloned().collect()
    }

    /// Check whether a variable is flagged as a coordinate.
    pub fn is_coord(&self, name: &str) -> bool {
        self.coords.contains(name)
    }

    /// Check whether `name` is a coordinate labelling a dimension.
    pub fn is_indexed(&self, name: &str) -> bool {
        self.is_coord(name) && self.is_dim(name)
    }

    /// Coordinates attached to a variable: those whose dimensions are all
    /// dimensions of the variable. Sorted.
    pub fn var_coords(&self, var: &str) -> Vec<String> {
        let Some(variable) = self.variable(var) else {
            return Vec::new();
        };
        self.coords
            .iter()
            .filter(|c| {
                self.variable(c)
                    .map_or(false, |cv| cv.dims.iter().all(|d| variable.dims.contains(d)))
            })
            .cloned()
            .collect()
    }

    /// Coordinates attached to a variable that do not label one of its
    /// dimensions. Sorted.
    pub fn non_indexed_coords(&self, var: &str) -> Vec<String> {
        let dims = self.variable(var).map(|v| v.dims.clone()).unwrap_or_default();
        self.var_coords(var)
            .into_iter()
            .filter(|c| !dims.contains(c))
            .collect()
    }

    /// Flag variables as coordinates. Unknown names are logged and skipped.
    pub fn set_coords<S: AsRef<str>>(&mut self, names: &[S]) {
        for name in names {
            let name = name.as_ref();
            if self.contains(name) {
                self.coords.insert(name.to_string());
            } else {
                warn!(name, "cannot set unknown variable as coordinate");
            }
        }
    }

    /// Demote every non-indexed coordinate back to a data variable.
    pub fn reset_coords(&mut self) {
        let dims = self.dims();
        self.coords.retain(|c| dims.contains(c));
    }

    /// Dimensions spanned by `name`. A bare dimension spans itself.
    pub fn dims_of(&self, name: &str) -> Vec<String> {
        match self.variable(name) {
            Some(v) => v.dims.clone(),
            None if self.is_dim(name) => vec![name.to_string()],
            None => Vec::new(),
        }
    }

    /// Labels along a dimension: the values of its index coordinate, or
    /// positions when it has none.
    pub fn labels(&self, dim: &str) -> Vec<f64> {
        match self.variable(dim) {
            Some(v) if v.dims.len() == 1 && v.dims[0] == dim => v.values.iter().copied().collect(),
            _ => (0..self.dim_size(dim).unwrap_or(0)).map(|i| i as f64).collect(),
        }
    }

    /// A variable or bare dimension as an array.
    pub fn array(&self, name: &str) -> Result<DataArray> {
        if let Some(var) = self.variable(name) {
            return Ok(var.to_array());
        }
        if self.is_dim(name) {
            let labels = self.labels(name);
            let values = ArrayD::from_shape_vec(IxDyn(&[labels.len()]), labels)
                .map_err(|e| EkmanError::shape_mismatch(name, e.to_string()))?;
            return DataArray::new(name, vec![name.to_string()], values);
        }
        Err(EkmanError::variable_not_found(name))
    }

    /// Select by label along `name`, falling back to the nearest label when
    /// there is no exact match.
    ///
    /// `name` is either a dimension of `array` or a one-dimensional
    /// coordinate over one of its dimensions.
    pub fn sel(&self, array: &DataArray, name: &str, label: f64) -> Result<DataArray> {
        let (dim, labels) = if array.has_dim(name) {
            (name.to_string(), self.labels(name))
        } else {
            match self.variable(name) {
                Some(coord) if coord.ndim() == 1 && array.has_dim(&coord.dims[0]) => {
                    (coord.dims[0].clone(), coord.values.iter().copied().collect())
                },
                _ => {
                    return Err(EkmanError::Selection(format!(
                        "cannot select '{}' on '{}'",
                        name, array.name
                    )))
                },
            }
        };

        let index = labels
            .iter()
            .position(|&l| l == label)
            .or_else(|| nearest(&labels, label))
            .ok_or_else(|| EkmanError::Selection(format!("no label near {} on '{}'", label, name)))?;
        array.isel(&dim, index)
    }
}

/// Position of the label closest to `target`, ignoring NaN labels.
pub fn nearest(labels: &[f64], target: f64) -> Option<usize> {
    labels
        .iter()
        .enumerate()
        .filter(|(_, l)| !l.is_nan())
        .min_by(|(_, a), (_, b)| (*a - target).abs().total_cmp(&(*b - target).abs()))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        let mut ds = Dataset::new();
        ds.insert(Variable::from_vec("time", &["time"], &[3], vec![0.0, 6.0, 12.0]).unwrap())
            .unwrap();
        ds.insert(
            Variable::from_vec("temp", &["time", "nx"], &[3, 2], vec![1., 2., 3., 4., 5., 6.])
                .unwrap(),
        )
        .unwrap();
        ds.insert(Variable::from_vec("xc", &["nx"], &[2], vec![10.0, 20.0]).unwrap())
            .unwrap();
        ds
    }

    #[test]
    fn index_coordinates_are_detected() {
        let ds = sample();
        assert!(ds.is_indexed("time"));
        assert!(!ds.is_coord("xc"));
        assert_eq!(ds.dims(), ["time", "nx"]);
        assert_eq!(ds.labels("nx"), [0.0, 1.0]);
        assert_eq!(ds.labels("time"), [0.0, 6.0, 12.0]);
    }

    #[test]
    fn set_and_reset_coords() {
        let mut ds = sample();
        ds.set_coords(&["xc", "missing"]);
        assert_eq!(ds.coord_names(), ["time", "xc"]);
        assert_eq!(ds.non_indexed_coords("temp"), ["xc"]);
        assert_eq!(ds.var_coords("temp"), ["time", "xc"]);

        ds.reset_coords();
        assert_eq!(ds.coord_names(), ["time"]);
        assert_eq!(ds.data_var_names(), ["temp", "xc"]);
    }

    #[test]
    fn inconsistent_dimension_is_rejected() {
        let mut ds = sample();
        let bad = Variable::from_vec("bad", &["nx"], &[3], vec![0.0; 3]).unwrap();
        assert!(ds.insert(bad).is_err());
    }

    #[test]
    fn sel_exact_then_nearest() {
        let ds = sample();
        let temp = ds.array("temp").unwrap();
        assert_eq!(ds.sel(&temp, "time", 6.0).unwrap().to_vec(), [3.0, 4.0]);
        assert_eq!(ds.sel(&temp, "time", 10.0).unwrap().to_vec(), [5.0, 6.0]);
        assert_eq!(ds.sel(&temp, "xc", 19.0).unwrap().to_vec(), [2.0, 4.0, 6.0]);
        assert!(ds.sel(&temp, "sigma", 0.0).is_err());
    }

    #[test]
    fn bare_dimension_as_array() {
        let ds = sample();
        let nx = ds.array("nx").unwrap();
        assert_eq!(nx.dims, ["nx"]);
        assert_eq!(ds.dims_of("nx"), ["nx"]);
        assert!(ds.array("nope").is_err());
    }
}
