//! Labeled n-dimensional arrays and the reductions the dashboard applies.

use crate::error::{EkmanError, Result};
use ndarray::{ArrayD, Axis, Dimension, IxDyn};

/// Reduction applied along one dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// Arithmetic mean of finite values.
    Mean,
    /// Maximum of finite values.
    Max,
    /// Minimum of finite values.
    Min,
    /// Median of finite values.
    Median,
    /// Population standard deviation of finite values.
    Std,
    /// Number of non-NaN values.
    Count,
}

impl Reduction {
    /// Reduction name.
    pub fn name(self) -> &'static str {
        match self {
            Reduction::Mean => "mean",
            Reduction::Max => "max",
            Reduction::Min => "min",
            Reduction::Median => "median",
            Reduction::Std => "std",
            Reduction::Count => "count",
        }
    }

    /// Reduce a lane of values. NaN entries are skipped; a lane without any
    /// valid value reduces to NaN, except for `Count` which gives zero.
    pub fn apply(self, lane: impl Iterator<Item = f64>) -> f64 {
        let mut values: Vec<f64> = lane.filter(|v| !v.is_nan()).collect();
        if self == Reduction::Count {
            return values.len() as f64;
        }
        if values.is_empty() {
            return f64::NAN;
        }

        let n = values.len() as f64;
        match self {
            Reduction::Mean => values.iter().sum::<f64>() / n,
            Reduction::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Reduction::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Reduction::Median => {
                values.sort_by(f64::total_cmp);
                let mid = values.len() / 2;
                if values.len() % 2 == 0 {
                    (values[mid - 1] + values[mid]) / 2.0
                } else {
                    values[mid]
                }
            },
            Reduction::Std => {
                let mean = values.iter().sum::<f64>() / n;
                let ssd: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
                (ssd / n).sqrt()
            },
            Reduction::Count => unreachable!("handled above"),
        }
    }
}

/// Named array with one name per axis.
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray {
    /// Array name.
    pub name: String,
    /// Dimension names, one per axis.
    pub dims: Vec<String>,
    /// Values.
    pub values: ArrayD<f64>,
}

impl DataArray {
    /// Create an array, checking that every axis is named.
    pub fn new(name: impl Into<String>, dims: Vec<String>, values: ArrayD<f64>) -> Result<Self> {
        let name = name.into();
        if dims.len() != values.ndim() {
            return Err(EkmanError::shape_mismatch(
                name,
                format!("{} dims for {}-d data", dims.len(), values.ndim()),
            ));
        }
        Ok(Self { name, dims, values })
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Shape of the data.
    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    /// Axis position of a dimension.
    pub fn axis_of(&self, dim: &str) -> Result<usize> {
        self.dims
            .iter()
            .position(|d| d == dim)
            .ok_or_else(|| EkmanError::dimension_not_found(&self.name, dim))
    }

    /// Check whether the array spans `dim`.
    pub fn has_dim(&self, dim: &str) -> bool {
        self.dims.iter().any(|d| d == dim)
    }

    /// Reduce along `dim`, dropping it.
    pub fn reduce(&self, dim: &str, reduction: Reduction) -> Result<DataArray> {
        let axis = self.axis_of(dim)?;
        let values = self
            .values
            .map_axis(Axis(axis), |lane| reduction.apply(lane.iter().copied()));
        let mut dims = self.dims.clone();
        dims.remove(axis);
        Ok(DataArray {
            name: self.name.clone(),
            dims,
            values,
        })
    }

    /// Select one position along `dim`, dropping it.
    pub fn isel(&self, dim: &str, index: usize) -> Result<DataArray> {
        let axis = self.axis_of(dim)?;
        let len = self.values.len_of(Axis(axis));
        if index >= len {
            return Err(EkmanError::Selection(format!(
                "index {} out of bounds for '{}' of length {}",
                index, dim, len
            )));
        }
        let mut dims = self.dims.clone();
        dims.remove(axis);
        Ok(DataArray {
            name: self.name.clone(),
            dims,
            values: self.values.index_axis(Axis(axis), index).to_owned(),
        })
    }

    /// Apply `f` to every element.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> DataArray {
        DataArray {
            name: self.name.clone(),
            dims: self.dims.clone(),
            values: self.values.mapv(f),
        }
    }

    /// Reorder axes to follow `order`, which must name every dimension.
    pub fn transpose(&self, order: &[&str]) -> Result<DataArray> {
        if order.len() != self.ndim() {
            return Err(EkmanError::shape_mismatch(
                &self.name,
                format!("cannot transpose {:?} to {:?}", self.dims, order),
            ));
        }
        let axes = order
            .iter()
            .map(|d| self.axis_of(d))
            .collect::<Result<Vec<_>>>()?;
        Ok(DataArray {
            name: self.name.clone(),
            dims: order.iter().map(|d| d.to_string()).collect(),
            values: self.values.clone().permuted_axes(IxDyn(&axes)),
        })
    }

    /// Linear-interpolated quantiles of the non-NaN values.
    ///
    /// Returns `None` when there is no valid value.
    pub fn quantiles(&self, qs: &[f64]) -> Option<Vec<f64>> {
        let mut sorted: Vec<f64> = self.values.iter().copied().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let last = (sorted.len() - 1) as f64;
        Some(
            qs.iter()
                .map(|q| {
                    let pos = q.clamp(0.0, 1.0) * last;
                    let lo = pos.floor() as usize;
                    let hi = pos.ceil() as usize;
                    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
                })
                .collect(),
        )
    }

    /// Minimum and maximum of the finite values.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Multi-index of the smallest non-NaN value.
    pub fn argmin(&self) -> Option<Vec<usize>> {
        self.values
            .indexed_iter()
            .filter(|(_, v)| !v.is_nan())
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(idx, _)| idx.slice().to_vec())
    }

    /// Values of a 1-d array.
    pub fn to_vec(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }
}
