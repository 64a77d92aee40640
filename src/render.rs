//! Plot renderer seam.
//!
//! The dashboard hands a [`QuadMeshRequest`] to a [`PlotRenderer`] and gets
//! back a [`Graph`]: the mesh, its axes, and one [`Slider`] for every array
//! dimension the axes do not consume. The dashboard turns those sliders into
//! its own select/player widgets.

use crate::control::Crs;
use crate::data::{nearest, DataArray};
use crate::error::{EkmanError, Result};
use ndarray::{Array2, ArrayD, Ix2, IxDyn};
use std::collections::BTreeMap;
use std::fmt;

/// Values along one plot axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisValues {
    /// Axis name (dimension or coordinate).
    pub name: String,
    /// Dimensions the values span.
    pub dims: Vec<String>,
    /// Coordinate values.
    pub values: ArrayD<f64>,
}

impl AxisValues {
    /// Wrap an array as axis values.
    pub fn from_array(array: DataArray) -> Self {
        Self {
            name: array.name,
            dims: array.dims,
            values: array.values,
        }
    }

    /// Smallest and largest finite value.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Display options of a graph.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphOptions {
    /// Title.
    pub title: String,
    /// Height.
    pub frame_height: i64,
    /// Width.
    pub frame_width: i64,
    /// Colormap name.
    pub cmap: String,
    /// Show a colorbar.
    pub colorbar: bool,
    /// Rasterize.
    pub rasterize: bool,
    /// Colormap limits.
    pub color_range: (f64, f64),
}

/// Geographic overlay of a graph.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoOverlay {
    /// CRS of the data.
    pub crs: Crs,
    /// Output projection.
    pub projection: Option<Crs>,
    /// Basemap tiles.
    pub basemap: Option<String>,
    /// Overlaid features.
    pub features: Vec<String>,
    /// Mesh opacity.
    pub alpha: f64,
    /// Project before plotting.
    pub project: bool,
    /// Span the whole globe.
    pub global_extent: bool,
}

/// Everything a renderer needs to draw a mesh.
#[derive(Debug, Clone)]
pub struct QuadMeshRequest {
    /// Values to draw.
    pub array: DataArray,
    /// Horizontal axis.
    pub x: AxisValues,
    /// Vertical axis.
    pub y: AxisValues,
    /// Display options.
    pub options: GraphOptions,
    /// Labels of the dimensions that become sliders.
    pub labels: BTreeMap<String, Vec<f64>>,
}

/// An auto-generated control stepping through one dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct Slider {
    /// Dimension.
    pub dim: String,
    /// Labels along the dimension.
    pub options: Vec<f64>,
    /// Current position.
    pub index: usize,
}

impl Slider {
    /// Current label.
    pub fn value(&self) -> f64 {
        self.options.get(self.index).copied().unwrap_or(f64::NAN)
    }
}

/// A two-dimensional view over the graph's array.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Values, rows along `rows`.
    pub values: Array2<f64>,
    /// Row dimension.
    pub rows: String,
    /// Column dimension.
    pub cols: String,
}

/// A rendered mesh with its sliders.
#[derive(Debug, Clone)]
pub struct Graph {
    /// Values, possibly with slider dimensions left.
    pub array: DataArray,
    /// Horizontal axis.
    pub x: AxisValues,
    /// Vertical axis.
    pub y: AxisValues,
    /// Display options.
    pub options: GraphOptions,
    /// Geographic overlay.
    pub geo: Option<GeoOverlay>,
    sliders: Vec<Slider>,
}

impl Graph {
    /// Sliders, one per non-axis dimension.
    pub fn sliders(&self) -> &[Slider] {
        &self.sliders
    }

    /// Move a slider to the label closest to `value`.
    pub fn set_slider(&mut self, dim: &str, value: f64) -> bool {
        let Some(slider) = self.sliders.iter_mut().find(|s| s.dim == dim) else {
            return false;
        };
        match nearest(&slider.options, value) {
            Some(index) => {
                slider.index = index;
                true
            },
            None => false,
        }
    }

    /// The 2-d frame for the current slider positions, rows along `y`.
    pub fn frame(&self) -> Result<Frame> {
        let mut array = self.array.clone();
        for slider in &self.sliders {
            array = array.isel(&slider.dim, slider.index)?;
        }
        if array.ndim() != 2 {
            return Err(EkmanError::Render(format!(
                "expected a 2-d frame, got dims {:?}",
                array.dims
            )));
        }

        let rows = self
            .y
            .dims
            .first()
            .filter(|d| array.has_dim(d))
            .cloned()
            .unwrap_or_else(|| array.dims[0].clone());
        let cols = array
            .dims
            .iter()
            .find(|d| **d != rows)
            .cloned()
            .ok_or_else(|| EkmanError::Render("frame needs two distinct dims".to_string()))?;
        let array = array.transpose(&[rows.as_str(), cols.as_str()])?;
        let values = array
            .values
            .into_dimensionality::<Ix2>()
            .map_err(|e| EkmanError::Render(e.to_string()))?;
        Ok(Frame { values, rows, cols })
    }

    /// Data coordinates of the frame cell at `(row, col)`.
    pub fn locate(&self, frame: &Frame, row: usize, col: usize) -> Option<(f64, f64)> {
        let at = |axis: &AxisValues| -> Option<f64> {
            let index: Vec<usize> = axis
                .dims
                .iter()
                .map(|d| {
                    if *d == frame.rows {
                        Some(row)
                    } else if *d == frame.cols {
                        Some(col)
                    } else {
                        None
                    }
                })
                .collect::<Option<_>>()?;
            axis.values.get(IxDyn(&index)).copied()
        };
        Some((at(&self.x)?, at(&self.y)?))
    }
}

/// Draws meshes.
pub trait PlotRenderer: fmt::Debug {
    /// Build a graph for the request.
    fn quadmesh(&self, request: QuadMeshRequest) -> Result<Graph>;
}

/// Default renderer: validates the geometry and derives the sliders.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuadMeshRenderer;

impl PlotRenderer for QuadMeshRenderer {
    fn quadmesh(&self, request: QuadMeshRequest) -> Result<Graph> {
        let QuadMeshRequest {
            array,
            x,
            y,
            options,
            labels,
        } = request;

        for axis in [&x, &y] {
            for (dim, &len) in axis.dims.iter().zip(axis.values.shape()) {
                let axis_index = array.axis_of(dim).map_err(|_| {
                    EkmanError::Render(format!(
                        "axis '{}' spans '{}', which '{}' lacks",
                        axis.name, dim, array.name
                    ))
                })?;
                if array.shape()[axis_index] != len {
                    return Err(EkmanError::Render(format!(
                        "axis '{}' has {} values along '{}', data has {}",
                        axis.name,
                        len,
                        dim,
                        array.shape()[axis_index]
                    )));
                }
            }
        }

        let sliders = array
            .dims
            .iter()
            .zip(array.shape())
            .filter(|(dim, _)| !x.dims.contains(*dim) && !y.dims.contains(*dim))
            .map(|(dim, &len)| Slider {
                dim: dim.clone(),
                options: labels
                    .get(dim)
                    .cloned()
                    .unwrap_or_else(|| (0..len).map(|i| i as f64).collect()),
                index: 0,
            })
            .collect();

        Ok(Graph {
            array,
            x,
            y,
            options,
            geo: None,
            sliders,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(name: &str, values: Vec<f64>) -> AxisValues {
        let n = values.len();
        AxisValues {
            name: name.into(),
            dims: vec![name.into()],
            values: ArrayD::from_shape_vec(IxDyn(&[n]), values).unwrap(),
        }
    }

    fn options() -> GraphOptions {
        GraphOptions {
            title: "temp".into(),
            frame_height: 300,
            frame_width: 450,
            cmap: "Inferno".into(),
            colorbar: true,
            rasterize: true,
            color_range: (0.0, 1.0),
        }
    }

    fn request() -> QuadMeshRequest {
        // (time, nx, ny) = (2, 3, 2)
        let values = ArrayD::from_shape_vec(IxDyn(&[2, 3, 2]), (0..12).map(f64::from).collect()).unwrap();
        let array = DataArray::new("temp", vec!["time".into(), "nx".into(), "ny".into()], values).unwrap();
        let mut labels = BTreeMap::new();
        labels.insert("time".to_string(), vec![0.0, 6.0]);
        QuadMeshRequest {
            array,
            x: axis("nx", vec![0.0, 1.0, 2.0]),
            y: axis("ny", vec![0.0, 1.0]),
            options: options(),
            labels,
        }
    }

    #[test]
    fn sliders_for_leftover_dims() {
        let graph = QuadMeshRenderer.quadmesh(request()).unwrap();
        assert_eq!(graph.sliders().len(), 1);
        assert_eq!(graph.sliders()[0].dim, "time");
        assert_eq!(graph.sliders()[0].options, [0.0, 6.0]);
    }

    #[test]
    fn frame_follows_slider_with_rows_along_y() {
        let mut graph = QuadMeshRenderer.quadmesh(request()).unwrap();
        let frame = graph.frame().unwrap();
        assert_eq!(frame.rows, "ny");
        assert_eq!(frame.values.dim(), (2, 3));
        assert_eq!(frame.values[[1, 2]], 5.0);

        assert!(graph.set_slider("time", 5.0));
        let frame = graph.frame().unwrap();
        assert_eq!(frame.values[[0, 0]], 6.0);
        assert_eq!(graph.locate(&frame, 1, 2), Some((2.0, 1.0)));
    }

    #[test]
    fn mismatched_axis_is_rejected() {
        let mut req = request();
        req.x = axis("nx", vec![0.0, 1.0]);
        assert!(QuadMeshRenderer.quadmesh(req).is_err());

        let mut req = request();
        req.y = axis("sigma", vec![0.0, 1.0]);
        assert!(QuadMeshRenderer.quadmesh(req).is_err());
    }
}
