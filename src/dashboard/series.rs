//! Tap markers and series extraction.
//!
//! A tap lands in data coordinates of the plot axes. It is resolved to one
//! point of the variable, and the values along the extract-along dimension
//! at that point become a curve. Other remaining dimensions are fixed at
//! the current index selector value, or at their first label when they
//! were aggregated.

use super::Dashboard;
use crate::error::{EkmanError, Result};
use ndarray::Zip;
use tracing::{debug, warn};

/// Marker and curve colours, used round-robin.
pub const TAP_COLORS: [&str; 11] = [
    "#60fffc", "#6da252", "#ff60d4", "#ff9400", "#f4e322", "#229cf4", "#af9862", "#629baf",
    "#7eed5a", "#e29ec8", "#ff4300",
];

/// Endless round-robin over [`TAP_COLORS`].
#[derive(Debug, Clone, Default)]
pub struct ColorCycle {
    next: usize,
}

impl Iterator for ColorCycle {
    type Item = &'static str;

    fn next(&mut self) -> Option<Self::Item> {
        let color = TAP_COLORS[self.next % TAP_COLORS.len()];
        self.next = self.next.wrapping_add(1);
        Some(color)
    }
}

/// A marker where the user tapped.
#[derive(Debug, Clone, PartialEq)]
pub struct Tap {
    /// Horizontal position, in x-axis units.
    pub x: f64,
    /// Vertical position, in y-axis units.
    pub y: f64,
    /// Marker colour.
    pub color: &'static str,
}

/// A series extracted at a tap.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesCurve {
    /// Variable the values come from.
    pub variable: String,
    /// Dimension the series runs along.
    pub along: String,
    /// Curve colour, matching its marker.
    pub color: &'static str,
    /// `(label, value)` pairs along `along`.
    pub points: Vec<(f64, f64)>,
    /// Labels the other dimensions were fixed at.
    pub fixed: Vec<(String, f64)>,
}

impl SeriesCurve {
    /// Hover text rows.
    pub fn tooltips(&self) -> Vec<(String, String)> {
        let mut rows = vec![
            (self.along.clone(), format!("@{}", self.along)),
            (self.variable.clone(), format!("@{}", self.variable)),
        ];
        rows.extend(self.fixed.iter().map(|(dim, v)| (dim.clone(), v.to_string())));
        rows
    }
}

impl Dashboard {
    /// Tap the plot at `(x, y)` in axis coordinates.
    ///
    /// Returns `true` when a series was added.
    pub fn tap(&mut self, x: f64, y: f64) -> bool {
        if !self.tap_enabled {
            debug!(x, y, "tap ignored, extraction not available");
            return false;
        }
        let color = self.colors.next().unwrap_or(TAP_COLORS[0]);
        self.taps.push(Tap { x, y, color });

        let Some(along) = self.control.fields.kwargs(&self.bus).extract_along else {
            self.taps.clear();
            return false;
        };
        match self.extract_series(x, y, &along, color) {
            Ok(Some(curve)) => {
                debug!(along = %along, points = curve.points.len(), "series extracted");
                self.series.push(curve);
                true
            },
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, x, y, "series extraction failed");
                false
            },
        }
    }

    fn extract_series(&self, x: f64, y: f64, along: &str, color: &'static str) -> Result<Option<SeriesCurve>> {
        let kwargs = self
            .plot_kwargs
            .as_ref()
            .ok_or_else(|| EkmanError::Selection("nothing plotted".to_string()))?;
        let var = kwargs
            .variable
            .as_deref()
            .ok_or_else(|| EkmanError::Selection("no variable plotted".to_string()))?;
        let fields = &kwargs.fields;
        let (Some(x_name), Some(y_name)) = (fields.axes.x.as_deref(), fields.axes.y.as_deref()) else {
            return Err(EkmanError::Selection("plot has no axes".to_string()));
        };

        let fixed: Vec<(String, f64)> = fields
            .remaining_dims
            .iter()
            .filter(|dim| dim.as_str() != along)
            .map(|dim| {
                let label = self
                    .index_selector(dim)
                    .and_then(|id| self.bus.value(id).as_f64())
                    .or_else(|| self.data.labels(dim).first().copied())
                    .unwrap_or(0.0);
                (dim.clone(), label)
            })
            .collect();

        let mut array = self.data.get(var)?.to_array();
        let x_dims = self.data.dims_of(x_name);
        let y_dims = self.data.dims_of(y_name);

        if !fields.are_axes_coordinates || (x_dims.len() == 1 && y_dims.len() == 1) {
            array = self.data.sel(&array, x_name, x)?;
            array = self.data.sel(&array, y_name, y)?;
        } else if x_dims.len() == 2 && same_dims(&x_dims, &y_dims) {
            let Some(index) = self.nearest_point(x_name, y_name, x, y)? else {
                return Ok(None);
            };
            for (dim, i) in x_dims.iter().zip(index) {
                array = array.isel(dim, i)?;
            }
        } else {
            debug!(x = x_name, y = y_name, "cannot extract along 2-d coordinates with different dims");
            return Ok(None);
        }

        for (dim, label) in &fixed {
            array = self.data.sel(&array, dim, *label)?;
        }
        if array.dims != [along] {
            return Err(EkmanError::Selection(format!(
                "expected a series along '{}', got dims {:?}",
                along, array.dims
            )));
        }

        Ok(Some(SeriesCurve {
            variable: var.to_string(),
            along: along.to_string(),
            color,
            points: self.data.labels(along).into_iter().zip(array.to_vec()).collect(),
            fixed,
        }))
    }

    /// Position, over `x_name`'s dims, of the grid point closest to the
    /// tap. Longitude differences shrink with the cosine of the mean
    /// latitude.
    fn nearest_point(&self, x_name: &str, y_name: &str, x: f64, y: f64) -> Result<Option<Vec<usize>>> {
        let xs = self.data.array(x_name)?;
        let order: Vec<&str> = xs.dims.iter().map(String::as_str).collect();
        let ys = self.data.array(y_name)?.transpose(&order)?;
        if xs.shape() != ys.shape() {
            return Ok(None);
        }

        let valid: Vec<f64> = ys.to_vec().into_iter().filter(|v| !v.is_nan()).collect();
        if valid.is_empty() {
            return Ok(None);
        }
        let cos = (valid.iter().sum::<f64>() / valid.len() as f64).to_radians().cos();

        let mut distance = xs.clone();
        distance.values = Zip::from(&xs.values)
            .and(&ys.values)
            .map_collect(|&xv, &yv| (yv - y).powi(2) + ((xv - x) * cos).powi(2));
        Ok(distance.argmin())
    }
}

fn same_dims(a: &[String], b: &[String]) -> bool {
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort();
    b.sort();
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_cycle_round_robin() {
        let colors: Vec<_> = ColorCycle::default().take(TAP_COLORS.len() + 2).collect();
        assert_eq!(colors[0], "#60fffc");
        assert_eq!(colors[TAP_COLORS.len()], "#60fffc");
        assert_eq!(colors[TAP_COLORS.len() + 1], "#6da252");
    }

    #[test]
    fn tooltips_list_fixed_dims() {
        let curve = SeriesCurve {
            variable: "temp".into(),
            along: "time".into(),
            color: TAP_COLORS[0],
            points: vec![(0.0, 1.0)],
            fixed: vec![("sigma".into(), 0.5)],
        };
        assert_eq!(
            curve.tooltips(),
            vec![
                ("time".to_string(), "@time".to_string()),
                ("temp".to_string(), "@temp".to_string()),
                ("sigma".to_string(), "0.5".to_string()),
            ]
        );
    }
}
