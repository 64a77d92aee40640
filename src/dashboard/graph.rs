//! Graph creation.
//!
//! Coordinate axes: aggregate, rescale, resolve limits, then hand the
//! array to the renderer and turn its sliders into index selectors.
//!
//! Raw dimension axes: build one index selector per select/animate
//! dimension up front, and re-render the selected 2-d slice whenever one
//! of them changes.

use super::Dashboard;
use crate::control::{parse_params, Disposition, FieldsKwargs, Kwargs, StyleOptions};
use crate::data::DataArray;
use crate::error::{EkmanError, Result};
use crate::render::{AxisValues, GeoOverlay, Graph, GraphOptions, QuadMeshRequest};
use crate::sigslot::Observer;
use crate::widget::{Attr, Value, Widget};
use std::collections::BTreeMap;
use tracing::{debug, error, info, warn};

/// Signal name of the render-side selector for `dim`.
pub fn index_signal(dim: &str) -> String {
    format!("index:{}", dim)
}

/// 10th and 90th percentiles, which balance the colormap better than the
/// extremes.
pub fn cmap_limits(array: &DataArray) -> Option<(f64, f64)> {
    match array.quantiles(&[0.1, 0.9])?.as_slice() {
        [lo, hi] => Some((*lo, *hi)),
        _ => None,
    }
}

fn rounded(v: f64) -> String {
    ((v * 1e5).round() / 1e5).to_string()
}

fn aggregate(mut array: DataArray, fields: &FieldsKwargs) -> Result<DataArray> {
    for dim in &fields.dims_to_aggregate {
        if let Some(reduction) = fields.dispositions.get(dim).and_then(Disposition::reduction) {
            array = array.reduce(dim, reduction)?;
        }
    }
    Ok(array)
}

impl Dashboard {
    pub(super) fn create_graph(&mut self) {
        if let Err(e) = self.try_create_graph() {
            error!(error = %e, "failed to create graph");
            self.render_error = Some(e.to_string());
        }
    }

    fn try_create_graph(&mut self) -> Result<()> {
        let kwargs = self.kwargs();
        let var = kwargs
            .variable
            .clone()
            .ok_or_else(|| EkmanError::Render("no variable selected".to_string()))?;

        for (_, id) in std::mem::take(&mut self.index_selectors) {
            self.bus.remove_widget(id);
        }
        self.graph = None;
        self.series.clear();
        self.taps.clear();
        self.plot_kwargs = Some(kwargs.clone());

        let coordinate_axes = kwargs.fields.are_axes_coordinates;
        if coordinate_axes {
            self.create_coordinate_graph(&var, &kwargs)?;
        } else {
            self.create_index_selectors(&var, &kwargs.fields);
            self.try_create_indexed_graph()?;
        }

        let ndim = self.data.get(&var)?.ndim();
        self.tap_enabled = ndim > 2 && kwargs.fields.extract_along.is_some();
        let clear = self.clear_series_button;
        let disabled = !self.tap_enabled;
        self.set(clear, Attr::Disabled, disabled);

        info!(
            variable = %var,
            coordinate_axes,
            selectors = self.index_selectors.len(),
            tap = self.tap_enabled,
            "graph created"
        );
        Ok(())
    }

    fn axes(&self, fields: &FieldsKwargs) -> Result<(AxisValues, AxisValues)> {
        let name = |axis: &Option<String>, which: &str| {
            axis.clone()
                .ok_or_else(|| EkmanError::Render(format!("no {} axis selected", which)))
        };
        let x = self.data.array(&name(&fields.axes.x, "x")?)?;
        let y = self.data.array(&name(&fields.axes.y, "y")?)?;
        Ok((AxisValues::from_array(x), AxisValues::from_array(y)))
    }

    /// Limits typed by the user, else percentiles of `array`, written back
    /// to the style pane.
    fn resolve_limits(&mut self, array: &DataArray, style: &StyleOptions) -> (f64, f64) {
        if let Some(limits) = style.user_limits() {
            return limits;
        }
        let limits = cmap_limits(array).unwrap_or_else(|| {
            warn!(array = %array.name, "no valid values for colormap limits");
            (0.0, 1.0)
        });
        let (lower, upper) = (self.control.style.lower_limit, self.control.style.upper_limit);
        self.set_value(lower, rounded(limits.0));
        self.set_value(upper, rounded(limits.1));
        debug!(lower = limits.0, upper = limits.1, "colormap limits filled in");
        limits
    }

    fn graph_options(var: &str, style: &StyleOptions, color_range: (f64, f64)) -> GraphOptions {
        GraphOptions {
            title: var.to_string(),
            frame_height: style.frame_height,
            frame_width: style.frame_width,
            cmap: style.cmap.clone(),
            colorbar: style.colorbar,
            rasterize: style.rasterize,
            color_range,
        }
    }

    fn prepared(&self, var: &str, fields: &FieldsKwargs) -> Result<DataArray> {
        let mut array = aggregate(self.data.get(var)?.to_array(), fields)?;
        if self.data.is_coord(&array.name) {
            // Plotted against itself.
            array.name.push('_');
        }
        Ok(array)
    }

    fn select(&self, array: DataArray, selection: &[(String, f64)]) -> Result<DataArray> {
        selection
            .iter()
            .try_fold(array, |array, (dim, label)| self.data.sel(&array, dim, *label))
    }

    fn create_coordinate_graph(&mut self, var: &str, kwargs: &Kwargs) -> Result<()> {
        let (fields, style) = (&kwargs.fields, &kwargs.style);
        let scale = style.color_scale;
        let sel_data = self.prepared(var, fields)?.map(|v| scale.apply(v));

        let limits = if style.use_all_data {
            self.resolve_limits(&sel_data, style)
        } else {
            let mut first = sel_data.clone();
            for dim in &fields.dims_to_select_animate {
                first = first.isel(dim, 0)?;
            }
            self.resolve_limits(&first, style)
        };

        let labels: BTreeMap<String, Vec<f64>> = fields
            .dims_to_select_animate
            .iter()
            .map(|dim| (dim.clone(), self.data.labels(dim)))
            .collect();
        let (x, y) = self.axes(fields)?;
        let mut graph = self.renderer.quadmesh(QuadMeshRequest {
            array: sel_data,
            x,
            y,
            options: Self::graph_options(var, style, limits),
            labels,
        })?;
        graph.geo = self.geo_overlay(kwargs)?;
        self.create_selectors_players(&graph, fields);
        self.graph = Some(graph);
        Ok(())
    }

    fn geo_overlay(&self, kwargs: &Kwargs) -> Result<Option<GeoOverlay>> {
        let (Some(opts), Some(provider)) = (&kwargs.projection, self.projection_provider.as_deref())
        else {
            return Ok(None);
        };
        if !opts.is_geo {
            return Ok(None);
        }

        let crs = provider.crs(&opts.crs, &parse_params(&opts.crs_params)?)?;
        let projection = match (&opts.basemap, &opts.projection) {
            (None, Some(name)) => Some(provider.projection(name, &parse_params(&opts.projection_params)?)?),
            _ => None,
        };
        Ok(Some(GeoOverlay {
            crs,
            projection,
            basemap: opts.basemap.clone(),
            features: opts
                .features
                .iter()
                .filter(|f| f.as_str() != "None")
                .cloned()
                .collect(),
            alpha: opts.alpha,
            project: opts.project,
            global_extent: opts.global_extent,
        }))
    }

    fn index_widget(dim: &str, options: Vec<Value>, disposition: Option<Disposition>) -> Widget {
        match disposition {
            Some(Disposition::Animate) => Widget::player(dim, options),
            _ => {
                let first = options.first().cloned().unwrap_or_default();
                Widget::select(dim, options).with_value(first)
            },
        }
    }

    /// Replace the renderer's sliders with our own selectors and players.
    fn create_selectors_players(&mut self, graph: &Graph, fields: &FieldsKwargs) {
        for slider in graph.sliders() {
            if !fields.dims_to_select_animate.contains(&slider.dim) {
                continue;
            }
            let dim = slider.dim.clone();
            let options = slider.options.iter().map(|&v| Value::Float(v)).collect();
            let widget = Self::index_widget(&dim, options, fields.dispositions.get(&dim))
                .with_value(slider.value());
            let id = self.bus.add_widget(widget);
            let signal = index_signal(&dim);
            self.bus.register(Some(id), signal.as_str(), Attr::Value);
            self.bus.connect(&signal, move |d: &mut Dashboard, v: &Value| {
                if let (Some(graph), Some(label)) = (d.graph.as_mut(), v.as_f64()) {
                    graph.set_slider(&dim, label);
                }
            });
            self.index_selectors.push((slider.dim.clone(), id));
        }
    }

    fn create_index_selectors(&mut self, var: &str, fields: &FieldsKwargs) {
        for dim in &fields.dims_to_select_animate {
            let options = self.data.labels(dim).into_iter().map(Value::Float).collect();
            let widget = Self::index_widget(dim, options, fields.dispositions.get(dim));
            let id = self.bus.add_widget(widget);
            let signal = index_signal(dim);
            self.bus.register(Some(id), signal.as_str(), Attr::Value);
            self.bus.connect(&signal, |d: &mut Dashboard, _: &Value| d.create_indexed_graph());
            self.index_selectors.push((dim.clone(), id));
        }
        debug!(variable = var, selectors = self.index_selectors.len(), "index selectors created");
    }

    fn create_indexed_graph(&mut self) {
        if let Err(e) = self.try_create_indexed_graph() {
            error!(error = %e, "failed to update graph");
            self.render_error = Some(e.to_string());
        }
    }

    /// Render the 2-d slice for the current index selection. Axes and
    /// dispositions come from the plot snapshot, styling from the panes.
    fn try_create_indexed_graph(&mut self) -> Result<()> {
        let Some(kwargs) = self.plot_kwargs.clone() else {
            return Ok(());
        };
        let var = kwargs
            .variable
            .clone()
            .ok_or_else(|| EkmanError::Render("no variable selected".to_string()))?;
        let style = self.control.style.kwargs(&self.bus);
        let selection: Vec<(String, f64)> = self
            .index_selectors
            .iter()
            .filter_map(|(dim, id)| Some((dim.clone(), self.bus.value(*id).as_f64()?)))
            .collect();

        let mut sel_data = self.prepared(&var, &kwargs.fields)?;
        if !style.use_all_data {
            sel_data = self.select(sel_data, &selection)?;
        }
        let scale = style.color_scale;
        sel_data = sel_data.map(|v| scale.apply(v));
        let limits = self.resolve_limits(&sel_data, &style);
        if style.use_all_data {
            sel_data = self.select(sel_data, &selection)?;
        }

        let (x, y) = self.axes(&kwargs.fields)?;
        let graph = self.renderer.quadmesh(QuadMeshRequest {
            array: sel_data,
            x,
            y,
            options: Self::graph_options(&var, &style, limits),
            labels: BTreeMap::new(),
        })?;
        self.graph = Some(graph);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{ArrayD, IxDyn};

    #[test]
    fn limits_are_the_10th_and_90th_percentiles() {
        let values = ArrayD::from_shape_vec(IxDyn(&[11]), (0..=10).map(f64::from).collect()).unwrap();
        let array = DataArray::new("a", vec!["n".into()], values).unwrap();
        assert_eq!(cmap_limits(&array), Some((1.0, 9.0)));

        let empty = DataArray::new(
            "a",
            vec!["n".into()],
            ArrayD::from_shape_vec(IxDyn(&[2]), vec![f64::NAN, f64::NAN]).unwrap(),
        )
        .unwrap();
        assert_eq!(cmap_limits(&empty), None);
    }

    #[test]
    fn written_back_limits_keep_five_decimals() {
        assert_eq!(rounded(0.123456789), "0.12346");
        assert_eq!(rounded(-3.0), "-3");
    }
}
