//! Axis selection and dimension dispositions.
//!
//! For the selected variable the pane offers its dimensions plus its
//! non-indexed coordinates as axis candidates. Choosing `x` narrows the
//! options of `y` to compatible candidates, and settling `y` rebuilds one
//! disposition selector per dimension the axes leave over.
//!
//! Cascade: `x` → [`Fields::change_y`] → `y` →
//! [`Fields::change_dim_selectors`] → `remaining_dims`.

use super::kwargs::{AxisSelection, Disposition, DispositionMap, FieldsKwargs};
use crate::config::InitialParams;
use crate::dashboard::Dashboard;
use crate::sigslot::{Observer, SigSlot, WidgetId};
use crate::widget::{options_from, Attr, Value, Widget};
use tracing::{debug, warn};

/// Anonymous signal emitted after the disposition selectors are rebuilt.
pub const REMAINING_DIMS: &str = "remaining_dims";

/// Signal name of the disposition selector for `dim`.
pub fn agg_signal(dim: &str) -> String {
    format!("agg:{}", dim)
}

/// Axis and disposition pane.
#[derive(Debug, Clone)]
pub struct Fields {
    /// Horizontal axis select.
    pub x: WidgetId,
    /// Vertical axis select.
    pub y: WidgetId,
    /// Extract-along select.
    pub series_selector: WidgetId,
    agg_selectors: Vec<(String, WidgetId)>,
    var: Option<String>,
    var_dims: Vec<String>,
    non_indexed_coords: Vec<String>,
    sel_options: Vec<String>,
    guess: Option<(String, String)>,
    remaining_dims: Vec<String>,
    are_var_coords: bool,
}

impl Fields {
    pub(crate) fn new(bus: &mut SigSlot<Dashboard>) -> Self {
        let x = bus.add_widget(Widget::select("x", Vec::new()));
        let y = bus.add_widget(Widget::select("y", Vec::new()));
        let series_selector = bus.add_widget(Widget::select("extract along", vec![Value::None]));
        bus.register(Some(x), "x", Attr::Value);
        bus.register(Some(y), "y", Attr::Value);
        bus.register(Some(series_selector), "extract_along", Attr::Value);
        bus.register(None, REMAINING_DIMS, Attr::Value);

        bus.connect("x", |d: &mut Dashboard, _: &Value| Fields::change_y(d));
        bus.connect("y", |d: &mut Dashboard, _: &Value| Fields::change_dim_selectors(d));

        Self {
            x,
            y,
            series_selector,
            agg_selectors: Vec::new(),
            var: None,
            var_dims: Vec::new(),
            non_indexed_coords: Vec::new(),
            sel_options: Vec::new(),
            guess: None,
            remaining_dims: Vec::new(),
            are_var_coords: false,
        }
    }

    /// Fill the axis candidates for `var` and pick the initial axes.
    pub(crate) fn setup(d: &mut Dashboard, var: &str) {
        let Some(variable) = d.data.variable(var) else {
            warn!(variable = var, "cannot set up axes for unknown variable");
            return;
        };
        let var_dims = variable.dims.clone();
        let non_indexed_coords = d.data.non_indexed_coords(var);
        let mut sel_options: Vec<String> = var_dims
            .iter()
            .chain(&non_indexed_coords)
            .cloned()
            .collect();
        sel_options.sort();
        sel_options.dedup();
        let guess = d.guesser.as_ref().and_then(|g| g.guess(&d.data, var));
        debug!(variable = var, candidates = ?sel_options, ?guess, "axis setup");

        let x_value: Value = match &guess {
            Some((gx, _)) if sel_options.contains(gx) => gx.as_str().into(),
            _ => sel_options.first().cloned().into(),
        };

        let fields = &mut d.control.fields;
        fields.var = Some(var.to_string());
        fields.var_dims = var_dims;
        fields.non_indexed_coords = non_indexed_coords;
        fields.sel_options = sel_options.clone();
        fields.guess = guess;

        let x = fields.x;
        d.ignore_events(|d| {
            d.set(x, Attr::Options, sel_options);
            d.set_value(x, x_value);
        });
        Self::change_y(d);
    }

    /// Offer `y` the candidates compatible with `x` and pick one.
    pub(crate) fn change_y(d: &mut Dashboard) {
        let fields = &d.control.fields;
        let y_opts: Vec<String> = match d.bus.value(fields.x).as_str() {
            Some(x) => {
                let values = fields.sel_options.iter().filter(|v| v.as_str() != x);
                if fields.var_dims.iter().any(|dim| dim == x) {
                    values
                        .filter(|v| !fields.non_indexed_coords.contains(v))
                        .cloned()
                        .collect()
                } else {
                    let x_ndim = d.data.dims_of(x).len();
                    values
                        .filter(|v| !fields.var_dims.contains(v))
                        .filter(|v| d.data.dims_of(v).len() == x_ndim)
                        .cloned()
                        .collect()
                }
            },
            None => Vec::new(),
        };

        let y_value: Value = match &fields.guess {
            Some((_, gy)) if y_opts.contains(gy) => gy.as_str().into(),
            _ => y_opts.first().cloned().into(),
        };
        let y = fields.y;
        d.ignore_events(|d| {
            d.set(y, Attr::Options, y_opts);
            d.set_value(y, y_value);
        });
        Self::change_dim_selectors(d);
    }

    /// Rebuild one disposition selector per remaining dimension and reset
    /// the extract-along selector.
    pub(crate) fn change_dim_selectors(d: &mut Dashboard) {
        let fields = &d.control.fields;
        let x = d.bus.value(fields.x).as_str().map(String::from);
        let y = d.bus.value(fields.y).as_str().map(String::from);

        let mut consumed: Vec<String> = x.iter().chain(&y).cloned().collect();
        let x_is_dim = x.as_ref().map_or(true, |x| fields.var_dims.contains(x));
        if !x_is_dim {
            for axis in x.iter().chain(&y) {
                consumed.extend(d.data.dims_of(axis));
            }
        }
        let remaining: Vec<String> = fields
            .var_dims
            .iter()
            .filter(|dim| !consumed.contains(dim))
            .cloned()
            .collect();

        let are_var_coords = match (&x, &y, &fields.var) {
            (Some(x), Some(y), Some(var)) => {
                let coords = d.data.var_coords(var);
                coords.contains(x) && coords.contains(y)
            },
            _ => false,
        };

        let old = std::mem::take(&mut d.control.fields.agg_selectors);
        for (_, id) in old {
            d.bus.remove_widget(id);
        }

        let mut sorted = remaining.clone();
        sorted.sort();
        let mut agg_selectors = Vec::with_capacity(sorted.len());
        for dim in &sorted {
            let widget = Widget::select(dim.as_str(), options_from(Disposition::ALL.map(Disposition::name)))
                .with_value(Disposition::Select.name());
            let id = d.bus.add_widget(widget);
            d.bus.register(Some(id), agg_signal(dim), Attr::Value);
            agg_selectors.push((dim.clone(), id));
        }
        debug!(?x, ?y, ?remaining, are_var_coords, "disposition selectors rebuilt");

        let fields = &mut d.control.fields;
        fields.agg_selectors = agg_selectors;
        fields.remaining_dims = remaining.clone();
        fields.are_var_coords = are_var_coords;

        let series = fields.series_selector;
        let mut series_opts = vec![Value::None];
        series_opts.extend(options_from(sorted));
        d.ignore_events(|d| {
            d.set_value(series, Value::None);
            if let Some(w) = d.bus.widget_mut(series) {
                // Options include None, which a name list cannot carry.
                let _ = w.replace_options(series_opts);
            }
        });

        d.emit(REMAINING_DIMS, &Value::List(remaining));
    }

    /// Re-run setup after the coordinate set changed.
    pub(crate) fn set_coords(d: &mut Dashboard, var: Option<&str>) {
        if let Some(var) = var {
            Self::setup(d, var);
        }
    }

    pub(crate) fn setup_initial_values(d: &mut Dashboard, params: &InitialParams) {
        let (x, y) = (d.control.fields.x, d.control.fields.y);
        for (key, id) in [("x", x), ("y", y)] {
            if let Some(value) = params.get(key).and_then(Value::from_json) {
                d.set_value(id, value);
            }
        }
        for (dim, id) in d.control.fields.agg_selectors.clone() {
            if let Some(value) = params.get(&dim).and_then(Value::from_json) {
                d.set_value(id, value);
            }
        }
        if let Some(value) = params.get("extract along").and_then(Value::from_json) {
            let series = d.control.fields.series_selector;
            d.set_value(series, value);
        }
    }

    /// Disposition selectors, sorted by dimension.
    pub fn agg_selectors(&self) -> &[(String, WidgetId)] {
        &self.agg_selectors
    }

    /// Disposition selector of a dimension.
    pub fn agg_selector(&self, dim: &str) -> Option<WidgetId> {
        self.agg_selectors
            .iter()
            .find(|(d, _)| d == dim)
            .map(|(_, id)| *id)
    }

    /// Dimensions left over by the axes, in declaration order.
    pub fn remaining_dims(&self) -> &[String] {
        &self.remaining_dims
    }

    /// Both axes are coordinates of the variable.
    pub fn are_var_coords(&self) -> bool {
        self.are_var_coords
    }

    /// Snapshot of the pane.
    pub fn kwargs(&self, bus: &SigSlot<Dashboard>) -> FieldsKwargs {
        let name = |id: WidgetId| bus.value(id).as_str().map(String::from);

        let mut dispositions = DispositionMap::default();
        for (dim, id) in &self.agg_selectors {
            let disposition = bus
                .value(*id)
                .as_str()
                .and_then(Disposition::parse)
                .unwrap_or(Disposition::Select);
            dispositions.insert(dim.as_str(), disposition);
        }

        FieldsKwargs::new(
            AxisSelection {
                x: name(self.x),
                y: name(self.y),
            },
            dispositions,
            self.are_var_coords,
            self.remaining_dims.clone(),
            name(self.series_selector),
        )
    }
}
