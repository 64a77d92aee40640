//! The dashboard: control panel, plot button and the rendered output.
//!
//! [`Dashboard`] is the single root the event bus mutates. Panes keep
//! only widget handles; every slot receives `&mut Dashboard`, reads the
//! current dataset and widget values, and writes back through
//! [`Observer::set`] so changes cascade.
//!
//! Plotting follows one of two paths, chosen by whether both axes are
//! coordinates of the variable (see [`graph`]). Taps on a plot with more
//! than two dimensions extract a series along the chosen dimension (see
//! [`series`]).

mod graph;
mod series;

pub use graph::{cmap_limits, index_signal};
pub use series::{ColorCycle, SeriesCurve, Tap, TAP_COLORS};

use crate::config::InitialParams;
use crate::control::{Control, Display, Kwargs, Projection, ProjectionProvider};
use crate::data::Dataset;
use crate::error::{EkmanError, Result};
use crate::guess::AxisGuesser;
use crate::render::{Graph, PlotRenderer, QuadMeshRenderer};
use crate::sigslot::{Observer, SigSlot, WidgetId};
use crate::widget::{Attr, Value, Widget};
use tracing::{debug, info, warn};

/// Builds a [`Dashboard`] with optional collaborators.
#[derive(Debug)]
pub struct DashboardBuilder {
    data: Dataset,
    params: InitialParams,
    renderer: Box<dyn PlotRenderer>,
    projection: Option<Box<dyn ProjectionProvider>>,
    guesser: Option<Box<dyn AxisGuesser>>,
}

impl DashboardBuilder {
    /// Start from a dataset, with the default renderer and no projection
    /// or axis guessing.
    pub fn new(data: Dataset) -> Self {
        Self {
            data,
            params: InitialParams::new(),
            renderer: Box::new(QuadMeshRenderer),
            projection: None,
            guesser: None,
        }
    }

    /// Use another plot renderer.
    pub fn renderer(mut self, renderer: impl PlotRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Enable the projection pane.
    pub fn projection(mut self, provider: impl ProjectionProvider + 'static) -> Self {
        self.projection = Some(Box::new(provider));
        self
    }

    /// Guess the initial axes from metadata.
    pub fn axis_guesser(mut self, guesser: impl AxisGuesser + 'static) -> Self {
        self.guesser = Some(Box::new(guesser));
        self
    }

    /// Control values applied once the panes are set up.
    pub fn initial_params(mut self, params: InitialParams) -> Self {
        self.params = params;
        self
    }

    /// Assemble the dashboard.
    ///
    /// Fails only when the dataset has nothing to explore.
    pub fn build(self) -> Result<Dashboard> {
        if self.data.is_empty() {
            return Err(EkmanError::InvalidInput("dataset has no variables".to_string()));
        }

        let mut bus = SigSlot::new();
        let control = Control::new(&mut bus, &self.data, self.projection.as_deref());
        let plot_button = bus.add_widget(Widget::button("Plot"));
        let clear_series_button = bus.add_widget(Widget::button("Clear").disabled(true));

        bus.register(Some(plot_button), "plot_clicked", Attr::Clicks);
        bus.register(Some(control.coord_setter.coord_selector), "set_coords", Attr::Value);
        bus.register(Some(clear_series_button), "clear_series", Attr::Clicks);
        bus.connect("plot_clicked", |d: &mut Dashboard, _: &Value| d.create_graph());
        bus.connect("set_coords", |d: &mut Dashboard, v: &Value| d.set_coords(v));
        bus.connect("clear_series", |d: &mut Dashboard, _: &Value| d.clear_series());
        bus.connect("extract_along", |d: &mut Dashboard, _: &Value| d.clear_series());
        bus.connect("variable_selected", |d: &mut Dashboard, v: &Value| {
            d.check_is_plottable(v.as_str())
        });
        bus.connect(crate::control::REMAINING_DIMS, |d: &mut Dashboard, _: &Value| {
            d.link_aggregation_selectors()
        });

        let mut d = Dashboard {
            bus,
            data: self.data,
            control,
            guesser: self.guesser,
            projection_provider: self.projection,
            renderer: self.renderer,
            plot_button,
            clear_series_button,
            index_selectors: Vec::new(),
            plot_kwargs: None,
            graph: None,
            series: Vec::new(),
            taps: Vec::new(),
            colors: ColorCycle::default(),
            tap_enabled: false,
            render_error: None,
        };
        d.check_is_plottable(None);
        Projection::init(&mut d);

        let names = d.data.variable_names();
        if let [only] = names.as_slice() {
            Display::select_variable(&mut d, only);
        }
        Control::setup_initial_values(&mut d, &self.params);
        for key in self.params.keys() {
            if !d.is_known_param(key) {
                debug!(key = %key, "ignoring unrecognised initial parameter");
            }
        }

        info!(
            variables = names.len(),
            projection = d.control.projection.is_some(),
            "dashboard ready"
        );
        Ok(d)
    }
}

/// Control panel plus plot output.
#[derive(Debug)]
pub struct Dashboard {
    pub(crate) bus: SigSlot<Dashboard>,
    pub(crate) data: Dataset,
    pub(crate) control: Control,
    pub(crate) guesser: Option<Box<dyn AxisGuesser>>,
    pub(crate) projection_provider: Option<Box<dyn ProjectionProvider>>,
    renderer: Box<dyn PlotRenderer>,
    plot_button: WidgetId,
    clear_series_button: WidgetId,
    index_selectors: Vec<(String, WidgetId)>,
    plot_kwargs: Option<Kwargs>,
    graph: Option<Graph>,
    series: Vec<SeriesCurve>,
    taps: Vec<Tap>,
    colors: ColorCycle,
    tap_enabled: bool,
    render_error: Option<String>,
}

impl Observer for Dashboard {
    fn sigslot(&self) -> &SigSlot<Self> {
        &self.bus
    }

    fn sigslot_mut(&mut self) -> &mut SigSlot<Self> {
        &mut self.bus
    }
}

impl Dashboard {
    /// Dashboard over `data` with default collaborators.
    pub fn new(data: Dataset) -> Result<Self> {
        DashboardBuilder::new(data).build()
    }

    /// Builder over `data`.
    pub fn builder(data: Dataset) -> DashboardBuilder {
        DashboardBuilder::new(data)
    }

    /// Select a variable by name. Unknown names are logged and ignored.
    pub fn select_variable(&mut self, name: &str) -> bool {
        Display::select_variable(self, name)
    }

    /// Click the plot button and report the outcome.
    pub fn plot(&mut self) -> Result<()> {
        if self.bus.is_disabled(self.plot_button) {
            return Err(EkmanError::Render("nothing plottable is selected".to_string()));
        }
        self.render_error = None;
        let plot = self.plot_button;
        self.click(plot);
        match self.render_error.take() {
            Some(message) => Err(EkmanError::Render(message)),
            None => Ok(()),
        }
    }

    /// Click the clear button.
    pub fn clear(&mut self) -> bool {
        let clear = self.clear_series_button;
        self.click(clear)
    }

    /// Current snapshot of every pane. Recomputed on each call.
    pub fn kwargs(&self) -> Kwargs {
        self.control.kwargs(&self.bus)
    }

    /// The kwargs snapshot taken by the last plot.
    pub fn plot_kwargs(&self) -> Option<&Kwargs> {
        self.plot_kwargs.as_ref()
    }

    /// The event bus and its widgets.
    pub fn bus(&self) -> &SigSlot<Dashboard> {
        &self.bus
    }

    /// The dataset, with the current coordinate set.
    pub fn data(&self) -> &Dataset {
        &self.data
    }

    /// Control panes.
    pub fn control(&self) -> &Control {
        &self.control
    }

    /// Plot button.
    pub fn plot_button(&self) -> WidgetId {
        self.plot_button
    }

    /// Clear-series button.
    pub fn clear_series_button(&self) -> WidgetId {
        self.clear_series_button
    }

    /// Current graph.
    pub fn graph(&self) -> Option<&Graph> {
        self.graph.as_ref()
    }

    /// Select/player widgets of the current graph, in creation order.
    pub fn index_selectors(&self) -> &[(String, WidgetId)] {
        &self.index_selectors
    }

    /// Index selector of a dimension.
    pub fn index_selector(&self, dim: &str) -> Option<WidgetId> {
        self.index_selectors
            .iter()
            .find(|(d, _)| d == dim)
            .map(|(_, id)| *id)
    }

    /// Extracted series, oldest first.
    pub fn series(&self) -> &[SeriesCurve] {
        &self.series
    }

    /// Tap markers, oldest first.
    pub fn taps(&self) -> &[Tap] {
        &self.taps
    }

    /// Taps extract series on the current graph.
    pub fn tap_enabled(&self) -> bool {
        self.tap_enabled
    }

    fn check_is_plottable(&mut self, var: Option<&str>) {
        let disabled = var
            .and_then(|v| self.data.variable(v))
            .map_or(true, |v| v.ndim() <= 1);
        let plot = self.plot_button;
        self.set(plot, Attr::Disabled, disabled);
    }

    /// Disposition changes invalidate the colormap limits.
    fn link_aggregation_selectors(&mut self) {
        for (dim, _) in self.control.fields.agg_selectors().to_vec() {
            self.bus.connect(
                &crate::control::agg_signal(&dim),
                |d: &mut Dashboard, _: &Value| crate::control::Style::setup(d),
            );
        }
    }

    /// Promote exactly `value`'s variables (plus the indexed ones) to
    /// coordinates and refresh the panes.
    fn set_coords(&mut self, value: &Value) {
        let Some(names) = value.as_list() else {
            warn!(value = %value, "coordinate selection must be a list");
            return;
        };
        let names = names.to_vec();
        self.data.reset_coords();
        self.data.set_coords(&names);
        Control::set_coords(self);
    }

    fn clear_series(&mut self) {
        if self.bus.is_disabled(self.clear_series_button) {
            return;
        }
        debug!(series = self.series.len(), taps = self.taps.len(), "clearing series");
        self.series.clear();
        self.taps.clear();
    }

    fn is_known_param(&self, key: &str) -> bool {
        key == crate::control::CoordSetter::NAME || self.kwargs().to_flat().contains_key(key)
    }
}
