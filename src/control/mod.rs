//! Control panel: the panes the user configures a plot with.
//!
//! [`Control`] owns every pane and wires the variable-selection cascade:
//! description, then axes (which rebuild the dispositions), then style.

mod coord_setter;
mod describe;
mod display;
mod fields;
pub mod kwargs;
mod projection;
mod style;

pub use coord_setter::CoordSetter;
pub use describe::{Describe, Section};
pub use display::{Display, COORD_MARKER};
pub use fields::{agg_signal, Fields, REMAINING_DIMS};
pub use kwargs::{
    AxisSelection, ColorScale, Disposition, DispositionMap, FieldsKwargs, Kwargs,
    ProjectionOptions, StyleOptions,
};
pub use projection::{
    parse_params, CartographicProvider, Crs, ProjParams, Projection, ProjectionProvider, FEATURES,
};
pub use style::{Style, CLEAR_CMAP_LIMITS};

use crate::config::InitialParams;
use crate::dashboard::Dashboard;
use crate::data::Dataset;
use crate::sigslot::SigSlot;
use crate::widget::Value;
use tracing::debug;

/// Tab names, in display order.
pub const TABS: [&str; 5] = ["Variables", "Set Coords", "Axes", "Style", "Projection"];

/// All control panes.
#[derive(Debug, Clone)]
pub struct Control {
    /// Variable picker.
    pub displayer: Display,
    /// Metadata description.
    pub describer: Describe,
    /// Coordinate promotion.
    pub coord_setter: CoordSetter,
    /// Axes and dispositions.
    pub fields: Fields,
    /// Styling.
    pub style: Style,
    /// Geographic projection, when a provider is available.
    pub projection: Option<Projection>,
}

impl Control {
    pub(crate) fn new(
        bus: &mut SigSlot<Dashboard>,
        data: &Dataset,
        provider: Option<&dyn ProjectionProvider>,
    ) -> Self {
        let control = Self {
            displayer: Display::new(bus, data),
            describer: Describe::new(data),
            coord_setter: CoordSetter::new(bus, data),
            fields: Fields::new(bus),
            style: Style::new(bus),
            projection: provider.map(|p| Projection::new(bus, p)),
        };

        if control.projection.is_some() {
            bus.connect(REMAINING_DIMS, |d: &mut Dashboard, _: &Value| {
                Control::check_is_projectable(d)
            });
        }
        bus.connect("variable_selected", |d: &mut Dashboard, v: &Value| {
            Describe::setup(d, v.as_str())
        });
        bus.connect("variable_selected", |d: &mut Dashboard, v: &Value| {
            if let Some(var) = v.as_str() {
                Fields::setup(d, var);
            }
        });
        bus.connect("variable_selected", |d: &mut Dashboard, _: &Value| Style::setup(d));
        control
    }

    /// Apply initial parameters pane by pane.
    pub(crate) fn setup_initial_values(d: &mut Dashboard, params: &InitialParams) {
        if let Some(var) = params.get("Variables").and_then(|v| v.as_str()) {
            Display::select_variable(d, var);
        }
        CoordSetter::setup_initial_values(d, params);
        Fields::setup_initial_values(d, params);
        Style::setup_initial_values(d, params);
        Projection::setup_initial_values(d, params);
    }

    /// Refresh every pane after the coordinate set changed.
    pub(crate) fn set_coords(d: &mut Dashboard) {
        let var = d.control.displayer.kwargs(&d.bus);
        debug!(?var, coords = ?d.data.coord_names(), "coordinates changed");
        CoordSetter::set_coords(d);
        Display::set_coords(d);
        Describe::set_coords(d, var.as_deref());
        Fields::set_coords(d, var.as_deref());
    }

    /// Geographic projection needs both axes to be coordinates.
    pub(crate) fn check_is_projectable(d: &mut Dashboard) {
        let disabled = !d.control.fields.are_var_coords();
        Projection::disable_geo(d, disabled);
    }

    /// Current snapshot of every pane.
    pub fn kwargs(&self, bus: &SigSlot<Dashboard>) -> Kwargs {
        Kwargs::merge(
            self.displayer.kwargs(bus),
            self.fields.kwargs(bus),
            self.style.kwargs(bus),
            self.projection.as_ref().map(|p| p.kwargs(bus)),
        )
    }
}
