//! Variable picker.

use crate::dashboard::Dashboard;
use crate::data::Dataset;
use crate::sigslot::{Observer, SigSlot, WidgetId};
use crate::widget::{options_from, Attr, Widget};
use tracing::warn;

/// Marker appended to coordinate names in the picker.
pub const COORD_MARKER: &str = "📈";

/// Lists every variable of the dataset and emits `variable_selected`.
#[derive(Debug, Clone)]
pub struct Display {
    /// The variable select.
    pub select: WidgetId,
}

impl Display {
    pub(crate) fn new(bus: &mut SigSlot<Dashboard>, data: &Dataset) -> Self {
        let select = bus.add_widget(Widget::select("Variables", options_from(data.variable_names())));
        bus.register(Some(select), "variable_selected", Attr::Value);
        Self { select }
    }

    /// Select a variable by name. Unknown names are logged and ignored.
    pub fn select_variable(d: &mut Dashboard, name: &str) -> bool {
        if !d.data.contains(name) {
            warn!(variable = name, "variable not present in displayer");
            return false;
        }
        let select = d.control.displayer.select;
        d.set_value(select, name);
        true
    }

    /// Refresh the listing after the coordinate set changed.
    pub(crate) fn set_coords(d: &mut Dashboard) {
        let names = d.data.variable_names();
        let select = d.control.displayer.select;
        d.ignore_events(|d| d.set(select, Attr::Options, names));
    }

    /// Picker label for a variable.
    pub fn label(data: &Dataset, name: &str) -> String {
        if data.is_coord(name) {
            format!("{} {}", name, COORD_MARKER)
        } else {
            name.to_string()
        }
    }

    /// Selected variable.
    pub fn kwargs(&self, bus: &SigSlot<Dashboard>) -> Option<String> {
        bus.value(self.select).as_str().map(String::from)
    }
}
