//! Coordinate promotion pane.

use crate::config::InitialParams;
use crate::dashboard::Dashboard;
use crate::data::Dataset;
use crate::sigslot::{Observer, SigSlot, WidgetId};
use crate::widget::{options_from, Value, Widget};
use tracing::warn;

/// Cross selector moving variables in and out of the coordinate set.
#[derive(Debug, Clone)]
pub struct CoordSetter {
    /// Selected coordinate names.
    pub coord_selector: WidgetId,
}

impl CoordSetter {
    /// Pane name, also the initial-parameter key.
    pub const NAME: &'static str = "Set Coords";

    pub(crate) fn new(bus: &mut SigSlot<Dashboard>, data: &Dataset) -> Self {
        let coord_selector = bus.add_widget(Widget::cross_selector(
            Self::NAME,
            options_from(data.variable_names()),
            data.coord_names(),
        ));
        Self { coord_selector }
    }

    /// Mirror the dataset's coordinate set, without re-triggering promotion.
    pub(crate) fn set_coords(d: &mut Dashboard) {
        let coords = d.data.coord_names();
        let id = d.control.coord_setter.coord_selector;
        d.ignore_events(|d| d.set_value(id, coords));
    }

    pub(crate) fn setup_initial_values(d: &mut Dashboard, params: &InitialParams) {
        let Some(json) = params.get(Self::NAME) else {
            return;
        };
        match Value::from_json(json) {
            Some(value @ Value::List(_)) => {
                let id = d.control.coord_setter.coord_selector;
                d.set_value(id, value);
            },
            _ => warn!(value = %json, "'{}' expects a list of variable names", Self::NAME),
        }
    }

    /// Names currently selected as coordinates.
    pub fn kwargs(&self, bus: &SigSlot<Dashboard>) -> Vec<String> {
        bus.value(self.coord_selector)
            .as_list()
            .map(<[String]>::to_vec)
            .unwrap_or_default()
    }
}
