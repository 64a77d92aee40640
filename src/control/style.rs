//! Plot styling pane.
//!
//! Colormap limits are cleared whenever the colour scaling or the
//! all-data toggle changes, and on every variable selection, so limits
//! auto-filled for one configuration never leak into the next.

use super::kwargs::{ColorScale, StyleOptions};
use crate::colormaps::Colormap;
use crate::config::InitialParams;
use crate::dashboard::Dashboard;
use crate::sigslot::{Observer, SigSlot, WidgetId};
use crate::widget::{options_from, Attr, Value, Widget};

/// Signal clearing the colormap limits.
pub const CLEAR_CMAP_LIMITS: &str = "clear_cmap_limits";

/// Style controls.
#[derive(Debug, Clone)]
pub struct Style {
    /// Plot height.
    pub frame_height: WidgetId,
    /// Plot width.
    pub frame_width: WidgetId,
    /// Colormap.
    pub cmap: WidgetId,
    /// Colour scaling.
    pub color_scale: WidgetId,
    /// Lower colormap limit.
    pub lower_limit: WidgetId,
    /// Upper colormap limit.
    pub upper_limit: WidgetId,
    /// Compute automatic limits from all data.
    pub use_all_data: WidgetId,
    /// Colorbar toggle.
    pub colorbar: WidgetId,
    /// Rasterize toggle.
    pub rasterize: WidgetId,
}

impl Style {
    pub(crate) fn new(bus: &mut SigSlot<Dashboard>) -> Self {
        let mut add = |w: Widget| bus.add_widget(w);
        let style = Self {
            frame_height: add(Widget::int_slider("frame_height", 300, 100, 1200)),
            frame_width: add(Widget::int_slider("frame_width", 450, 100, 1200)),
            cmap: add(
                Widget::select("cmap", options_from(Colormap::names()))
                    .with_value(Colormap::Inferno.name()),
            ),
            color_scale: add(
                Widget::select("color_scale", options_from(ColorScale::ALL.map(ColorScale::name)))
                    .with_value(ColorScale::Linear.name()),
            ),
            lower_limit: add(Widget::text_input("cmap lower limit", None)),
            upper_limit: add(Widget::text_input("cmap upper limit", None)),
            use_all_data: add(Widget::checkbox("compute min/max from all data", false)),
            colorbar: add(Widget::checkbox("colorbar", true)),
            rasterize: add(Widget::checkbox("rasterize", true)),
        };

        // Both feed the same signal; the map tracks each source.
        bus.register(Some(style.use_all_data), CLEAR_CMAP_LIMITS, Attr::Value);
        bus.register(Some(style.color_scale), CLEAR_CMAP_LIMITS, Attr::Value);
        bus.connect(CLEAR_CMAP_LIMITS, |d: &mut Dashboard, _: &Value| Style::setup(d));
        style
    }

    /// Widgets in panel order.
    pub fn widgets(&self) -> [WidgetId; 9] {
        [
            self.frame_height,
            self.frame_width,
            self.cmap,
            self.color_scale,
            self.lower_limit,
            self.upper_limit,
            self.use_all_data,
            self.colorbar,
            self.rasterize,
        ]
    }

    /// Clear the colormap limits.
    pub(crate) fn setup(d: &mut Dashboard) {
        let style = &d.control.style;
        let (lower, upper) = (style.lower_limit, style.upper_limit);
        d.set_value(lower, Value::None);
        d.set_value(upper, Value::None);
    }

    pub(crate) fn setup_initial_values(d: &mut Dashboard, params: &InitialParams) {
        for id in d.control.style.widgets() {
            let Some(name) = d.bus.widget(id).map(|w| w.name().to_string()) else {
                continue;
            };
            if let Some(value) = params.get(&name).and_then(Value::from_json) {
                d.set_value(id, value);
            }
        }
    }

    /// Snapshot of the pane.
    pub fn kwargs(&self, bus: &SigSlot<Dashboard>) -> StyleOptions {
        let text = |id: WidgetId| bus.value(id).as_str().map(String::from);
        let flag = |id: WidgetId| bus.value(id).as_bool().unwrap_or(false);
        StyleOptions {
            frame_height: bus.value(self.frame_height).as_i64().unwrap_or(300),
            frame_width: bus.value(self.frame_width).as_i64().unwrap_or(450),
            cmap: text(self.cmap).unwrap_or_else(|| Colormap::Inferno.name().to_string()),
            color_scale: text(self.color_scale)
                .as_deref()
                .and_then(ColorScale::parse)
                .unwrap_or_default(),
            lower_limit: text(self.lower_limit),
            upper_limit: text(self.upper_limit),
            use_all_data: flag(self.use_all_data),
            colorbar: flag(self.colorbar),
            rasterize: flag(self.rasterize),
        }
    }
}
