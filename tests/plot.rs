mod common;

use common::*;
use ekman::control::{CartographicProvider, Disposition};
use ekman::widget::WidgetKind;
use ekman::{Dashboard, Observer, Value};

fn limits(d: &Dashboard) -> (Value, Value) {
    let style = &d.control().style;
    (value(d, style.lower_limit), value(d, style.upper_limit))
}

#[test]
fn animate_disposition_creates_a_player_on_plot() {
    let mut d = with_variable("wind");
    assert_eq!(x(&d).as_deref(), Some("nx"));
    assert_eq!(y(&d).as_deref(), Some("ny"));
    assert_eq!(d.kwargs().fields.dispositions.get("time"), Some(Disposition::Select));

    set_disposition(&mut d, "time", Disposition::Animate);
    let fields = d.kwargs().fields;
    assert!(fields.dims_to_aggregate.is_empty());
    assert_eq!(fields.dims_to_select_animate, ["time"]);

    d.plot().expect("plot");
    let players: Vec<_> = d
        .index_selectors()
        .iter()
        .filter(|(_, id)| matches!(d.bus().widget(*id).map(|w| w.kind()), Some(WidgetKind::Player)))
        .collect();
    assert_eq!(players.len(), 1);
    assert_eq!(players[0].0, "time");
}

#[test]
fn aggregated_dims_are_removed_from_the_slice() {
    let mut d = with_variable("temp");
    set_disposition(&mut d, "sigma", Disposition::Mean);
    set_disposition(&mut d, "time", Disposition::Count);
    let fields = d.kwargs().fields;
    assert_eq!(fields.dims_to_aggregate, ["sigma", "time"]);
    assert!(fields.dims_to_select_animate.is_empty());

    d.plot().expect("plot");
    let graph = d.graph().expect("graph");
    assert_eq!(graph.array.dims, ["nx", "ny"]);
    assert!(graph.array.to_vec().iter().all(|&v| v == NT as f64));
    assert!(d.index_selectors().is_empty());
}

#[test]
fn raw_axes_re_render_on_index_change() {
    let mut d = with_variable("temp");
    d.plot().expect("plot");
    assert_eq!(d.index_selectors().len(), 2);

    let frame = d.graph().expect("graph").frame().expect("frame");
    assert_eq!(frame.values[[2, 1]], temp(0, 0, 1, 2));

    let time = d.index_selector("time").expect("time selector");
    assert!(d.set_value(time, TIMES[2]));
    let frame = d.graph().expect("graph").frame().expect("frame");
    assert_eq!(frame.values[[2, 1]], temp(2, 0, 1, 2));
}

#[test]
fn coordinate_axes_become_index_selectors() {
    let mut d = with_variable("temp");
    promote_lat_lon(&mut d);
    d.plot().expect("plot");

    let dims: Vec<&str> = d.index_selectors().iter().map(|(dim, _)| dim.as_str()).collect();
    assert_eq!(sorted(dims.iter().map(|s| s.to_string()).collect()), ["sigma", "time"]);

    let sigma = d.index_selector("sigma").expect("sigma selector");
    assert_eq!(d.bus().value(sigma).as_f64(), Some(SIGMAS[0]));
    assert!(d.set_value(sigma, SIGMAS[1]));
    let graph = d.graph().expect("graph");
    let slider = graph.sliders().iter().find(|s| s.dim == "sigma").expect("sigma slider");
    assert_eq!(slider.value(), SIGMAS[1]);
}

#[test]
fn plot_fills_colormap_limits() {
    let mut d = with_variable("temp");
    assert_eq!(limits(&d), (Value::None, Value::None));
    d.plot().expect("plot");

    let (lower, upper) = limits(&d);
    let lower: f64 = lower.as_str().expect("lower").parse().expect("number");
    let upper: f64 = upper.as_str().expect("upper").parse().expect("number");
    assert!(lower < upper);
    let range = d.graph().expect("graph").options.color_range;
    assert!((range.0 - lower).abs() < 1e-4);
    assert!((range.1 - upper).abs() < 1e-4);
    // First time step only.
    assert!(upper < temp(1, 0, 0, 0));
}

#[test]
fn user_limits_win() {
    let mut d = with_variable("temp");
    let style = d.control().style.clone();
    d.set_value(style.lower_limit, "270");
    d.set_value(style.upper_limit, "300");
    d.plot().expect("plot");
    assert_eq!(d.graph().expect("graph").options.color_range, (270.0, 300.0));
    assert_eq!(limits(&d), (Value::from("270"), Value::from("300")));
}

#[test]
fn limits_are_cleared_by_scale_and_disposition_changes() {
    let mut d = with_variable("temp");
    d.plot().expect("plot");
    assert!(!limits(&d).0.is_none());

    let color_scale = d.control().style.color_scale;
    d.set_value(color_scale, "log");
    assert_eq!(limits(&d), (Value::None, Value::None));

    d.plot().expect("plot");
    assert!(!limits(&d).0.is_none());
    set_disposition(&mut d, "sigma", Disposition::Max);
    assert_eq!(limits(&d), (Value::None, Value::None));
}

#[test]
fn all_data_limits_span_every_step() {
    let mut d = with_variable("temp");
    let all = d.control().style.use_all_data;
    d.set_value(all, true);
    d.plot().expect("plot");
    let upper: f64 = limits(&d).1.as_str().expect("upper").parse().expect("number");
    assert!(upper > temp(1, 0, 0, 0));
}

#[test]
fn tap_extracts_series_on_raw_axes() {
    let mut d = with_variable("temp");
    set_extract_along(&mut d, "time");
    d.plot().expect("plot");
    assert!(d.tap_enabled());
    assert!(!d.bus().is_disabled(d.clear_series_button()));

    assert!(d.tap(1.0, 2.0));
    let curve = &d.series()[0];
    assert_eq!(curve.along, "time");
    assert_eq!(curve.fixed, [("sigma".to_string(), SIGMAS[0])]);
    let expected: Vec<(f64, f64)> = (0..NT).map(|t| (TIMES[t], temp(t, 0, 1, 2))).collect();
    assert_eq!(curve.points, expected);
    assert_eq!(d.taps().len(), 1);
    assert_eq!(d.taps()[0].color, curve.color);
}

#[test]
fn tap_uses_current_index_selection() {
    let mut d = with_variable("temp");
    set_extract_along(&mut d, "time");
    d.plot().expect("plot");
    let sigma = d.index_selector("sigma").expect("sigma selector");
    d.set_value(sigma, SIGMAS[1]);

    assert!(d.tap(3.0, 0.0));
    let curve = &d.series()[0];
    assert_eq!(curve.fixed, [("sigma".to_string(), SIGMAS[1])]);
    assert_eq!(curve.points[1], (TIMES[1], temp(1, 1, 3, 0)));
}

#[test]
fn tap_on_two_dimensional_coordinates_uses_nearest_point() {
    let mut d = with_variable("temp");
    promote_lat_lon(&mut d);
    set_extract_along(&mut d, "time");
    d.plot().expect("plot");

    assert!(d.tap(lat(2, 3) + 0.01, lon(2, 3) - 0.01));
    let expected: Vec<(f64, f64)> = (0..NT).map(|t| (TIMES[t], temp(t, 0, 2, 3))).collect();
    assert_eq!(d.series()[0].points, expected);
}

#[test]
fn aggregated_dims_are_fixed_at_first_label() {
    let mut d = with_variable("temp");
    set_disposition(&mut d, "sigma", Disposition::Mean);
    set_extract_along(&mut d, "time");
    d.plot().expect("plot");

    assert!(d.tap(0.0, 0.0));
    assert_eq!(d.series()[0].fixed, [("sigma".to_string(), SIGMAS[0])]);
}

#[test]
fn taps_are_ignored_without_extract_along() {
    let mut d = with_variable("temp");
    d.plot().expect("plot");
    assert!(!d.tap_enabled());
    assert!(d.bus().is_disabled(d.clear_series_button()));
    assert!(!d.tap(1.0, 1.0));
    assert!(d.taps().is_empty());

    let mut air = with_variable("air");
    assert_nothing_to_extract(&air);
    air.plot().expect("plot");
    assert!(!air.tap_enabled());
}

fn assert_nothing_to_extract(d: &Dashboard) {
    let id = d.control().fields.series_selector;
    let options = d.bus().widget(id).map(|w| w.options().to_vec()).unwrap_or_default();
    assert_eq!(options, [Value::None]);
}

#[test]
fn clearing_removes_taps_and_series() {
    let mut d = with_variable("temp");
    set_extract_along(&mut d, "time");
    d.plot().expect("plot");
    d.tap(0.0, 0.0);
    d.tap(1.0, 1.0);
    assert_eq!(d.series().len(), 2);
    assert_ne!(d.series()[0].color, d.series()[1].color);

    assert!(d.clear());
    assert!(d.series().is_empty());
    assert!(d.taps().is_empty());
}

#[test]
fn changing_extract_along_clears_series() {
    let mut d = with_variable("temp");
    set_extract_along(&mut d, "time");
    d.plot().expect("plot");
    d.tap(0.0, 0.0);
    assert_eq!(d.series().len(), 1);

    set_extract_along(&mut d, "sigma");
    assert!(d.series().is_empty());

    let id = d.control().fields.series_selector;
    d.set_value(id, Value::None);
    assert!(!d.tap(0.0, 0.0));
    assert!(d.taps().is_empty());
}

#[test]
fn replotting_drops_old_selectors_and_series() {
    let mut d = with_variable("temp");
    set_extract_along(&mut d, "time");
    d.plot().expect("plot");
    let old = d.index_selector("time").expect("time selector");
    d.tap(0.0, 0.0);

    d.plot().expect("plot");
    assert!(d.bus().widget(old).is_none());
    assert!(d.series().is_empty());
    assert_eq!(d.index_selectors().len(), 2);
    assert_eq!(d.plot_kwargs().and_then(|k| k.variable.as_deref()), Some("temp"));
}

#[test]
fn geo_overlay_follows_projection_pane() {
    let mut d = Dashboard::builder(dataset())
        .projection(CartographicProvider)
        .build()
        .expect("dashboard");
    d.select_variable("temp");
    let pane = d.control().projection.clone().expect("projection pane");
    assert!(d.bus().is_disabled(pane.is_geo));

    promote_lat_lon(&mut d);
    assert!(!d.bus().is_disabled(pane.is_geo));
    assert!(d.bus().is_disabled(pane.crs));
    d.set_value(pane.is_geo, true);
    assert!(!d.bus().is_disabled(pane.crs));

    d.plot().expect("plot");
    let geo = d.graph().and_then(|g| g.geo.clone()).expect("geo overlay");
    assert_eq!(geo.crs.name, "PlateCarree");
    assert!(geo.projection.is_none());
    assert!(!geo.features.is_empty());
    assert!(!geo.features.iter().any(|f| f == "None"));
}

#[test]
fn raw_axes_disable_geo() {
    let mut d = Dashboard::builder(dataset())
        .projection(CartographicProvider)
        .build()
        .expect("dashboard");
    promote_lat_lon(&mut d);
    d.select_variable("temp");
    let pane = d.control().projection.clone().expect("projection pane");
    assert!(!d.bus().is_disabled(pane.is_geo));

    set_x(&mut d, "nx");
    assert!(d.bus().is_disabled(pane.is_geo));
}
