mod common;

use common::*;
use ekman::{Observer, Value};

fn x_options(d: &ekman::Dashboard) -> Vec<String> {
    let x = d.control().fields.x;
    d.bus()
        .widget(x)
        .map(|w| w.options().iter().map(|o| o.to_string()).collect())
        .unwrap_or_default()
}

#[test]
fn y_never_offers_or_picks_x() {
    for promoted in [false, true] {
        let mut d = dashboard();
        if promoted {
            promote_lat_lon(&mut d);
        }
        for var in ["temp", "air", "wind", "lat", "lon"] {
            assert!(d.select_variable(var));
            for option in x_options(&d) {
                set_x(&mut d, &option);
                assert_eq!(x(&d).as_deref(), Some(option.as_str()));
                assert!(!y_options(&d).contains(&option), "{}: y offers x={}", var, option);
                assert_ne!(y(&d).as_deref(), Some(option.as_str()));
            }
        }
    }
}

#[test]
fn dimension_x_offers_only_dimensions_for_y() {
    let mut d = dashboard();
    promote_lat_lon(&mut d);
    d.select_variable("temp");
    set_x(&mut d, "nx");
    assert_eq!(sorted(y_options(&d)), ["ny", "sigma", "time"]);
}

#[test]
fn coordinate_x_offers_coordinates_of_the_same_ndim() {
    let mut d = dashboard();
    promote_lat_lon(&mut d);
    d.select_variable("temp");

    set_x(&mut d, "lat");
    assert_eq!(y_options(&d), ["lon"]);
    assert_eq!(y(&d).as_deref(), Some("lon"));
    for option in y_options(&d) {
        assert!(!d.data().is_indexed(&option));
        assert_eq!(d.data().dims_of(&option).len(), d.data().dims_of("lat").len());
    }
}

#[test]
fn dispositions_track_remaining_dims() {
    let mut d = dashboard();
    promote_lat_lon(&mut d);
    for var in ["temp", "wind", "air"] {
        d.select_variable(var);
        for option in x_options(&d) {
            set_x(&mut d, &option);
            let remaining = d.kwargs().fields.remaining_dims;
            assert_eq!(disposition_dims(&d), sorted(remaining.clone()), "{} x={}", var, option);
            assert_eq!(
                d.control().fields.agg_selectors().len(),
                remaining.len(),
                "one selector per remaining dim"
            );
        }
    }
}

#[test]
fn coordinate_axes_consume_their_dims() {
    let mut d = dashboard();
    promote_lat_lon(&mut d);
    d.select_variable("temp");
    set_x(&mut d, "lat");

    let fields = d.kwargs().fields;
    assert_eq!(fields.remaining_dims, ["time", "sigma"]);
    assert!(fields.are_axes_coordinates);
}

#[test]
fn repeated_setup_is_stable() {
    let mut d = with_variable("temp");
    set_x(&mut d, "time");

    let snapshot = |d: &ekman::Dashboard| (x(d), y(d), d.kwargs().fields.dispositions);
    d.emit("variable_selected", &Value::from("temp"));
    let first = snapshot(&d);
    d.emit("variable_selected", &Value::from("temp"));
    assert_eq!(snapshot(&d), first);
    assert_eq!(first.0.as_deref(), Some("nx"));
}

#[test]
fn two_dimensional_variable_has_no_dispositions() {
    let mut d = with_variable("air");
    assert_eq!(x(&d).as_deref(), Some("nx"));
    assert_eq!(y(&d).as_deref(), Some("ny"));
    assert!(d.kwargs().fields.dispositions.is_empty());
    assert!(d.control().fields.agg_selectors().is_empty());

    d.plot().expect("plot");
    assert!(d.index_selectors().is_empty());
    assert!(!d.tap_enabled());
}

#[test]
fn unknown_axis_is_rejected_and_state_kept() {
    let mut d = with_variable("temp");
    assert!(!set_x(&mut d, "depth"));
    assert_eq!(x(&d).as_deref(), Some("nx"));
    assert_eq!(y(&d).as_deref(), Some("ny"));
}

#[test]
fn one_dimensional_variables_cannot_be_plotted() {
    let mut d = with_variable("validtime");
    assert!(d.bus().is_disabled(d.plot_button()));
    assert!(d.plot().is_err());
    assert!(d.graph().is_none());

    d.select_variable("wind");
    assert!(!d.bus().is_disabled(d.plot_button()));
}

#[test]
fn unknown_variable_is_ignored() {
    let mut d = with_variable("wind");
    assert!(!d.select_variable("salinity"));
    assert_eq!(d.kwargs().variable.as_deref(), Some("wind"));
}

#[test]
fn removing_a_coordinate_resets_stale_selection() {
    let mut d = with_variable("temp");
    promote_lat_lon(&mut d);
    assert_eq!(x(&d).as_deref(), Some("lat"));
    assert_eq!(y(&d).as_deref(), Some("lon"));
    d.plot().expect("plot");
    set_extract_along(&mut d, "time");
    assert!(d.kwargs().fields.are_axes_coordinates);

    let selector = d.control().coord_setter.coord_selector;
    let coords: Vec<String> = ["lon", "sigma", "time"].iter().map(|s| s.to_string()).collect();
    d.set_value(selector, coords);

    let fields = d.kwargs().fields;
    assert!(!d.data().is_coord("lat"));
    assert!(!fields.are_axes_coordinates);
    assert_eq!(fields.extract_along, None);
}
