mod common;

use common::*;
use ekman::control::{CartographicProvider, Disposition};
use ekman::sigslot::{Observer, SigSlot};
use ekman::widget::{options_from, Attr, Widget};
use ekman::{Dashboard, InitialParams, Value};
use serde_json::json;

#[test]
fn kwargs_partition_the_remaining_dims() {
    let mut d = dashboard();
    for var in ["temp", "wind", "air", "lat", "lon"] {
        d.select_variable(var);
        let kwargs = d.kwargs();
        assert_eq!(kwargs.variable.as_deref(), Some(var));
        assert!(kwargs.fields.axes.x.is_some(), "{} has no x", var);
        assert!(kwargs.fields.axes.y.is_some(), "{} has no y", var);

        let flat = kwargs.to_flat();
        for key in ["Variables", "x", "y", "remaining_dims"] {
            assert!(!flat.get(key).map_or(true, Value::is_none), "{}: {} missing", var, key);
        }

        let fields = kwargs.fields;
        assert!(fields
            .dims_to_aggregate
            .iter()
            .all(|dim| !fields.dims_to_select_animate.contains(dim)));
        let mut union = fields.dims_to_aggregate.clone();
        union.extend(fields.dims_to_select_animate.clone());
        assert_eq!(sorted(union), sorted(fields.remaining_dims.clone()));
    }
}

#[test]
fn partition_follows_dispositions() {
    let mut d = with_variable("temp");
    set_disposition(&mut d, "time", Disposition::Median);
    let fields = d.kwargs().fields;
    assert_eq!(fields.dims_to_aggregate, ["time"]);
    assert_eq!(fields.dims_to_select_animate, ["sigma"]);

    set_disposition(&mut d, "time", Disposition::Animate);
    set_disposition(&mut d, "sigma", Disposition::Std);
    let fields = d.kwargs().fields;
    assert_eq!(fields.dims_to_aggregate, ["sigma"]);
    assert_eq!(fields.dims_to_select_animate, ["time"]);
}

#[test]
fn flattened_keys_cover_every_pane() {
    let mut d = Dashboard::builder(dataset())
        .projection(CartographicProvider)
        .build()
        .expect("dashboard");
    d.select_variable("temp");
    let flat = d.kwargs().to_flat();

    for key in [
        "Variables",
        "x",
        "y",
        "time",
        "sigma",
        "dims_to_aggregate",
        "dims_to_select_animate",
        "are_axes_coordinates",
        "remaining_dims",
        "extract along",
        "frame_height",
        "frame_width",
        "cmap",
        "color_scale",
        "cmap lower limit",
        "cmap upper limit",
        "compute min/max from all data",
        "colorbar",
        "rasterize",
        "is_geo",
        "project",
        "global_extent",
        "alpha",
        "basemap",
        "features",
        "crs",
        "crs params",
        "projection",
        "projection params",
    ] {
        assert!(flat.contains_key(key), "missing {}", key);
    }
    assert_eq!(flat["time"], Value::from("select"));
    assert_eq!(flat["frame_height"], Value::Int(300));
    assert_eq!(flat["cmap"], Value::from("Inferno"));

    let without = with_variable("temp").kwargs().to_flat();
    assert!(!without.contains_key("is_geo"));
}

#[test]
fn kwargs_json_is_an_object() {
    let d = with_variable("wind");
    let text = d.kwargs().to_json().expect("json");
    let parsed: serde_json::Value = serde_json::from_str(&text).expect("valid json");
    assert_eq!(parsed["Variables"], json!("wind"));
    assert_eq!(parsed["remaining_dims"], json!(["time"]));
    assert_eq!(parsed["extract along"], json!(null));
}

#[test]
fn initial_params_are_applied() {
    let params: InitialParams = [
        ("Variables", json!("temp")),
        ("x", json!("ny")),
        ("sigma", json!("mean")),
        ("extract along", json!("time")),
        ("cmap", json!("Viridis")),
        ("cmap lower limit", json!(275)),
        ("frame_width", json!(600)),
        ("no such control", json!(1)),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    let d = Dashboard::builder(dataset())
        .initial_params(params)
        .build()
        .expect("dashboard");

    let kwargs = d.kwargs();
    assert_eq!(kwargs.variable.as_deref(), Some("temp"));
    assert_eq!(kwargs.fields.axes.x.as_deref(), Some("ny"));
    assert_eq!(kwargs.fields.axes.y.as_deref(), Some("nx"));
    assert_eq!(kwargs.fields.dims_to_aggregate, ["sigma"]);
    assert_eq!(kwargs.fields.extract_along.as_deref(), Some("time"));
    assert_eq!(kwargs.style.cmap, "Viridis");
    assert_eq!(kwargs.style.lower_limit.as_deref(), Some("275"));
    assert_eq!(kwargs.style.frame_width, 600);
}

#[test]
fn initial_coordinates_promote_before_axes() {
    let params: InitialParams = [
        ("Set Coords", json!(["lat", "lon", "sigma", "time"])),
        ("Variables", json!("temp")),
        ("x", json!("lon")),
        ("is_geo", json!(true)),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    let d = Dashboard::builder(dataset())
        .projection(CartographicProvider)
        .initial_params(params)
        .build()
        .expect("dashboard");

    assert!(d.data().is_coord("lat"));
    let kwargs = d.kwargs();
    assert_eq!(kwargs.fields.axes.x.as_deref(), Some("lon"));
    assert_eq!(kwargs.fields.axes.y.as_deref(), Some("lat"));
    assert!(kwargs.fields.are_axes_coordinates);
    assert!(kwargs.projection.expect("projection").is_geo);
}

#[test]
fn invalid_initial_values_are_rejected() {
    let params: InitialParams = [
        ("Variables", json!("wind")),
        ("x", json!("depth")),
        ("frame_height", json!(5000)),
        ("colorbar", json!("yes")),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    let d = Dashboard::builder(dataset())
        .initial_params(params)
        .build()
        .expect("dashboard");

    let kwargs = d.kwargs();
    assert_eq!(kwargs.fields.axes.x.as_deref(), Some("nx"));
    assert_eq!(kwargs.style.frame_height, 300);
    assert!(kwargs.style.colorbar);
}

#[test]
fn single_variable_is_selected_up_front() {
    let mut data = ekman::data::Dataset::new();
    data.insert(
        ekman::data::Variable::from_vec("only", &["a", "b"], &[2, 2], vec![1.0, 2.0, 3.0, 4.0])
            .expect("variable"),
    )
    .expect("insert");
    let d = Dashboard::new(data).expect("dashboard");
    assert_eq!(d.kwargs().variable.as_deref(), Some("only"));
    assert!(!d.bus().is_disabled(d.plot_button()));
}

#[test]
fn empty_dataset_is_refused() {
    assert!(Dashboard::new(ekman::data::Dataset::new()).is_err());
}

#[derive(Default)]
struct Counter {
    bus: SigSlot<Counter>,
    hits: Vec<&'static str>,
}

impl Observer for Counter {
    fn sigslot(&self) -> &SigSlot<Self> {
        &self.bus
    }

    fn sigslot_mut(&mut self) -> &mut SigSlot<Self> {
        &mut self.bus
    }
}

#[test]
fn false_callback_short_circuits_emission() {
    let mut root = Counter::default();
    let id = root.bus.add_widget(Widget::select("pick", options_from(["a", "b"])));
    root.bus.register(Some(id), "pick", Attr::Value);
    root.bus.connect("pick", |c: &mut Counter, _: &Value| {
        c.hits.push("first");
        false
    });
    root.bus.connect("pick", |c: &mut Counter, _: &Value| c.hits.push("second"));

    root.set_value(id, "a");
    root.emit("pick", &Value::from("b"));
    assert_eq!(root.hits, ["first", "first"]);
}
