//! Synthetic dataset shared by the integration tests.
//!
//! Dims `time(3)`, `sigma(2)`, `nx(4)`, `ny(5)`. `time` and `sigma` are
//! index coordinates. `lat`/`lon` start as plain 2-d data variables over
//! `(nx, ny)`; tests that need coordinate axes promote them through the
//! Set Coords selector.

#![allow(dead_code)]

use ekman::control::Disposition;
use ekman::data::{Dataset, Variable};
use ekman::sigslot::WidgetId;
use ekman::{Dashboard, Observer, Value};

pub const NT: usize = 3;
pub const NS: usize = 2;
pub const NX: usize = 4;
pub const NY: usize = 5;

pub const TIMES: [f64; NT] = [0.0, 6.0, 12.0];
pub const SIGMAS: [f64; NS] = [-1.0, -0.5];

pub fn lat(i: usize, j: usize) -> f64 {
    40.0 + i as f64 + j as f64 * 0.1
}

pub fn lon(i: usize, j: usize) -> f64 {
    -70.0 + j as f64 * 2.0 + i as f64 * 0.2
}

pub fn temp(t: usize, s: usize, i: usize, j: usize) -> f64 {
    280.0 + t as f64 * 10.0 + s as f64 + i as f64 * 0.1 + j as f64 * 0.01
}

fn grid(f: impl Fn(usize, usize) -> f64) -> Vec<f64> {
    (0..NX).flat_map(|i| (0..NY).map(move |j| (i, j))).map(|(i, j)| f(i, j)).collect()
}

pub fn dataset() -> Dataset {
    let mut data = Dataset::new().with_attr("title", "synthetic estuary");
    data.insert_coord(Variable::from_vec("time", &["time"], &[NT], TIMES.to_vec()).unwrap())
        .unwrap();
    data.insert_coord(Variable::from_vec("sigma", &["sigma"], &[NS], SIGMAS.to_vec()).unwrap())
        .unwrap();
    data.insert(Variable::from_vec("lat", &["nx", "ny"], &[NX, NY], grid(lat)).unwrap())
        .unwrap();
    data.insert(Variable::from_vec("lon", &["nx", "ny"], &[NX, NY], grid(lon)).unwrap())
        .unwrap();

    let mut values = Vec::with_capacity(NT * NS * NX * NY);
    for t in 0..NT {
        for s in 0..NS {
            values.extend(grid(|i, j| temp(t, s, i, j)));
        }
    }
    data.insert(
        Variable::from_vec("temp", &["time", "sigma", "nx", "ny"], &[NT, NS, NX, NY], values)
            .unwrap()
            .with_attr("units", "K"),
    )
    .unwrap();
    data.insert(Variable::from_vec("air", &["nx", "ny"], &[NX, NY], grid(|i, j| (i * NY + j) as f64)).unwrap())
        .unwrap();
    data.insert(Variable::from_vec("validtime", &["time"], &[NT], vec![1.0, 2.0, 3.0]).unwrap())
        .unwrap();

    let wind: Vec<f64> = (0..NT)
        .flat_map(|t| grid(move |i, j| t as f64 + i as f64 - j as f64))
        .collect();
    data.insert(Variable::from_vec("wind", &["time", "nx", "ny"], &[NT, NX, NY], wind).unwrap())
        .unwrap();
    data
}

pub fn dashboard() -> Dashboard {
    Dashboard::new(dataset()).expect("dashboard")
}

/// Dashboard with `var` selected.
pub fn with_variable(var: &str) -> Dashboard {
    let mut d = dashboard();
    assert!(d.select_variable(var));
    d
}

/// Promote `lat` and `lon` to coordinates.
pub fn promote_lat_lon(d: &mut Dashboard) {
    let selector = d.control().coord_setter.coord_selector;
    let coords: Vec<String> = ["lat", "lon", "sigma", "time"].iter().map(|s| s.to_string()).collect();
    assert!(d.set_value(selector, coords));
}

pub fn value(d: &Dashboard, id: WidgetId) -> Value {
    d.bus().value(id).clone()
}

pub fn x(d: &Dashboard) -> Option<String> {
    d.bus().value(d.control().fields.x).as_str().map(String::from)
}

pub fn y(d: &Dashboard) -> Option<String> {
    d.bus().value(d.control().fields.y).as_str().map(String::from)
}

pub fn y_options(d: &Dashboard) -> Vec<String> {
    let y = d.control().fields.y;
    d.bus()
        .widget(y)
        .map(|w| w.options().iter().map(|o| o.to_string()).collect())
        .unwrap_or_default()
}

pub fn set_x(d: &mut Dashboard, name: &str) -> bool {
    let x = d.control().fields.x;
    d.set_value(x, name)
}

pub fn set_disposition(d: &mut Dashboard, dim: &str, disposition: Disposition) {
    let id = d.control().fields.agg_selector(dim).expect("disposition selector");
    d.set_value(id, disposition.name());
}

pub fn set_extract_along(d: &mut Dashboard, dim: &str) {
    let id = d.control().fields.series_selector;
    assert!(d.set_value(id, dim));
}

/// Keys of the disposition map.
pub fn disposition_dims(d: &Dashboard) -> Vec<String> {
    d.kwargs().fields.dispositions.dims()
}

pub fn sorted(mut names: Vec<String>) -> Vec<String> {
    names.sort();
    names
}
