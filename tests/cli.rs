use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};

fn ekman() -> Command {
    Command::cargo_bin("ekman").expect("binary")
}

/// Small file with `time(2)` labels and `temp(time, nx)`.
fn write_dataset(dir: &Path) -> PathBuf {
    let path = dir.join("small.nc");
    let mut file = netcdf::create(&path).expect("create netcdf");
    file.add_dimension("time", 2).expect("time dim");
    file.add_dimension("nx", 3).expect("nx dim");

    let mut time = file.add_variable::<f64>("time", &["time"]).expect("time var");
    time.put_values(&[0.0, 6.0], ..).expect("time values");
    time.put_attribute("units", "hours since 2000-01-01").expect("units");

    let mut temp = file.add_variable::<f32>("temp", &["time", "nx"]).expect("temp var");
    temp.put_values(&[280.0f32, 281.0, 282.0, 290.0, 291.0, 292.0], ..)
        .expect("temp values");
    temp.put_attribute("units", "K").expect("units");
    drop(file);
    path
}

#[test]
fn missing_arguments_print_usage() {
    ekman()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
    ekman()
        .arg("show")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<PATH>"));
}

#[test]
fn unreadable_path_exits_with_one() {
    ekman()
        .args(["show", "/nonexistent/data.nc", "--dump-kwargs"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unable to open the datafile"));
}

#[test]
fn dump_kwargs_prints_the_snapshot() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_dataset(dir.path());

    ekman()
        .arg("show")
        .arg(&path)
        .args(["--dump-kwargs", "--param", "Variables=temp"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""Variables": "temp""#))
        .stdout(predicate::str::contains(r#""is_geo": false"#))
        .stdout(predicate::str::contains(r#""remaining_dims": []"#));
}

#[test]
fn params_file_is_overridden_by_param_flags() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_dataset(dir.path());
    let params = dir.path().join("params.json");
    std::fs::write(&params, r#"{"Variables": "temp", "cmap": "Magma", "frame_width": 800}"#)
        .expect("write params");

    ekman()
        .arg("show")
        .arg(&path)
        .arg("--params")
        .arg(&params)
        .args(["--param", "cmap=\"Greys\"", "--no-projection", "--dump-kwargs"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""cmap": "Greys""#))
        .stdout(predicate::str::contains(r#""frame_width": 800"#))
        .stdout(predicate::str::contains("is_geo").not());
}

#[test]
fn malformed_param_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_dataset(dir.path());

    ekman()
        .arg("show")
        .arg(&path)
        .args(["--param", "cmap", "--dump-kwargs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("KEY=VALUE"));
}

#[test]
fn log_file_is_written() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_dataset(dir.path());
    let log = dir.path().join("ekman.log");

    ekman()
        .arg("show")
        .arg(&path)
        .arg("--log")
        .arg(&log)
        .args(["--log-level", "info", "--dump-kwargs"])
        .assert()
        .success();

    let text = std::fs::read_to_string(&log).expect("log file");
    assert!(text.contains("dataset loaded"));
    assert!(!text.contains("DEBUG"));
}
