//! Initial parameters.
//!
//! A flat name → JSON value map whose keys mirror the flattened kwargs
//! (plus `Set Coords`). Values are applied to the matching controls once
//! the dashboard is set up.

use crate::error::{EkmanError, Result};
use serde_json::Value as Json;
use std::collections::BTreeMap;
use std::path::Path;

/// Initial control values, keyed like the flattened kwargs.
pub type InitialParams = BTreeMap<String, Json>;

/// Load initial parameters from a JSON object file.
pub fn load_params(path: &Path) -> Result<InitialParams> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| EkmanError::file_open(path.to_path_buf(), e))?;
    match serde_json::from_str::<Json>(&text)? {
        Json::Object(map) => Ok(map.into_iter().collect()),
        _ => Err(EkmanError::InvalidInput(format!(
            "{} must contain a JSON object",
            path.display()
        ))),
    }
}

/// Parse a `KEY=VALUE` pair. The value is read as JSON, falling back to a
/// plain string.
pub fn parse_param(pair: &str) -> Result<(String, Json)> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| EkmanError::InvalidInput(format!("expected KEY=VALUE, got '{}'", pair)))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(EkmanError::InvalidInput(format!("empty key in '{}'", pair)));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Json::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn pairs_parse_json_or_text() {
        assert_eq!(parse_param("frame_height=500").unwrap(), ("frame_height".into(), json!(500)));
        assert_eq!(parse_param("x=lon").unwrap(), ("x".into(), json!("lon")));
        assert_eq!(
            parse_param(r#"Set Coords=["lat","lon"]"#).unwrap(),
            ("Set Coords".into(), json!(["lat", "lon"]))
        );
        assert_eq!(parse_param("extract along=null").unwrap().1, Json::Null);
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=3").is_err());
    }

    #[test]
    fn params_file_must_be_an_object() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"Variables": "temp", "time": "animate"}}"#).unwrap();
        let params = load_params(file.path()).unwrap();
        assert_eq!(params["time"], json!("animate"));

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        write!(bad, "[1, 2]").unwrap();
        assert!(load_params(bad.path()).is_err());
    }
}
