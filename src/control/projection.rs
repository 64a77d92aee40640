//! Geographic projection pane and the projection provider seam.
//!
//! The pane exists only when a [`ProjectionProvider`] is handed to the
//! dashboard. Its widgets stay disabled unless both axes are coordinates of
//! the plotted variable and `is_geo` is checked.

use super::kwargs::ProjectionOptions;
use crate::config::InitialParams;
use crate::dashboard::Dashboard;
use crate::error::{EkmanError, Result};
use crate::sigslot::{Observer, SigSlot, WidgetId};
use crate::widget::{options_from, Attr, Value, Widget};
use serde::Serialize;
use serde_json::{json, Map, Value as Json};
use std::fmt;
use tracing::{debug, warn};

/// Projection parameters, a JSON object.
pub type ProjParams = Map<String, Json>;

/// Geographic features that can be overlaid. `None` means no feature.
pub const FEATURES: [&str; 8] = [
    "None",
    "borders",
    "coastline",
    "grid",
    "land",
    "lakes",
    "ocean",
    "rivers",
];

/// A resolved coordinate reference system or output projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Crs {
    /// Catalog name.
    pub name: String,
    /// Full parameter set, defaults filled in.
    pub params: ProjParams,
}

/// Supplies projections, their parameters and basemap tiles.
pub trait ProjectionProvider: fmt::Debug {
    /// Names of the available projections.
    fn projections(&self) -> Vec<String>;

    /// Names of the available basemap tile sources.
    fn tile_sources(&self) -> Vec<String>;

    /// Default parameters of a projection.
    fn default_params(&self, name: &str) -> Option<ProjParams>;

    /// Resolve the CRS the data is expressed in.
    fn crs(&self, name: &str, params: &ProjParams) -> Result<Crs>;

    /// Resolve the output projection.
    fn projection(&self, name: &str, params: &ProjParams) -> Result<Crs> {
        self.crs(name, params)
    }
}

/// Parse parameter text. Blank text means no parameters.
pub fn parse_params(text: &str) -> Result<ProjParams> {
    if text.trim().is_empty() {
        return Ok(ProjParams::new());
    }
    match serde_json::from_str::<Json>(text)? {
        Json::Object(map) => Ok(map),
        other => Err(EkmanError::Projection(format!(
            "parameters must be a JSON object, got {}",
            other
        ))),
    }
}

const GLOBE_KEYS: [&str; 8] = [
    "datum",
    "ellipse",
    "semimajor_axis",
    "semiminor_axis",
    "flattening",
    "inverse_flattening",
    "towgs84",
    "nadgrids",
];

/// Built-in catalog of cartographic projections.
#[derive(Debug, Clone, Copy, Default)]
pub struct CartographicProvider;

impl CartographicProvider {
    fn catalog(name: &str) -> Option<Json> {
        let params = match name {
            "AlbersEqualArea" => json!({
                "central_longitude": 0.0, "central_latitude": 0.0,
                "false_easting": 0.0, "false_northing": 0.0,
                "standard_parallels": [20.0, 50.0], "globe": null
            }),
            "AzimuthalEquidistant" => json!({
                "central_longitude": 0.0, "central_latitude": 0.0,
                "false_easting": 0.0, "false_northing": 0.0, "globe": null
            }),
            "EqualEarth" => json!({
                "central_longitude": 0.0, "false_easting": null,
                "false_northing": null, "globe": null
            }),
            "EquidistantConic" => json!({
                "central_longitude": 0.0, "central_latitude": 0.0,
                "false_easting": 0.0, "false_northing": 0.0,
                "standard_parallels": [20.0, 50.0], "globe": null
            }),
            "Geostationary" => json!({
                "central_longitude": 0.0, "satellite_height": 35785831.0,
                "false_easting": 0.0, "false_northing": 0.0,
                "globe": null, "sweep_axis": "y"
            }),
            "Gnomonic" => json!({
                "central_latitude": 0.0, "central_longitude": 0.0, "globe": null
            }),
            "InterruptedGoodeHomolosine" => json!({
                "central_longitude": 0.0, "globe": null
            }),
            "LambertAzimuthalEqualArea" => json!({
                "central_longitude": 0.0, "central_latitude": 0.0,
                "false_easting": 0.0, "false_northing": 0.0, "globe": null
            }),
            "LambertConformal" => json!({
                "central_longitude": -96.0, "central_latitude": 39.0,
                "false_easting": 0.0, "false_northing": 0.0,
                "secant_latitudes": null, "standard_parallels": null,
                "globe": null, "cutoff": -30.0
            }),
            "LambertCylindrical" => json!({ "central_longitude": 0.0 }),
            "Mercator" => json!({
                "central_longitude": 0.0, "min_latitude": -80.0, "max_latitude": 84.0,
                "globe": null, "latitude_true_scale": null,
                "false_easting": 0.0, "false_northing": 0.0, "scale_factor": null
            }),
            "Miller" => json!({ "central_longitude": 0.0, "globe": null }),
            "Mollweide" => json!({
                "central_longitude": 0.0, "globe": null,
                "false_easting": null, "false_northing": null
            }),
            "NearsidePerspective" => json!({
                "central_longitude": 0.0, "central_latitude": 0.0,
                "satellite_height": 35785831.0, "false_easting": 0.0,
                "false_northing": 0.0, "globe": null
            }),
            "NorthPolarStereo" => json!({
                "central_longitude": 0.0, "true_scale_latitude": null, "globe": null
            }),
            "Orthographic" => json!({
                "central_longitude": 0.0, "central_latitude": 0.0, "globe": null
            }),
            "PlateCarree" => json!({ "central_longitude": 0.0, "globe": null }),
            "Robinson" => json!({
                "central_longitude": 0.0, "globe": null,
                "false_easting": null, "false_northing": null
            }),
            "RotatedPole" => json!({
                "pole_longitude": 0.0, "pole_latitude": 90.0,
                "central_rotated_longitude": 0.0, "globe": null
            }),
            "Sinusoidal" => json!({
                "central_longitude": 0.0, "false_easting": 0.0,
                "false_northing": 0.0, "globe": null
            }),
            "SouthPolarStereo" => json!({
                "central_longitude": 0.0, "true_scale_latitude": null, "globe": null
            }),
            "Stereographic" => json!({
                "central_latitude": 0.0, "central_longitude": 0.0,
                "false_easting": 0.0, "false_northing": 0.0,
                "true_scale_latitude": null, "scale_factor": null, "globe": null
            }),
            "TransverseMercator" => json!({
                "central_longitude": 0.0, "central_latitude": 0.0,
                "false_easting": 0.0, "false_northing": 0.0,
                "scale_factor": 1.0, "globe": null, "approx": null
            }),
            _ => return None,
        };
        Some(params)
    }

    const NAMES: [&'static str; 23] = [
        "AlbersEqualArea",
        "AzimuthalEquidistant",
        "EqualEarth",
        "EquidistantConic",
        "Geostationary",
        "Gnomonic",
        "InterruptedGoodeHomolosine",
        "LambertAzimuthalEqualArea",
        "LambertConformal",
        "LambertCylindrical",
        "Mercator",
        "Miller",
        "Mollweide",
        "NearsidePerspective",
        "NorthPolarStereo",
        "Orthographic",
        "PlateCarree",
        "Robinson",
        "RotatedPole",
        "Sinusoidal",
        "SouthPolarStereo",
        "Stereographic",
        "TransverseMercator",
    ];

    const TILES: [&'static str; 13] = [
        "CartoDark",
        "CartoEco",
        "CartoLight",
        "CartoMidnight",
        "ESRI",
        "EsriImagery",
        "EsriNatGeo",
        "EsriReference",
        "EsriTerrain",
        "EsriUSATopo",
        "OSM",
        "StamenTerrain",
        "Wikipedia",
    ];

    fn check_value(name: &str, key: &str, default: &Json, value: &Json) -> Result<()> {
        let bad = |what: &str| {
            Err(EkmanError::Projection(format!(
                "{}: '{}' {}",
                name, key, what
            )))
        };
        match (key, value) {
            (_, Json::Null) => Ok(()),
            ("globe", Json::Object(globe)) => match globe.keys().find(|k| !GLOBE_KEYS.contains(&k.as_str())) {
                Some(k) => bad(&format!("has unknown key '{}'", k)),
                None => Ok(()),
            },
            ("globe", _) => bad("must be an object"),
            (_, v) if default.is_number() && !v.is_number() => bad("must be a number"),
            (_, v) if default.is_string() && !v.is_string() => bad("must be a string"),
            _ => Ok(()),
        }
    }
}

impl ProjectionProvider for CartographicProvider {
    fn projections(&self) -> Vec<String> {
        Self::NAMES.iter().map(|s| s.to_string()).collect()
    }

    fn tile_sources(&self) -> Vec<String> {
        Self::TILES.iter().map(|s| s.to_string()).collect()
    }

    fn default_params(&self, name: &str) -> Option<ProjParams> {
        match Self::catalog(name)? {
            Json::Object(map) => Some(map),
            _ => None,
        }
    }

    fn crs(&self, name: &str, params: &ProjParams) -> Result<Crs> {
        let mut full = self
            .default_params(name)
            .ok_or_else(|| EkmanError::Projection(format!("unknown projection '{}'", name)))?;
        for (key, value) in params {
            let Some(default) = full.get(key) else {
                return Err(EkmanError::Projection(format!(
                    "{} has no parameter '{}'",
                    name, key
                )));
            };
            Self::check_value(name, key, default, value)?;
            full.insert(key.clone(), value.clone());
        }
        Ok(Crs {
            name: name.to_string(),
            params: full,
        })
    }
}

/// Projection controls.
#[derive(Debug, Clone)]
pub struct Projection {
    /// Project geographically.
    pub is_geo: WidgetId,
    /// Project before plotting.
    pub project: WidgetId,
    /// Span the globe.
    pub global_extent: WidgetId,
    /// Mesh opacity.
    pub alpha: WidgetId,
    /// Basemap tiles.
    pub basemap: WidgetId,
    /// Overlaid features.
    pub features: WidgetId,
    /// Data CRS.
    pub crs: WidgetId,
    /// Data CRS parameters.
    pub crs_params: WidgetId,
    /// Output projection.
    pub projection: WidgetId,
    /// Output projection parameters.
    pub proj_params: WidgetId,
}

impl Projection {
    pub(crate) fn new(bus: &mut SigSlot<Dashboard>, provider: &dyn ProjectionProvider) -> Self {
        let mut projections = provider.projections();
        projections.sort();
        let default_crs = if projections.iter().any(|p| p == "PlateCarree") {
            Value::from("PlateCarree")
        } else {
            projections.first().cloned().into()
        };

        let mut basemaps = vec![Value::None];
        basemaps.extend(options_from(provider.tile_sources()));
        let mut outputs = vec![Value::None];
        outputs.extend(options_from(projections.clone()));
        let default_features: Vec<String> = FEATURES[1..].iter().map(|s| s.to_string()).collect();

        let mut add = |w: Widget| bus.add_widget(w);
        let pane = Self {
            is_geo: add(Widget::checkbox("is_geo", false).disabled(true)),
            project: add(Widget::checkbox("project", false)),
            global_extent: add(Widget::checkbox("global_extent", false)),
            alpha: add(Widget::float_slider("alpha", 0.7, 0.0, 1.0, 0.01)),
            basemap: add(Widget::select("basemap", basemaps)),
            features: add(Widget::multi_select("features", options_from(FEATURES), default_features)),
            crs: add(Widget::select("crs", options_from(projections)).with_value(default_crs)),
            crs_params: add(Widget::text_input("crs params", Some("{}"))),
            projection: add(Widget::select("projection", outputs)),
            proj_params: add(Widget::text_input("projection params", Some("{}"))),
        };

        bus.register(Some(pane.is_geo), "geo_changed", Attr::Value);
        bus.register(Some(pane.is_geo), "geo_disabled", Attr::Disabled);
        bus.register(Some(pane.crs), "add_crs_params", Attr::Value);
        bus.register(Some(pane.projection), "add_proj_params", Attr::Value);
        bus.register(Some(pane.basemap), "show_basemap", Attr::Value);
        bus.connect("geo_changed", |d: &mut Dashboard, _: &Value| Projection::setup(d));
        bus.connect("geo_disabled", |d: &mut Dashboard, _: &Value| Projection::setup(d));
        bus.connect("add_crs_params", |d: &mut Dashboard, v: &Value| {
            Projection::add_params(d, v, |p| p.crs_params)
        });
        bus.connect("add_proj_params", |d: &mut Dashboard, v: &Value| {
            Projection::add_params(d, v, |p| p.proj_params)
        });
        bus.connect("show_basemap", |d: &mut Dashboard, _: &Value| Projection::show_basemap(d));
        pane
    }

    /// Widgets in panel order.
    pub fn widgets(&self) -> [WidgetId; 10] {
        [
            self.is_geo,
            self.project,
            self.global_extent,
            self.alpha,
            self.basemap,
            self.features,
            self.crs,
            self.crs_params,
            self.projection,
            self.proj_params,
        ]
    }

    /// Fill parameters for the initially selected CRS and sync enablement.
    pub(crate) fn init(d: &mut Dashboard) {
        let Some(pane) = d.control.projection.clone() else {
            return;
        };
        let crs = d.bus.value(pane.crs).clone();
        Self::add_params(d, &crs, |p| p.crs_params);
        Self::setup(d);
    }

    /// Enable or disable the geographic widgets.
    pub(crate) fn setup(d: &mut Dashboard) {
        let Some(pane) = d.control.projection.clone() else {
            return;
        };
        let disabled = d.bus.is_disabled(pane.is_geo)
            || !d.bus.value(pane.is_geo).as_bool().unwrap_or(false);
        for id in [
            pane.alpha,
            pane.basemap,
            pane.features,
            pane.crs,
            pane.crs_params,
            pane.projection,
            pane.proj_params,
        ] {
            d.set(id, Attr::Disabled, disabled);
        }
        if !disabled && !d.bus.value(pane.basemap).is_none() {
            d.set(pane.projection, Attr::Disabled, true);
            d.set(pane.proj_params, Attr::Disabled, true);
        }
        debug!(disabled, "projection pane updated");
    }

    /// A basemap excludes an output projection and replaces the features.
    pub(crate) fn show_basemap(d: &mut Dashboard) {
        let Some(pane) = d.control.projection.clone() else {
            return;
        };
        let has_basemap = !d.bus.value(pane.basemap).is_none();
        let pane_disabled = d.bus.is_disabled(pane.basemap);
        d.set(pane.projection, Attr::Disabled, has_basemap || pane_disabled);
        d.set(pane.proj_params, Attr::Disabled, has_basemap || pane_disabled);

        let features: Vec<String> = if has_basemap {
            vec![FEATURES[0].to_string()]
        } else {
            FEATURES[1..].iter().map(|s| s.to_string()).collect()
        };
        d.set_value(pane.features, features);
    }

    fn add_params(d: &mut Dashboard, value: &Value, target: impl Fn(&Projection) -> WidgetId) {
        let (Some(name), Some(pane)) = (value.as_str(), d.control.projection.as_ref()) else {
            return;
        };
        let target = target(pane);
        let text = d
            .projection_provider
            .as_ref()
            .and_then(|p| p.default_params(name))
            .map(|params| Json::Object(params).to_string())
            .unwrap_or_else(|| "{}".to_string());
        d.set_value(target, text);
    }

    /// Block or allow geographic projection.
    pub(crate) fn disable_geo(d: &mut Dashboard, disabled: bool) {
        if let Some(pane) = d.control.projection.as_ref() {
            let is_geo = pane.is_geo;
            d.set(is_geo, Attr::Disabled, disabled);
        }
    }

    pub(crate) fn setup_initial_values(d: &mut Dashboard, params: &InitialParams) {
        let Some(pane) = d.control.projection.clone() else {
            return;
        };
        if params.get("is_geo") == Some(&Json::Bool(true)) {
            d.set(pane.is_geo, Attr::Disabled, false);
        }
        for id in pane.widgets() {
            let Some(name) = d.bus.widget(id).map(|w| w.name().to_string()) else {
                continue;
            };
            match params.get(&name).map(|json| (json, Value::from_json(json))) {
                Some((_, Some(value))) => {
                    d.set_value(id, value);
                },
                Some((json, None)) => warn!(widget = %name, value = %json, "unsupported parameter value"),
                None => {},
            }
        }
    }

    /// Snapshot of the pane.
    pub fn kwargs(&self, bus: &SigSlot<Dashboard>) -> ProjectionOptions {
        let text = |id: WidgetId| bus.value(id).as_str().map(String::from);
        let flag = |id: WidgetId| bus.value(id).as_bool().unwrap_or(false);
        ProjectionOptions {
            is_geo: flag(self.is_geo),
            project: flag(self.project),
            global_extent: flag(self.global_extent),
            alpha: bus.value(self.alpha).as_f64().unwrap_or(0.7),
            basemap: text(self.basemap),
            features: bus
                .value(self.features)
                .as_list()
                .map(<[String]>::to_vec)
                .unwrap_or_default(),
            crs: text(self.crs).unwrap_or_default(),
            crs_params: text(self.crs_params).unwrap_or_default(),
            projection: text(self.projection),
            projection_params: text(self.proj_params).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_filled_and_overridden() {
        let provider = CartographicProvider;
        let params = parse_params(r#"{"central_longitude": 180}"#).unwrap();
        let crs = provider.crs("PlateCarree", &params).unwrap();
        assert_eq!(crs.params["central_longitude"], json!(180));
        assert_eq!(crs.params["globe"], Json::Null);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let provider = CartographicProvider;
        let unknown = parse_params(r#"{"zoom": 3}"#).unwrap();
        assert!(provider.crs("Mercator", &unknown).is_err());

        let wrong_type = parse_params(r#"{"central_longitude": "east"}"#).unwrap();
        assert!(provider.crs("Mercator", &wrong_type).is_err());

        let globe = parse_params(r#"{"globe": {"ellipse": "WGS84"}}"#).unwrap();
        assert!(provider.crs("Mercator", &globe).is_ok());
        let bad_globe = parse_params(r#"{"globe": {"shape": "flat"}}"#).unwrap();
        assert!(provider.crs("Mercator", &bad_globe).is_err());

        assert!(provider.crs("Flat", &ProjParams::new()).is_err());
    }

    #[test]
    fn parameter_text() {
        assert!(parse_params("  ").unwrap().is_empty());
        assert!(parse_params("[1, 2]").is_err());
        assert!(matches!(parse_params("{oops"), Err(EkmanError::Params(_))));
    }

    #[test]
    fn catalog_is_complete() {
        let provider = CartographicProvider;
        for name in provider.projections() {
            assert!(provider.default_params(&name).is_some(), "{}", name);
        }
        assert!(provider.tile_sources().contains(&"OSM".to_string()));
    }
}
