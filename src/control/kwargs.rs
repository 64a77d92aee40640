//! Typed configuration records gathered from the control panes.
//!
//! Each pane produces its own record; [`Kwargs::merge`] combines them into
//! the snapshot the dashboard renders from. [`Kwargs::to_flat`] gives the
//! flat name → value view used for initial parameters and JSON output.

use crate::data::Reduction;
use crate::error::Result;
use crate::widget::Value;
use std::collections::BTreeMap;

/// How a remaining dimension is handled when plotting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Hold at one label, picked with a select.
    Select,
    /// Step through labels with a player.
    Animate,
    /// Reduce with the mean.
    Mean,
    /// Reduce with the maximum.
    Max,
    /// Reduce with the minimum.
    Min,
    /// Reduce with the median.
    Median,
    /// Reduce with the standard deviation.
    Std,
    /// Count non-missing values.
    Count,
}

impl Disposition {
    /// Every disposition, in menu order.
    pub const ALL: [Disposition; 8] = [
        Disposition::Select,
        Disposition::Animate,
        Disposition::Mean,
        Disposition::Max,
        Disposition::Min,
        Disposition::Median,
        Disposition::Std,
        Disposition::Count,
    ];

    /// Name shown in the selector.
    pub fn name(self) -> &'static str {
        match self {
            Disposition::Select => "select",
            Disposition::Animate => "animate",
            Disposition::Mean => "mean",
            Disposition::Max => "max",
            Disposition::Min => "min",
            Disposition::Median => "median",
            Disposition::Std => "std",
            Disposition::Count => "count",
        }
    }

    /// Parse a selector value.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.name() == name)
    }

    /// The reduction this disposition stands for, if any.
    pub fn reduction(self) -> Option<Reduction> {
        match self {
            Disposition::Select | Disposition::Animate => None,
            Disposition::Mean => Some(Reduction::Mean),
            Disposition::Max => Some(Reduction::Max),
            Disposition::Min => Some(Reduction::Min),
            Disposition::Median => Some(Reduction::Median),
            Disposition::Std => Some(Reduction::Std),
            Disposition::Count => Some(Reduction::Count),
        }
    }

    /// Check whether the dimension is kept and indexed when plotting.
    pub fn is_select_animate(self) -> bool {
        self.reduction().is_none()
    }
}

/// Numeric rescaling applied before colour mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScale {
    /// No rescaling.
    #[default]
    Linear,
    /// `e^v`.
    Exp,
    /// Natural logarithm.
    Log,
    /// `1/v`.
    Reciprocal,
    /// `v²`.
    Square,
    /// `√v`.
    Sqrt,
}

impl ColorScale {
    /// Every scale, in menu order.
    pub const ALL: [ColorScale; 6] = [
        ColorScale::Linear,
        ColorScale::Exp,
        ColorScale::Log,
        ColorScale::Reciprocal,
        ColorScale::Square,
        ColorScale::Sqrt,
    ];

    /// Name shown in the selector.
    pub fn name(self) -> &'static str {
        match self {
            ColorScale::Linear => "linear",
            ColorScale::Exp => "exp",
            ColorScale::Log => "log",
            ColorScale::Reciprocal => "reciprocal",
            ColorScale::Square => "square",
            ColorScale::Sqrt => "sqrt",
        }
    }

    /// Parse a selector value.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Rescale one value.
    pub fn apply(self, v: f64) -> f64 {
        match self {
            ColorScale::Linear => v,
            ColorScale::Exp => v.exp(),
            ColorScale::Log => v.ln(),
            ColorScale::Reciprocal => v.recip(),
            ColorScale::Square => v * v,
            ColorScale::Sqrt => v.sqrt(),
        }
    }
}

/// The chosen plot axes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisSelection {
    /// Horizontal axis.
    pub x: Option<String>,
    /// Vertical axis.
    pub y: Option<String>,
}

/// Disposition per remaining dimension, ordered by dimension name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispositionMap(BTreeMap<String, Disposition>);

impl DispositionMap {
    /// Set the disposition of a dimension.
    pub fn insert(&mut self, dim: impl Into<String>, disposition: Disposition) {
        self.0.insert(dim.into(), disposition);
    }

    /// Disposition of a dimension.
    pub fn get(&self, dim: &str) -> Option<Disposition> {
        self.0.get(dim).copied()
    }

    /// Dimension names, sorted.
    pub fn dims(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    /// Iterate over `(dim, disposition)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Disposition)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of dimensions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check for an empty map.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Axes, dispositions and derived partitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldsKwargs {
    /// Plot axes.
    pub axes: AxisSelection,
    /// Disposition per remaining dimension.
    pub dispositions: DispositionMap,
    /// Remaining dims that are reduced. Sorted.
    pub dims_to_aggregate: Vec<String>,
    /// Remaining dims that are selected or animated. Sorted.
    pub dims_to_select_animate: Vec<String>,
    /// Both axes are coordinates of the variable.
    pub are_axes_coordinates: bool,
    /// Dimensions not consumed by the axes, in declaration order.
    pub remaining_dims: Vec<String>,
    /// Dimension along which taps extract a series.
    pub extract_along: Option<String>,
}

impl FieldsKwargs {
    /// Build from axes and dispositions, deriving the partitions.
    pub fn new(
        axes: AxisSelection,
        dispositions: DispositionMap,
        are_axes_coordinates: bool,
        remaining_dims: Vec<String>,
        extract_along: Option<String>,
    ) -> Self {
        let (select_animate, aggregate): (Vec<_>, Vec<_>) = dispositions
            .iter()
            .partition(|(_, d)| d.is_select_animate());
        Self {
            dims_to_aggregate: aggregate.into_iter().map(|(k, _)| k.to_string()).collect(),
            dims_to_select_animate: select_animate
                .into_iter()
                .map(|(k, _)| k.to_string())
                .collect(),
            axes,
            dispositions,
            are_axes_coordinates,
            remaining_dims,
            extract_along,
        }
    }
}

/// Style pane record.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleOptions {
    /// Plot height.
    pub frame_height: i64,
    /// Plot width.
    pub frame_width: i64,
    /// Colormap name.
    pub cmap: String,
    /// Rescaling applied before colour mapping.
    pub color_scale: ColorScale,
    /// Lower colormap limit as typed.
    pub lower_limit: Option<String>,
    /// Upper colormap limit as typed.
    pub upper_limit: Option<String>,
    /// Compute automatic limits from all data instead of the first step.
    pub use_all_data: bool,
    /// Show a colorbar.
    pub colorbar: bool,
    /// Rasterize the image.
    pub rasterize: bool,
}

impl StyleOptions {
    /// Both limits, when both parse as numbers.
    pub fn user_limits(&self) -> Option<(f64, f64)> {
        let parse = |s: &Option<String>| s.as_deref().and_then(|s| s.trim().parse::<f64>().ok());
        Some((parse(&self.lower_limit)?, parse(&self.upper_limit)?))
    }
}

/// Projection pane record.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionOptions {
    /// Project geographically.
    pub is_geo: bool,
    /// Project before plotting.
    pub project: bool,
    /// Span the whole globe.
    pub global_extent: bool,
    /// Mesh opacity.
    pub alpha: f64,
    /// Basemap tile source.
    pub basemap: Option<String>,
    /// Geographic features overlaid.
    pub features: Vec<String>,
    /// CRS of the data.
    pub crs: String,
    /// CRS parameters as JSON text.
    pub crs_params: String,
    /// Output projection.
    pub projection: Option<String>,
    /// Output projection parameters as JSON text.
    pub projection_params: String,
}

/// The full control snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Kwargs {
    /// Selected variable.
    pub variable: Option<String>,
    /// Axes and dispositions.
    pub fields: FieldsKwargs,
    /// Style.
    pub style: StyleOptions,
    /// Projection, when the pane exists.
    pub projection: Option<ProjectionOptions>,
}

impl Kwargs {
    /// Combine the pane records.
    pub fn merge(
        variable: Option<String>,
        fields: FieldsKwargs,
        style: StyleOptions,
        projection: Option<ProjectionOptions>,
    ) -> Self {
        Self {
            variable,
            fields,
            style,
            projection,
        }
    }

    /// Flat name → value view.
    pub fn to_flat(&self) -> BTreeMap<String, Value> {
        let mut out = BTreeMap::new();
        let mut put = |key: &str, value: Value| {
            out.insert(key.to_string(), value);
        };

        put("Variables", self.variable.clone().into());

        let fields = &self.fields;
        put("x", fields.axes.x.clone().into());
        put("y", fields.axes.y.clone().into());
        for (dim, disposition) in fields.dispositions.iter() {
            put(dim, disposition.name().into());
        }
        put("dims_to_aggregate", fields.dims_to_aggregate.clone().into());
        put("dims_to_select_animate", fields.dims_to_select_animate.clone().into());
        put("are_axes_coordinates", fields.are_axes_coordinates.into());
        put("remaining_dims", fields.remaining_dims.clone().into());
        put("extract along", fields.extract_along.clone().into());

        let style = &self.style;
        put("frame_height", style.frame_height.into());
        put("frame_width", style.frame_width.into());
        put("cmap", style.cmap.clone().into());
        put("color_scale", style.color_scale.name().into());
        put("cmap lower limit", style.lower_limit.clone().into());
        put("cmap upper limit", style.upper_limit.clone().into());
        put("compute min/max from all data", style.use_all_data.into());
        put("colorbar", style.colorbar.into());
        put("rasterize", style.rasterize.into());

        if let Some(proj) = &self.projection {
            put("is_geo", proj.is_geo.into());
            put("project", proj.project.into());
            put("global_extent", proj.global_extent.into());
            put("alpha", proj.alpha.into());
            put("basemap", proj.basemap.clone().into());
            put("features", proj.features.clone().into());
            put("crs", proj.crs.clone().into());
            put("crs params", proj.crs_params.clone().into());
            put("projection", proj.projection.clone().into());
            put("projection params", proj.projection_params.clone().into());
        }
        out
    }

    /// Flat view as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_flat())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> StyleOptions {
        StyleOptions {
            frame_height: 300,
            frame_width: 450,
            cmap: "Inferno".into(),
            color_scale: ColorScale::Linear,
            lower_limit: Some("0.5".into()),
            upper_limit: None,
            use_all_data: false,
            colorbar: true,
            rasterize: true,
        }
    }

    fn fields() -> FieldsKwargs {
        let mut dispositions = DispositionMap::default();
        dispositions.insert("time", Disposition::Count);
        dispositions.insert("sigma", Disposition::Animate);
        FieldsKwargs::new(
            AxisSelection {
                x: Some("nx".into()),
                y: Some("ny".into()),
            },
            dispositions,
            false,
            vec!["time".into(), "sigma".into()],
            None,
        )
    }

    #[test]
    fn partitions_follow_dispositions() {
        let f = fields();
        assert_eq!(f.dims_to_aggregate, ["time"]);
        assert_eq!(f.dims_to_select_animate, ["sigma"]);
    }

    #[test]
    fn flat_view_has_every_key() {
        let kwargs = Kwargs::merge(Some("temp".into()), fields(), style(), None);
        let flat = kwargs.to_flat();
        assert_eq!(flat["Variables"], Value::from("temp"));
        assert_eq!(flat["time"], Value::from("count"));
        assert_eq!(flat["extract along"], Value::None);
        assert_eq!(flat["cmap lower limit"], Value::from("0.5"));
        assert!(!flat.contains_key("is_geo"));

        let json = kwargs.to_json().unwrap();
        assert!(json.contains("\"dims_to_aggregate\": [\n    \"time\"\n  ]"));
    }

    #[test]
    fn user_limits_need_both_numbers() {
        let mut s = style();
        assert_eq!(s.user_limits(), None);
        s.upper_limit = Some(" 2 ".into());
        assert_eq!(s.user_limits(), Some((0.5, 2.0)));
    }

    #[test]
    fn names_round_trip() {
        for d in Disposition::ALL {
            assert_eq!(Disposition::parse(d.name()), Some(d));
        }
        assert_eq!(ColorScale::parse("sqrt"), Some(ColorScale::Sqrt));
        assert_eq!(Disposition::parse("sum"), None);
    }
}
