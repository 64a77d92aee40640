//! Horizontal axis guessing from CF metadata.

use crate::data::{Dataset, Variable};
use std::fmt;

/// Suggests which coordinates of a variable make the best x and y axes.
pub trait AxisGuesser: fmt::Debug {
    /// Return `(x, y)` names, or `None` if no confident guess exists.
    fn guess(&self, data: &Dataset, var: &str) -> Option<(String, String)>;
}

/// Guesser reading CF conventions: `axis`, `standard_name`, `units`, and
/// finally well-known names.
#[derive(Debug, Clone, Copy, Default)]
pub struct CfAxisGuesser;

#[derive(Clone, Copy, PartialEq)]
enum Horizontal {
    X,
    Y,
}

impl Horizontal {
    fn axis(self) -> &'static str {
        match self {
            Horizontal::X => "X",
            Horizontal::Y => "Y",
        }
    }

    fn standard_names(self) -> &'static [&'static str] {
        match self {
            Horizontal::X => &["projection_x_coordinate", "longitude", "grid_longitude"],
            Horizontal::Y => &["projection_y_coordinate", "latitude", "grid_latitude"],
        }
    }

    fn units(self) -> &'static [&'static str] {
        match self {
            Horizontal::X => &["degrees_east", "degree_east", "degree_E", "degrees_E", "degreeE", "degreesE"],
            Horizontal::Y => &["degrees_north", "degree_north", "degree_N", "degrees_N", "degreeN", "degreesN"],
        }
    }

    fn names(self) -> &'static [&'static str] {
        match self {
            Horizontal::X => &["lon", "longitude", "x", "xc"],
            Horizontal::Y => &["lat", "latitude", "y", "yc"],
        }
    }

    /// Confidence that `var` is this axis; higher is stronger.
    fn score(self, var: &Variable) -> u8 {
        let attr = |key: &str| var.attrs.get(key).map(String::as_str);

        if attr("axis") == Some(self.axis()) {
            4
        } else if attr("standard_name").map_or(false, |s| self.standard_names().contains(&s)) {
            3
        } else if attr("units").map_or(false, |u| self.units().contains(&u)) {
            2
        } else if self.names().contains(&var.name.to_lowercase().as_str()) {
            1
        } else {
            0
        }
    }
}

impl CfAxisGuesser {
    fn pick(data: &Dataset, candidates: &[String], axis: Horizontal) -> Option<String> {
        candidates
            .iter()
            .filter_map(|name| data.variable(name).map(|v| (axis.score(v), name)))
            .filter(|(score, _)| *score > 0)
            .max_by_key(|(score, _)| *score)
            .map(|(_, name)| name.clone())
    }
}

impl AxisGuesser for CfAxisGuesser {
    fn guess(&self, data: &Dataset, var: &str) -> Option<(String, String)> {
        let candidates = data.var_coords(var);
        let x = Self::pick(data, &candidates, Horizontal::X)?;
        let y = Self::pick(data, &candidates, Horizontal::Y)?;
        (x != y).then_some((x, y))
    }
}
