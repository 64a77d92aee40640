//! Metadata summary of the selected variable and the dataset.

use crate::dashboard::Dashboard;
use crate::data::Dataset;

/// One titled block of `(key, value)` rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    /// Block title.
    pub title: String,
    /// Rows.
    pub rows: Vec<(String, String)>,
}

impl Section {
    fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            rows: Vec::new(),
        }
    }

    fn row(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.rows.push((key.into(), value.into()));
    }
}

/// Text description shown next to the variable picker.
#[derive(Debug, Clone, Default)]
pub struct Describe {
    sections: Vec<Section>,
}

impl Describe {
    pub(crate) fn new(data: &Dataset) -> Self {
        Self {
            sections: describe(data, None),
        }
    }

    /// Rebuild for a newly selected variable.
    pub(crate) fn setup(d: &mut Dashboard, var: Option<&str>) {
        let sections = describe(&d.data, var);
        d.control.describer.sections = sections;
    }

    /// Rebuild after the coordinate set changed.
    pub(crate) fn set_coords(d: &mut Dashboard, var: Option<&str>) {
        if var.is_some() {
            Self::setup(d, var);
        }
    }

    /// Current description.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }
}

fn describe(data: &Dataset, var: Option<&str>) -> Vec<Section> {
    let mut sections = Vec::new();

    if let Some(variable) = var.and_then(|v| data.variable(v)) {
        let mut s = Section::new("Variable");
        s.row("name", variable.name.as_str());
        s.row("dtype", variable.dtype.as_str());
        let dims: Vec<String> = variable
            .dims
            .iter()
            .zip(variable.shape())
            .map(|(d, n)| format!("{}: {}", d, n))
            .collect();
        s.row("dims", dims.join(", "));
        s.row("shape", format!("{:?}", variable.shape()));
        s.row("size", variable.values.len().to_string());
        s.row("nbytes", (variable.values.len() * std::mem::size_of::<f64>()).to_string());
        s.row("coords", data.var_coords(&variable.name).join(", "));
        sections.push(s);

        let mut attrs = Section::new("Variable attributes");
        for (k, v) in &variable.attrs {
            attrs.row(k.as_str(), v.as_str());
        }
        sections.push(attrs);
    }

    let mut s = Section::new("Dataset");
    let dims: Vec<String> = data
        .dims()
        .iter()
        .map(|d| format!("{}: {}", d, data.dim_size(d).unwrap_or(0)))
        .collect();
    s.row("dims", dims.join(", "));
    s.row("coords", data.coord_names().join(", "));
    sections.push(s);

    let mut attrs = Section::new("Global attributes");
    for (k, v) in &data.attrs {
        attrs.row(k.as_str(), v.as_str());
    }
    sections.push(attrs);

    sections
}
