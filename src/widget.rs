//! Observable widget records.
//!
//! A widget is a named bundle of attributes (`value`, `options`, `disabled`,
//! `clicks`). Widgets live in the arena of a [`SigSlot`](crate::sigslot::SigSlot)
//! and are written through [`Observer::set`](crate::sigslot::Observer::set),
//! which fires the signal registered for the changed attribute.

use serde::Serialize;
use std::fmt;

/// A widget attribute value.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// No value (an unset select, a cleared text input).
    #[default]
    None,
    /// Boolean (checkboxes).
    Bool(bool),
    /// Integer (int sliders, button clicks).
    Int(i64),
    /// Floating point (float sliders, coordinate labels).
    Float(f64),
    /// Text.
    Str(String),
    /// A list of names (multi selects, coordinate selection).
    List(Vec<String>),
}

impl Value {
    /// Check for [`Value::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Borrow as a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Read as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Read as an integer. Integral floats are accepted.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            _ => None,
        }
    }

    /// Read as a float. Integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Borrow as a list of names.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Convert a JSON value (initial parameters) into a widget value.
    ///
    /// Arrays become name lists; nested objects are not representable.
    pub fn from_json(json: &serde_json::Value) -> Option<Value> {
        use serde_json::Value as Json;

        match json {
            Json::Null => Some(Value::None),
            Json::Bool(b) => Some(Value::Bool(*b)),
            Json::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .or_else(|| n.as_f64().map(Value::Float)),
            Json::String(s) => Some(Value::Str(s.clone())),
            Json::Array(items) => Some(Value::List(
                items
                    .iter()
                    .map(|item| match item {
                        Json::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
            )),
            Json::Object(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(l) => write!(f, "[{}]", l.join(", ")),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Vec<String>> for Value {
    fn from(l: Vec<String>) -> Self {
        Value::List(l)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(o: Option<T>) -> Self {
        o.map(Into::into).unwrap_or(Value::None)
    }
}

/// Observable attribute of a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attr {
    /// The current value.
    Value,
    /// The list of selectable options.
    Options,
    /// Whether the widget accepts user input.
    Disabled,
    /// Button click counter.
    Clicks,
}

impl Attr {
    /// Attribute name.
    pub fn name(self) -> &'static str {
        match self {
            Attr::Value => "value",
            Attr::Options => "options",
            Attr::Disabled => "disabled",
            Attr::Clicks => "clicks",
        }
    }
}

/// The kind of a widget, which decides what values it accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetKind {
    /// Pick one of `options` (or nothing).
    Select,
    /// Step through `options` one at a time (animation).
    Player,
    /// Pick any subset of `options`.
    MultiSelect,
    /// Move names between "available" and "selected" lists.
    CrossSelector,
    /// On/off.
    Checkbox,
    /// Integer in `start..=end`.
    IntSlider {
        /// Lower bound.
        start: i64,
        /// Upper bound.
        end: i64,
    },
    /// Float in `start..=end`.
    FloatSlider {
        /// Lower bound.
        start: f64,
        /// Upper bound.
        end: f64,
        /// Keyboard step.
        step: f64,
    },
    /// Free text.
    TextInput,
    /// Push button, counts clicks.
    Button,
}

impl WidgetKind {
    /// Check whether the kind picks its value from `options`.
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            WidgetKind::Select
                | WidgetKind::Player
                | WidgetKind::MultiSelect
                | WidgetKind::CrossSelector
        )
    }
}

/// A named, observable UI control.
#[derive(Debug, Clone)]
pub struct Widget {
    name: String,
    kind: WidgetKind,
    value: Value,
    options: Vec<Value>,
    disabled: bool,
    clicks: i64,
}

impl Widget {
    fn new(name: impl Into<String>, kind: WidgetKind, value: Value, options: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            kind,
            value,
            options,
            disabled: false,
            clicks: 0,
        }
    }

    /// Create a select with the given options. The value starts unset.
    pub fn select(name: impl Into<String>, options: Vec<Value>) -> Self {
        Self::new(name, WidgetKind::Select, Value::None, options)
    }

    /// Create a player stepping through `options`, starting at the first one.
    pub fn player(name: impl Into<String>, options: Vec<Value>) -> Self {
        let value = options.first().cloned().unwrap_or_default();
        Self::new(name, WidgetKind::Player, value, options)
    }

    /// Create a multi select.
    pub fn multi_select(name: impl Into<String>, options: Vec<Value>, value: Vec<String>) -> Self {
        Self::new(name, WidgetKind::MultiSelect, Value::List(value), options)
    }

    /// Create a cross selector.
    pub fn cross_selector(
        name: impl Into<String>,
        options: Vec<Value>,
        value: Vec<String>,
    ) -> Self {
        Self::new(name, WidgetKind::CrossSelector, Value::List(value), options)
    }

    /// Create a checkbox.
    pub fn checkbox(name: impl Into<String>, value: bool) -> Self {
        Self::new(name, WidgetKind::Checkbox, Value::Bool(value), Vec::new())
    }

    /// Create an integer slider.
    pub fn int_slider(name: impl Into<String>, value: i64, start: i64, end: i64) -> Self {
        Self::new(
            name,
            WidgetKind::IntSlider { start, end },
            Value::Int(value.clamp(start, end)),
            Vec::new(),
        )
    }

    /// Create a float slider.
    pub fn float_slider(name: impl Into<String>, value: f64, start: f64, end: f64, step: f64) -> Self {
        Self::new(
            name,
            WidgetKind::FloatSlider { start, end, step },
            Value::Float(value.clamp(start, end)),
            Vec::new(),
        )
    }

    /// Create a text input.
    pub fn text_input(name: impl Into<String>, value: Option<&str>) -> Self {
        Self::new(name, WidgetKind::TextInput, value.into(), Vec::new())
    }

    /// Create a button.
    pub fn button(name: impl Into<String>) -> Self {
        Self::new(name, WidgetKind::Button, Value::None, Vec::new())
    }

    /// Start disabled.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Start with a value. Not validated against the options.
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    /// Widget name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Widget kind.
    pub fn kind(&self) -> &WidgetKind {
        &self.kind
    }

    /// Current value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Selectable options.
    pub fn options(&self) -> &[Value] {
        &self.options
    }

    /// Whether user input is blocked.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Number of clicks (buttons).
    pub fn clicks(&self) -> i64 {
        self.clicks
    }

    /// Read an attribute.
    pub fn get(&self, attr: Attr) -> Value {
        match attr {
            Attr::Value => self.value.clone(),
            Attr::Options => Value::List(self.options.iter().map(|o| o.to_string()).collect()),
            Attr::Disabled => Value::Bool(self.disabled),
            Attr::Clicks => Value::Int(self.clicks),
        }
    }

    /// Normalize `value` into something this widget can hold, or `None` if
    /// it is not acceptable.
    pub fn coerce(&self, value: Value) -> Option<Value> {
        match &self.kind {
            WidgetKind::Select | WidgetKind::Player => {
                if value.is_none() || self.options.contains(&value) {
                    Some(value)
                } else {
                    // Numeric labels may arrive as ints or floats.
                    let f = value.as_f64()?;
                    self.options
                        .iter()
                        .find(|o| o.as_f64() == Some(f))
                        .cloned()
                }
            },
            WidgetKind::MultiSelect | WidgetKind::CrossSelector => {
                let names = value.as_list()?;
                let known = names
                    .iter()
                    .all(|n| self.options.iter().any(|o| o.as_str() == Some(n.as_str())));
                known.then_some(value)
            },
            WidgetKind::Checkbox => value.as_bool().map(Value::Bool),
            WidgetKind::IntSlider { start, end } => {
                let i = value.as_i64()?;
                (*start..=*end).contains(&i).then_some(Value::Int(i))
            },
            WidgetKind::FloatSlider { start, end, .. } => {
                let f = value.as_f64()?;
                (*start..=*end).contains(&f).then_some(Value::Float(f))
            },
            WidgetKind::TextInput => match value {
                Value::None | Value::Str(_) => Some(value),
                Value::Int(_) | Value::Float(_) => Some(Value::Str(value.to_string())),
                _ => None,
            },
            WidgetKind::Button => None,
        }
    }

    /// Write an attribute. Returns the attributes that actually changed,
    /// or `Err(())` when the new value is rejected.
    pub(crate) fn apply(&mut self, attr: Attr, value: Value) -> Result<Vec<Attr>, ()> {
        match attr {
            Attr::Value => {
                let value = self.coerce(value).ok_or(())?;
                if value == self.value {
                    return Ok(Vec::new());
                }
                self.value = value;
                Ok(vec![Attr::Value])
            },
            Attr::Options => {
                let options = match value {
                    Value::List(names) => names.into_iter().map(Value::Str).collect(),
                    Value::None => Vec::new(),
                    _ => return Err(()),
                };
                self.replace_options(options)
            },
            Attr::Disabled => {
                let disabled = value.as_bool().ok_or(())?;
                if disabled == self.disabled {
                    return Ok(Vec::new());
                }
                self.disabled = disabled;
                Ok(vec![Attr::Disabled])
            },
            Attr::Clicks => {
                let clicks = value.as_i64().ok_or(())?;
                if clicks == self.clicks {
                    return Ok(Vec::new());
                }
                self.clicks = clicks;
                Ok(vec![Attr::Clicks])
            },
        }
    }

    /// Replace the options list. A select whose value is no longer offered
    /// falls back to the first option.
    pub(crate) fn replace_options(&mut self, options: Vec<Value>) -> Result<Vec<Attr>, ()> {
        if !self.kind.has_options() {
            return Err(());
        }
        if options == self.options {
            return Ok(Vec::new());
        }
        self.options = options;
        let mut changed = vec![Attr::Options];

        match self.kind {
            WidgetKind::Select | WidgetKind::Player => {
                if !self.value.is_none() && !self.options.contains(&self.value) {
                    self.value = self.options.first().cloned().unwrap_or_default();
                    changed.push(Attr::Value);
                }
            },
            WidgetKind::MultiSelect | WidgetKind::CrossSelector => {
                if let Value::List(names) = &self.value {
                    let kept: Vec<String> = names
                        .iter()
                        .filter(|n| self.options.iter().any(|o| o.as_str() == Some(n.as_str())))
                        .cloned()
                        .collect();
                    if kept.len() != names.len() {
                        self.value = Value::List(kept);
                        changed.push(Attr::Value);
                    }
                }
            },
            _ => {},
        }
        Ok(changed)
    }
}

/// Build an options list from names.
pub fn options_from<I, S>(names: I) -> Vec<Value>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(|n| Value::Str(n.into())).collect()
}
