//! Application state and logic for the terminal front-end.

use std::path::PathBuf;

use crate::clipboard::copy_kwargs;
use crate::control::TABS;
use crate::dashboard::Dashboard;
use crate::sigslot::{Observer, WidgetId};
use crate::widget::{Value, WidgetKind};

/// Application theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    /// Gruvbox dark theme.
    GruvboxDark,
    /// Gruvbox light theme.
    GruvboxLight,
}

impl Theme {
    /// Get the next theme in the cycle.
    pub fn next(self) -> Self {
        match self {
            Theme::GruvboxDark => Theme::GruvboxLight,
            Theme::GruvboxLight => Theme::GruvboxDark,
        }
    }

    /// Get the theme name.
    pub fn name(self) -> &'static str {
        match self {
            Theme::GruvboxDark => "Gruvbox Dark",
            Theme::GruvboxLight => "Gruvbox Light",
        }
    }
}

/// Which half of the screen receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// The control tabs.
    Controls,
    /// The plot, with its crosshair and index selectors.
    Plot,
}

/// Application state.
#[derive(Debug)]
pub struct App {
    /// The dashboard being driven.
    pub dashboard: Dashboard,
    /// Opened file.
    pub file_path: PathBuf,
    /// Active control tab.
    pub tab: usize,
    /// Row of the active tab.
    pub cursor: usize,
    /// Option under the cursor of a multi-value widget.
    pub option_cursor: usize,
    /// Text being typed into a text input.
    pub editing: Option<String>,
    /// Key focus.
    pub focus: Focus,
    /// Crosshair position as (row, col) of the displayed frame.
    pub crosshair: (usize, usize),
    /// Index selector stepped by `+`/`-`.
    pub active_selector: usize,
    /// Players advance on every tick.
    pub playing: bool,
    /// Status message.
    pub status: String,
    /// Current theme.
    pub theme: Theme,
}

impl App {
    /// Create a new application instance.
    pub fn new(dashboard: Dashboard, file_path: PathBuf) -> Self {
        let name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "dataset".to_string());
        Self {
            dashboard,
            file_path,
            tab: 0,
            cursor: 0,
            option_cursor: 0,
            editing: None,
            focus: Focus::Controls,
            crosshair: (0, 0),
            active_selector: 0,
            playing: false,
            status: format!("{} loaded", name),
            theme: Theme::GruvboxDark,
        }
    }

    /// Tab names shown, without Projection when the pane is absent.
    pub fn tabs(&self) -> Vec<&'static str> {
        let n = if self.dashboard.control().projection.is_some() {
            TABS.len()
        } else {
            TABS.len() - 1
        };
        TABS[..n].to_vec()
    }

    /// Widgets of the active tab, top to bottom.
    pub fn rows(&self) -> Vec<WidgetId> {
        let control = self.dashboard.control();
        match TABS.get(self.tab).copied() {
            Some("Variables") => vec![control.displayer.select],
            Some("Set Coords") => vec![control.coord_setter.coord_selector],
            Some("Axes") => {
                let fields = &control.fields;
                let mut rows = vec![fields.x, fields.y];
                rows.extend(fields.agg_selectors().iter().map(|(_, id)| *id));
                rows.push(fields.series_selector);
                rows
            },
            Some("Style") => control.style.widgets().to_vec(),
            Some("Projection") => control
                .projection
                .as_ref()
                .map(|p| p.widgets().to_vec())
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// Widget under the cursor.
    pub fn current(&self) -> Option<WidgetId> {
        self.rows().get(self.cursor).copied()
    }

    /// Switch to the next tab.
    pub fn next_tab(&mut self) {
        self.tab = (self.tab + 1) % self.tabs().len();
        self.cursor = 0;
        self.option_cursor = 0;
    }

    /// Switch to the previous tab.
    pub fn prev_tab(&mut self) {
        let n = self.tabs().len();
        self.tab = (self.tab + n - 1) % n;
        self.cursor = 0;
        self.option_cursor = 0;
    }

    /// Move the cursor up.
    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
        self.option_cursor = 0;
    }

    /// Move the cursor down.
    pub fn cursor_down(&mut self) {
        let last = self.rows().len().saturating_sub(1);
        self.cursor = (self.cursor + 1).min(last);
        self.option_cursor = 0;
    }

    /// Step the widget under the cursor by `delta`.
    pub fn step(&mut self, delta: i64) {
        let Some(id) = self.current() else {
            return;
        };
        let Some(widget) = self.dashboard.bus().widget(id).cloned() else {
            return;
        };
        if widget.is_disabled() {
            self.status = format!("{} is disabled", widget.name());
            return;
        }

        let value = match widget.kind() {
            WidgetKind::Select | WidgetKind::Player => {
                let options = widget.options();
                if options.is_empty() {
                    return;
                }
                let n = options.len() as i64;
                let next = match options.iter().position(|o| o == widget.value()) {
                    Some(at) => (at as i64 + delta).rem_euclid(n),
                    // Unset: enter from either end.
                    None if delta > 0 => 0,
                    None => n - 1,
                };
                options[next as usize].clone()
            },
            WidgetKind::Checkbox => Value::Bool(!widget.value().as_bool().unwrap_or(false)),
            WidgetKind::IntSlider { start, end } => {
                let step = ((end - start) / 22).max(1);
                Value::Int((widget.value().as_i64().unwrap_or(*start) + delta * step).clamp(*start, *end))
            },
            WidgetKind::FloatSlider { start, end, step } => {
                let v = widget.value().as_f64().unwrap_or(*start) + delta as f64 * step * 5.0;
                Value::Float(((v.clamp(*start, *end)) * 100.0).round() / 100.0)
            },
            WidgetKind::MultiSelect | WidgetKind::CrossSelector => {
                let n = widget.options().len().max(1) as i64;
                self.option_cursor = (self.option_cursor as i64 + delta).rem_euclid(n) as usize;
                return;
            },
            WidgetKind::TextInput | WidgetKind::Button => return,
        };
        self.write(id, value);
    }

    /// Toggle a checkbox, or the option under the option cursor of a
    /// multi-value widget.
    pub fn toggle(&mut self) {
        let Some(id) = self.current() else {
            return;
        };
        let Some(widget) = self.dashboard.bus().widget(id).cloned() else {
            return;
        };
        match widget.kind() {
            WidgetKind::MultiSelect | WidgetKind::CrossSelector => {
                let Some(option) = widget.options().get(self.option_cursor).and_then(Value::as_str) else {
                    return;
                };
                let mut list = widget.value().as_list().map(<[String]>::to_vec).unwrap_or_default();
                match list.iter().position(|s| s == option) {
                    Some(at) => {
                        list.remove(at);
                    },
                    None => list.push(option.to_string()),
                }
                self.write(id, Value::List(list));
            },
            WidgetKind::Checkbox => self.step(1),
            _ => {},
        }
    }

    /// Start typing into the text input under the cursor.
    pub fn start_editing(&mut self) {
        let Some(id) = self.current() else {
            return;
        };
        if let Some(widget) = self.dashboard.bus().widget(id) {
            if matches!(widget.kind(), WidgetKind::TextInput) && !widget.is_disabled() {
                self.editing = Some(widget.value().as_str().unwrap_or_default().to_string());
            }
        }
    }

    /// Commit the typed text.
    pub fn commit_editing(&mut self) {
        let (Some(text), Some(id)) = (self.editing.take(), self.current()) else {
            return;
        };
        let value = if text.trim().is_empty() {
            Value::None
        } else {
            Value::Str(text)
        };
        self.write(id, value);
    }

    fn write(&mut self, id: WidgetId, value: Value) {
        let shown = value.to_string();
        if self.dashboard.set_value(id, value) {
            let name = self.dashboard.bus().widget(id).map(|w| w.name().to_string());
            self.status = format!("{} = {}", name.unwrap_or_default(), shown);
        }
        // Rebuilt selectors may shorten the tab.
        self.cursor = self.cursor.min(self.rows().len().saturating_sub(1));
    }

    /// Press Plot.
    pub fn plot(&mut self) {
        match self.dashboard.plot() {
            Ok(()) => {
                self.crosshair = (0, 0);
                self.active_selector = 0;
                self.status = match self.dashboard.graph() {
                    Some(graph) => format!("Plotted {}", graph.options.title),
                    None => "Plotted".to_string(),
                };
            },
            Err(e) => self.status = format!("Plot failed: {}", e),
        }
    }

    /// Toggle key focus between the controls and the plot.
    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Controls if self.dashboard.graph().is_some() => Focus::Plot,
            Focus::Controls => {
                self.status = "Nothing plotted yet".to_string();
                Focus::Controls
            },
            Focus::Plot => Focus::Controls,
        };
    }

    /// Move the crosshair, staying inside the frame.
    pub fn move_crosshair(&mut self, drow: i64, dcol: i64) {
        let Some(frame) = self.dashboard.graph().and_then(|g| g.frame().ok()) else {
            return;
        };
        let (rows, cols) = frame.values.dim();
        let clamp = |v: usize, d: i64, n: usize| (v as i64 + d).clamp(0, n.saturating_sub(1) as i64) as usize;
        self.crosshair = (clamp(self.crosshair.0, drow, rows), clamp(self.crosshair.1, dcol, cols));
    }

    /// Tap at the crosshair.
    pub fn tap(&mut self) {
        let Some(graph) = self.dashboard.graph() else {
            return;
        };
        let Some(point) = graph
            .frame()
            .ok()
            .and_then(|frame| graph.locate(&frame, self.crosshair.0, self.crosshair.1))
        else {
            self.status = "Cannot locate the crosshair".to_string();
            return;
        };
        if !self.dashboard.tap_enabled() {
            self.status = "Series extraction needs 3+ dims and an extract-along dim".to_string();
            return;
        }
        self.status = if self.dashboard.tap(point.0, point.1) {
            format!("Series at ({:.4}, {:.4})", point.0, point.1)
        } else {
            format!("No series at ({:.4}, {:.4})", point.0, point.1)
        };
    }

    /// Clear markers and series.
    pub fn clear_series(&mut self) {
        self.status = if self.dashboard.clear() {
            "Series cleared".to_string()
        } else {
            "Nothing to clear".to_string()
        };
    }

    /// Pick the next index selector.
    pub fn next_selector(&mut self) {
        let n = self.dashboard.index_selectors().len();
        if n > 0 {
            self.active_selector = (self.active_selector + 1) % n;
        }
    }

    /// Step the active index selector.
    pub fn step_selector(&mut self, delta: i64) {
        let Some((_, id)) = self.dashboard.index_selectors().get(self.active_selector).cloned() else {
            return;
        };
        self.step_index(id, delta);
    }

    fn step_index(&mut self, id: WidgetId, delta: i64) {
        let Some(widget) = self.dashboard.bus().widget(id) else {
            return;
        };
        let options = widget.options();
        if options.is_empty() {
            return;
        }
        let at = options.iter().position(|o| o == widget.value()).unwrap_or(0) as i64;
        let next = options[(at + delta).rem_euclid(options.len() as i64) as usize].clone();
        self.dashboard.set_value(id, next);
    }

    /// Start or stop the players.
    pub fn toggle_playing(&mut self) {
        self.playing = !self.playing;
        self.status = if self.playing { "Playing" } else { "Paused" }.to_string();
    }

    /// Advance every player by one step.
    pub fn tick(&mut self) {
        if !self.playing {
            return;
        }
        let players: Vec<WidgetId> = self
            .dashboard
            .index_selectors()
            .iter()
            .filter(|(_, id)| {
                self.dashboard
                    .bus()
                    .widget(*id)
                    .is_some_and(|w| matches!(w.kind(), WidgetKind::Player))
            })
            .map(|(_, id)| *id)
            .collect();
        for id in players {
            self.step_index(id, 1);
        }
    }

    /// Copy the kwargs snapshot as JSON.
    pub fn copy_kwargs(&mut self) {
        self.status = match copy_kwargs(&self.dashboard.kwargs()) {
            Ok(json) => format!("Kwargs copied! ({} bytes)", json.len()),
            Err(e) => format!("Copy failed: {}", e),
        };
    }

    /// Cycle to the next theme.
    pub fn cycle_theme(&mut self) {
        self.theme = self.theme.next();
        self.status = format!("Theme: {}", self.theme.name());
    }
}
