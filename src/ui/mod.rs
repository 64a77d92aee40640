//! User interface rendering.

mod controls;
mod formatters;
mod graph;
mod keymap_bar;
mod status_bar;
mod theme;

use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::Block,
    Frame,
};

pub use theme::ThemeColors;

/// Draw the UI: controls on the left, output on the right, bars below.
pub fn draw(f: &mut Frame<'_>, app: &App) {
    let colors = ThemeColors::from_theme(app.theme);
    f.render_widget(Block::default().style(Style::default().bg(colors.bg0)), f.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1), Constraint::Length(1)])
        .split(f.area());
    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[0]);

    controls::draw_controls(f, main[0], app, &colors);
    graph::draw_output(f, main[1], app, &colors);
    status_bar::draw_status(f, chunks[1], &app.status, app.editing.as_deref(), &colors);
    keymap_bar::draw_keymap(f, chunks[2], app.focus, app.editing.is_some(), &colors);
}
