//! Control panel: tab bar, the rows of the active tab, and the variable
//! description.

use super::ThemeColors;
use crate::app::{App, Focus};
use crate::control::Display;
use crate::sigslot::WidgetId;
use crate::widget::{Value, Widget, WidgetKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame,
};

/// Draw the control panel.
pub fn draw_controls(f: &mut Frame<'_>, area: Rect, app: &App, colors: &ThemeColors) {
    let block = Block::default()
        .title(" Controls ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if app.focus == Focus::Controls {
            colors.yellow
        } else {
            colors.bg2
        }))
        .style(Style::default().bg(colors.bg0));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let describe = app.tab == 0;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(if describe {
            vec![Constraint::Length(2), Constraint::Length(3), Constraint::Min(3), Constraint::Length(1)]
        } else {
            vec![Constraint::Length(2), Constraint::Min(3), Constraint::Length(0), Constraint::Length(1)]
        })
        .split(inner);

    let tabs = Tabs::new(app.tabs())
        .select(app.tab)
        .style(Style::default().fg(colors.gray))
        .highlight_style(Style::default().fg(colors.yellow).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(colors.bg2)),
        );
    f.render_widget(tabs, chunks[0]);

    let rows = app.rows();
    let mut lines = Vec::new();
    for (i, id) in rows.iter().enumerate() {
        let focused = app.focus == Focus::Controls && i == app.cursor;
        lines.extend(widget_lines(app, *id, focused, colors));
    }
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "Select a variable first",
            Style::default().fg(colors.gray),
        )));
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), chunks[1]);

    if describe {
        draw_description(f, chunks[2], app, colors);
    }

    let plot = app.dashboard.plot_button();
    let disabled = app.dashboard.bus().is_disabled(plot);
    let button = Paragraph::new(Line::from(vec![
        Span::styled(
            " [ Plot ] ",
            if disabled {
                Style::default().fg(colors.gray)
            } else {
                Style::default().fg(colors.bg0).bg(colors.green).add_modifier(Modifier::BOLD)
            },
        ),
        Span::styled("  p", Style::default().fg(colors.gray)),
    ]));
    f.render_widget(button, chunks[3]);
}

fn row_style(widget: &Widget, focused: bool, colors: &ThemeColors) -> (Style, Style) {
    if focused {
        let style = Style::default().fg(colors.bg0).bg(colors.yellow).add_modifier(Modifier::BOLD);
        (style, style)
    } else if widget.is_disabled() {
        (Style::default().fg(colors.gray), Style::default().fg(colors.gray))
    } else {
        (Style::default().fg(colors.green), Style::default().fg(colors.aqua))
    }
}

fn widget_lines<'a>(app: &App, id: WidgetId, focused: bool, colors: &ThemeColors) -> Vec<Line<'a>> {
    let Some(widget) = app.dashboard.bus().widget(id) else {
        return Vec::new();
    };
    let (name_style, value_style) = row_style(widget, focused, colors);
    let name = Span::styled(format!("{}: ", widget.name()), name_style);

    match widget.kind() {
        WidgetKind::MultiSelect | WidgetKind::CrossSelector => {
            let chosen = widget.value().as_list().unwrap_or_default();
            let mut lines = vec![Line::from(name)];
            for (i, option) in widget.options().iter().enumerate() {
                let option = option.to_string();
                let mark = if chosen.contains(&option) { "[x]" } else { "[ ]" };
                let style = if focused && i == app.option_cursor {
                    Style::default().fg(colors.bg0).bg(colors.aqua)
                } else {
                    value_style.remove_modifier(Modifier::BOLD).bg(colors.bg0)
                };
                lines.push(Line::from(Span::styled(format!("  {} {}", mark, option), style)));
            }
            lines
        },
        WidgetKind::TextInput if focused && app.editing.is_some() => {
            let text = app.editing.clone().unwrap_or_default();
            vec![Line::from(vec![name, Span::styled(format!("{}_", text), value_style)])]
        },
        kind => {
            let value = match (kind, widget.value()) {
                (WidgetKind::Checkbox, Value::Bool(true)) => "[x]".to_string(),
                (WidgetKind::Checkbox, _) => "[ ]".to_string(),
                (_, Value::Str(s)) if widget.name() == "Variables" => {
                    Display::label(app.dashboard.data(), s)
                },
                (WidgetKind::Select | WidgetKind::Player, v) => format!("< {} >", v),
                (_, v) => v.to_string(),
            };
            vec![Line::from(vec![name, Span::styled(value, value_style)])]
        },
    }
}

fn draw_description(f: &mut Frame<'_>, area: Rect, app: &App, colors: &ThemeColors) {
    let mut lines = Vec::new();
    for section in app.dashboard.control().describer.sections() {
        lines.push(Line::from(Span::styled(
            section.title.clone(),
            Style::default().fg(colors.yellow).add_modifier(Modifier::BOLD),
        )));
        for (key, value) in &section.rows {
            lines.push(Line::from(vec![
                Span::styled(format!("  {}: ", key), Style::default().fg(colors.green)),
                Span::styled(value.clone(), Style::default().fg(colors.fg0)),
            ]));
        }
    }
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(colors.bg2)),
    );
    f.render_widget(paragraph, area);
}
