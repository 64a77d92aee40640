//! Plot output: heatmap with colorbar, crosshair and tap markers, the
//! index selectors, and the extracted series.

use super::formatters::format_stat_value;
use super::ThemeColors;
use crate::app::{App, Focus};
use crate::colormaps::{hex_color, Colormap};
use crate::render::{Frame as MeshFrame, Graph};
use crate::widget::WidgetKind;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

/// Terminal cells are about twice as tall as wide.
const PIXEL_WIDTH: usize = 2;

/// Draw the output side.
pub fn draw_output(f: &mut Frame<'_>, area: Rect, app: &App, colors: &ThemeColors) {
    let Some(graph) = app.dashboard.graph() else {
        let para = Paragraph::new("Pick a variable and press p to plot")
            .style(Style::default().fg(colors.gray))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(colors.bg2)),
            );
        f.render_widget(para, area);
        return;
    };

    let has_series = !app.dashboard.series().is_empty();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),
            Constraint::Length(if app.dashboard.index_selectors().is_empty() { 0 } else { 2 }),
            Constraint::Length(if has_series { 12 } else { 0 }),
        ])
        .split(area);

    match graph.frame() {
        Ok(frame) => draw_heatmap(f, chunks[0], app, graph, &frame, colors),
        Err(e) => {
            let para = Paragraph::new(format!("Cannot draw: {}", e))
                .style(Style::default().fg(colors.red))
                .alignment(Alignment::Center);
            f.render_widget(para, chunks[0]);
        },
    }
    draw_selectors(f, chunks[1], app, colors);
    if has_series {
        draw_series(f, chunks[2], app, colors);
    }
}

fn draw_heatmap(
    f: &mut Frame<'_>,
    area: Rect,
    app: &App,
    graph: &Graph,
    frame: &MeshFrame,
    colors: &ThemeColors,
) {
    let cmap = Colormap::parse(&graph.options.cmap).unwrap_or_default();
    let (lo, hi) = graph.options.color_range;
    let range = if (hi - lo).abs() < 1e-12 { 1.0 } else { hi - lo };
    let (rows, cols) = frame.values.dim();
    let (cr, cc) = app.crosshair;

    let mut title = format!(" {} | y: {} | x: {} | {} ", graph.options.title, frame.rows, frame.cols, cmap.name());
    if let Some(geo) = &graph.geo {
        title.push_str(&format!("| {} ", geo.crs.name));
    }
    let focused = app.focus == Focus::Plot;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { colors.yellow } else { colors.bg2 }))
        .title(title)
        .title_style(Style::default().fg(colors.yellow));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.width < 4 || inner.height < 4 || rows == 0 || cols == 0 {
        return;
    }

    // Header line: crosshair readout, or the colorbar.
    let header = if focused {
        let value = frame.values.get((cr, cc)).copied().unwrap_or(f64::NAN);
        let at = graph
            .locate(frame, cr, cc)
            .map(|(x, y)| format!("x={} y={}", format_stat_value(x), format_stat_value(y)))
            .unwrap_or_default();
        Some(format!("{} value={}", at, format_stat_value(value)))
    } else {
        None
    };
    match header {
        Some(text) => f.render_widget(
            Paragraph::new(text).style(Style::default().fg(colors.orange)),
            Rect { height: 1, ..inner },
        ),
        None if graph.options.colorbar => draw_colorbar(f, inner, cmap, lo, hi, colors),
        None => {},
    }

    let area = Rect {
        y: inner.y + 1,
        height: inner.height.saturating_sub(1),
        ..inner
    };
    let height = area.height as usize;
    let display_cols = (area.width as usize / PIXEL_WIDTH).max(1);
    let row_step = (rows as f64 / height as f64).max(1.0);
    let col_step = (cols as f64 / display_cols as f64).max(1.0);

    // Higher rows are drawn nearer the top.
    let screen = |row: usize, col: usize| -> Option<(u16, u16)> {
        let y = (row as f64 / row_step) as usize;
        let px = (col as f64 / col_step) as usize;
        if y >= height || px >= display_cols {
            return None;
        }
        Some((area.x + (px * PIXEL_WIDTH) as u16, area.y + (height - 1 - y) as u16))
    };

    for y in 0..height {
        let row = ((y as f64) * row_step) as usize;
        if row >= rows {
            break;
        }
        for px in 0..display_cols {
            let col = ((px as f64) * col_step) as usize;
            if col >= cols {
                break;
            }
            let val = frame.values[[row, col]];
            let Some((sx, sy)) = screen(row, col) else {
                continue;
            };
            for i in 0..PIXEL_WIDTH as u16 {
                if sx + i >= area.x + area.width {
                    break;
                }
                if let Some(cell) = f.buffer_mut().cell_mut((sx + i, sy)) {
                    if val.is_finite() {
                        cell.set_char('█').set_fg(cmap.color((val - lo) / range));
                    } else {
                        cell.set_char('·').set_fg(colors.gray);
                    }
                }
            }
        }
    }

    for tap in app.dashboard.taps() {
        let Some((row, col)) = nearest_cell(graph, frame, tap.x, tap.y) else {
            continue;
        };
        if let Some((sx, sy)) = screen(row, col) {
            if let Some(cell) = f.buffer_mut().cell_mut((sx, sy)) {
                cell.set_char('▲').set_fg(hex_color(tap.color).unwrap_or(colors.fg0));
            }
        }
    }

    if focused {
        if let Some((sx, sy)) = screen(cr, cc) {
            if let Some(cell) = f.buffer_mut().cell_mut((sx, sy)) {
                cell.set_char('+').set_fg(colors.orange).set_bg(colors.bg0);
            }
        }
    }
}

fn draw_colorbar(f: &mut Frame<'_>, inner: Rect, cmap: Colormap, lo: f64, hi: f64, colors: &ThemeColors) {
    let min_label = format_stat_value(lo);
    let max_label = format_stat_value(hi);
    let labels = (min_label.len() + max_label.len() + 2) as u16;
    let width = inner.width.saturating_sub(labels) as usize;

    let mut spans = vec![Span::styled(format!("{} ", min_label), Style::default().fg(colors.green))];
    for i in 0..width {
        let t = i as f64 / width.max(1) as f64;
        spans.push(Span::styled("█", Style::default().fg(cmap.color(t))));
    }
    spans.push(Span::styled(format!(" {}", max_label), Style::default().fg(colors.green)));
    f.render_widget(Paragraph::new(Line::from(spans)), Rect { height: 1, ..inner });
}

/// Frame cell whose axis values are closest to `(x, y)`.
fn nearest_cell(graph: &Graph, frame: &MeshFrame, x: f64, y: f64) -> Option<(usize, usize)> {
    let (rows, cols) = frame.values.dim();
    (0..rows)
        .flat_map(|r| (0..cols).map(move |c| (r, c)))
        .filter_map(|(r, c)| {
            let (cx, cy) = graph.locate(frame, r, c)?;
            Some(((cx - x).powi(2) + (cy - y).powi(2), (r, c)))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, cell)| cell)
}

fn draw_selectors(f: &mut Frame<'_>, area: Rect, app: &App, colors: &ThemeColors) {
    if area.height == 0 {
        return;
    }
    let bus = app.dashboard.bus();
    let mut spans = vec![Span::styled("Index: ", Style::default().fg(colors.green))];
    for (i, (dim, id)) in app.dashboard.index_selectors().iter().enumerate() {
        let Some(widget) = bus.widget(*id) else {
            continue;
        };
        let player = matches!(widget.kind(), WidgetKind::Player);
        let mark = match (player, app.playing) {
            (true, true) => "▶ ",
            (true, false) => "⏸ ",
            _ => "",
        };
        let value = widget.value().as_f64().map(format_stat_value).unwrap_or_default();
        let style = if app.focus == Focus::Plot && i == app.active_selector {
            Style::default().fg(colors.bg0).bg(colors.yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.aqua)
        };
        spans.push(Span::styled(format!(" {}{}={} ", mark, dim, value), style));
    }
    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(colors.bg2)),
    );
    f.render_widget(paragraph, area);
}

fn draw_series(f: &mut Frame<'_>, area: Rect, app: &App, colors: &ThemeColors) {
    let series = app.dashboard.series();
    let finite = |p: &&(f64, f64)| p.0.is_finite() && p.1.is_finite();
    let points: Vec<Vec<(f64, f64)>> = series
        .iter()
        .map(|s| s.points.iter().filter(finite).copied().collect())
        .collect();

    let bounds = |pick: fn(&(f64, f64)) -> f64| {
        points
            .iter()
            .flatten()
            .map(pick)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
    };
    let (x_min, x_max) = bounds(|p| p.0);
    let (y_min, y_max) = bounds(|p| p.1);
    if !x_min.is_finite() || !y_min.is_finite() {
        return;
    }
    let padding = ((y_max - y_min).abs() * 0.1).max(1e-9);
    let (y_min, y_max) = (y_min - padding, y_max + padding);

    let datasets = series
        .iter()
        .zip(&points)
        .map(|(curve, data)| {
            Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(hex_color(curve.color).unwrap_or(colors.fg0)))
                .data(data)
        })
        .collect();

    let along = series.last().map(|s| s.along.clone()).unwrap_or_default();
    let fixed = series
        .last()
        .map(|s| {
            s.fixed
                .iter()
                .map(|(dim, v)| format!("{}={}", dim, format_stat_value(*v)))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.bg2))
                .title(format!(" Series along {} [{}] ", along, fixed))
                .title_style(Style::default().fg(colors.yellow)),
        )
        .x_axis(
            Axis::default()
                .title(along)
                .style(Style::default().fg(colors.fg0))
                .bounds([x_min, x_max.max(x_min + 1e-9)])
                .labels(vec![format_stat_value(x_min), format_stat_value(x_max)]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(colors.fg0))
                .bounds([y_min, y_max])
                .labels(vec![
                    format_stat_value(y_min),
                    format_stat_value((y_min + y_max) / 2.0),
                    format_stat_value(y_max),
                ]),
        );
    f.render_widget(chart, area);
}
