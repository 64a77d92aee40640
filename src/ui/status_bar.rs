//! Status bar UI component.

use crate::ui::ThemeColors;
use ratatui::{layout::Rect, style::Style, widgets::Paragraph, Frame};

/// Draw the status bar. Text being typed replaces the status.
pub fn draw_status(
    f: &mut Frame<'_>,
    area: Rect,
    status: &str,
    editing: Option<&str>,
    colors: &ThemeColors,
) {
    let text = match editing {
        Some(buffer) => format!("> {}_", buffer),
        None => status.to_string(),
    };

    let paragraph = Paragraph::new(text).style(Style::default().fg(colors.fg0).bg(colors.bg1));

    f.render_widget(paragraph, area);
}
