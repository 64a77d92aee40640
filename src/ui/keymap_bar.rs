//! Keymap help bar UI component.

use crate::app::Focus;
use crate::ui::ThemeColors;
use ratatui::{layout::Rect, style::Style, widgets::Paragraph, Frame};

/// Draw the keymap help bar.
pub fn draw_keymap(f: &mut Frame<'_>, area: Rect, focus: Focus, editing: bool, colors: &ThemeColors) {
    let keymap_text = if editing {
        "Enter:apply | Esc:cancel | Backspace:delete | empty clears the value"
    } else {
        match focus {
            Focus::Controls => {
                "q:quit | Tab:pane | jk:row | hl:change | Space:toggle | Enter:edit | p:plot | f:plot focus | y:copy | T:theme"
            },
            Focus::Plot => {
                "hjkl:move | Enter:tap | c:clear | s:selector | +-:step | Space:play | f/Esc:controls | q:quit"
            },
        }
    };

    let paragraph =
        Paragraph::new(keymap_text).style(Style::default().fg(colors.fg0).bg(colors.bg0));

    f.render_widget(paragraph, area);
}
