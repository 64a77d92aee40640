//! Color themes for the UI.

use crate::app::Theme;
use ratatui::style::Color;

/// Theme color palette.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    /// Background color.
    pub bg0: Color,
    /// Raised background (bars, focused rows).
    pub bg1: Color,
    /// Border color.
    pub bg2: Color,
    /// Primary text color.
    pub fg0: Color,
    /// Dimmed text (disabled widgets, missing values).
    pub gray: Color,
    /// Widget names.
    pub green: Color,
    /// Titles and the focused row.
    pub yellow: Color,
    /// Widget values.
    pub aqua: Color,
    /// The crosshair.
    pub orange: Color,
    /// Errors.
    pub red: Color,
}

impl ThemeColors {
    /// Create color palette from theme.
    pub fn from_theme(theme: Theme) -> Self {
        match theme {
            Theme::GruvboxDark => Self {
                bg0: Color::Rgb(40, 40, 40),
                bg1: Color::Rgb(60, 56, 54),
                bg2: Color::Rgb(102, 92, 84),
                fg0: Color::Rgb(235, 219, 178),
                gray: Color::Rgb(146, 131, 116),
                green: Color::Rgb(184, 187, 38),
                yellow: Color::Rgb(250, 189, 47),
                aqua: Color::Rgb(142, 192, 124),
                orange: Color::Rgb(254, 128, 25),
                red: Color::Rgb(251, 73, 52),
            },
            Theme::GruvboxLight => Self {
                bg0: Color::Rgb(251, 241, 199),
                bg1: Color::Rgb(235, 219, 178),
                bg2: Color::Rgb(213, 196, 161),
                fg0: Color::Rgb(60, 56, 54),
                gray: Color::Rgb(146, 131, 116),
                green: Color::Rgb(121, 116, 14),
                yellow: Color::Rgb(181, 118, 20),
                aqua: Color::Rgb(66, 123, 88),
                orange: Color::Rgb(175, 58, 3),
                red: Color::Rgb(157, 0, 6),
            },
        }
    }
}
