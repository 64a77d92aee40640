//! Colormap catalog and value-to-colour mapping.

use ratatui::style::Color;

/// Colormaps offered by the style pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Colormap {
    /// Perceptually uniform black-red-yellow.
    #[default]
    Inferno,
    /// Perceptually uniform black-purple-cream.
    Magma,
    /// Perceptually uniform blue-red-yellow.
    Plasma,
    /// Perceptually uniform purple-green-yellow.
    Viridis,
    /// Hue sweep from blue to red.
    Rainbow,
    /// Diverging blue-white-red.
    BlueRed,
    /// Black to white.
    Greys,
}

impl Colormap {
    /// Every colormap, in menu order.
    pub const ALL: [Colormap; 7] = [
        Colormap::Inferno,
        Colormap::Magma,
        Colormap::Plasma,
        Colormap::Viridis,
        Colormap::Rainbow,
        Colormap::BlueRed,
        Colormap::Greys,
    ];

    /// Catalog name.
    pub fn name(self) -> &'static str {
        match self {
            Colormap::Inferno => "Inferno",
            Colormap::Magma => "Magma",
            Colormap::Plasma => "Plasma",
            Colormap::Viridis => "Viridis",
            Colormap::Rainbow => "Rainbow",
            Colormap::BlueRed => "BlueRed",
            Colormap::Greys => "Greys",
        }
    }

    /// Look up by catalog name, ignoring case.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }

    /// Catalog names.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.name()).collect()
    }

    /// Map a normalized value (0.0 to 1.0) to an RGB color.
    pub fn color(self, t: f64) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        match self {
            Colormap::Inferno => interpolate(INFERNO, t),
            Colormap::Magma => interpolate(MAGMA, t),
            Colormap::Plasma => interpolate(PLASMA, t),
            Colormap::Viridis => interpolate(VIRIDIS, t),
            Colormap::Rainbow => rainbow_color(t),
            Colormap::BlueRed => bluered_color(t),
            Colormap::Greys => {
                let v = (t * 255.0) as u8;
                Color::Rgb(v, v, v)
            },
        }
    }
}

type Stops = &'static [(u8, u8, u8)];

const INFERNO: Stops = &[(0, 0, 4), (87, 16, 110), (188, 55, 84), (249, 142, 9), (252, 255, 164)];
const MAGMA: Stops = &[(0, 0, 4), (81, 18, 124), (183, 55, 121), (252, 137, 97), (252, 253, 191)];
const PLASMA: Stops = &[(13, 8, 135), (126, 3, 168), (204, 71, 120), (248, 149, 64), (240, 249, 33)];
const VIRIDIS: Stops = &[(68, 1, 84), (59, 82, 139), (33, 145, 140), (94, 201, 98), (253, 231, 37)];

/// Piecewise-linear interpolation between evenly spaced stops.
fn interpolate(stops: Stops, t: f64) -> Color {
    let segments = (stops.len() - 1) as f64;
    let pos = t * segments;
    let i = (pos.floor() as usize).min(stops.len() - 2);
    let f = pos - i as f64;
    let (a, b) = (stops[i], stops[i + 1]);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * f).round() as u8;
    Color::Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Rainbow/Spectral colormap.
fn rainbow_color(t: f64) -> Color {
    // H from 240° (blue) down to 0° (red), full saturation and value
    let h = (1.0 - t) * 240.0;
    let x = 1.0 - ((h / 60.0) % 2.0 - 1.0).abs();

    let (r, g, b) = if h < 60.0 {
        (1.0, x, 0.0)
    } else if h < 120.0 {
        (x, 1.0, 0.0)
    } else if h < 180.0 {
        (0.0, 1.0, x)
    } else {
        (0.0, x, 1.0)
    };

    Color::Rgb((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

/// Blue-White-Red diverging colormap.
fn bluered_color(t: f64) -> Color {
    if t < 0.5 {
        let v = (t * 2.0 * 255.0) as u8;
        Color::Rgb(v, v, 255)
    } else {
        let v = ((1.0 - (t - 0.5) * 2.0) * 255.0) as u8;
        Color::Rgb(255, v, v)
    }
}

/// Parse a `#rrggbb` colour.
pub fn hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_hit_the_stops() {
        assert_eq!(Colormap::Inferno.color(0.0), Color::Rgb(0, 0, 4));
        assert_eq!(Colormap::Inferno.color(1.0), Color::Rgb(252, 255, 164));
        assert_eq!(Colormap::Inferno.color(f64::NAN), Color::Rgb(0, 0, 4));
        assert_eq!(Colormap::BlueRed.color(0.0), Color::Rgb(0, 0, 255));
    }

    #[test]
    fn catalog_lookup() {
        assert_eq!(Colormap::parse("inferno"), Some(Colormap::Inferno));
        assert_eq!(Colormap::parse("jet"), None);
        assert_eq!(Colormap::names()[0], "Inferno");
    }

    #[test]
    fn hex_colors() {
        assert_eq!(hex_color("#60fffc"), Some(Color::Rgb(0x60, 0xff, 0xfc)));
        assert_eq!(hex_color("60fffc"), None);
    }
}
