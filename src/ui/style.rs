/// RGB Color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const RED: Color = Color::new(255, 0, 0);
    pub const GREEN: Color = Color::new(0, 255, 0);
    pub const CYAN: Color = Color::new(0, 255, 255);
    pub const GRAY: Color = Color::new(128, 128, 128);
    pub const DARK_GRAY: Color = Color::new(64, 64, 64);
    pub const SKY_BLUE: Color = Color::new(135, 206, 235);
    pub const GOLD: Color = Color::new(255, 215, 0);
    pub const SELECTION_BG: Color = Color::new(40, 60, 100);
    pub const CELL_OFF: Color = Color::new(30, 30, 30);

    /// Fully saturated-ish color for a hue in degrees, used as the UI accent
    pub fn from_hue(hue: f64) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let (s, v) = (0.6, 1.0);
        let c = v * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = v - c;
        let to_u8 = |f: f64| ((f + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Color::new(to_u8(r), to_u8(g), to_u8(b))
    }
}

/// Text style with foreground, background, and attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
}

impl Style {
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            bold: false,
        }
    }

    pub const fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    pub const fn bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

impl From<Color> for ratatui::style::Color {
    fn from(c: Color) -> Self {
        ratatui::style::Color::Rgb(c.r, c.g, c.b)
    }
}

impl From<Style> for ratatui::style::Style {
    fn from(style: Style) -> Self {
        use ratatui::style::Modifier;

        let mut rs = ratatui::style::Style::default();
        if let Some(fg) = style.fg {
            rs = rs.fg(fg.into());
        }
        if let Some(bg) = style.bg {
            rs = rs.bg(bg.into());
        }
        if style.bold {
            rs = rs.add_modifier(Modifier::BOLD);
        }
        rs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hue_primaries() {
        assert_eq!(Color::from_hue(0.0), Color::new(255, 102, 102));
        assert_eq!(Color::from_hue(120.0), Color::new(102, 255, 102));
        assert_eq!(Color::from_hue(240.0), Color::new(102, 102, 255));
        assert_eq!(Color::from_hue(360.0), Color::from_hue(0.0));
    }

    #[test]
    fn test_style_conversion() {
        let rs: ratatui::style::Style = Style::new().fg(Color::WHITE).bold().into();
        assert_eq!(rs.fg, Some(ratatui::style::Color::Rgb(255, 255, 255)));
        assert!(rs.add_modifier.contains(ratatui::style::Modifier::BOLD));
    }
}
