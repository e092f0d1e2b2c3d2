use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// Display color for a species.
///
/// This is presentation-only: species identity lives in `SpeciesId`, so
/// recoloring a species never merges it with another one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl SpeciesColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to a ratatui color for terminal rendering
    pub fn to_ratatui(self) -> Color {
        Color::Rgb(self.r, self.g, self.b)
    }

    /// Human-readable name for palette colors, hex otherwise
    pub fn name(self) -> String {
        for (color, name) in PALETTE_NAMES {
            if self == color {
                return name.to_string();
            }
        }
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Default species palette, in assignment order
pub const PALETTE: [SpeciesColor; 8] = [
    SpeciesColor::new(240, 220, 60),  // yellow
    SpeciesColor::new(230, 60, 50),   // red
    SpeciesColor::new(70, 200, 90),   // green
    SpeciesColor::new(70, 120, 240),  // blue
    SpeciesColor::new(170, 80, 220),  // purple
    SpeciesColor::new(240, 150, 40),  // orange
    SpeciesColor::new(60, 210, 210),  // cyan
    SpeciesColor::new(230, 90, 180),  // magenta
];

const PALETTE_NAMES: [(SpeciesColor, &str); 8] = [
    (PALETTE[0], "Yellow"),
    (PALETTE[1], "Red"),
    (PALETTE[2], "Green"),
    (PALETTE[3], "Blue"),
    (PALETTE[4], "Purple"),
    (PALETTE[5], "Orange"),
    (PALETTE[6], "Cyan"),
    (PALETTE[7], "Magenta"),
];

/// Get a palette color by index, wrapping past the end
pub fn palette_color(index: usize) -> SpeciesColor {
    PALETTE[index % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_wraps() {
        assert_eq!(palette_color(0), PALETTE[0]);
        assert_eq!(palette_color(PALETTE.len()), PALETTE[0]);
        assert_eq!(palette_color(PALETTE.len() + 2), PALETTE[2]);
    }

    #[test]
    fn test_color_names() {
        assert_eq!(PALETTE[1].name(), "Red");
        assert_eq!(SpeciesColor::new(1, 2, 3).name(), "#010203");
    }
}
