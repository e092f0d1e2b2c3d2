use crate::simulation::World;
use crate::species::{SpeciesId, SpeciesRoster};
use ratatui::style::Color;
use std::collections::HashMap;

/// Braille rasterization: each terminal cell carries a 2x4 dot grid, so
/// the canvas resolves to twice the columns and four times the rows.
///
/// Bit values by dot position:
/// ```text
/// (0,0)=0x01  (1,0)=0x08
/// (0,1)=0x02  (1,1)=0x10
/// (0,2)=0x04  (1,2)=0x20
/// (0,3)=0x40  (1,3)=0x80
/// ```
///
/// The 256 patterns occupy U+2800..=U+28FF
const BRAILLE_BASE: u32 = 0x2800;

/// Column-major dot bits
const BRAILLE_DOTS: [[u8; 4]; 2] = [
    [0x01, 0x02, 0x04, 0x40], // Left column (x=0): rows 0,1,2,3
    [0x08, 0x10, 0x20, 0x80], // Right column (x=1): rows 0,1,2,3
];

/// One positioned, colored character ready for the terminal
#[derive(Clone, Copy)]
pub struct BrailleCell {
    pub x: u16,
    pub y: u16,
    pub char: char,
    pub color: Color,
}

/// Rasterize the particle field to Braille characters. Cell color is the
/// display color of the last particle drawn into it; positions past the
/// arena walls (boundary overshoot) are simply skipped.
pub fn render_to_braille(
    world: &World,
    roster: &SpeciesRoster,
    canvas_width: u16,
    canvas_height: u16,
) -> Vec<BrailleCell> {
    if canvas_width == 0 || canvas_height == 0 || world.width() <= 0.0 || world.height() <= 0.0 {
        return Vec::new();
    }

    let braille_width = canvas_width as usize * 2;
    let braille_height = canvas_height as usize * 4;

    let scale_x = braille_width as f32 / world.width();
    let scale_y = braille_height as f32 / world.height();

    let palette: HashMap<SpeciesId, Color> = roster
        .species()
        .iter()
        .map(|s| (s.id, s.color.to_ratatui()))
        .collect();

    let mut grid: Vec<(u8, Option<Color>)> =
        vec![(0, None); canvas_width as usize * canvas_height as usize];

    for particle in world.particles() {
        if particle.x < 0.0 || particle.y < 0.0 {
            continue;
        }
        let bx = (particle.x * scale_x) as usize;
        let by = (particle.y * scale_y) as usize;
        if bx >= braille_width || by >= braille_height {
            continue;
        }

        let cell_idx = (by / 4) * canvas_width as usize + bx / 2;
        let (pattern, color) = &mut grid[cell_idx];
        *pattern |= BRAILLE_DOTS[bx % 2][by % 4];
        *color = palette.get(&particle.species).copied();
    }

    let mut cells = Vec::new();
    for cy in 0..canvas_height {
        for cx in 0..canvas_width {
            let (pattern, color) = grid[cy as usize * canvas_width as usize + cx as usize];
            if pattern != 0 {
                let braille_char = char::from_u32(BRAILLE_BASE + pattern as u32).unwrap_or(' ');
                cells.push(BrailleCell {
                    x: cx,
                    y: cy,
                    char: braille_char,
                    color: color.unwrap_or(Color::White),
                });
            }
        }
    }

    cells
}

/// Arena dimensions matching the Braille resolution of a canvas.
/// Braille gives 2x4 dots per character; one dot is one arena unit.
pub fn calculate_arena_size(canvas_width: u16, canvas_height: u16) -> (f32, f32) {
    let width = (canvas_width as usize * 2).max(64);
    let height = (canvas_height as usize * 4).max(64);
    (width as f32, height as f32)
}
