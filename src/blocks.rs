use doom_fire::{Palette, Rgb};
use ratatui::style::Color;

/// Half-block rendering: each terminal cell shows two stacked pixels.
///
/// The glyph `▀` paints the upper pixel with the foreground color and leaves
/// the lower half to the background color, doubling vertical resolution.
pub const UPPER_HALF_BLOCK: char = '\u{2580}';

/// Vertical pixels per terminal cell
pub const PIXELS_PER_CELL: usize = 2;

/// A single rendered terminal cell with both pixel colors
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockCell {
    pub x: u16,
    pub y: u16,
    pub top: Color,
    pub bottom: Color,
}

/// Render the fire grid to half-block cells covering the whole canvas
pub fn render_to_blocks(
    grid: &[u8],
    sim_width: usize,
    sim_height: usize,
    canvas_width: u16,
    canvas_height: u16,
    palette: &Palette,
) -> Vec<BlockCell> {
    if sim_width == 0 || sim_height == 0 || grid.len() != sim_width * sim_height {
        return Vec::new();
    }

    let pixel_width = canvas_width as usize;
    let pixel_height = canvas_height as usize * PIXELS_PER_CELL;

    // Scale factors (pre-calculated once)
    let scale_x = sim_width as f32 / pixel_width.max(1) as f32;
    let scale_y = sim_height as f32 / pixel_height.max(1) as f32;

    let sample = |px: usize, py: usize| -> Color {
        let sim_x = ((px as f32 * scale_x) as usize).min(sim_width - 1);
        let sim_y = ((py as f32 * scale_y) as usize).min(sim_height - 1);
        to_color(palette.color(grid[sim_y * sim_width + sim_x]))
    };

    let mut cells = Vec::with_capacity(canvas_width as usize * canvas_height as usize);
    for cy in 0..canvas_height {
        for cx in 0..canvas_width {
            let py = cy as usize * PIXELS_PER_CELL;
            cells.push(BlockCell {
                x: cx,
                y: cy,
                top: sample(cx as usize, py),
                bottom: sample(cx as usize, py + 1),
            });
        }
    }

    cells
}

pub fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

/// Simulation grid size for a canvas, with `downscale` terminal pixels per cell
pub fn calculate_simulation_size(
    canvas_width: u16,
    canvas_height: u16,
    downscale: u16,
) -> (usize, usize) {
    let downscale = downscale.max(1) as usize;
    let width = (canvas_width as usize / downscale).max(1);
    let height = (canvas_height as usize * PIXELS_PER_CELL / downscale).max(1);
    (width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_size() {
        assert_eq!(calculate_simulation_size(80, 24, 1), (80, 48));
        assert_eq!(calculate_simulation_size(80, 24, 2), (40, 24));
        assert_eq!(calculate_simulation_size(0, 0, 1), (1, 1));
        assert_eq!(calculate_simulation_size(10, 10, 0), (10, 20));
    }

    #[test]
    fn test_blocks_sample_both_halves() {
        let palette = Palette::grayscale();
        // 1 wide, 2 tall: top 10, bottom 200
        let cells = render_to_blocks(&[10, 200], 1, 2, 1, 1, &palette);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].top, Color::Rgb(10, 10, 10));
        assert_eq!(cells[0].bottom, Color::Rgb(200, 200, 200));
    }

    #[test]
    fn test_blocks_cover_canvas() {
        let palette = Palette::default();
        let grid = vec![255u8; 40 * 24];
        let cells = render_to_blocks(&grid, 40, 24, 20, 6, &palette);
        assert_eq!(cells.len(), 120);
        assert!(cells.iter().all(|c| c.top == Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_mismatched_grid_renders_nothing() {
        let palette = Palette::default();
        assert!(render_to_blocks(&[0; 3], 2, 2, 4, 4, &palette).is_empty());
    }
}
