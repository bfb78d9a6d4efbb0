//! Paints a generation onto a 2D surface: grid lines first, then one fill
//! pass per cell state.

use ratatui::style::Color;

use crate::bridge::CellsView;
use crate::grid::Cell;

pub const GRID_COLOR: Color = Color::Rgb(0xF5, 0xDA, 0x70);
pub const DEAD_COLOR: Color = Color::Rgb(0xFF, 0xFF, 0xFF);
pub const ALIVE_COLOR: Color = Color::Rgb(0x80, 0xE6, 0x94);

/// A rectangular pixel canvas with stroke and fill primitives.
pub trait Surface {
    fn set_stroke_color(&mut self, color: Color);

    /// Strokes a one-pixel line between two points, both ends inclusive.
    fn stroke_line(&mut self, from: (u32, u32), to: (u32, u32));

    fn set_fill_color(&mut self, color: Color);

    fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub grid: Color,
    pub dead: Color,
    pub alive: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            grid: GRID_COLOR,
            dead: DEAD_COLOR,
            alive: ALIVE_COLOR,
        }
    }
}

/// Largest accepted cell size in pixels.
pub const MAX_CELL_SIZE: u32 = 1024;

/// Maps cells to pixels. Each cell is a `cell_size` square followed by a
/// one-pixel grid line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellMetrics {
    cell_size: u32,
}

impl CellMetrics {
    /// Metrics for `cell_size` pixel cells, clamped to `1..=MAX_CELL_SIZE`.
    pub fn new(cell_size: u32) -> Self {
        CellMetrics {
            cell_size: cell_size.clamp(1, MAX_CELL_SIZE),
        }
    }

    /// Largest cell size that lets `cells` cells plus their grid lines fit in
    /// `viewport_px` pixels, never below one pixel.
    pub fn fit(viewport_px: u32, cells: u32) -> Self {
        let per_cell = viewport_px / cells.max(1);
        CellMetrics::new(per_cell.saturating_sub(1))
    }

    /// Side of one cell's fill square in pixels.
    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Distance in pixels between the origins of two adjacent cells.
    pub fn pitch(&self) -> u32 {
        self.cell_size + 1
    }

    /// Surface size needed for a `width` x `height` grid. Saturates at `u32::MAX`.
    pub fn surface_size(&self, width: u32, height: u32) -> (u32, u32) {
        (
            self.line_offset(width).saturating_add(1),
            self.line_offset(height).saturating_add(1),
        )
    }

    /// Pixel position of grid line `i`, counted from the top or left edge.
    pub fn line_offset(&self, i: u32) -> u32 {
        i.saturating_mul(self.pitch())
    }

    /// Top-left pixel of the fill square for (`row`, `col`).
    pub fn cell_origin(&self, row: u32, col: u32) -> (u32, u32) {
        (
            self.line_offset(col).saturating_add(1),
            self.line_offset(row).saturating_add(1),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Renderer {
    metrics: CellMetrics,
    palette: Palette,
}

impl Renderer {
    /// Renderer drawing `metrics` sized cells in `palette` colors.
    pub fn new(metrics: CellMetrics, palette: Palette) -> Self {
        Renderer { metrics, palette }
    }

    /// Cell-to-pixel mapping used by [`Renderer::draw`].
    pub fn metrics(&self) -> CellMetrics {
        self.metrics
    }

    /// Colors used for grid lines and cells.
    pub fn palette(&self) -> Palette {
        self.palette
    }

    /// Paints grid lines and every cell of `view` onto `surface`.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, view: CellsView<'_>) {
        self.draw_grid(surface, view.width(), view.height());
        self.draw_cells(surface, view);
    }

    fn draw_grid<S: Surface + ?Sized>(&self, surface: &mut S, width: u32, height: u32) {
        let metrics = self.metrics;
        let (right, bottom) = (metrics.line_offset(width), metrics.line_offset(height));
        surface.set_stroke_color(self.palette.grid);

        // Vertical lines.
        for i in 0..=width {
            let x = metrics.line_offset(i);
            surface.stroke_line((x, 0), (x, bottom));
        }

        // Horizontal lines.
        for j in 0..=height {
            let y = metrics.line_offset(j);
            surface.stroke_line((0, y), (right, y));
        }
    }

    fn draw_cells<S: Surface + ?Sized>(&self, surface: &mut S, view: CellsView<'_>) {
        let size = self.metrics.cell_size();
        for (state, color) in [
            (Cell::Alive, self.palette.alive),
            (Cell::Dead, self.palette.dead),
        ] {
            surface.set_fill_color(color);
            for (row, col) in view.positions(state) {
                let (x, y) = self.metrics.cell_origin(row, col);
                surface.fill_rect(x, y, size, size);
            }
        }
    }
}
