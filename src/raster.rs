//! In-memory pixel surface, displayed in the terminal with half-block glyphs.

use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};

use crate::render::Surface;

/// Glyph whose foreground paints the upper pixel and background the lower one.
const UPPER_HALF: char = '▀';

/// A `width` x `height` grid of colored pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
    stroke: Color,
    fill: Color,
}

impl Raster {
    /// A raster filled with `background`.
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Raster {
            width,
            height,
            pixels: vec![background; width as usize * height as usize],
            stroke: Color::Reset,
            fill: Color::Reset,
        }
    }

    /// Creates a raster sized for `(width, height)`, as returned by
    /// [`CellMetrics::surface_size`](crate::render::CellMetrics::surface_size).
    pub fn with_size((width, height): (u32, u32)) -> Self {
        Raster::new(width, height, Color::Reset)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Color at (`x`, `y`), or `None` outside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[self.index(x, y)])
    }

    /// Terminal columns and rows the raster occupies when displayed.
    pub fn display_size(&self) -> (u16, u16) {
        let cols = self.width.min(u16::MAX as u32) as u16;
        let rows = self.height.div_ceil(2).min(u16::MAX as u32) as u16;
        (cols, rows)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn put(&mut self, x: i64, y: i64, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = self.index(x as u32, y as u32);
        self.pixels[idx] = color;
    }
}

impl Surface for Raster {
    fn set_stroke_color(&mut self, color: Color) {
        self.stroke = color;
    }

    fn stroke_line(&mut self, from: (u32, u32), to: (u32, u32)) {
        let (x0, y0) = (from.0 as i64, from.1 as i64);
        let (dx, dy) = (to.0 as i64 - x0, to.1 as i64 - y0);
        let steps = dx.abs().max(dy.abs());
        if steps == 0 {
            self.put(x0, y0, self.stroke);
            return;
        }
        for i in 0..=steps {
            self.put(x0 + dx * i / steps, y0 + dy * i / steps, self.stroke);
        }
    }

    fn set_fill_color(&mut self, color: Color) {
        self.fill = color;
    }

    fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32) {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        for py in y..y_end {
            let start = self.index(x.min(x_end), py);
            let end = self.index(x_end, py);
            self.pixels[start..end].fill(self.fill);
        }
    }
}

impl Widget for &Raster {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (cols, rows) = self.display_size();
        for ty in 0..rows.min(area.height) {
            for tx in 0..cols.min(area.width) {
                let (x, y) = (tx as u32, ty as u32 * 2);
                let top = self.pixel(x, y).unwrap_or(Color::Reset);
                let bottom = self.pixel(x, y + 1).unwrap_or(Color::Reset);
                buf.get_mut(area.x + tx, area.y + ty)
                    .set_char(UPPER_HALF)
                    .set_fg(top)
                    .set_bg(bottom);
            }
        }
    }
}
