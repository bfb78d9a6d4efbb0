//! Pointer clicks to cell toggles.

use tracing::debug;

use crate::error::Result;
use crate::grid::Universe;
use crate::render::{CellMetrics, Renderer, Surface};

/// Where the canvas is displayed, in the host's pointer coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasBounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Canvas pixels per displayed unit along each axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportScale {
    pub x: f64,
    pub y: f64,
}

impl ViewportScale {
    pub const IDENTITY: ViewportScale = ViewportScale { x: 1.0, y: 1.0 };

    pub fn new(x: f64, y: f64) -> Self {
        ViewportScale { x, y }
    }

    /// Scale of a `canvas_width` x `canvas_height` surface shown inside `bounds`.
    /// A degenerate axis falls back to 1.
    pub fn between(canvas_width: u32, canvas_height: u32, bounds: &CanvasBounds) -> Self {
        ViewportScale {
            x: ratio(canvas_width, bounds.width),
            y: ratio(canvas_height, bounds.height),
        }
    }
}

fn ratio(canvas: u32, displayed: f64) -> f64 {
    if displayed.is_finite() && displayed > 0.0 {
        canvas as f64 / displayed
    } else {
        1.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Click {
    pub client_x: f64,
    pub client_y: f64,
}

impl Click {
    pub fn new(client_x: f64, client_y: f64) -> Self {
        Click { client_x, client_y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputHandler {
    bounds: CanvasBounds,
    scale: ViewportScale,
}

impl InputHandler {
    /// Handler for a `canvas_width` x `canvas_height` surface shown inside `bounds`.
    pub fn new(bounds: CanvasBounds, canvas_width: u32, canvas_height: u32) -> Self {
        let scale = ViewportScale::between(canvas_width, canvas_height, &bounds);
        InputHandler { bounds, scale }
    }

    /// Handler with a scale supplied directly by the host.
    pub fn with_scale(bounds: CanvasBounds, scale: ViewportScale) -> Self {
        InputHandler { bounds, scale }
    }

    pub fn bounds(&self) -> CanvasBounds {
        self.bounds
    }

    pub fn scale(&self) -> ViewportScale {
        self.scale
    }

    /// Maps a click to `(row, col)`, clamped into a `width` x `height` grid.
    pub fn locate(&self, click: Click, metrics: CellMetrics, width: u32, height: u32) -> (u32, u32) {
        let canvas_x = (click.client_x - self.bounds.left) * self.scale.x;
        let canvas_y = (click.client_y - self.bounds.top) * self.scale.y;
        let pitch = metrics.pitch() as f64;

        let row = clamp_index((canvas_y / pitch).floor(), height);
        let col = clamp_index((canvas_x / pitch).floor(), width);
        (row, col)
    }

    /// Toggles the clicked cell and redraws at once, outside the animation cadence.
    pub fn on_click<D: Surface + ?Sized>(
        &self,
        click: Click,
        universe: &mut Universe,
        renderer: &Renderer,
        surface: &mut D,
    ) -> Result<(u32, u32)> {
        let (row, col) = self.locate(
            click,
            renderer.metrics(),
            universe.width(),
            universe.height(),
        );
        universe.toggle(row, col)?;
        renderer.draw(surface, universe.cells_view());
        debug!(row, col, "click toggled cell");
        Ok((row, col))
    }
}

fn clamp_index(value: f64, len: u32) -> u32 {
    let last = len.saturating_sub(1);
    // NaN lands on 0
    if !(value > 0.0) {
        0
    } else if value >= last as f64 {
        last
    } else {
        value as u32
    }
}
