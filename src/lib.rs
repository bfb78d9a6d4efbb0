//! # life_canvas
//!
//! Conway's Game of Life on a torus, split into the pieces a front-end needs:
//!
//! * [`Universe`] owns the cells and advances generations
//! * [`CellsView`] lends the current generation out as raw bytes without copying
//! * [`Renderer`] paints grid lines and cells onto any [`Surface`]
//! * [`AnimationController`] runs tick + draw once per host frame, with play/pause
//! * [`InputHandler`] turns pointer clicks into cell toggles

pub mod animation;
pub mod bridge;
pub mod error;
pub mod grid;
pub mod input;
pub mod raster;
pub mod render;

pub use animation::{AnimationController, FrameClock, FrameId, FrameOutcome, FrameScheduler, Playback};
pub use bridge::CellsView;
pub use error::{LifeError, Result};
pub use grid::{Cell, Seeding, TickStats, Universe, DEFAULT_DENSITY};
pub use input::{CanvasBounds, Click, InputHandler, ViewportScale};
pub use raster::Raster;
pub use render::{CellMetrics, Palette, Renderer, Surface};
