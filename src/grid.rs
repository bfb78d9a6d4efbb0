//! The simulation state: a toroidal universe of one-byte cells.

use std::fmt;

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, trace};

use crate::bridge::CellsView;
use crate::error::{LifeError, Result};

/// Probability that a cell starts alive when a universe is randomly seeded.
pub const DEFAULT_DENSITY: f64 = 0.3;

/// State of a single cell. The discriminants are the byte values exposed
/// through [`CellsView::as_bytes`].
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, bytemuck::NoUninit)]
pub enum Cell {
    #[default]
    Dead = 0,
    Alive = 1,
}

impl Cell {
    /// Flips between alive and dead.
    pub fn toggle(&mut self) {
        *self = match *self {
            Cell::Alive => Cell::Dead,
            Cell::Dead => Cell::Alive,
        }
    }

    pub fn is_alive(self) -> bool {
        self == Cell::Alive
    }
}

/// How the first generation is populated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Seeding {
    /// Every cell starts dead.
    Empty,
    /// Every cell is independently alive with probability [`DEFAULT_DENSITY`],
    /// drawn from a generator seeded with `seed`.
    Random { seed: u64 },
}

/// Births and deaths produced by one call to [`Universe::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    pub born: u32,
    pub died: u32,
}

/// A fixed-size toroidal grid of cells stored row-major.
///
/// The universe is the only owner of its generation buffer. Readers borrow it
/// through [`Universe::cells_view`], so a view can never outlive the next
/// [`tick`](Universe::tick) or [`toggle`](Universe::toggle).
#[derive(Clone, Debug)]
pub struct Universe {
    width: u32,
    height: u32,
    /// Current generation
    cells: Vec<Cell>,
    /// Next generation is built here, then swapped with `cells`
    scratch: Vec<Cell>,
    generation: u64,
}

impl Universe {
    /// Creates a universe of `width` x `height` cells.
    ///
    /// # Errors
    ///
    /// [`LifeError::InvalidDimension`] if either side is zero.
    pub fn new(width: u32, height: u32, seeding: Seeding) -> Result<Universe> {
        if width == 0 || height == 0 {
            return Err(LifeError::InvalidDimension { width, height });
        }

        let len = width as usize * height as usize;
        let cells = seed_cells(len, seeding);
        debug!(width, height, ?seeding, "created universe");

        Ok(Universe {
            width,
            height,
            cells,
            scratch: vec![Cell::Dead; len],
            generation: 0,
        })
    }

    /// Number of columns, fixed at creation.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows, fixed at creation.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of generations advanced since creation or the last reset.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Counts the cells that are currently alive.
    pub fn population(&self) -> u64 {
        self.cells.iter().filter(|cell| cell.is_alive()).count() as u64
    }

    /// Borrows the current generation without copying it.
    pub fn cells_view(&self) -> CellsView<'_> {
        CellsView::new(&self.cells, self.width, self.height)
    }

    /// State of the cell at (`row`, `col`).
    ///
    /// # Errors
    ///
    /// [`LifeError::OutOfRange`] outside the grid.
    pub fn get(&self, row: u32, col: u32) -> Result<Cell> {
        self.check_bounds(row, col)?;
        Ok(self.cells[self.index(row, col)])
    }

    /// Advances the universe by one generation (B3/S23 on a torus).
    ///
    /// Every neighbor count reads the previous generation only; results land in
    /// the scratch buffer, which is published by swapping it with the current one.
    pub fn tick(&mut self) -> TickStats {
        let mut stats = TickStats::default();

        for row in 0..self.height {
            for col in 0..self.width {
                let idx = self.index(row, col);
                let cell = self.cells[idx];
                let next = match (cell, self.live_neighbor_count(row, col)) {
                    (Cell::Alive, 2) | (Cell::Alive, 3) => Cell::Alive,
                    (Cell::Alive, _) => {
                        stats.died += 1;
                        Cell::Dead
                    }
                    (Cell::Dead, 3) => {
                        stats.born += 1;
                        Cell::Alive
                    }
                    (otherwise, _) => otherwise,
                };
                self.scratch[idx] = next;
            }
        }

        std::mem::swap(&mut self.cells, &mut self.scratch);
        self.generation += 1;
        trace!(
            generation = self.generation,
            born = stats.born,
            died = stats.died,
            "tick"
        );
        stats
    }

    /// Flips a single cell. Coordinates never wrap here.
    ///
    /// # Errors
    ///
    /// [`LifeError::OutOfRange`] if `row >= height` or `col >= width`.
    pub fn toggle(&mut self, row: u32, col: u32) -> Result<()> {
        self.check_bounds(row, col)?;
        let idx = self.index(row, col);
        self.cells[idx].toggle();
        trace!(row, col, state = ?self.cells[idx], "toggled cell");
        Ok(())
    }

    /// Marks every listed cell alive. Nothing is written if any cell is out of range.
    pub fn set_cells(&mut self, cells: &[(u32, u32)]) -> Result<()> {
        for &(row, col) in cells {
            self.check_bounds(row, col)?;
        }
        for &(row, col) in cells {
            let idx = self.index(row, col);
            self.cells[idx] = Cell::Alive;
        }
        Ok(())
    }

    /// Kills every cell and resets the generation counter.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::Dead);
        self.generation = 0;
        debug!("cleared universe");
    }

    /// Replaces the current generation with a freshly seeded one.
    pub fn reseed(&mut self, seeding: Seeding) {
        self.cells = seed_cells(self.cells.len(), seeding);
        self.generation = 0;
        debug!(?seeding, "reseeded universe");
    }

    fn index(&self, row: u32, col: u32) -> usize {
        row as usize * self.width as usize + col as usize
    }

    fn check_bounds(&self, row: u32, col: u32) -> Result<()> {
        if row >= self.height || col >= self.width {
            return Err(LifeError::OutOfRange {
                row,
                col,
                height: self.height,
                width: self.width,
            });
        }
        Ok(())
    }

    /// Counts live cells among the 8 positions around (`row`, `col`), with
    /// both axes taken modulo the grid size.
    fn live_neighbor_count(&self, row: u32, col: u32) -> u8 {
        let mut count = 0;
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }

                let ny = (row as i64 + dy).rem_euclid(self.height as i64) as u32;
                let nx = (col as i64 + dx).rem_euclid(self.width as i64) as u32;

                if self.cells[self.index(ny, nx)].is_alive() {
                    count += 1;
                }
            }
        }
        count
    }
}

fn seed_cells(len: usize, seeding: Seeding) -> Vec<Cell> {
    match seeding {
        Seeding::Empty => vec![Cell::Dead; len],
        Seeding::Random { seed } => {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..len)
                .map(|_| {
                    if rng.gen_bool(DEFAULT_DENSITY) {
                        Cell::Alive
                    } else {
                        Cell::Dead
                    }
                })
                .collect()
        }
    }
}

impl fmt::Display for Universe {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for line in self.cells.chunks(self.width as usize) {
            for &cell in line {
                let symbol = if cell == Cell::Dead { '◻' } else { '◼' };
                write!(f, "{}", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
