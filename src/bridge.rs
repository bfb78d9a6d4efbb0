//! Zero-copy access to the current generation.
//!
//! A [`CellsView`] borrows the universe's buffer, so the borrow checker rejects
//! any attempt to keep it across a `tick` or `toggle`. Drawing code fetches a
//! fresh view at the start of every frame.

use crate::grid::Cell;

/// Read-only window over one generation, laid out row-major.
#[derive(Clone, Copy, Debug)]
pub struct CellsView<'a> {
    cells: &'a [Cell],
    width: u32,
    height: u32,
}

impl<'a> CellsView<'a> {
    pub(crate) fn new(cells: &'a [Cell], width: u32, height: u32) -> Self {
        debug_assert_eq!(cells.len(), width as usize * height as usize);
        CellsView {
            cells,
            width,
            height,
        }
    }

    /// Number of columns.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of cells, always `width * height`.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The generation as typed cells.
    pub fn cells(&self) -> &'a [Cell] {
        self.cells
    }

    /// The generation as raw bytes: `0` for dead, `1` for alive.
    pub fn as_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.cells)
    }

    /// Address of the first cell, for hosts that sample the buffer directly.
    pub fn as_ptr(&self) -> *const u8 {
        self.cells.as_ptr().cast()
    }

    /// State of (`row`, `col`), or `None` outside the grid.
    pub fn get(&self, row: u32, col: u32) -> Option<Cell> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.cells
            .get(row as usize * self.width as usize + col as usize)
            .copied()
    }

    /// One slice per row, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &'a [Cell]> {
        self.cells.chunks(self.width as usize)
    }

    /// Yields `(row, col)` of every cell in `state`, in row-major order.
    pub fn positions(&self, state: Cell) -> impl Iterator<Item = (u32, u32)> + 'a {
        let width = self.width as usize;
        self.cells
            .iter()
            .enumerate()
            .filter(move |&(_, &cell)| cell == state)
            .map(move |(idx, _)| ((idx / width) as u32, (idx % width) as u32))
    }
}
