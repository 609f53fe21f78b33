//! Cell-based frame buffer with width-aware drawing.
//!
//! This module provides [`OptimizedBuffer`], the drawing surface the renderer
//! diffs every frame. Buffers are flat row-major grids of [`Cell`]s that
//! support:
//!
//! - **Raw access**: [`get`](OptimizedBuffer::get) and
//!   [`set_raw`](OptimizedBuffer::set_raw) with no side effects
//! - **Width-aware drawing**: [`set_cell`](OptimizedBuffer::set_cell) and
//!   [`draw_text`](OptimizedBuffer::draw_text) place wide glyphs with their
//!   continuation cells and repair glyphs they partially overwrite
//! - **Region fills**: [`fill_rect`](OptimizedBuffer::fill_rect) and
//!   [`clear`](OptimizedBuffer::clear)
//!
//! # Examples
//!
//! ```
//! use vtframe::{GraphemePool, OptimizedBuffer, Rgba, TextAttributes, WidthMethod};
//!
//! let mut pool = GraphemePool::new();
//! let mut buf = OptimizedBuffer::new(20, 4, WidthMethod::Unicode).unwrap();
//! buf.clear(Rgba::BLACK, None);
//! buf.draw_text(&mut pool, "漢字", 0, 0, Rgba::WHITE, None, TextAttributes::empty())
//!     .unwrap();
//! assert!(buf.get(1, 0).unwrap().is_continuation());
//! ```

// Drawing calls carry position, colors and attributes
#![allow(clippy::too_many_arguments)]

mod drawing;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::cell::{Cell, CellChar, CharKind};
use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::grapheme_pool::GraphemePool;
use crate::style::TextAttributes;
use crate::unicode::{WidthMethod, display_width_char};

/// Cell buffer for terminal rendering.
///
/// # Coordinate System
///
/// Coordinates are (x, y) where (0, 0) is the top-left corner. X increases
/// to the right, Y increases downward. Every write outside the grid is a
/// no-op and every read outside it is `None`.
#[derive(Clone, Debug)]
pub struct OptimizedBuffer {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    width_method: WidthMethod,
}

fn allocate_cells(width: u32, height: u32, fill: Cell) -> Result<Vec<Cell>> {
    let count = (width as usize)
        .checked_mul(height as usize)
        .ok_or(Error::InvalidDimensions { width, height })?;
    let mut cells = Vec::new();
    cells
        .try_reserve_exact(count)
        .map_err(|_| Error::Allocation { cells: count })?;
    cells.resize(count, fill);
    Ok(cells)
}

impl OptimizedBuffer {
    /// Create a buffer of blank transparent cells.
    ///
    /// Zero dimensions are clamped to 1. Fails with [`Error::Allocation`] when
    /// the cell storage cannot be reserved.
    pub fn new(width: u32, height: u32, width_method: WidthMethod) -> Result<Self> {
        let width = width.max(1);
        let height = height.max(1);
        Ok(Self {
            width,
            height,
            cells: allocate_cells(width, height, Cell::blank(Rgba::TRANSPARENT))?,
            width_method,
        })
    }

    /// Get buffer dimensions.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Get buffer width.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get buffer height.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Glyph measurement used by drawing operations.
    #[must_use]
    pub fn width_method(&self) -> WidthMethod {
        self.width_method
    }

    /// Estimated byte size of the buffer cell storage.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.cells.len() * std::mem::size_of::<Cell>()
    }

    #[inline]
    fn cell_index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Cell at position, `None` out of bounds.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<Cell> {
        self.cell_index(x, y).map(|idx| self.cells[idx])
    }

    /// Overwrite a cell with no placement logic. No-op out of bounds.
    pub fn set_raw(&mut self, x: u32, y: u32, cell: Cell) {
        if let Some(idx) = self.cell_index(x, y) {
            self.cells[idx] = cell;
        }
    }

    /// Reset every cell to `fill` (default space) over `bg` with a
    /// transparent foreground and no attributes.
    ///
    /// `fill` must be one column wide; any other fill falls back to a space.
    pub fn clear(&mut self, bg: Rgba, fill: Option<char>) {
        let fill = match fill {
            Some(ch) if display_width_char(ch) == 1 => ch,
            Some(ch) => {
                tracing::warn!(fill = ?ch, "clear fill is not one column wide, using space");
                ' '
            }
            None => ' ',
        };
        let cell = Cell::new(
            fill,
            Rgba::TRANSPARENT,
            bg,
            TextAttributes::empty(),
        );
        self.cells.fill(cell);
    }

    /// Blank a rectangle to spaces over `bg`, clipped to the buffer.
    ///
    /// Wide glyphs straddling the rectangle edges are repaired so no orphaned
    /// half remains outside it.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, bg: Rgba) {
        if w == 0 || h == 0 {
            return;
        }
        let x0 = x.min(self.width);
        let y0 = y.min(self.height);
        let x1 = x.saturating_add(w).min(self.width);
        let y1 = y.saturating_add(h).min(self.height);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let blank = Cell::blank(bg);
        let row_width = self.width as usize;
        for row in y0..y1 {
            self.repair_glyph_at(x0, row);
            self.repair_glyph_at(x1 - 1, row);
            let row_start = row as usize * row_width;
            self.cells[row_start + x0 as usize..row_start + x1 as usize].fill(blank);
        }
    }

    /// Place one grapheme at (x, y), measured with the buffer's width method.
    ///
    /// Multi-column glyphs are interned in `pool` and followed by continuation
    /// cells. A glyph that would cross the right edge, and a zero-width
    /// cluster, are not drawn.
    pub fn set_cell(
        &mut self,
        pool: &mut GraphemePool,
        x: u32,
        y: u32,
        grapheme: &str,
        fg: Rgba,
        bg: Rgba,
        attributes: TextAttributes,
    ) -> Result<()> {
        drawing::set_cell(self, pool, x, y, grapheme, fg, bg, attributes)
    }

    /// Draw a string starting at (x, y), one grapheme cluster at a time.
    ///
    /// `bg: None` keeps the existing background under each glyph. Line breaks
    /// are skipped; drawing stops at the first glyph that does not fit.
    pub fn draw_text(
        &mut self,
        pool: &mut GraphemePool,
        text: &str,
        x: u32,
        y: u32,
        fg: Rgba,
        bg: Option<Rgba>,
        attributes: TextAttributes,
    ) -> Result<()> {
        drawing::draw_text(self, pool, text, x, y, fg, bg, attributes)
    }

    /// Reallocate to new dimensions. Content is discarded.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        let width = width.max(1);
        let height = height.max(1);
        self.cells = allocate_cells(width, height, Cell::blank(Rgba::TRANSPARENT))?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Get raw cell slice.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Cells of row `y`, empty out of bounds.
    #[must_use]
    pub fn row(&self, y: u32) -> &[Cell] {
        if y >= self.height {
            return &[];
        }
        let start = y as usize * self.width as usize;
        &self.cells[start..start + self.width as usize]
    }

    /// Write the visible text of the buffer, one line per row.
    ///
    /// Graphemes are resolved through `pool`; ids the pool does not know are
    /// written as U+FFFD. Continuation cells produce no output.
    pub fn dump_to<W: Write>(&self, pool: &GraphemePool, out: &mut W) -> Result<()> {
        let mut line = String::with_capacity(self.width as usize);
        for y in 0..self.height {
            line.clear();
            for cell in self.row(y) {
                match cell.ch.kind() {
                    CharKind::Scalar(ch) => line.push(ch),
                    CharKind::Grapheme { id, .. } => {
                        line.push_str(pool.get(id).unwrap_or("\u{FFFD}"));
                    }
                    CharKind::Continuation { .. } => {}
                }
            }
            writeln!(out, "{}", line.trim_end())?;
        }
        Ok(())
    }

    /// [`dump_to`](Self::dump_to) into a newly created file at `path`.
    pub fn dump_to_file(&self, pool: &GraphemePool, path: impl AsRef<Path>) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.dump_to(pool, &mut out)?;
        out.flush()?;
        Ok(())
    }

    /// If (x, y) belongs to a multi-column glyph, turn every cell of that
    /// glyph into a space that keeps its colors.
    fn repair_glyph_at(&mut self, x: u32, y: u32) {
        let Some(idx) = self.cell_index(x, y) else {
            return;
        };
        let ch = self.cells[idx].ch;
        let Some(id) = ch.grapheme_id() else {
            return;
        };
        if ch.is_grapheme() && ch.right_extent() == 0 {
            return;
        }

        let start = x.saturating_sub(u32::from(ch.left_extent()));
        let end = x
            .saturating_add(u32::from(ch.right_extent()))
            .min(self.width - 1);
        let row_start = y as usize * self.width as usize;
        for col in start..=end {
            let cell = &mut self.cells[row_start + col as usize];
            if cell.ch.grapheme_id() == Some(id) {
                cell.ch = CellChar::SPACE;
                cell.attributes = TextAttributes::empty();
            }
        }
    }
}
