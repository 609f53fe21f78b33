//! Double-buffered hit testing grid for pointer dispatch.
//!
//! Registrations for the frame being drawn go into `next`; queries read
//! `current`, which always holds a completed frame. [`HitGrid::swap`] runs as
//! the last step of a render.

use super::scissor::{ClipRect, ScissorStack};
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Id meaning "no hit region".
pub const NO_HIT: u32 = 0;

/// A pair of screen-sized id arrays with a scissor stack for writes.
#[derive(Clone, Debug)]
pub struct HitGrid {
    width: u32,
    height: u32,
    current: Vec<u32>,
    next: Vec<u32>,
    scissor: ScissorStack,
    dirty: bool,
}

fn allocate(width: u32, height: u32) -> Result<Vec<u32>> {
    let len = (width as usize)
        .checked_mul(height as usize)
        .ok_or(Error::InvalidDimensions { width, height })?;
    let mut ids = Vec::new();
    ids.try_reserve_exact(len)
        .map_err(|_| Error::Allocation { cells: len })?;
    ids.resize(len, NO_HIT);
    Ok(ids)
}

impl HitGrid {
    /// Create a grid of the given dimensions with no regions.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            width,
            height,
            current: allocate(width, height)?,
            next: allocate(width, height)?,
            scissor: ScissorStack::new(),
            dirty: false,
        })
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    /// Clip a rect against the screen and the scissor stack, returning
    /// column and row ranges in grid coordinates.
    fn clip(&self, x: i32, y: i32, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let screen = ClipRect::new(0, 0, self.width, self.height);
        let rect = self
            .scissor
            .clip(ClipRect::new(x, y, width, height))?
            .intersect(&screen)?;
        let x0 = rect.x.unsigned_abs();
        let y0 = rect.y.unsigned_abs();
        Some((x0, x0 + rect.width, y0, y0 + rect.height))
    }

    fn fill(ids: &mut [u32], stride: u32, bounds: (u32, u32, u32, u32), id: u32) {
        let (x0, x1, y0, y1) = bounds;
        for row in y0..y1 {
            let start = row as usize * stride as usize;
            ids[start + x0 as usize..start + x1 as usize].fill(id);
        }
    }

    /// Register `id` over a rect in the frame being drawn. Later writes win.
    pub fn add(&mut self, x: i32, y: i32, width: u32, height: u32, id: u32) {
        if let Some(bounds) = self.clip(x, y, width, height) {
            Self::fill(&mut self.next, self.width, bounds, id);
        }
    }

    /// Register `id` over a rect in the live grid, visible to queries now.
    pub fn add_to_current_clipped(&mut self, x: i32, y: i32, width: u32, height: u32, id: u32) {
        if let Some(bounds) = self.clip(x, y, width, height) {
            Self::fill(&mut self.current, self.width, bounds, id);
        }
    }

    /// Id at a position in the live grid; [`NO_HIT`] out of bounds.
    #[must_use]
    pub fn check(&self, x: u32, y: u32) -> u32 {
        self.index(x, y).map_or(NO_HIT, |idx| self.current[idx])
    }

    /// Promote `next` to `current` and start an empty `next`.
    ///
    /// Records whether the promoted grid differs from the one it replaced.
    pub fn swap(&mut self) {
        self.dirty = self.current != self.next;
        std::mem::swap(&mut self.current, &mut self.next);
        self.next.fill(NO_HIT);
    }

    /// Whether the last [`swap`](Self::swap) changed any cell.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Push a clip rect for subsequent writes.
    pub fn push_scissor_rect(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.scissor.push(ClipRect::new(x, y, width, height));
    }

    /// Pop the top clip rect.
    pub fn pop_scissor_rect(&mut self) {
        self.scissor.pop();
    }

    /// Drop every clip rect.
    pub fn clear_scissor_rects(&mut self) {
        self.scissor.clear();
    }

    /// The scissor stack.
    #[must_use]
    pub fn scissor(&self) -> &ScissorStack {
        &self.scissor
    }

    /// Reallocate both grids. Content is discarded and the scissor stack is
    /// cleared.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        let current = allocate(width, height)?;
        let next = allocate(width, height)?;
        self.width = width;
        self.height = height;
        self.current = current;
        self.next = next;
        self.scissor.clear();
        self.dirty = true;
        Ok(())
    }

    /// Get dimensions.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Byte size of both grids.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        (self.current.len() + self.next.len()) * std::mem::size_of::<u32>()
    }

    /// Write the live grid as text, one row per line, ids in hex with `.`
    /// for no hit.
    pub fn dump_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let stride = self.width.max(1) as usize;
        for row in self.current.chunks(stride) {
            let mut first = true;
            for &id in row {
                if !first {
                    out.write_all(b" ")?;
                }
                first = false;
                if id == NO_HIT {
                    out.write_all(b".")?;
                } else {
                    write!(out, "{id:x}")?;
                }
            }
            out.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Write the live grid to a file.
    pub fn dump_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = io::BufWriter::new(File::create(path)?);
        self.dump_to(&mut file)?;
        file.flush()?;
        Ok(())
    }
}
