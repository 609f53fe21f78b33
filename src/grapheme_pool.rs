//! Interning pool for multi-codepoint and multi-column glyphs.
//!
//! Cells store a [`GraphemeId`] in their character slot instead of the glyph
//! bytes, which keeps every cell fixed-size and comparable by plain equality.
//! Entries are never evicted: an id handed out by a pool stays valid for the
//! pool's whole lifetime, so a live cell can never dangle inside the pool that
//! produced it.
//!
//! # Usage
//!
//! ```
//! use vtframe::GraphemePool;
//!
//! let mut pool = GraphemePool::new();
//! let id = pool.intern("👨‍👩‍👧").unwrap();
//! assert_eq!(pool.get(id).unwrap(), "👨‍👩‍👧");
//! assert_eq!(pool.intern("👨‍👩‍👧").unwrap(), id);
//! ```
//!
//! # Invariants
//!
//! - Id 0 is reserved and never issued
//! - Identical byte sequences share one id
//! - `get` fails with [`Error::GraphemeNotFound`] for ids this pool never issued

use crate::cell::{GraphemeId, MAX_GLYPH_WIDTH};
use crate::error::{Error, Result};
use std::collections::HashMap;

#[derive(Clone, Debug)]
struct Slot {
    bytes: Box<str>,
    width: u8,
}

/// Append-only pool of grapheme clusters.
///
/// Not thread-safe; the renderer owns one pool and all drawing into its
/// buffers happens on the render thread.
#[derive(Clone, Debug)]
pub struct GraphemePool {
    /// Index 0 is the reserved invalid slot.
    slots: Vec<Slot>,
    index: HashMap<Box<str>, u32>,
    byte_size: usize,
}

impl Default for GraphemePool {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphemePool {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a pool with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity + 1);
        slots.push(Slot {
            bytes: Box::from(""),
            width: 0,
        });
        Self {
            slots,
            index: HashMap::with_capacity(capacity),
            byte_size: 0,
        }
    }

    /// Intern a grapheme, measuring its width as a Unicode cluster.
    pub fn intern(&mut self, grapheme: &str) -> Result<GraphemeId> {
        let width = crate::unicode::display_width(grapheme);
        self.intern_with_width(grapheme, u8::try_from(width).unwrap_or(MAX_GLYPH_WIDTH))
    }

    /// Intern a grapheme with a caller-measured display width.
    ///
    /// An already interned byte sequence returns its existing id and keeps the
    /// width recorded the first time.
    pub fn intern_with_width(&mut self, grapheme: &str, width: u8) -> Result<GraphemeId> {
        if let Some(&id) = self.index.get(grapheme) {
            return Ok(GraphemeId::new(id));
        }

        let id = u32::try_from(self.slots.len()).map_err(|_| Error::GraphemePoolExhausted)?;
        if id > GraphemeId::MAX {
            return Err(Error::GraphemePoolExhausted);
        }

        let bytes: Box<str> = Box::from(grapheme);
        self.byte_size += bytes.len();
        self.index.insert(bytes.clone(), id);
        self.slots.push(Slot {
            bytes,
            width: width.clamp(1, MAX_GLYPH_WIDTH),
        });
        Ok(GraphemeId::new(id))
    }

    /// Bytes of an interned grapheme.
    pub fn get(&self, id: GraphemeId) -> Result<&str> {
        self.slot(id).map(|slot| &*slot.bytes)
    }

    /// Recorded display width of an interned grapheme.
    pub fn width(&self, id: GraphemeId) -> Result<u8> {
        self.slot(id).map(|slot| slot.width)
    }

    /// True if `id` was issued by this pool.
    #[must_use]
    pub fn contains(&self, id: GraphemeId) -> bool {
        self.slot(id).is_ok()
    }

    fn slot(&self, id: GraphemeId) -> Result<&Slot> {
        match id.get() {
            0 => Err(Error::GraphemeNotFound { id: 0 }),
            raw => self
                .slots
                .get(raw as usize)
                .ok_or(Error::GraphemeNotFound { id: raw }),
        }
    }

    /// Number of interned graphemes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - 1
    }

    /// True if nothing has been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total bytes of grapheme text held by the pool.
    #[must_use]
    pub const fn byte_size(&self) -> usize {
        self.byte_size
    }

    /// Iterate over `(id, grapheme)` pairs in issue order.
    pub fn iter(&self) -> impl Iterator<Item = (GraphemeId, &str)> {
        self.slots
            .iter()
            .enumerate()
            .skip(1)
            .map(|(idx, slot)| (GraphemeId::new(idx as u32), &*slot.bytes))
    }
}
