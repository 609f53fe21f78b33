//! Terminal cell type and the packed character slot.
//!
//! Every cell stores its character as one `u32` ([`CellChar`]) partitioned by
//! range so classification never needs a pool lookup:
//!
//! ```text
//! scalar        0x0000_0000 ..= 0x0010_FFFF   plain Unicode scalar value
//! grapheme      [31]=1 [30]=0 [29-28]=right extent [25-0]=pool id
//! continuation  [31]=1 [30]=1 [29-28]=right extent [27-26]=left extent [25-0]=pool id
//! ```
//!
//! A glyph `N` columns wide occupies one grapheme cell (right extent `N-1`)
//! followed by `N-1` continuation cells. Each continuation records how far it
//! is from the glyph start (left extent) and how many columns remain after it
//! (right extent), so any column of a wide glyph can find the whole glyph.
//!
//! # Examples
//!
//! ```
//! use vtframe::cell::{CellChar, CharKind, GraphemeId};
//!
//! let id = GraphemeId::new(7);
//! let start = CellChar::grapheme(id, 2);
//! let cont = CellChar::continuation(id, 1, 0);
//! assert!(start.is_grapheme());
//! assert_eq!(start.right_extent(), 1);
//! assert!(cont.is_continuation());
//! assert_eq!(cont.kind(), CharKind::Continuation { id, left: 1, right: 0 });
//! ```

use crate::color::Rgba;
use crate::style::TextAttributes;

const GRAPHEME_FLAG: u32 = 0x8000_0000;
const CONTINUATION_FLAG: u32 = 0x4000_0000;
const KIND_MASK: u32 = GRAPHEME_FLAG | CONTINUATION_FLAG;
const RIGHT_EXT_SHIFT: u32 = 28;
const LEFT_EXT_SHIFT: u32 = 26;
const EXT_MASK: u32 = 0x3;
const ID_MASK: u32 = 0x03FF_FFFF;

/// Widest glyph a cell can describe (right extent is two bits).
pub const MAX_GLYPH_WIDTH: u8 = 4;

/// Grapheme pool id. Ids are issued from 1; 0 is never valid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphemeId(u32);

impl GraphemeId {
    /// Largest id the packed slot can address.
    pub const MAX: u32 = ID_MASK;

    /// Wrap a raw pool id (masked to 26 bits).
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw & ID_MASK)
    }

    /// Raw pool id.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Decoded view of a [`CellChar`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharKind {
    /// Single-column Unicode scalar.
    Scalar(char),
    /// Start cell of an interned glyph spanning `width` columns.
    Grapheme { id: GraphemeId, width: u8 },
    /// Trailing column of a multi-column glyph.
    Continuation {
        id: GraphemeId,
        left: u8,
        right: u8,
    },
}

/// Packed character slot of a [`Cell`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellChar(u32);

impl Default for CellChar {
    fn default() -> Self {
        Self::SPACE
    }
}

impl CellChar {
    /// A plain space.
    pub const SPACE: Self = Self(' ' as u32);

    /// Scalar character.
    #[must_use]
    pub const fn from_char(ch: char) -> Self {
        Self(ch as u32)
    }

    /// Grapheme start cell for a glyph `width` columns wide (clamped to 1..=4).
    #[must_use]
    pub const fn grapheme(id: GraphemeId, width: u8) -> Self {
        let width = clamp_width(width);
        let right = (width - 1) as u32;
        Self(GRAPHEME_FLAG | (right << RIGHT_EXT_SHIFT) | id.get())
    }

    /// Continuation cell `left` columns after the glyph start, `right` columns
    /// before its end.
    #[must_use]
    pub const fn continuation(id: GraphemeId, left: u8, right: u8) -> Self {
        Self(
            KIND_MASK
                | (((right as u32) & EXT_MASK) << RIGHT_EXT_SHIFT)
                | (((left as u32) & EXT_MASK) << LEFT_EXT_SHIFT)
                | id.get(),
        )
    }

    /// Reconstruct from a raw slot value.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw slot value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Decode the slot.
    #[must_use]
    pub fn kind(self) -> CharKind {
        if is_continuation_char(self.0) {
            CharKind::Continuation {
                id: GraphemeId::new(self.0),
                left: char_left_extent(self.0),
                right: char_right_extent(self.0),
            }
        } else if is_grapheme_char(self.0) {
            CharKind::Grapheme {
                id: GraphemeId::new(self.0),
                width: char_right_extent(self.0) + 1,
            }
        } else {
            CharKind::Scalar(char::from_u32(self.0).unwrap_or(char::REPLACEMENT_CHARACTER))
        }
    }

    /// True for a grapheme start cell.
    #[must_use]
    pub const fn is_grapheme(self) -> bool {
        is_grapheme_char(self.0)
    }

    /// True for a continuation cell.
    #[must_use]
    pub const fn is_continuation(self) -> bool {
        is_continuation_char(self.0)
    }

    /// Columns this glyph occupies to the right of this cell.
    #[must_use]
    pub const fn right_extent(self) -> u8 {
        char_right_extent(self.0)
    }

    /// Columns between this cell and the start of its glyph.
    #[must_use]
    pub const fn left_extent(self) -> u8 {
        char_left_extent(self.0)
    }

    /// Pool id for grapheme and continuation cells.
    #[must_use]
    pub const fn grapheme_id(self) -> Option<GraphemeId> {
        if self.0 & GRAPHEME_FLAG != 0 {
            Some(GraphemeId::new(self.0))
        } else {
            None
        }
    }
}

const fn clamp_width(width: u8) -> u8 {
    if width == 0 {
        1
    } else if width > MAX_GLYPH_WIDTH {
        MAX_GLYPH_WIDTH
    } else {
        width
    }
}

/// True when `ch` is a grapheme start cell (not a continuation).
#[inline]
#[must_use]
pub const fn is_grapheme_char(ch: u32) -> bool {
    ch & KIND_MASK == GRAPHEME_FLAG
}

/// True when `ch` is a continuation cell of a multi-column glyph.
#[inline]
#[must_use]
pub const fn is_continuation_char(ch: u32) -> bool {
    ch & KIND_MASK == KIND_MASK
}

/// Additional columns the glyph occupies to the right (0 for single width).
#[inline]
#[must_use]
pub const fn char_right_extent(ch: u32) -> u8 {
    if ch & GRAPHEME_FLAG == 0 {
        return 0;
    }
    ((ch >> RIGHT_EXT_SHIFT) & EXT_MASK) as u8
}

/// Columns back to the glyph start (0 for anything but continuations).
#[inline]
#[must_use]
pub const fn char_left_extent(ch: u32) -> u8 {
    if !is_continuation_char(ch) {
        return 0;
    }
    ((ch >> LEFT_EXT_SHIFT) & EXT_MASK) as u8
}

/// A single terminal cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cell {
    /// Packed character slot.
    pub ch: CellChar,
    /// Foreground color.
    pub fg: Rgba,
    /// Background color.
    pub bg: Rgba,
    /// SGR flags plus packed link id.
    pub attributes: TextAttributes,
}

impl Cell {
    /// Cell holding a scalar character.
    #[must_use]
    pub const fn new(ch: char, fg: Rgba, bg: Rgba, attributes: TextAttributes) -> Self {
        Self {
            ch: CellChar::from_char(ch),
            fg,
            bg,
            attributes,
        }
    }

    /// Blank cell: a space over `bg` with a transparent foreground.
    #[must_use]
    pub const fn blank(bg: Rgba) -> Self {
        Self::new(' ', Rgba::TRANSPARENT, bg, TextAttributes::empty())
    }

    /// Content equality as the diff sees it: identical character and
    /// attributes, colors within [`COLOR_EPSILON`](crate::color::COLOR_EPSILON).
    #[inline]
    #[must_use]
    pub fn same_as(&self, other: &Cell) -> bool {
        self.ch == other.ch
            && self.attributes == other.attributes
            && self.fg.approx_eq(other.fg)
            && self.bg.approx_eq(other.bg)
    }

    /// True for a continuation cell.
    #[must_use]
    pub const fn is_continuation(&self) -> bool {
        self.ch.is_continuation()
    }
}
