//! Grapheme cluster iteration.

use crate::unicode::width::{WidthMethod, glyph_width};
use unicode_segmentation::UnicodeSegmentation;

/// A grapheme cluster with its placement width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacedGlyph<'a> {
    pub text: &'a str,
    /// Columns the glyph occupies (0 for zero-width clusters).
    pub width: u8,
}

impl PlacedGlyph<'_> {
    /// True when the cluster is a single scalar that fits in one cell.
    #[must_use]
    pub fn is_simple(&self) -> bool {
        self.width == 1 && self.text.chars().nth(1).is_none()
    }
}

/// Iterate over extended grapheme clusters in a string.
pub fn graphemes(s: &str) -> impl Iterator<Item = &str> {
    s.graphemes(true)
}

/// Iterate over grapheme clusters paired with their placement width.
pub fn glyphs(s: &str, method: WidthMethod) -> impl Iterator<Item = PlacedGlyph<'_>> {
    s.graphemes(true).map(move |text| PlacedGlyph {
        text,
        width: glyph_width(text, method),
    })
}
