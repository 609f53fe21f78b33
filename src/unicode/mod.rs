//! Unicode utilities for grapheme segmentation and display width.

mod grapheme;
mod width;

pub use grapheme::{PlacedGlyph, glyphs, graphemes};
pub use width::{
    WidthMethod, display_width, display_width_char, display_width_with_method, glyph_width,
};
