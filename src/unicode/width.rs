//! Display width calculation for terminal rendering.

use std::str::FromStr;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::cell::MAX_GLYPH_WIDTH;

/// Glyph measurement algorithm used by buffer drawing operations.
///
/// The method belongs to a buffer, not to individual cells: a cell only
/// records the width it was placed with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WidthMethod {
    /// Measure each grapheme cluster as a whole (emoji ZWJ sequences and
    /// flags are one wide glyph).
    #[default]
    Unicode,
    /// Sum per-codepoint `wcwidth` values, the way most libc terminals do.
    WcWidth,
}

impl FromStr for WidthMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unicode" => Ok(Self::Unicode),
            "wcwidth" => Ok(Self::WcWidth),
            other => Err(format!("unknown width method: {other}")),
        }
    }
}

/// Width of a string in terminal columns, measured as Unicode clusters.
#[must_use]
pub fn display_width(s: &str) -> usize {
    display_width_with_method(s, WidthMethod::Unicode)
}

/// Width of a single character in terminal columns.
///
/// Fast path for printable ASCII, which is always one column.
#[inline]
#[must_use]
pub fn display_width_char(c: char) -> usize {
    if (' '..='~').contains(&c) {
        return 1;
    }
    if c < ' ' {
        return 0;
    }
    UnicodeWidthChar::width(c).unwrap_or(0)
}

/// Width of a string in terminal columns using `method`.
#[must_use]
pub fn display_width_with_method(s: &str, method: WidthMethod) -> usize {
    match method {
        WidthMethod::Unicode => UnicodeWidthStr::width(s),
        WidthMethod::WcWidth => s.chars().map(display_width_char).sum(),
    }
}

/// Placement width of one grapheme cluster: 0 for zero-width clusters,
/// otherwise clamped to `1..=MAX_GLYPH_WIDTH`.
#[must_use]
pub fn glyph_width(grapheme: &str, method: WidthMethod) -> u8 {
    let width = display_width_with_method(grapheme, method);
    if width == 0 {
        return 0;
    }
    width.min(usize::from(MAX_GLYPH_WIDTH)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_width() {
        assert_eq!(display_width("hello"), 5);
        assert_eq!(display_width_char('a'), 1);
        assert_eq!(display_width_char('\t'), 0);
    }

    #[test]
    fn test_cjk_width() {
        assert_eq!(display_width("漢字"), 4);
        assert_eq!(display_width_char('漢'), 2);
    }

    #[test]
    fn test_cluster_vs_codepoint_sum() {
        let family = "👨\u{200d}👩\u{200d}👧";
        assert_eq!(glyph_width(family, WidthMethod::Unicode), 2);
        assert_eq!(glyph_width(family, WidthMethod::WcWidth), 4);
    }

    #[test]
    fn test_combining_mark() {
        assert_eq!(glyph_width("e\u{301}", WidthMethod::Unicode), 1);
        assert_eq!(glyph_width("e\u{301}", WidthMethod::WcWidth), 1);
        assert_eq!(glyph_width("\u{301}", WidthMethod::WcWidth), 0);
    }

    #[test]
    fn test_width_method_from_str() {
        assert_eq!("WcWidth".parse::<WidthMethod>(), Ok(WidthMethod::WcWidth));
        assert_eq!(" unicode ".parse::<WidthMethod>(), Ok(WidthMethod::Unicode));
        assert!("cjk".parse::<WidthMethod>().is_err());
    }
}
