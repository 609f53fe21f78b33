//! Cursor state and styles.

use crate::color::Rgba;

/// Cursor shape style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CursorStyle {
    /// Block cursor (█).
    #[default]
    Block,
    /// Underline cursor (_).
    Underline,
    /// Vertical bar cursor (|).
    Bar,
}

impl CursorStyle {
    /// DECSCUSR sequence for this shape.
    #[must_use]
    pub fn sequence(self, blinking: bool) -> &'static str {
        use crate::ansi::sequences::cursor_style;
        match (self, blinking) {
            (Self::Block, true) => cursor_style::BLOCK_BLINK,
            (Self::Block, false) => cursor_style::BLOCK_STEADY,
            (Self::Underline, true) => cursor_style::UNDERLINE_BLINK,
            (Self::Underline, false) => cursor_style::UNDERLINE_STEADY,
            (Self::Bar, true) => cursor_style::BAR_BLINK,
            (Self::Bar, false) => cursor_style::BAR_STEADY,
        }
    }
}

/// Cursor state.
///
/// The terminal tracker keeps two of these: the state callers asked for and
/// the state last written to the terminal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CursorState {
    /// X position (column).
    pub x: u32,
    /// Y position (row).
    pub y: u32,
    /// Whether cursor is visible.
    pub visible: bool,
    /// Cursor style.
    pub style: CursorStyle,
    /// Whether cursor is blinking.
    pub blinking: bool,
    /// Cursor color (None = terminal default).
    pub color: Option<Rgba>,
}

impl Default for CursorState {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            visible: false,
            style: CursorStyle::Block,
            blinking: true,
            color: None,
        }
    }
}

impl CursorState {
    /// Set position.
    pub fn set_position(&mut self, x: u32, y: u32) {
        self.x = x;
        self.y = y;
    }

    /// Get position as tuple.
    #[must_use]
    pub fn position(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    /// True when both states would leave the terminal with the same cursor color.
    #[must_use]
    pub fn same_color(&self, other: &Self) -> bool {
        match (self.color, other.color) {
            (None, None) => true,
            (Some(a), Some(b)) => a.to_rgb_u8() == b.to_rgb_u8(),
            _ => false,
        }
    }
}
