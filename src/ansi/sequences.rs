//! Constant ANSI escape sequences.

/// Reset all attributes to default.
pub const RESET: &str = "\x1b[0m";

/// Clear entire screen.
pub const CLEAR_SCREEN: &str = "\x1b[2J";

/// Hide cursor.
pub const CURSOR_HIDE: &str = "\x1b[?25l";

/// Show cursor.
pub const CURSOR_SHOW: &str = "\x1b[?25h";

/// Move cursor to home position (1,1).
pub const CURSOR_HOME: &str = "\x1b[H";

/// Reset cursor color to default (OSC 112).
pub const CURSOR_COLOR_RESET: &str = "\x1b]112\x07";

/// Generate cursor color sequence (OSC 12).
#[must_use]
pub fn cursor_color(r: u8, g: u8, b: u8) -> String {
    format!("\x1b]12;#{r:02x}{g:02x}{b:02x}\x07")
}

/// Enable alternative screen buffer.
pub const ALT_SCREEN_ON: &str = "\x1b[?1049h";

/// Disable alternative screen buffer.
pub const ALT_SCREEN_OFF: &str = "\x1b[?1049l";

/// Enable button and drag mouse tracking with SGR encoding.
pub const MOUSE_ON: &str = "\x1b[?1000h\x1b[?1002h\x1b[?1006h";

/// Additionally report motion with no button held.
pub const MOUSE_MOVEMENT_ON: &str = "\x1b[?1003h";

/// Disable every mouse tracking mode.
pub const MOUSE_OFF: &str = "\x1b[?1003l\x1b[?1002l\x1b[?1000l\x1b[?1006l";

/// Enable bracketed paste mode.
pub const BRACKETED_PASTE_ON: &str = "\x1b[?2004h";

/// Disable bracketed paste mode.
pub const BRACKETED_PASTE_OFF: &str = "\x1b[?2004l";

/// Enable focus tracking.
pub const FOCUS_ON: &str = "\x1b[?1004h";

/// Disable focus tracking.
pub const FOCUS_OFF: &str = "\x1b[?1004l";

/// Pop one entry off the Kitty keyboard flag stack.
pub const KITTY_KEYBOARD_POP: &str = "\x1b[<u";

/// OSC 8 hyperlink end sequence.
pub const HYPERLINK_END: &str = "\x1b]8;;\x1b\\";

/// Terminal capability query sequences.
pub mod query {
    /// XTVERSION query.
    pub const XTVERSION: &str = "\x1b[>0q";
    /// Kitty keyboard protocol query.
    pub const KITTY_KEYBOARD: &str = "\x1b[?u";
    /// Cursor position report request (DSR 6).
    pub const CURSOR_POSITION: &str = "\x1b[6n";
    /// Home, print one OSC 66 cell of explicit width 1, then report position.
    pub const EXPLICIT_WIDTH_PROBE: &str = "\x1b[H\x1b]66;w=1; \x1b\\\x1b[6n";
    /// Home, print one OSC 66 cell at scale 2, then report position.
    pub const SCALED_TEXT_PROBE: &str = "\x1b[H\x1b]66;s=2; \x1b\\\x1b[6n";

    /// DECRQM request for a private mode.
    #[must_use]
    pub fn decrqm(mode: u16) -> String {
        format!("\x1b[?{mode}$p")
    }
}

/// Set window title prefix.
pub const TITLE_PREFIX: &str = "\x1b]0;";

/// Set window title suffix.
pub const TITLE_SUFFIX: &str = "\x1b\\";

/// Cursor style constants.
pub mod cursor_style {
    /// Block cursor (blinking).
    pub const BLOCK_BLINK: &str = "\x1b[1 q";
    /// Block cursor (steady).
    pub const BLOCK_STEADY: &str = "\x1b[2 q";
    /// Underline cursor (blinking).
    pub const UNDERLINE_BLINK: &str = "\x1b[3 q";
    /// Underline cursor (steady).
    pub const UNDERLINE_STEADY: &str = "\x1b[4 q";
    /// Bar cursor (blinking).
    pub const BAR_BLINK: &str = "\x1b[5 q";
    /// Bar cursor (steady).
    pub const BAR_STEADY: &str = "\x1b[6 q";
    /// Default cursor style.
    pub const DEFAULT: &str = "\x1b[0 q";
}

/// Synchronous update sequences (for flicker-free rendering).
pub mod sync {
    /// Begin synchronized update.
    pub const BEGIN: &str = "\x1b[?2026h";
    /// End synchronized update.
    pub const END: &str = "\x1b[?2026l";
}
