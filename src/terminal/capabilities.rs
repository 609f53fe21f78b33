//! Terminal capability detection.

use super::queries::{TerminalResponse, modes};
use std::env;

/// Terminals whose XTVERSION name implies OSC 8 and synchronized output.
const KNOWN_MODERN_TERMINALS: [&str; 6] = ["kitty", "wezterm", "ghostty", "alacritty", "foot", "iterm"];

/// Detected terminal capabilities.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// Terminal segments grapheme clusters itself (mode 2027).
    pub unicode: bool,
    /// Terminal supports hyperlinks (OSC 8).
    pub hyperlinks: bool,
    /// Terminal supports synchronized output (mode 2026).
    pub sync_output: bool,
    /// Terminal supports focus events.
    pub focus: bool,
    /// Terminal supports bracketed paste.
    pub bracketed_paste: bool,
    /// Kitty keyboard protocol.
    pub kitty_keyboard: bool,
    /// Flags reported by the Kitty keyboard query.
    pub kitty_flags: u8,
    /// SGR pixel mouse mode.
    pub sgr_pixels: bool,
    /// Terminal supports dynamic color scheme updates.
    pub color_scheme_updates: bool,
    /// Terminal honors the OSC 66 explicit width escape.
    pub explicit_width: bool,
    /// Terminal supports OSC 66 scaled text.
    pub scaled_text: bool,
    /// Reposition the cursor after every multi-column glyph instead of
    /// trusting the terminal's advance.
    pub explicit_cursor_positioning: bool,
    /// Terminal name if known.
    pub term_name: Option<String>,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            unicode: false,
            hyperlinks: false,
            sync_output: false,
            focus: false,
            bracketed_paste: false,
            kitty_keyboard: false,
            kitty_flags: 0,
            sgr_pixels: false,
            color_scheme_updates: false,
            explicit_width: false,
            scaled_text: false,
            explicit_cursor_positioning: true,
            term_name: None,
        }
    }
}

impl Capabilities {
    /// Detect terminal capabilities from environment.
    #[must_use]
    pub fn detect() -> Self {
        let term = env::var("TERM").unwrap_or_default();
        let term_program = env::var("TERM_PROGRAM").unwrap_or_default();
        let kitty_window_id = env::var("KITTY_WINDOW_ID").ok();
        Self::from_env_values(&term, &term_program, kitty_window_id.is_some())
    }

    /// Build the initial capability set from environment values.
    #[must_use]
    pub fn from_env_values(term: &str, term_program: &str, in_kitty: bool) -> Self {
        let hinted = is_known_modern(term_program) || is_known_modern(term) || in_kitty;
        Self {
            hyperlinks: hinted,
            sync_output: hinted,
            kitty_keyboard: in_kitty,
            term_name: (!term.is_empty()).then(|| term.to_string()),
            ..Self::default()
        }
    }

    /// Fold one parsed query reply into the capability set.
    ///
    /// Cursor position reports are not handled here: they only mean something
    /// when paired with the probe that requested them.
    pub fn apply_response(&mut self, response: &TerminalResponse) {
        match response {
            TerminalResponse::ModeReport { .. } => {
                let Some((mode, supported)) = response.mode_supported() else {
                    return;
                };
                self.apply_mode(mode, supported);
            }
            TerminalResponse::XtVersion { name, .. } => {
                if is_known_modern(name) {
                    self.hyperlinks = true;
                    self.sync_output = true;
                }
                self.term_name = Some(name.clone());
            }
            TerminalResponse::KittyKeyboard { flags } => {
                self.kitty_keyboard = true;
                self.kitty_flags = *flags;
            }
            TerminalResponse::CursorPosition { .. } | TerminalResponse::Unknown(_) => {}
        }
    }

    fn apply_mode(&mut self, mode: u16, supported: bool) {
        match mode {
            modes::SGR_PIXELS => self.sgr_pixels = supported,
            modes::UNICODE_CORE => {
                self.unicode = supported;
                if supported {
                    self.explicit_cursor_positioning = false;
                }
            }
            modes::COLOR_SCHEME => self.color_scheme_updates = supported,
            modes::FOCUS => self.focus = supported,
            modes::BRACKETED_PASTE => self.bracketed_paste = supported,
            modes::SYNC_OUTPUT => self.sync_output = supported,
            _ => {}
        }
    }
}

fn is_known_modern(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    KNOWN_MODERN_TERMINALS.iter().any(|t| lower.contains(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_conservative() {
        let caps = Capabilities::default();
        assert!(!caps.hyperlinks);
        assert!(!caps.explicit_width);
        assert!(caps.explicit_cursor_positioning);
    }

    #[test]
    fn test_env_values() {
        let caps = Capabilities::from_env_values("xterm-256color", "WezTerm", false);
        assert!(caps.hyperlinks);
        assert!(caps.sync_output);
        assert!(!caps.kitty_keyboard);
        assert_eq!(caps.term_name.as_deref(), Some("xterm-256color"));

        let caps = Capabilities::from_env_values("xterm-kitty", "", true);
        assert!(caps.kitty_keyboard);
        assert!(caps.hyperlinks);

        let caps = Capabilities::from_env_values("", "", false);
        assert!(!caps.hyperlinks);
        assert!(caps.term_name.is_none());
    }

    #[test]
    fn test_mode_reports() {
        let mut caps = Capabilities::default();
        for (mode, value) in [(1016, 2), (2031, 1), (1004, 2), (2004, 1), (2026, 2)] {
            caps.apply_response(&TerminalResponse::ModeReport { mode, value });
        }
        assert!(caps.sgr_pixels);
        assert!(caps.color_scheme_updates);
        assert!(caps.focus);
        assert!(caps.bracketed_paste);
        assert!(caps.sync_output);

        caps.apply_response(&TerminalResponse::ModeReport { mode: 2026, value: 0 });
        assert!(!caps.sync_output);
    }

    #[test]
    fn test_unicode_mode_disables_explicit_positioning() {
        let mut caps = Capabilities::default();
        caps.apply_response(&TerminalResponse::ModeReport { mode: 2027, value: 4 });
        assert!(!caps.unicode);
        assert!(caps.explicit_cursor_positioning);

        caps.apply_response(&TerminalResponse::ModeReport { mode: 2027, value: 2 });
        assert!(caps.unicode);
        assert!(!caps.explicit_cursor_positioning);
    }

    #[test]
    fn test_xtversion_and_kitty() {
        let mut caps = Capabilities::default();
        caps.apply_response(&TerminalResponse::XtVersion {
            name: "xterm".into(),
            version: "390".into(),
        });
        assert!(!caps.hyperlinks);
        assert_eq!(caps.term_name.as_deref(), Some("xterm"));

        caps.apply_response(&TerminalResponse::XtVersion {
            name: "ghostty".into(),
            version: "1.0".into(),
        });
        assert!(caps.hyperlinks);
        assert!(caps.sync_output);

        caps.apply_response(&TerminalResponse::KittyKeyboard { flags: 7 });
        assert!(caps.kitty_keyboard);
        assert_eq!(caps.kitty_flags, 7);
    }
}
