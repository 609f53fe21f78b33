//! Terminal capability and state tracking.
//!
//! [`Terminal`] never owns the output sink. Every method writes the escape
//! sequences it needs into a caller-provided writer and updates its record of
//! what the terminal has been told, so the renderer can route the bytes
//! through its own output path.

mod capabilities;
mod cursor;
mod queries;
mod raw;

pub use capabilities::Capabilities;
pub use cursor::{CursorState, CursorStyle};
pub use queries::{TerminalResponse, all_queries, modes, parse_responses};
pub use raw::{RawModeGuard, enable_raw_mode, is_tty, terminal_size};

use crate::ansi::{self, sequences};
use crate::color::Rgba;
use std::collections::VecDeque;
use std::io::{self, Write};

/// Mouse tracking mode last enabled on the terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MouseMode {
    /// No tracking.
    #[default]
    Off,
    /// Button presses and drags.
    Buttons,
    /// Buttons plus motion without a button held.
    Movement,
}

/// A cursor position probe awaiting its report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Probe {
    /// Reply column 2 means OSC 66 `w=1` advanced exactly one cell.
    ExplicitWidth,
    /// Reply column 3 means OSC 66 `s=2` advanced two cells.
    ScaledText,
}

impl Probe {
    const fn expected_col(self) -> u32 {
        match self {
            Self::ExplicitWidth => 2,
            Self::ScaledText => 3,
        }
    }
}

/// Terminal state manager.
#[derive(Debug)]
pub struct Terminal {
    capabilities: Capabilities,
    desired_cursor: CursorState,
    emitted_cursor: CursorState,
    emitted_position_valid: bool,
    /// False until a hide or show has been written in this session.
    emitted_visibility_known: bool,
    alt_screen: bool,
    mouse: MouseMode,
    kitty_pushed: Option<u8>,
    bracketed_paste: bool,
    focus_events: bool,
    is_setup: bool,
    pending_probes: VecDeque<Probe>,
    raw_mode_guard: Option<RawModeGuard>,
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new(Capabilities::default())
    }
}

impl Terminal {
    /// Create a tracker seeded with `capabilities`.
    #[must_use]
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            desired_cursor: CursorState::default(),
            emitted_cursor: CursorState::default(),
            emitted_position_valid: false,
            emitted_visibility_known: false,
            alt_screen: false,
            mouse: MouseMode::Off,
            kitty_pushed: None,
            bracketed_paste: false,
            focus_events: false,
            is_setup: false,
            pending_probes: VecDeque::new(),
            raw_mode_guard: None,
        }
    }

    /// Get terminal capabilities.
    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Get mutable access to terminal capabilities.
    pub fn capabilities_mut(&mut self) -> &mut Capabilities {
        &mut self.capabilities
    }

    /// True between [`setup`](Self::setup) and [`restore`](Self::restore).
    #[must_use]
    pub fn is_setup(&self) -> bool {
        self.is_setup
    }

    /// True while the alternate screen is active.
    #[must_use]
    pub fn is_alt_screen(&self) -> bool {
        self.alt_screen
    }

    /// Current mouse tracking mode.
    #[must_use]
    pub fn mouse_mode(&self) -> MouseMode {
        self.mouse
    }

    /// Kitty keyboard flags currently pushed, if any.
    #[must_use]
    pub fn kitty_keyboard_flags(&self) -> Option<u8> {
        self.kitty_pushed
    }

    /// Check if terminal is in raw mode.
    #[must_use]
    pub fn is_raw_mode(&self) -> bool {
        self.raw_mode_guard.is_some()
    }

    /// Enter raw mode on stdin.
    pub fn enter_raw_mode(&mut self) -> io::Result<()> {
        if self.raw_mode_guard.is_none() {
            self.raw_mode_guard = Some(enable_raw_mode()?);
        }
        Ok(())
    }

    /// Restore the termios state saved by [`enter_raw_mode`](Self::enter_raw_mode).
    pub fn exit_raw_mode(&mut self) {
        self.raw_mode_guard = None;
    }

    /// Write the session start sequences.
    pub fn setup(&mut self, out: &mut impl Write, use_alternate_screen: bool) -> io::Result<()> {
        if use_alternate_screen && !self.alt_screen {
            out.write_all(sequences::ALT_SCREEN_ON.as_bytes())?;
            self.alt_screen = true;
        }
        out.write_all(sequences::CURSOR_HIDE.as_bytes())?;
        self.emitted_cursor.visible = false;
        self.emitted_visibility_known = true;
        if self.capabilities.bracketed_paste && !self.bracketed_paste {
            out.write_all(sequences::BRACKETED_PASTE_ON.as_bytes())?;
            self.bracketed_paste = true;
        }
        if self.capabilities.focus && !self.focus_events {
            out.write_all(sequences::FOCUS_ON.as_bytes())?;
            self.focus_events = true;
        }
        self.clear(out)?;
        self.is_setup = true;
        tracing::debug!(alt_screen = self.alt_screen, "terminal setup");
        Ok(())
    }

    /// Undo everything the session enabled and drop raw mode.
    pub fn restore(&mut self, out: &mut impl Write) -> io::Result<()> {
        out.write_all(sequences::RESET.as_bytes())?;
        self.disable_mouse(out)?;
        self.disable_kitty_keyboard(out)?;
        if self.bracketed_paste {
            out.write_all(sequences::BRACKETED_PASTE_OFF.as_bytes())?;
            self.bracketed_paste = false;
        }
        if self.focus_events {
            out.write_all(sequences::FOCUS_OFF.as_bytes())?;
            self.focus_events = false;
        }
        if self.emitted_cursor.color.is_some() {
            out.write_all(sequences::CURSOR_COLOR_RESET.as_bytes())?;
        }
        out.write_all(sequences::cursor_style::DEFAULT.as_bytes())?;
        out.write_all(sequences::CURSOR_SHOW.as_bytes())?;
        if self.alt_screen {
            out.write_all(sequences::ALT_SCREEN_OFF.as_bytes())?;
            self.alt_screen = false;
        }
        self.emitted_cursor = CursorState {
            visible: true,
            ..CursorState::default()
        };
        self.desired_cursor = CursorState::default();
        self.emitted_position_valid = false;
        self.emitted_visibility_known = true;
        self.exit_raw_mode();
        self.is_setup = false;
        tracing::debug!("terminal restored");
        Ok(())
    }

    /// Cursor state requested by the caller.
    #[must_use]
    pub fn cursor(&self) -> &CursorState {
        &self.desired_cursor
    }

    /// Cursor state last written to the terminal.
    #[must_use]
    pub fn emitted_cursor(&self) -> &CursorState {
        &self.emitted_cursor
    }

    /// Request a cursor position and visibility for the next frame.
    pub fn set_cursor_position(&mut self, x: u32, y: u32, visible: bool) {
        self.desired_cursor.set_position(x, y);
        self.desired_cursor.visible = visible;
    }

    /// Request a cursor shape for the next frame.
    pub fn set_cursor_style(&mut self, style: CursorStyle, blinking: bool) {
        self.desired_cursor.style = style;
        self.desired_cursor.blinking = blinking;
    }

    /// Request a cursor color for the next frame (`None` = terminal default).
    pub fn set_cursor_color(&mut self, color: Option<Rgba>) {
        self.desired_cursor.color = color;
    }

    /// Forget where the terminal cursor is, forcing the next visible cursor
    /// phase to reposition it.
    pub fn invalidate_cursor_position(&mut self) {
        self.emitted_position_valid = false;
    }

    /// Emit whatever cursor sequences differ from the last emitted state.
    ///
    /// `frame_moved_cursor` is set when the frame body repositioned the
    /// terminal cursor. `row_offset` shifts the emitted row.
    pub fn write_cursor_state(
        &mut self,
        out: &mut impl Write,
        frame_moved_cursor: bool,
        row_offset: u32,
    ) -> io::Result<()> {
        let desired = self.desired_cursor;
        let mut emitted = self.emitted_cursor;
        if !self.emitted_visibility_known {
            // Inline sessions never ran setup; force an explicit hide or show.
            emitted.visible = !desired.visible;
            self.emitted_visibility_known = true;
        }
        if frame_moved_cursor {
            self.emitted_position_valid = false;
        }

        if !desired.visible && emitted.visible {
            out.write_all(sequences::CURSOR_HIDE.as_bytes())?;
        }
        if desired.visible
            && (!self.emitted_position_valid || desired.position() != emitted.position())
        {
            ansi::write_cursor_position(out, desired.y.saturating_add(row_offset), desired.x)?;
            self.emitted_position_valid = true;
        }
        if (desired.style, desired.blinking) != (emitted.style, emitted.blinking) {
            out.write_all(desired.style.sequence(desired.blinking).as_bytes())?;
        }
        if !desired.same_color(&emitted) {
            match desired.color {
                Some(color) => {
                    let (r, g, b) = color.to_rgb_u8();
                    out.write_all(sequences::cursor_color(r, g, b).as_bytes())?;
                }
                None => out.write_all(sequences::CURSOR_COLOR_RESET.as_bytes())?,
            }
        }
        if desired.visible && !emitted.visible {
            out.write_all(sequences::CURSOR_SHOW.as_bytes())?;
        }
        self.emitted_cursor = desired;
        Ok(())
    }

    /// Enable mouse tracking.
    pub fn enable_mouse(&mut self, out: &mut impl Write, movement: bool) -> io::Result<()> {
        let mode = if movement {
            MouseMode::Movement
        } else {
            MouseMode::Buttons
        };
        if self.mouse == mode {
            return Ok(());
        }
        if self.mouse != MouseMode::Off {
            out.write_all(sequences::MOUSE_OFF.as_bytes())?;
        }
        out.write_all(sequences::MOUSE_ON.as_bytes())?;
        if movement {
            out.write_all(sequences::MOUSE_MOVEMENT_ON.as_bytes())?;
        }
        self.mouse = mode;
        Ok(())
    }

    /// Disable mouse tracking.
    pub fn disable_mouse(&mut self, out: &mut impl Write) -> io::Result<()> {
        if self.mouse != MouseMode::Off {
            out.write_all(sequences::MOUSE_OFF.as_bytes())?;
            self.mouse = MouseMode::Off;
        }
        Ok(())
    }

    /// Push Kitty keyboard flags, replacing a previous push.
    pub fn enable_kitty_keyboard(&mut self, out: &mut impl Write, flags: u8) -> io::Result<()> {
        if self.kitty_pushed == Some(flags) {
            return Ok(());
        }
        if self.kitty_pushed.is_some() {
            out.write_all(sequences::KITTY_KEYBOARD_POP.as_bytes())?;
        }
        ansi::write_kitty_keyboard_push(out, flags)?;
        self.kitty_pushed = Some(flags);
        Ok(())
    }

    /// Pop the Kitty keyboard flags this tracker pushed.
    pub fn disable_kitty_keyboard(&mut self, out: &mut impl Write) -> io::Result<()> {
        if self.kitty_pushed.take().is_some() {
            out.write_all(sequences::KITTY_KEYBOARD_POP.as_bytes())?;
        }
        Ok(())
    }

    /// Set window title.
    pub fn set_title(&mut self, out: &mut impl Write, title: &str) -> io::Result<()> {
        ansi::write_title(out, title)
    }

    /// Clear the screen and home the cursor.
    pub fn clear(&mut self, out: &mut impl Write) -> io::Result<()> {
        out.write_all(sequences::CLEAR_SCREEN.as_bytes())?;
        out.write_all(sequences::CURSOR_HOME.as_bytes())?;
        self.emitted_position_valid = false;
        Ok(())
    }

    /// Send every capability query and queue the cursor probes.
    ///
    /// The probes print at the home position, so callers should redraw
    /// afterwards.
    pub fn query_capabilities(&mut self, out: &mut impl Write) -> io::Result<()> {
        out.write_all(all_queries().as_bytes())?;
        self.pending_probes.push_back(Probe::ExplicitWidth);
        self.pending_probes.push_back(Probe::ScaledText);
        self.emitted_position_valid = false;
        Ok(())
    }

    /// Number of cursor probes still waiting for a report.
    #[must_use]
    pub fn pending_probe_count(&self) -> usize {
        self.pending_probes.len()
    }

    /// Parse query replies and fold them into the capability set.
    ///
    /// Cursor position reports answer the oldest pending probe.
    pub fn process_response(&mut self, bytes: &[u8]) -> Vec<TerminalResponse> {
        let responses = parse_responses(bytes);
        for response in &responses {
            if let TerminalResponse::CursorPosition { col, .. } = response {
                let Some(probe) = self.pending_probes.pop_front() else {
                    continue;
                };
                let supported = *col == probe.expected_col();
                match probe {
                    Probe::ExplicitWidth => self.capabilities.explicit_width = supported,
                    Probe::ScaledText => self.capabilities.scaled_text = supported,
                }
                tracing::debug!(?probe, col, supported, "cursor probe answered");
            } else {
                self.capabilities.apply_response(response);
            }
        }
        if !responses.is_empty() {
            tracing::debug!(count = responses.len(), "processed capability responses");
        }
        responses
    }
}
