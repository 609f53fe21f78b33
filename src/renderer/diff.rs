//! Frame diffing and ANSI emission.
//!
//! [`FrameEncoder::encode`] walks `next` row by row, compares each glyph with
//! `current` and emits positioning, SGR, hyperlink and glyph bytes for the
//! cells that changed. Cells that were emitted are copied into `current`, so
//! after a complete frame the two buffers agree.
//!
//! Each changed glyph is composed into a scratch buffer and committed to the
//! [`OutputBuffer`] whole. When a commit is rejected the frame stops there and
//! the remaining cells keep their old `current` value, so the next frame
//! emits them again.

use crate::ansi::{self, OutputBuffer, sequences};
use crate::buffer::OptimizedBuffer;
use crate::cell::{Cell, CharKind};
use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::grapheme_pool::GraphemePool;
use crate::link::LinkPool;
use crate::style::TextAttributes;
use crate::terminal::Capabilities;
use std::io::Write;

/// Link id meaning "no hyperlink".
const NO_LINK: u32 = 0;

/// Everything a frame reads besides the two buffers.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput<'a> {
    pub next: &'a OptimizedBuffer,
    pub pool: &'a GraphemePool,
    pub links: &'a LinkPool,
    pub capabilities: &'a Capabilities,
    /// Rows added to every emitted cursor position.
    pub render_offset: u32,
    /// Emit every cell regardless of `current`.
    pub force: bool,
}

/// What one frame emitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSummary {
    /// Glyphs written (a wide glyph counts once).
    pub cells_emitted: u32,
    /// SGR runs opened.
    pub runs: u32,
    /// Cursor positioning sequences written.
    pub cursor_moves: u32,
    /// A chunk was rejected and the frame stopped early.
    pub truncated: bool,
    /// An OSC 8 span may still be open.
    pub link_open: bool,
}

impl FrameSummary {
    /// True when the frame body moved the terminal cursor.
    #[must_use]
    pub fn moved_cursor(&self) -> bool {
        self.cursor_moves > 0 || self.truncated
    }
}

/// The SGR state shared by a run of cells.
#[derive(Clone, Copy, Debug)]
struct OpenRun {
    fg: Rgba,
    bg: Rgba,
    attrs: TextAttributes,
    link: u32,
}

impl OpenRun {
    fn of(cell: &Cell) -> Self {
        Self {
            fg: cell.fg,
            bg: cell.bg,
            attrs: cell.attributes.flags_only(),
            link: cell.attributes.link_id(),
        }
    }

    fn matches(&self, other: &Self) -> bool {
        self.attrs == other.attrs
            && self.link == other.link
            && self.fg.approx_eq(other.fg)
            && self.bg.approx_eq(other.bg)
    }
}

/// Emission state threaded through one frame.
#[derive(Debug, Default)]
struct EmitState {
    run: Option<OpenRun>,
    link: u32,
    /// Where the terminal cursor is known to be, in buffer coordinates.
    cursor: Option<(u32, u32)>,
}

/// Columns covered by the glyph starting at `cell`, limited to `remaining`.
fn glyph_span(cell: &Cell, remaining: u32) -> u32 {
    match cell.ch.kind() {
        CharKind::Grapheme { width, .. } => u32::from(width).clamp(1, remaining.max(1)),
        _ => 1,
    }
}

fn cells_equal(a: &[Cell], b: &[Cell]) -> bool {
    a.iter().zip(b).all(|(a, b)| a.same_as(b))
}

/// Reusable frame encoder.
#[derive(Debug, Default)]
pub struct FrameEncoder {
    scratch: Vec<u8>,
}

impl FrameEncoder {
    /// Create an encoder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scratch: Vec::with_capacity(256),
        }
    }

    /// Emit the frame body for `frame.next` against `current`.
    ///
    /// Starts with the synchronized update marker. Call
    /// [`finish`](Self::finish) afterwards to close the frame.
    ///
    /// # Errors
    ///
    /// [`Error::GraphemeNotFound`] when a cell references an id missing from
    /// the pool, [`Error::InvalidDimensions`] when the buffers differ in size.
    pub fn encode(
        &mut self,
        current: &mut OptimizedBuffer,
        frame: &FrameInput<'_>,
        out: &mut OutputBuffer,
    ) -> Result<FrameSummary> {
        let next = frame.next;
        if current.size() != next.size() {
            return Err(Error::InvalidDimensions {
                width: next.width(),
                height: next.height(),
            });
        }
        let (width, height) = next.size();
        let mut summary = FrameSummary::default();
        let mut state = EmitState::default();

        if out.write_bytes(sequences::sync::BEGIN.as_bytes()).is_err() {
            summary.truncated = true;
            return Ok(summary);
        }

        'rows: for y in 0..height {
            let row_start = y as usize * width as usize;
            let mut x = 0;
            while x < width {
                let idx = row_start + x as usize;
                let cell = next.cells()[idx];
                let span = glyph_span(&cell, width - x);
                let end = idx + span as usize;

                let changed =
                    frame.force || !cells_equal(&current.cells()[idx..end], &next.cells()[idx..end]);
                if !changed {
                    if state.run.take().is_some()
                        && out.write_bytes(sequences::RESET.as_bytes()).is_err()
                    {
                        summary.truncated = true;
                        break 'rows;
                    }
                    x += span;
                    continue;
                }

                self.scratch.clear();
                self.compose(&cell, x, y, span, frame, &mut state, &mut summary)?;
                if out.write_bytes(&self.scratch).is_err() {
                    summary.truncated = true;
                    break 'rows;
                }
                current.cells_mut()[idx..end].copy_from_slice(&next.cells()[idx..end]);
                summary.cells_emitted += 1;
                x += span;
            }

            if state.run.take().is_some() && out.write_bytes(sequences::RESET.as_bytes()).is_err() {
                summary.truncated = true;
                break;
            }
        }

        summary.link_open =
            state.link != NO_LINK || (summary.truncated && frame.capabilities.hyperlinks);
        if summary.truncated {
            tracing::warn!(
                dropped = out.dropped_bytes(),
                capacity = out.capacity(),
                "frame output truncated"
            );
        }
        Ok(summary)
    }

    /// Write the frame trailer: close the hyperlink span, reset, end the
    /// synchronized update. Uses the output buffer's reserved tail.
    pub fn finish(&mut self, summary: &FrameSummary, out: &mut OutputBuffer) -> Result<()> {
        self.scratch.clear();
        if summary.link_open {
            self.scratch.extend_from_slice(sequences::HYPERLINK_END.as_bytes());
        }
        self.scratch.extend_from_slice(sequences::RESET.as_bytes());
        self.scratch.extend_from_slice(sequences::sync::END.as_bytes());
        out.write_trailer(&self.scratch)
    }

    #[allow(clippy::too_many_arguments)]
    fn compose(
        &mut self,
        cell: &Cell,
        x: u32,
        y: u32,
        span: u32,
        frame: &FrameInput<'_>,
        state: &mut EmitState,
        summary: &mut FrameSummary,
    ) -> Result<()> {
        let w = &mut self.scratch;
        let style = OpenRun::of(cell);
        let row = y.saturating_add(frame.render_offset);

        match state.run {
            Some(open) if open.matches(&style) => {
                if state.cursor != Some((x, y)) {
                    ansi::write_cursor_position(w, row, x)?;
                    summary.cursor_moves += 1;
                }
            }
            _ => {
                // The SGR starts with a reset, which closes the previous run.
                ansi::write_cursor_position(w, row, x)?;
                ansi::write_sgr(w, style.fg, style.bg, style.attrs)?;
                summary.cursor_moves += 1;
                summary.runs += 1;
                state.run = Some(style);
            }
        }

        if frame.capabilities.hyperlinks && style.link != state.link {
            if state.link != NO_LINK {
                w.write_all(sequences::HYPERLINK_END.as_bytes())?;
                state.link = NO_LINK;
            }
            if let Some(url) = frame.links.get(style.link) {
                ansi::write_hyperlink_start(w, style.link, url)?;
                state.link = style.link;
            }
        }

        match cell.ch.kind() {
            CharKind::Scalar(ch) => {
                // Never emit raw control bytes.
                let ch = if ch.is_control() { ' ' } else { ch };
                let mut utf8 = [0u8; 4];
                w.write_all(ch.encode_utf8(&mut utf8).as_bytes())?;
                state.cursor = Some((x + 1, y));
            }
            CharKind::Grapheme { id, width } => {
                let bytes = frame.pool.get(id)?;
                if frame.capabilities.explicit_width {
                    ansi::write_explicit_width(w, width, bytes)?;
                    state.cursor = Some((x + span, y));
                } else {
                    w.write_all(bytes.as_bytes())?;
                    state.cursor = (!frame.capabilities.explicit_cursor_positioning)
                        .then_some((x + span, y));
                }
            }
            CharKind::Continuation { .. } => {
                w.write_all(b" ")?;
                state.cursor = Some((x + 1, y));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{CellChar, GraphemeId};
    use crate::unicode::WidthMethod;

    struct Fixture {
        current: OptimizedBuffer,
        next: OptimizedBuffer,
        pool: GraphemePool,
        links: LinkPool,
        caps: Capabilities,
        encoder: FrameEncoder,
    }

    impl Fixture {
        fn new(width: u32, height: u32) -> Self {
            let mut current = OptimizedBuffer::new(width, height, WidthMethod::Unicode).unwrap();
            let mut next = OptimizedBuffer::new(width, height, WidthMethod::Unicode).unwrap();
            current.clear(Rgba::BLACK, None);
            next.clear(Rgba::BLACK, None);
            Self {
                current,
                next,
                pool: GraphemePool::new(),
                links: LinkPool::new(),
                caps: Capabilities::default(),
                encoder: FrameEncoder::new(),
            }
        }

        fn frame_with(&mut self, force: bool, capacity: usize) -> (String, FrameSummary) {
            let mut out = OutputBuffer::new(capacity).unwrap();
            let input = FrameInput {
                next: &self.next,
                pool: &self.pool,
                links: &self.links,
                capabilities: &self.caps,
                render_offset: 0,
                force,
            };
            let summary = self
                .encoder
                .encode(&mut self.current, &input, &mut out)
                .unwrap();
            self.encoder.finish(&summary, &mut out).unwrap();
            (String::from_utf8(out.as_bytes().to_vec()).unwrap(), summary)
        }

        fn frame(&mut self, force: bool) -> (String, FrameSummary) {
            self.frame_with(force, 64 * 1024)
        }

        fn text(&mut self, text: &str, x: u32, y: u32, fg: Rgba, attrs: TextAttributes) {
            self.next
                .draw_text(&mut self.pool, text, x, y, fg, None, attrs)
                .unwrap();
        }
    }

    const BEGIN: &str = "\x1b[?2026h";
    const TRAILER: &str = "\x1b[0m\x1b[?2026l";

    #[test]
    fn test_hi_scenario() {
        let mut fx = Fixture::new(10, 3);
        fx.next
            .draw_text(&mut fx.pool, "Hi", 0, 0, Rgba::WHITE, Some(Rgba::BLACK), TextAttributes::empty())
            .unwrap();
        let (out, summary) = fx.frame(true);

        assert!(out.starts_with(&format!(
            "{BEGIN}\x1b[1;1H\x1b[0;38;2;255;255;255;48;2;0;0;0mHi\x1b[1;3H\x1b[0;39;48;2;0;0;0m        \x1b[0m"
        )));
        assert_eq!(out.matches("\x1b[1;1H").count(), 1);
        assert_eq!(out.matches("38;2;255;255;255").count(), 1);
        assert!(out.ends_with(TRAILER));
        assert_eq!(summary.cells_emitted, 30);
        assert_eq!(summary.runs, 4);
    }

    #[test]
    fn test_noop_frame_emits_no_content() {
        let mut fx = Fixture::new(8, 2);
        fx.text("abc", 1, 1, Rgba::RED, TextAttributes::BOLD);
        fx.frame(true);

        let (out, summary) = fx.frame(false);
        assert_eq!(out, format!("{BEGIN}{TRAILER}"));
        assert_eq!(summary.cells_emitted, 0);
        assert!(!summary.moved_cursor());
    }

    #[test]
    fn test_first_unforced_frame_diffs_against_cleared_current() {
        let mut fx = Fixture::new(8, 1);
        fx.text("ab", 3, 0, Rgba::WHITE, TextAttributes::empty());
        let (out, summary) = fx.frame(false);
        assert_eq!(
            out,
            format!("{BEGIN}\x1b[1;4H\x1b[0;38;2;255;255;255;48;2;0;0;0mab\x1b[0m{TRAILER}")
        );
        assert_eq!(summary.cells_emitted, 2);
    }

    #[test]
    fn test_run_coalescing_single_sgr() {
        let mut fx = Fixture::new(12, 1);
        fx.text("abcdefghij", 0, 0, Rgba::GREEN, TextAttributes::UNDERLINE);
        let (out, summary) = fx.frame(false);
        assert_eq!(out.matches("\x1b[0;").count(), 1);
        assert!(out.contains("abcdefghij"));
        assert_eq!(summary.runs, 1);
        assert_eq!(summary.cursor_moves, 1);
    }

    #[test]
    fn test_skipped_cell_closes_run() {
        let mut fx = Fixture::new(6, 1);
        fx.text("aXb", 0, 0, Rgba::WHITE, TextAttributes::empty());
        fx.frame(true);

        fx.text("zXy", 0, 0, Rgba::WHITE, TextAttributes::empty());
        let (out, summary) = fx.frame(false);
        let sgr = "\x1b[0;38;2;255;255;255;48;2;0;0;0m";
        assert_eq!(
            out,
            format!("{BEGIN}\x1b[1;1H{sgr}z\x1b[0m\x1b[1;3H{sgr}y\x1b[0m{TRAILER}")
        );
        assert_eq!(summary.runs, 2);
    }

    #[test]
    fn test_attribute_change_breaks_run() {
        let mut fx = Fixture::new(4, 1);
        fx.text("a", 0, 0, Rgba::WHITE, TextAttributes::empty());
        fx.text("b", 1, 0, Rgba::WHITE, TextAttributes::BOLD);
        let (out, summary) = fx.frame(false);
        assert!(out.contains("\x1b[1;2H\x1b[0;38;2;255;255;255;48;2;0;0;0;1mb"));
        assert_eq!(summary.runs, 2);
    }

    #[test]
    fn test_epsilon_color_difference_is_unchanged() {
        let mut fx = Fixture::new(3, 1);
        fx.text("a", 0, 0, Rgba::new(0.5, 0.5, 0.5, 1.0), TextAttributes::empty());
        fx.frame(true);
        fx.text("a", 0, 0, Rgba::new(0.500_001, 0.5, 0.5, 1.0), TextAttributes::empty());
        let (_, summary) = fx.frame(false);
        assert_eq!(summary.cells_emitted, 0);
    }

    #[test]
    fn test_transparent_background_uses_default() {
        let mut fx = Fixture::new(2, 1);
        fx.next.set_raw(0, 0, Cell::new('x', Rgba::WHITE, Rgba::TRANSPARENT, TextAttributes::empty()));
        let (out, _) = fx.frame(false);
        assert!(out.contains("\x1b[0;38;2;255;255;255;49mx"));
    }

    #[test]
    fn test_render_offset_shifts_rows() {
        let mut fx = Fixture::new(4, 2);
        fx.text("q", 2, 1, Rgba::WHITE, TextAttributes::empty());
        let mut out = OutputBuffer::new(4096).unwrap();
        let input = FrameInput {
            next: &fx.next,
            pool: &fx.pool,
            links: &fx.links,
            capabilities: &fx.caps,
            render_offset: 10,
            force: false,
        };
        fx.encoder.encode(&mut fx.current, &input, &mut out).unwrap();
        let out = String::from_utf8(out.as_bytes().to_vec()).unwrap();
        assert!(out.contains("\x1b[12;3H"));
    }

    #[test]
    fn test_wide_glyph_emitted_once_and_copied_in_lockstep() {
        let mut fx = Fixture::new(6, 1);
        fx.caps.explicit_cursor_positioning = false;
        fx.text("漢x", 0, 0, Rgba::WHITE, TextAttributes::empty());
        let (out, summary) = fx.frame(false);
        assert!(out.contains("漢x"));
        assert_eq!(summary.cells_emitted, 2);
        assert_eq!(summary.cursor_moves, 1);
        assert!(fx.current.get(1, 0).unwrap().is_continuation());
        assert!(fx.current.cells().iter().zip(fx.next.cells()).all(|(a, b)| a.same_as(b)));
    }

    #[test]
    fn test_explicit_cursor_positioning_after_wide_glyph() {
        let mut fx = Fixture::new(6, 1);
        fx.text("漢x", 0, 0, Rgba::WHITE, TextAttributes::empty());
        let (out, summary) = fx.frame(false);
        assert!(out.contains("漢\x1b[1;3Hx"));
        assert_eq!(summary.cursor_moves, 2);
    }

    #[test]
    fn test_explicit_width_wraps_grapheme() {
        let mut fx = Fixture::new(6, 1);
        fx.caps.explicit_width = true;
        fx.text("👋x", 0, 0, Rgba::WHITE, TextAttributes::empty());
        let (out, summary) = fx.frame(false);
        assert!(out.contains("\x1b]66;w=2;👋\x1b\\x"));
        assert_eq!(summary.cursor_moves, 1);
    }

    #[test]
    fn test_change_in_right_half_reemits_whole_glyph() {
        let mut fx = Fixture::new(4, 1);
        fx.text("漢", 0, 0, Rgba::WHITE, TextAttributes::empty());
        fx.frame(true);

        fx.text("漢", 0, 0, Rgba::WHITE, TextAttributes::empty());
        let mut cont = fx.next.get(1, 0).unwrap();
        cont.bg = Rgba::RED;
        fx.next.set_raw(1, 0, cont);
        let (out, summary) = fx.frame(false);
        assert!(out.contains("\x1b[1;1H"));
        assert!(out.contains('漢'));
        assert_eq!(summary.cells_emitted, 1);
        assert_eq!(fx.current.get(1, 0).unwrap().bg, Rgba::RED);
    }

    #[test]
    fn test_orphan_continuation_emits_space() {
        let mut fx = Fixture::new(4, 1);
        let id = GraphemeId::new(1);
        fx.next.set_raw(
            0,
            0,
            Cell {
                ch: CellChar::continuation(id, 1, 0),
                ..Cell::blank(Rgba::BLUE)
            },
        );
        let (out, _) = fx.frame(false);
        assert!(out.contains("\x1b[0;39;48;2;0;0;255m \x1b[0m"));
    }

    #[test]
    fn test_hyperlink_spans() {
        let mut fx = Fixture::new(6, 1);
        fx.caps.hyperlinks = true;
        let link = fx.links.intern("https://example.com").unwrap();
        let linked = TextAttributes::empty().with_link_id(link);
        fx.text("ab", 0, 0, Rgba::WHITE, linked);
        fx.text("c", 2, 0, Rgba::WHITE, TextAttributes::empty());
        let (out, _) = fx.frame(false);
        assert!(out.contains("\x1b]8;id=1;https://example.com\x1b\\ab"));
        assert!(out.contains("\x1b]8;;\x1b\\c"));
    }

    #[test]
    fn test_hyperlink_span_closed_in_trailer() {
        let mut fx = Fixture::new(2, 1);
        fx.caps.hyperlinks = true;
        let link = fx.links.intern("https://example.com").unwrap();
        fx.text("ab", 0, 0, Rgba::WHITE, TextAttributes::empty().with_link_id(link));
        let (out, summary) = fx.frame(false);
        assert!(summary.link_open);
        assert!(out.ends_with(&format!("\x1b]8;;\x1b\\{TRAILER}")));
    }

    #[test]
    fn test_hyperlinks_ignored_without_capability() {
        let mut fx = Fixture::new(2, 1);
        let link = fx.links.intern("https://example.com").unwrap();
        fx.text("ab", 0, 0, Rgba::WHITE, TextAttributes::empty().with_link_id(link));
        let (out, _) = fx.frame(false);
        assert!(!out.contains("\x1b]8;"));
    }

    #[test]
    fn test_missing_grapheme_is_error() {
        let mut fx = Fixture::new(4, 1);
        fx.next.set_raw(
            0,
            0,
            Cell {
                ch: CellChar::grapheme(GraphemeId::new(99), 1),
                ..Cell::blank(Rgba::BLACK)
            },
        );
        let mut out = OutputBuffer::new(4096).unwrap();
        let input = FrameInput {
            next: &fx.next,
            pool: &fx.pool,
            links: &fx.links,
            capabilities: &fx.caps,
            render_offset: 0,
            force: false,
        };
        let err = fx.encoder.encode(&mut fx.current, &input, &mut out).unwrap_err();
        assert!(matches!(err, Error::GraphemeNotFound { id: 99 }));
    }

    #[test]
    fn test_truncated_frame_resumes_next_time() {
        let mut fx = Fixture::new(40, 10);
        for y in 0..10 {
            fx.text(&"y".repeat(40), 0, y, Rgba::WHITE, TextAttributes::empty());
        }
        let (out, summary) = fx.frame_with(false, 512);
        assert!(summary.truncated);
        assert!(out.ends_with(TRAILER));
        assert!(out.len() <= 512);

        let (_, resumed) = fx.frame(false);
        assert!(!resumed.truncated);
        assert_eq!(summary.cells_emitted + resumed.cells_emitted, 400);
        let (_, idle) = fx.frame(false);
        assert_eq!(idle.cells_emitted, 0);
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let mut fx = Fixture::new(4, 1);
        let mut current = OptimizedBuffer::new(3, 1, WidthMethod::Unicode).unwrap();
        let mut out = OutputBuffer::new(4096).unwrap();
        let input = FrameInput {
            next: &fx.next,
            pool: &fx.pool,
            links: &fx.links,
            capabilities: &fx.caps,
            render_offset: 0,
            force: false,
        };
        assert!(matches!(
            fx.encoder.encode(&mut current, &input, &mut out),
            Err(Error::InvalidDimensions { .. })
        ));
    }
}
