//! Double-buffered frame renderer.
//!
//! [`Renderer`] owns the `current` buffer (what the terminal shows) and the
//! `next` buffer (what callers draw into). Each [`render`](Renderer::render)
//! diffs the two, emits only the changed cells, hands the bytes to the
//! [`OutputWriter`] and promotes the hit grid drawn alongside the frame.
//!
//! # Frame lifecycle
//!
//! 1. Draw into [`next_buffer_with_pool`](Renderer::next_buffer_with_pool)
//!    and register hit regions with [`add_to_hit_grid`](Renderer::add_to_hit_grid).
//! 2. Call [`render`](Renderer::render).
//! 3. `next` comes back cleared to the background colour.
//!
//! # Examples
//!
//! ```no_run
//! use vtframe::{Renderer, Rgba, TextAttributes};
//!
//! fn main() -> vtframe::Result<()> {
//!     let mut renderer = Renderer::new(80, 24)?;
//!     renderer.setup_terminal(true)?;
//!
//!     let (next, pool) = renderer.next_buffer_with_pool();
//!     next.draw_text(pool, "Hello!", 10, 5, Rgba::GREEN, None, TextAttributes::BOLD)?;
//!     renderer.add_to_hit_grid(10, 5, 6, 1, 1);
//!     renderer.render(false);
//!
//!     renderer.destroy();
//!     Ok(())
//! }
//! ```

mod diff;
mod hitgrid;
mod output;
mod scissor;

pub use diff::{FrameEncoder, FrameInput, FrameSummary};
pub use hitgrid::{HitGrid, NO_HIT};
pub use output::{OutputWriter, Sink, WriterStats};
pub use scissor::{ClipRect, ScissorStack};

use crate::ansi::output::DEFAULT_CAPACITY;
use crate::buffer::OptimizedBuffer;
use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::event;
use crate::grapheme_pool::GraphemePool;
use crate::link::LinkPool;
use crate::style::TextAttributes;
use crate::terminal::{Capabilities, CursorStyle, Terminal, is_tty};
use crate::unicode::WidthMethod;
use std::io;
use std::path::Path;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// Screen corner the debug overlay is anchored to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DebugCorner {
    TopLeft,
    #[default]
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Renderer configuration.
#[derive(Clone, Debug)]
pub struct RendererOptions {
    /// Flush frames on a background writer thread.
    pub use_thread: bool,
    /// Alternate screen preference for hosts calling
    /// [`Renderer::setup_terminal`].
    pub use_alternate_screen: bool,
    /// Rows added to every emitted cursor row.
    pub render_offset: u32,
    /// Glyph width algorithm for both buffers.
    pub width_method: WidthMethod,
    /// Bytes per output buffer.
    pub output_capacity: usize,
    /// Colour `next` is cleared to after each frame.
    pub background: Rgba,
    /// Paint the stats panel into every frame.
    pub debug_overlay: bool,
    pub debug_overlay_corner: DebugCorner,
    /// Send capability queries during terminal setup.
    pub query_capabilities: bool,
    /// Put stdin in raw mode during terminal setup when it is a tty.
    pub raw_mode: bool,
    /// Capability set to start from; `None` reads the environment.
    pub capabilities: Option<Capabilities>,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            use_thread: false,
            use_alternate_screen: true,
            render_offset: 0,
            width_method: WidthMethod::default(),
            output_capacity: DEFAULT_CAPACITY,
            background: Rgba::BLACK,
            debug_overlay: false,
            debug_overlay_corner: DebugCorner::default(),
            query_capabilities: true,
            raw_mode: true,
            capabilities: None,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl RendererOptions {
    /// Defaults overridden by `VTFRAME_*` environment variables.
    ///
    /// Recognised: `VTFRAME_USE_THREAD`, `VTFRAME_DEBUG_OVERLAY` (flags),
    /// `VTFRAME_WIDTH_METHOD` (`unicode` or `wcwidth`) and
    /// `VTFRAME_RENDER_OFFSET` (rows). Unparseable values are ignored.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// [`from_env`](Self::from_env) with an injectable variable source.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();
        if let Some(flag) = lookup("VTFRAME_USE_THREAD").as_deref().and_then(parse_flag) {
            options.use_thread = flag;
        }
        if let Some(flag) = lookup("VTFRAME_DEBUG_OVERLAY")
            .as_deref()
            .and_then(parse_flag)
        {
            options.debug_overlay = flag;
        }
        if let Some(value) = lookup("VTFRAME_WIDTH_METHOD") {
            match WidthMethod::from_str(&value) {
                Ok(method) => options.width_method = method,
                Err(err) => tracing::debug!(%err, "ignoring VTFRAME_WIDTH_METHOD"),
            }
        }
        if let Some(rows) = lookup("VTFRAME_RENDER_OFFSET").and_then(|v| v.trim().parse().ok()) {
            options.render_offset = rows;
        }
        options
    }
}

/// Rendering statistics.
#[derive(Clone, Debug, Default)]
pub struct RenderStats {
    pub frames: u64,
    /// Frames whose output hit the buffer capacity.
    pub truncated_frames: u64,
    /// Frames with nothing to emit; no bytes were written.
    pub skipped_frames: u64,
    pub last_frame_cells: u32,
    pub last_frame_runs: u32,
    pub last_frame_bytes: usize,
    pub last_render_time: Duration,
    pub write_errors: u64,
    pub bytes_written: u64,
    /// Host supplied via [`Renderer::update_stats`].
    pub time_ms: f64,
    pub fps: f64,
    pub frame_callback_ms: f64,
    /// Host supplied via [`Renderer::update_memory_stats`].
    pub heap_used: u64,
    pub heap_total: u64,
    pub array_buffers: u64,
    pub buffer_bytes: usize,
    pub hitgrid_bytes: usize,
    pub pool_bytes: usize,
}

/// Frame renderer bound to one output sink.
pub struct Renderer {
    width: u32,
    height: u32,

    current: OptimizedBuffer,
    next: OptimizedBuffer,
    pool: GraphemePool,
    links: LinkPool,

    terminal: Terminal,
    hit_grid: HitGrid,
    writer: OutputWriter,
    encoder: FrameEncoder,

    options: RendererOptions,
    force_redraw: bool,
    /// Cursor and control sequences, reused.
    scratch: Vec<u8>,
    last_frame: Vec<u8>,
    stats: RenderStats,
    destroyed: bool,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("writer", &self.writer)
            .field("force_redraw", &self.force_redraw)
            .finish_non_exhaustive()
    }
}

impl Renderer {
    /// Renderer writing to stdout with options read from the environment.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::with_writer(width, height, Box::new(io::stdout()), RendererOptions::from_env())
    }

    /// Renderer writing to `sink`.
    pub fn with_writer(
        width: u32,
        height: u32,
        sink: Sink,
        options: RendererOptions,
    ) -> Result<Self> {
        let width = width.max(1);
        let height = height.max(1);
        let capabilities = options
            .capabilities
            .clone()
            .unwrap_or_else(Capabilities::detect);

        let current = OptimizedBuffer::new(width, height, options.width_method)?;
        let mut next = OptimizedBuffer::new(width, height, options.width_method)?;
        next.clear(options.background, None);
        let mut writer = OutputWriter::new(sink, options.output_capacity)?;
        if options.use_thread {
            writer.set_threaded(true)?;
        }

        tracing::debug!(width, height, threaded = options.use_thread, "renderer created");
        Ok(Self {
            width,
            height,
            current,
            next,
            pool: GraphemePool::new(),
            links: LinkPool::new(),
            terminal: Terminal::new(capabilities),
            hit_grid: HitGrid::new(width, height)?,
            writer,
            encoder: FrameEncoder::new(),
            options,
            force_redraw: true,
            scratch: Vec::with_capacity(256),
            last_frame: Vec::new(),
            stats: RenderStats::default(),
            destroyed: false,
        })
    }

    /// Get dimensions.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The buffer the terminal currently shows.
    #[must_use]
    pub fn current_buffer(&self) -> &OptimizedBuffer {
        &self.current
    }

    /// The buffer the next frame is drawn into.
    pub fn next_buffer(&mut self) -> &mut OptimizedBuffer {
        &mut self.next
    }

    /// `next` together with the grapheme pool its cells intern into.
    pub fn next_buffer_with_pool(&mut self) -> (&mut OptimizedBuffer, &mut GraphemePool) {
        (&mut self.next, &mut self.pool)
    }

    pub fn grapheme_pool(&mut self) -> &mut GraphemePool {
        &mut self.pool
    }

    pub fn link_pool(&mut self) -> &mut LinkPool {
        &mut self.links
    }

    /// The terminal state tracker.
    #[must_use]
    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }

    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        self.terminal.capabilities()
    }

    pub fn capabilities_mut(&mut self) -> &mut Capabilities {
        self.terminal.capabilities_mut()
    }

    #[must_use]
    pub fn options(&self) -> &RendererOptions {
        &self.options
    }

    /// Draw text into `next` with the renderer's pool.
    pub fn draw_text(
        &mut self,
        text: &str,
        x: u32,
        y: u32,
        fg: Rgba,
        bg: Option<Rgba>,
        attributes: TextAttributes,
    ) -> Result<()> {
        self.next
            .draw_text(&mut self.pool, text, x, y, fg, bg, attributes)
    }

    /// Place one grapheme into `next` with the renderer's pool.
    #[allow(clippy::too_many_arguments)]
    pub fn set_cell(
        &mut self,
        x: u32,
        y: u32,
        grapheme: &str,
        fg: Rgba,
        bg: Rgba,
        attributes: TextAttributes,
    ) -> Result<()> {
        self.next
            .set_cell(&mut self.pool, x, y, grapheme, fg, bg, attributes)
    }

    /// Fill a rectangle of `next` with a background colour.
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, bg: Rgba) {
        self.next.fill_rect(x, y, width, height, bg);
    }

    /// Change the colour `next` is cleared to. Applies to `next` immediately.
    pub fn set_background(&mut self, color: Rgba) {
        self.options.background = color;
        self.next.clear(color, None);
    }

    /// Shift every emitted row down by `rows`. Forces a full redraw.
    pub fn set_render_offset(&mut self, rows: u32) {
        if self.options.render_offset != rows {
            self.options.render_offset = rows;
            self.force_redraw = true;
        }
    }

    /// Switch between synchronous and threaded output.
    pub fn set_use_thread(&mut self, enabled: bool) -> Result<()> {
        self.writer.set_threaded(enabled)?;
        self.options.use_thread = enabled;
        Ok(())
    }

    /// Resize both buffers and the hit grid. The next frame redraws fully.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        let width = width.max(1);
        let height = height.max(1);
        if (width, height) == (self.width, self.height) {
            return Ok(());
        }
        // Allocate first so a failure leaves the buffers unchanged.
        let mut current = OptimizedBuffer::new(width, height, self.options.width_method)?;
        let mut next = OptimizedBuffer::new(width, height, self.options.width_method)?;
        self.hit_grid.resize(width, height)?;

        current.clear(Rgba::TRANSPARENT, None);
        next.clear(self.options.background, None);
        self.current = current;
        self.next = next;
        self.width = width;
        self.height = height;
        self.force_redraw = true;
        self.terminal.invalidate_cursor_position();

        tracing::debug!(width, height, "renderer resized");
        event::emit_event("resize", &format!("{width}x{height}"));
        Ok(())
    }

    /// Force the next frame to emit every cell.
    pub fn invalidate(&mut self) {
        self.force_redraw = true;
    }

    // ---- frame ----

    /// Diff `next` against `current` into the writer's active buffer.
    ///
    /// Emits the changed cells, then the cursor state, then the trailer.
    /// Does not send anything. Returns the frame summary, or
    /// [`Error::GraphemeNotFound`] when a cell references a grapheme the pool
    /// does not hold.
    pub fn prepare_render_frame(&mut self, force: bool) -> Result<FrameSummary> {
        let force = force || self.force_redraw;
        self.scratch.clear();
        let Some(out) = self.writer.begin_frame() else {
            tracing::error!("no output buffer available, frame dropped");
            return Ok(FrameSummary {
                truncated: true,
                ..FrameSummary::default()
            });
        };

        let input = FrameInput {
            next: &self.next,
            pool: &self.pool,
            links: &self.links,
            capabilities: self.terminal.capabilities(),
            render_offset: self.options.render_offset,
            force,
        };
        let mut summary = self.encoder.encode(&mut self.current, &input, out)?;

        if summary.truncated {
            self.terminal.invalidate_cursor_position();
        } else {
            self.terminal.write_cursor_state(
                &mut self.scratch,
                summary.moved_cursor(),
                self.options.render_offset,
            )?;
            if out.write_bytes(&self.scratch).is_err() {
                summary.truncated = true;
                self.terminal.invalidate_cursor_position();
            }
        }
        self.encoder.finish(&summary, out)?;
        self.force_redraw = false;
        Ok(summary)
    }

    /// Render one frame.
    ///
    /// A frame with no changed cells and no cursor change writes nothing.
    /// An encoding error such as a grapheme pool miss restores the terminal
    /// and aborts the process.
    pub fn render(&mut self, force: bool) {
        let started = Instant::now();
        if self.options.debug_overlay {
            self.draw_debug_overlay();
        }

        let summary = match self.prepare_render_frame(force) {
            Ok(summary) => summary,
            Err(err) => self.fatal(&err),
        };

        let empty = summary.cells_emitted == 0 && self.scratch.is_empty() && !summary.truncated;
        self.last_frame.clear();
        if empty {
            self.stats.skipped_frames += 1;
        } else {
            if let Some(buffer) = self.writer.active_buffer() {
                self.last_frame.extend_from_slice(buffer.as_bytes());
            }
            self.writer.submit();
        }

        self.hit_grid.swap();
        self.next.clear(self.options.background, None);
        self.record_frame(&summary, started.elapsed());
    }

    fn fatal(&mut self, err: &Error) -> ! {
        self.writer.shutdown();
        self.scratch.clear();
        if self.terminal.restore(&mut self.scratch).is_ok() {
            self.writer.write_out(&self.scratch);
        }
        tracing::error!(%err, "render aborted");
        eprintln!("vtframe: render aborted: {err}");
        std::process::abort();
    }

    /// Bytes of the last frame handed to the writer. Empty when the last
    /// frame was skipped.
    #[must_use]
    pub fn last_frame_output(&self) -> &[u8] {
        &self.last_frame
    }

    fn record_frame(&mut self, summary: &FrameSummary, elapsed: Duration) {
        let writer = self.writer.stats();
        let stats = &mut self.stats;
        stats.frames += 1;
        if summary.truncated {
            stats.truncated_frames += 1;
        }
        stats.last_frame_cells = summary.cells_emitted;
        stats.last_frame_runs = summary.runs;
        stats.last_frame_bytes = self.last_frame.len();
        stats.last_render_time = elapsed;
        stats.write_errors = writer.write_errors;
        stats.bytes_written = writer.bytes_written;
        self.update_memory_usage();

        tracing::debug!(
            frame = self.stats.frames,
            cells = summary.cells_emitted,
            runs = summary.runs,
            bytes = self.stats.last_frame_bytes,
            micros = elapsed.as_micros() as u64,
            "frame rendered"
        );
    }

    fn update_memory_usage(&mut self) {
        self.stats.buffer_bytes = self.current.byte_size() + self.next.byte_size();
        self.stats.hitgrid_bytes = self.hit_grid.byte_size();
        self.stats.pool_bytes = self.pool.byte_size();
    }

    fn draw_debug_overlay(&mut self) {
        let stats = &self.stats;
        let lines = [
            format!("fps {:.1}  host {:.2}ms", stats.fps, stats.frame_callback_ms),
            format!(
                "frame {}  {:.2}ms",
                stats.frames,
                stats.last_render_time.as_secs_f64() * 1000.0
            ),
            format!(
                "cells {}  bytes {}",
                stats.last_frame_cells, stats.last_frame_bytes
            ),
            format!(
                "mem {}K  heap {}K",
                (stats.buffer_bytes + stats.hitgrid_bytes + stats.pool_bytes) / 1024,
                stats.heap_used / 1024
            ),
        ];
        let panel_width = lines.iter().map(String::len).max().unwrap_or(0) as u32 + 2;
        let panel_height = lines.len() as u32;
        let (x, y) = match self.options.debug_overlay_corner {
            DebugCorner::TopLeft => (0, 0),
            DebugCorner::TopRight => (self.width.saturating_sub(panel_width), 0),
            DebugCorner::BottomLeft => (0, self.height.saturating_sub(panel_height)),
            DebugCorner::BottomRight => (
                self.width.saturating_sub(panel_width),
                self.height.saturating_sub(panel_height),
            ),
        };

        let panel = Rgba::from_rgb_u8(24, 24, 32);
        self.next.fill_rect(x, y, panel_width, panel_height, panel);
        for (row, line) in (y..).zip(lines.iter()) {
            if let Err(err) = self.next.draw_text(
                &mut self.pool,
                line,
                x + 1,
                row,
                Rgba::WHITE,
                Some(panel),
                TextAttributes::empty(),
            ) {
                tracing::debug!(%err, "debug overlay not drawn");
                return;
            }
        }
    }

    // ---- hit grid ----

    /// Register `id` over a rect for the frame being drawn.
    pub fn add_to_hit_grid(&mut self, x: i32, y: i32, width: u32, height: u32, id: u32) {
        self.hit_grid.add(x, y, width, height, id);
    }

    /// Register `id` over a rect of the live grid, effective immediately.
    pub fn add_to_current_hit_grid_clipped(
        &mut self,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        id: u32,
    ) {
        self.hit_grid.add_to_current_clipped(x, y, width, height, id);
    }

    /// Id under a cell of the last rendered frame, [`NO_HIT`] for none.
    #[must_use]
    pub fn check_hit(&self, x: u32, y: u32) -> u32 {
        self.hit_grid.check(x, y)
    }

    pub fn push_scissor_rect(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.hit_grid.push_scissor_rect(x, y, width, height);
    }

    pub fn pop_scissor_rect(&mut self) {
        self.hit_grid.pop_scissor_rect();
    }

    pub fn clear_scissor_rects(&mut self) {
        self.hit_grid.clear_scissor_rects();
    }

    /// Per-frame reset of the scissor stack.
    pub fn hit_grid_clear_scissor_rects(&mut self) {
        self.clear_scissor_rects();
    }

    /// Whether the last frame changed any hit region.
    #[must_use]
    pub fn hit_grid_dirty(&self) -> bool {
        self.hit_grid.is_dirty()
    }

    #[must_use]
    pub fn hit_grid(&self) -> &HitGrid {
        &self.hit_grid
    }

    pub fn dump_hit_grid(&self, path: impl AsRef<Path>) -> Result<()> {
        self.hit_grid.dump_to_file(path)
    }

    /// Write the text of both buffers to `<prefix>-current.txt` and
    /// `<prefix>-next.txt` under `dir`.
    pub fn dump_buffers(&self, dir: impl AsRef<Path>, prefix: &str) -> Result<()> {
        let dir = dir.as_ref();
        self.current
            .dump_to_file(&self.pool, dir.join(format!("{prefix}-current.txt")))?;
        self.next
            .dump_to_file(&self.pool, dir.join(format!("{prefix}-next.txt")))
    }

    // ---- terminal control ----

    fn control<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Terminal, &mut Vec<u8>) -> io::Result<()>,
    {
        self.scratch.clear();
        f(&mut self.terminal, &mut self.scratch)?;
        self.writer.write_out(&self.scratch);
        Ok(())
    }

    /// Write raw bytes after any in-flight frame.
    pub fn write_out(&mut self, bytes: &[u8]) {
        self.writer.write_out(bytes);
    }

    /// Start a session: raw mode (when enabled and stdin is a tty), the
    /// alternate screen, hidden cursor and a cleared screen. Sends the
    /// capability queries when enabled in the options.
    pub fn setup_terminal(&mut self, use_alternate_screen: bool) -> Result<()> {
        if self.options.raw_mode && is_tty(&io::stdin()) {
            self.terminal.enter_raw_mode()?;
        }
        self.control(|terminal, out| terminal.setup(out, use_alternate_screen))?;
        self.current.clear(Rgba::TRANSPARENT, None);
        self.force_redraw = true;
        if self.options.query_capabilities {
            self.query_capabilities()?;
        }
        Ok(())
    }

    /// Undo everything [`setup_terminal`](Self::setup_terminal) enabled.
    pub fn restore_terminal_modes(&mut self) -> Result<()> {
        self.writer.wait_idle();
        self.control(|terminal, out| terminal.restore(out))
    }

    /// Cursor position for the end of the next frame.
    pub fn set_cursor_position(&mut self, x: u32, y: u32, visible: bool) {
        self.terminal.set_cursor_position(x, y, visible);
    }

    /// Cursor shape for the end of the next frame.
    pub fn set_cursor_style(&mut self, style: CursorStyle, blinking: bool) {
        self.terminal.set_cursor_style(style, blinking);
    }

    /// Cursor colour for the end of the next frame; `None` restores the
    /// terminal default.
    pub fn set_cursor_color(&mut self, color: Option<Rgba>) {
        self.terminal.set_cursor_color(color);
    }

    pub fn enable_mouse(&mut self, movement: bool) -> Result<()> {
        self.control(|terminal, out| terminal.enable_mouse(out, movement))
    }

    pub fn disable_mouse(&mut self) -> Result<()> {
        self.control(|terminal, out| terminal.disable_mouse(out))
    }

    pub fn enable_kitty_keyboard(&mut self, flags: u8) -> Result<()> {
        self.control(|terminal, out| terminal.enable_kitty_keyboard(out, flags))
    }

    pub fn disable_kitty_keyboard(&mut self) -> Result<()> {
        self.control(|terminal, out| terminal.disable_kitty_keyboard(out))
    }

    pub fn set_terminal_title(&mut self, title: &str) -> Result<()> {
        self.control(|terminal, out| terminal.set_title(out, title))
    }

    /// Clear the screen. The next frame redraws fully.
    pub fn clear_terminal(&mut self) -> Result<()> {
        self.control(|terminal, out| terminal.clear(out))?;
        self.current.clear(Rgba::TRANSPARENT, None);
        self.force_redraw = true;
        Ok(())
    }

    /// Send the capability queries. The probes print at the home position,
    /// so the next frame redraws fully.
    pub fn query_capabilities(&mut self) -> Result<()> {
        self.control(|terminal, out| terminal.query_capabilities(out))?;
        self.force_redraw = true;
        Ok(())
    }

    /// Feed terminal replies to the capability tracker.
    pub fn process_capability_response(&mut self, bytes: &[u8]) {
        let responses = self.terminal.process_response(bytes);
        if !responses.is_empty() {
            tracing::debug!(count = responses.len(), capabilities = ?self.terminal.capabilities(), "capability responses");
        }
    }

    // ---- stats ----

    /// Record host timing figures shown by the debug overlay.
    pub fn update_stats(&mut self, time_ms: f64, fps: f64, frame_callback_ms: f64) {
        self.stats.time_ms = time_ms;
        self.stats.fps = fps;
        self.stats.frame_callback_ms = frame_callback_ms;
    }

    /// Record host memory figures shown by the debug overlay.
    pub fn update_memory_stats(&mut self, heap_used: u64, heap_total: u64, array_buffers: u64) {
        self.stats.heap_used = heap_used;
        self.stats.heap_total = heap_total;
        self.stats.array_buffers = array_buffers;
    }

    pub fn set_debug_overlay(&mut self, enabled: bool, corner: DebugCorner) {
        self.options.debug_overlay = enabled;
        self.options.debug_overlay_corner = corner;
    }

    #[must_use]
    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    /// Flush in-flight output, stop the writer thread and restore the
    /// terminal if it was set up. Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.writer.shutdown();
        if self.terminal.is_setup() || self.terminal.is_raw_mode() {
            if let Err(err) = self.restore_terminal_modes() {
                tracing::debug!(%err, "terminal restore failed");
            }
        }
        tracing::debug!(frames = self.stats.frames, "renderer destroyed");
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.destroy();
    }
}
