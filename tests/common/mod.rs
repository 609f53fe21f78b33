#![allow(clippy::nursery)] // Test infra prioritizes clarity over pedantry
#![allow(clippy::pedantic)] // Test infra prioritizes clarity over pedantry
#![allow(dead_code)] // Each test binary uses a subset

use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;
use vtframe::{Capabilities, Renderer, RendererOptions};

/// Sink that records every byte written to it.
#[derive(Clone, Default)]
pub struct CaptureSink(Arc<Mutex<Vec<u8>>>);

impl CaptureSink {
    /// Drain the captured bytes.
    pub fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.0.lock())
    }

    pub fn take_string(&self) -> String {
        String::from_utf8(self.take()).expect("renderer output is UTF-8")
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }
}

impl Write for CaptureSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Options that never touch the real terminal.
pub fn headless_options() -> RendererOptions {
    RendererOptions {
        query_capabilities: false,
        raw_mode: false,
        capabilities: Some(Capabilities::default()),
        ..RendererOptions::default()
    }
}

pub fn headless_renderer(width: u32, height: u32) -> (Renderer, CaptureSink) {
    headless_renderer_with(width, height, headless_options())
}

pub fn headless_renderer_with(
    width: u32,
    height: u32,
    options: RendererOptions,
) -> (Renderer, CaptureSink) {
    let sink = CaptureSink::default();
    let renderer = Renderer::with_writer(width, height, Box::new(sink.clone()), options)
        .expect("renderer creation");
    (renderer, sink)
}

/// A vt100 screen fed with renderer output.
pub struct Screen {
    parser: vt100::Parser,
    width: u16,
}

impl Screen {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            parser: vt100::Parser::new(height, width, 0),
            width,
        }
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.parser.process(bytes);
    }

    /// Text of each row, trailing spaces trimmed.
    pub fn rows(&self) -> Vec<String> {
        self.parser
            .screen()
            .rows(0, self.width)
            .map(|row| row.trim_end().to_string())
            .collect()
    }

    pub fn cell(&self, row: u16, col: u16) -> vt100::Cell {
        self.parser
            .screen()
            .cell(row, col)
            .cloned()
            .expect("cell in bounds")
    }
}

/// Number of non-overlapping occurrences of `needle`.
pub fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

/// Number of absolute cursor moves (`ESC[row;colH`).
pub fn cursor_moves(output: &str) -> usize {
    let bytes = output.as_bytes();
    let mut moves = 0;
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i] == 0x1b && bytes[i + 1] == b'[' {
            let mut j = i + 2;
            while j < bytes.len() && (bytes[j].is_ascii_digit() || bytes[j] == b';') {
                j += 1;
            }
            if j < bytes.len() && bytes[j] == b'H' && j > i + 2 {
                moves += 1;
            }
            i = j;
        } else {
            i += 1;
        }
    }
    moves
}
