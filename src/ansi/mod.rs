//! ANSI escape sequence generation.
//!
//! Writers append to any [`Write`] without `format!` on the hot path. The
//! frame encoder feeds them a scratch `Vec<u8>` and commits each finished
//! chunk to an [`OutputBuffer`] in one piece.

pub mod output;
pub mod sequences;

pub use output::OutputBuffer;
pub use sequences::*;

use crate::color::Rgba;
use crate::style::TextAttributes;
use std::io::{self, Write};

/// Write a u8 as decimal digits to a writer without formatting overhead.
#[inline]
fn write_u8_decimal(w: &mut impl Write, n: u8) -> io::Result<()> {
    if n >= 100 {
        w.write_all(&[b'0' + n / 100, b'0' + (n / 10) % 10, b'0' + n % 10])
    } else if n >= 10 {
        w.write_all(&[b'0' + n / 10, b'0' + n % 10])
    } else {
        w.write_all(&[b'0' + n])
    }
}

/// Write a u32 as decimal digits to a writer without formatting overhead.
#[inline]
fn write_u32_decimal(w: &mut impl Write, n: u32) -> io::Result<()> {
    if n < 10 {
        return w.write_all(&[b'0' + n as u8]);
    }
    if n < 100 {
        return w.write_all(&[b'0' + (n / 10) as u8, b'0' + (n % 10) as u8]);
    }

    let mut buf = [0u8; 10];
    let mut i = buf.len();
    let mut val = n;
    while val > 0 {
        i -= 1;
        buf[i] = b'0' + (val % 10) as u8;
        val /= 10;
    }
    w.write_all(&buf[i..])
}

fn write_rgb_params(w: &mut impl Write, color: Rgba) -> io::Result<()> {
    let (r, g, b) = color.to_rgb_u8();
    write_u8_decimal(w, r)?;
    w.write_all(b";")?;
    write_u8_decimal(w, g)?;
    w.write_all(b";")?;
    write_u8_decimal(w, b)
}

/// Write one SGR sequence that fully determines the rendition: a reset,
/// then foreground, background and attribute flags.
///
/// Colors with alpha below the transparency threshold select the terminal
/// default (39/49) instead of an RGB value.
pub fn write_sgr(
    w: &mut impl Write,
    fg: Rgba,
    bg: Rgba,
    attrs: TextAttributes,
) -> io::Result<()> {
    w.write_all(b"\x1b[0;")?;
    if fg.is_default_alpha() {
        w.write_all(b"39")?;
    } else {
        w.write_all(b"38;2;")?;
        write_rgb_params(w, fg)?;
    }
    if bg.is_default_alpha() {
        w.write_all(b";49")?;
    } else {
        w.write_all(b";48;2;")?;
        write_rgb_params(w, bg)?;
    }
    for code in attrs.sgr_codes() {
        w.write_all(b";")?;
        write_u8_decimal(w, code)?;
    }
    w.write_all(b"m")
}

/// Write cursor position sequence for a 0-based row and column.
pub fn write_cursor_position(w: &mut impl Write, row: u32, col: u32) -> io::Result<()> {
    w.write_all(b"\x1b[")?;
    write_u32_decimal(w, row.saturating_add(1))?;
    w.write_all(b";")?;
    write_u32_decimal(w, col.saturating_add(1))?;
    w.write_all(b"H")
}

/// Escape a URL for safe inclusion in OSC 8 hyperlink sequences.
///
/// Control characters (C0, DEL and C1) are percent-encoded so a URL can
/// never terminate the OSC early.
#[must_use]
pub fn escape_url_for_osc8(url: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut escaped = String::with_capacity(url.len());
    for ch in url.chars() {
        if ch.is_control() {
            let mut utf8 = [0u8; 4];
            for byte in ch.encode_utf8(&mut utf8).bytes() {
                escaped.push('%');
                escaped.push(char::from(HEX[usize::from(byte >> 4)]));
                escaped.push(char::from(HEX[usize::from(byte & 0x0F)]));
            }
        } else {
            escaped.push(ch);
        }
    }
    escaped
}

/// Write OSC 8 hyperlink start sequence to a writer.
///
/// The URL is automatically escaped to prevent control character injection.
pub fn write_hyperlink_start(w: &mut impl Write, id: u32, url: &str) -> io::Result<()> {
    w.write_all(b"\x1b]8;id=")?;
    write_u32_decimal(w, id)?;
    w.write_all(b";")?;
    w.write_all(escape_url_for_osc8(url).as_bytes())?;
    w.write_all(b"\x1b\\")
}

/// Write a glyph wrapped in the OSC 66 explicit-width escape.
pub fn write_explicit_width(w: &mut impl Write, width: u8, glyph: &str) -> io::Result<()> {
    w.write_all(b"\x1b]66;w=")?;
    write_u8_decimal(w, width)?;
    w.write_all(b";")?;
    w.write_all(glyph.as_bytes())?;
    w.write_all(b"\x1b\\")
}

/// Write a Kitty keyboard push of `flags`.
pub fn write_kitty_keyboard_push(w: &mut impl Write, flags: u8) -> io::Result<()> {
    w.write_all(b"\x1b[>")?;
    write_u8_decimal(w, flags)?;
    w.write_all(b"u")
}

/// Write a window title sequence.
///
/// Control characters are dropped from the title.
pub fn write_title(w: &mut impl Write, title: &str) -> io::Result<()> {
    w.write_all(TITLE_PREFIX.as_bytes())?;
    let mut utf8 = [0u8; 4];
    for ch in title.chars().filter(|ch| !ch.is_control()) {
        w.write_all(ch.encode_utf8(&mut utf8).as_bytes())?;
    }
    w.write_all(TITLE_SUFFIX.as_bytes())
}
