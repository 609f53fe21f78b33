//! Width-aware glyph placement.

use crate::buffer::OptimizedBuffer;
use crate::cell::{Cell, CellChar};
use crate::color::Rgba;
use crate::error::Result;
use crate::grapheme_pool::GraphemePool;
use crate::style::TextAttributes;
use crate::unicode::{PlacedGlyph, glyph_width, glyphs};

/// Outcome of placing one glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Placement {
    /// Glyph written; columns consumed.
    Placed(u32),
    /// Zero-width cluster, nothing written.
    Empty,
    /// Glyph would cross the right edge or the row is out of bounds.
    DoesNotFit,
}

pub fn set_cell(
    buffer: &mut OptimizedBuffer,
    pool: &mut GraphemePool,
    x: u32,
    y: u32,
    grapheme: &str,
    fg: Rgba,
    bg: Rgba,
    attrs: TextAttributes,
) -> Result<()> {
    let glyph = PlacedGlyph {
        text: grapheme,
        width: glyph_width(grapheme, buffer.width_method()),
    };
    place_glyph(buffer, pool, x, y, glyph, fg, Some(bg), attrs)?;
    Ok(())
}

pub fn draw_text(
    buffer: &mut OptimizedBuffer,
    pool: &mut GraphemePool,
    text: &str,
    x: u32,
    y: u32,
    fg: Rgba,
    bg: Option<Rgba>,
    attrs: TextAttributes,
) -> Result<()> {
    if y >= buffer.height() {
        return Ok(());
    }
    let mut col = x;
    for glyph in glyphs(text, buffer.width_method()) {
        if glyph.text == "\n" || glyph.text == "\r" || glyph.text == "\r\n" {
            continue;
        }
        match place_glyph(buffer, pool, col, y, glyph, fg, bg, attrs)? {
            Placement::Placed(width) => col += width,
            Placement::Empty => {}
            Placement::DoesNotFit => break,
        }
    }
    Ok(())
}

fn place_glyph(
    buffer: &mut OptimizedBuffer,
    pool: &mut GraphemePool,
    x: u32,
    y: u32,
    glyph: PlacedGlyph<'_>,
    fg: Rgba,
    bg: Option<Rgba>,
    attrs: TextAttributes,
) -> Result<Placement> {
    if glyph.width == 0 {
        return Ok(Placement::Empty);
    }
    let width = u32::from(glyph.width);
    if y >= buffer.height() || x.saturating_add(width) > buffer.width() {
        return Ok(Placement::DoesNotFit);
    }

    let ch = if glyph.is_simple() {
        glyph
            .text
            .chars()
            .next()
            .map_or(CellChar::SPACE, CellChar::from_char)
    } else {
        CellChar::grapheme(pool.intern_with_width(glyph.text, glyph.width)?, glyph.width)
    };

    for col in x..x + width {
        buffer.repair_glyph_at(col, y);
    }

    let id = ch.grapheme_id();
    let right = glyph.width - 1;
    for offset in 0..glyph.width {
        let col = x + u32::from(offset);
        let Some(existing) = buffer.get(col, y) else {
            break;
        };
        let slot = match (offset, id) {
            (0, _) | (_, None) => ch,
            (_, Some(id)) => CellChar::continuation(id, offset, right - offset),
        };
        buffer.set_raw(
            col,
            y,
            Cell {
                ch: slot,
                fg,
                bg: bg.unwrap_or(existing.bg),
                attributes: attrs,
            },
        );
    }
    Ok(Placement::Placed(width))
}
