//! Terminal capability query response parsing.
//!
//! Recognized replies:
//! - DECRPM: `ESC [ ? mode ; value $ y`
//! - XTVERSION: `ESC P > | name version ESC \`
//! - Kitty keyboard flags: `ESC [ ? flags u`
//! - Cursor position report: `ESC [ row ; col R`
//!
//! Replies usually arrive concatenated in one read, so the parser walks the
//! input and returns every sequence it finds. Bytes outside escape sequences
//! are skipped.

use crate::ansi::sequences;

/// Maximum length for DCS response parsing.
const MAX_DCS_RESPONSE_LENGTH: usize = 4 * 1024;

/// DEC private modes queried with DECRQM.
pub mod modes {
    /// SGR pixel mouse reporting.
    pub const SGR_PIXELS: u16 = 1016;
    /// Grapheme cluster (unicode core) support.
    pub const UNICODE_CORE: u16 = 2027;
    /// Color scheme change notifications.
    pub const COLOR_SCHEME: u16 = 2031;
    /// Focus in/out events.
    pub const FOCUS: u16 = 1004;
    /// Bracketed paste.
    pub const BRACKETED_PASTE: u16 = 2004;
    /// Synchronized output.
    pub const SYNC_OUTPUT: u16 = 2026;

    /// Every mode sent by the capability query, in send order.
    pub const QUERIED: [u16; 6] = [
        SGR_PIXELS,
        UNICODE_CORE,
        COLOR_SCHEME,
        FOCUS,
        BRACKETED_PASTE,
        SYNC_OUTPUT,
    ];
}

/// Response from a terminal capability query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TerminalResponse {
    /// DECRPM report for a private mode. Values 1 (set) and 2 (reset) mean
    /// the mode is recognized; 0 and 4 mean it is not.
    ModeReport { mode: u16, value: u8 },
    /// XTVERSION reply.
    XtVersion { name: String, version: String },
    /// Kitty keyboard protocol flags.
    KittyKeyboard { flags: u8 },
    /// Cursor position report, 1-based.
    CursorPosition { row: u32, col: u32 },
    /// A complete escape sequence this parser does not interpret.
    Unknown(Vec<u8>),
}

impl TerminalResponse {
    /// True for a mode report saying the terminal recognizes the mode.
    #[must_use]
    pub fn mode_supported(&self) -> Option<(u16, bool)> {
        match self {
            Self::ModeReport { mode, value } => Some((*mode, matches!(value, 1 | 2))),
            _ => None,
        }
    }
}

/// Every capability query, concatenated in send order.
#[must_use]
pub fn all_queries() -> String {
    let mut out = String::with_capacity(128);
    for mode in modes::QUERIED {
        out.push_str(&sequences::query::decrqm(mode));
    }
    out.push_str(sequences::query::XTVERSION);
    out.push_str(sequences::query::KITTY_KEYBOARD);
    out.push_str(sequences::query::EXPLICIT_WIDTH_PROBE);
    out.push_str(sequences::query::SCALED_TEXT_PROBE);
    out
}

/// Parse every reply in `input`.
#[must_use]
pub fn parse_responses(input: &[u8]) -> Vec<TerminalResponse> {
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < input.len() {
        if input[pos] != 0x1b {
            pos += 1;
            continue;
        }
        match input.get(pos + 1) {
            Some(b'[') => match csi_end(input, pos + 2) {
                Some(end) => {
                    out.push(parse_csi(&input[pos..=end]));
                    pos = end + 1;
                }
                None => break,
            },
            Some(b'P') => match dcs_end(input, pos + 2) {
                Some(end) => {
                    out.push(parse_dcs(&input[pos..end]));
                    pos = end + 2;
                }
                None => break,
            },
            _ => pos += 1,
        }
    }
    out
}

/// Index of the CSI final byte at or after `start`.
fn csi_end(input: &[u8], start: usize) -> Option<usize> {
    input[start.min(input.len())..]
        .iter()
        .position(|b| (0x40..=0x7e).contains(b))
        .map(|p| start + p)
}

/// Index of the `ESC \` terminator at or after `start`.
fn dcs_end(input: &[u8], start: usize) -> Option<usize> {
    let rest = input.get(start..)?;
    let limit = rest.len().min(MAX_DCS_RESPONSE_LENGTH);
    rest[..limit]
        .windows(2)
        .position(|w| w == b"\x1b\\")
        .map(|p| start + p)
}

fn parse_params(bytes: &[u8]) -> Option<Vec<u32>> {
    let text = std::str::from_utf8(bytes).ok()?;
    text.split(';').map(|s| s.parse().ok()).collect()
}

fn parse_csi(seq: &[u8]) -> TerminalResponse {
    let unknown = || TerminalResponse::Unknown(seq.to_vec());
    let final_byte = seq[seq.len() - 1];
    let body = &seq[2..seq.len() - 1];

    match (final_byte, body.first()) {
        (b'y', Some(b'?')) => {
            let Some(body) = body[1..].strip_suffix(b"$") else {
                return unknown();
            };
            match parse_params(body).as_deref() {
                Some(&[mode, value]) => match (u16::try_from(mode), u8::try_from(value)) {
                    (Ok(mode), Ok(value)) => TerminalResponse::ModeReport { mode, value },
                    _ => unknown(),
                },
                _ => unknown(),
            }
        }
        (b'u', Some(b'?')) => match parse_params(&body[1..]).as_deref() {
            Some(&[flags]) => u8::try_from(flags)
                .map_or_else(|_| unknown(), |flags| TerminalResponse::KittyKeyboard { flags }),
            _ => unknown(),
        },
        (b'R', Some(b'0'..=b'9')) => match parse_params(body).as_deref() {
            Some(&[row, col]) => TerminalResponse::CursorPosition { row, col },
            _ => unknown(),
        },
        _ => unknown(),
    }
}

fn parse_dcs(seq: &[u8]) -> TerminalResponse {
    let Some(content) = seq.get(2..).and_then(|c| c.strip_prefix(b">|")) else {
        return TerminalResponse::Unknown(seq.to_vec());
    };
    let content = String::from_utf8_lossy(content);
    let content = content.trim();
    let (name, version) = content
        .split_once([' ', '(', '-'])
        .map_or((content, ""), |(name, rest)| (name, rest.trim_end_matches(')')));
    TerminalResponse::XtVersion {
        name: name.to_string(),
        version: version.to_string(),
    }
}
