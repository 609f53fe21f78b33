//! `vtframe` - double-buffered terminal cell renderer
//!
//! Callers draw into a cell grid; each frame is diffed against what the
//! terminal already shows and only the changed cells are written, as
//! coalesced runs of ANSI escape sequences inside a synchronized update.
//! A hit grid rendered in lockstep resolves pointer positions to widget ids.

// Crate-level lint configuration
#![warn(unsafe_code)] // Unsafe code needs justification (required for termios FFI)
#![allow(clippy::cast_possible_truncation)] // Intentional coordinate casts
#![allow(clippy::cast_sign_loss)] // Intentional coordinate conversions
#![allow(clippy::cast_precision_loss)] // Intentional for color math
#![allow(clippy::cast_possible_wrap)] // Intentional coordinate conversions
#![allow(clippy::module_name_repetitions)] // Allow cell::CellChar etc
#![allow(clippy::struct_excessive_bools)] // Capability and terminal state flags
#![allow(clippy::missing_errors_doc)] // Errors are the crate-wide Error enum
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::use_self)] // Allow explicit type names in impl blocks
#![allow(clippy::needless_pass_by_value)] // Allow pass by value for small Copy types
#![allow(clippy::suboptimal_flops)] // Standard math notation is clearer than mul_add
#![allow(clippy::collapsible_if)] // Sometimes nested ifs are clearer
#![allow(clippy::cast_lossless)] // as casts are fine for primitive widening
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::semicolon_if_nothing_returned)] // Style preference

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod color;
pub mod error;
pub mod event;
pub mod grapheme_pool;
pub mod link;
pub mod renderer;
pub mod style;
pub mod terminal;
pub mod unicode;

// Re-export core types at crate root
pub use cell::{Cell, CellChar, CharKind, GraphemeId};
pub use color::Rgba;
pub use error::{Error, Result};
pub use event::{LogLevel, emit_event, emit_log, set_event_callback, set_log_callback};
pub use grapheme_pool::GraphemePool;
pub use link::LinkPool;
pub use style::TextAttributes;

// Re-export commonly used types
pub use buffer::OptimizedBuffer;
pub use renderer::{DebugCorner, HitGrid, RenderStats, Renderer, RendererOptions, Sink};
pub use terminal::{
    Capabilities, CursorStyle, RawModeGuard, Terminal, enable_raw_mode, is_tty, terminal_size,
};
pub use unicode::WidthMethod;
