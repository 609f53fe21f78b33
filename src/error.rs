//! Error types for vtframe.

use std::io;
use thiserror::Error;

/// Result type alias for vtframe operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for vtframe operations.
///
/// Only construction-time failures and lifetime-invariant violations reach
/// callers. Output truncation and sink write failures are absorbed by the
/// renderer and surface as counters in [`RenderStats`](crate::RenderStats).
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Buffer dimension error (dimensions too large to address).
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Cell or hit-grid storage could not be allocated.
    #[error("failed to allocate {cells} cells")]
    Allocation { cells: usize },

    /// A write would exceed the fixed capacity of an output buffer.
    #[error("output buffer full")]
    BufferFull,

    /// A cell references a grapheme id that this pool never issued.
    #[error("grapheme id {id:#x} not found in pool")]
    GraphemeNotFound { id: u32 },

    /// The grapheme pool ran out of ids.
    #[error("grapheme pool exhausted")]
    GraphemePoolExhausted,

    /// The link pool ran out of ids.
    #[error("link pool exhausted")]
    LinkPoolExhausted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidDimensions {
            width: 0,
            height: 100,
        };
        assert!(err.to_string().contains("0x100"));

        let err = Error::GraphemeNotFound { id: 0x2a };
        assert_eq!(err.to_string(), "grapheme id 0x2a not found in pool");

        assert_eq!(Error::BufferFull.to_string(), "output buffer full");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "pipe");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
