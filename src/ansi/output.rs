//! Fixed-capacity output byte buffer for one frame.

use crate::error::{Error, Result};

/// Default frame capacity (2 MiB).
pub const DEFAULT_CAPACITY: usize = 2 * 1024 * 1024;

/// Bytes held back for the frame trailer (link close, reset, sync end).
pub const TRAILER_RESERVE: usize = 64;

/// Preallocated buffer that never grows past its capacity.
///
/// Body writes are all-or-nothing: a chunk that does not fit is rejected with
/// [`Error::BufferFull`] and the buffer stays truncated until the next
/// [`clear`](Self::clear), so a frame never continues from a position the
/// terminal did not see. The trailer has its own reserved space and always
/// fits.
#[derive(Debug)]
pub struct OutputBuffer {
    data: Vec<u8>,
    capacity: usize,
    truncated: bool,
    dropped_bytes: usize,
}

impl OutputBuffer {
    /// Allocate a buffer holding at most `capacity` bytes
    /// (raised to fit at least the trailer reserve).
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = capacity.max(TRAILER_RESERVE * 2);
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| Error::Allocation { cells: capacity })?;
        Ok(Self {
            data,
            capacity,
            truncated: false,
            dropped_bytes: 0,
        })
    }

    /// Append a body chunk.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let limit = self.capacity - TRAILER_RESERVE;
        if self.truncated || self.data.len() + bytes.len() > limit {
            self.truncated = true;
            self.dropped_bytes += bytes.len();
            return Err(Error::BufferFull);
        }
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Append trailer bytes, which may use the reserved tail.
    pub fn write_trailer(&mut self, bytes: &[u8]) -> Result<()> {
        if self.data.len() + bytes.len() > self.capacity {
            self.dropped_bytes += bytes.len();
            return Err(Error::BufferFull);
        }
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Empty the buffer and reset the truncation state.
    pub fn clear(&mut self) {
        self.data.clear();
        self.truncated = false;
        self.dropped_bytes = 0;
    }

    /// Bytes written so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of bytes written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Configured capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True once a body write was rejected since the last clear.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Bytes rejected since the last clear.
    #[must_use]
    pub fn dropped_bytes(&self) -> usize {
        self.dropped_bytes
    }
}
