//! Frame output: synchronous flush or a background writer thread.
//!
//! ```text
//! Render thread                          Writer thread
//! -------------                          -------------
//! encode frame into buffers[active]
//! wait for phase == Idle
//! reclaim the buffer the writer returned
//! hand buffers[active] over,
//!   phase = RenderRequested      ─────▶   phase = InProgress
//! flip active, return                     write + flush the sink
//!                                         hand the buffer back,
//!                              ◀─────     phase = Idle
//! ```
//!
//! The two buffers are owned values that move between the threads, so the
//! render side never writes a buffer the writer is flushing.

use crate::ansi::OutputBuffer;
use crate::error::Result;
use parking_lot::{Condvar, Mutex};
use std::io::{self, Write};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Output destination shared with the writer thread.
pub type Sink = Box<dyn Write + Send>;

/// Writer thread handshake state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    RenderRequested,
    InProgress,
}

#[derive(Debug)]
struct WriterState {
    phase: Phase,
    pending: Option<OutputBuffer>,
    returned: Option<OutputBuffer>,
    terminate: bool,
    write_errors: u64,
    bytes_written: u64,
}

struct Shared {
    state: Mutex<WriterState>,
    cond: Condvar,
    sink: Mutex<Sink>,
}

impl Shared {
    fn wait_idle(&self) {
        let mut state = self.state.lock();
        while state.phase != Phase::Idle {
            self.cond.wait(&mut state);
        }
    }

    /// Write and flush, recording the outcome. Errors are not returned.
    fn deliver(&self, bytes: &[u8]) {
        let result = {
            let mut sink = self.sink.lock();
            sink.write_all(bytes).and_then(|()| sink.flush())
        };
        let mut state = self.state.lock();
        match result {
            Ok(()) => state.bytes_written += bytes.len() as u64,
            Err(err) => {
                state.write_errors += 1;
                tracing::debug!(%err, len = bytes.len(), "terminal write failed");
            }
        }
    }
}

/// Counters kept by the writer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Writes that failed at the sink.
    pub write_errors: u64,
    /// Bytes delivered to the sink.
    pub bytes_written: u64,
}

/// Double-buffered frame writer.
pub struct OutputWriter {
    buffers: [Option<OutputBuffer>; 2],
    active: usize,
    shared: Arc<Shared>,
    thread: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for OutputWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputWriter")
            .field("active", &self.active)
            .field("threaded", &self.thread.is_some())
            .finish_non_exhaustive()
    }
}

impl OutputWriter {
    /// Create a synchronous writer with two buffers of `capacity` bytes.
    pub fn new(sink: Sink, capacity: usize) -> Result<Self> {
        Ok(Self {
            buffers: [
                Some(OutputBuffer::new(capacity)?),
                Some(OutputBuffer::new(capacity)?),
            ],
            active: 0,
            shared: Arc::new(Shared {
                state: Mutex::new(WriterState {
                    phase: Phase::Idle,
                    pending: None,
                    returned: None,
                    terminate: false,
                    write_errors: 0,
                    bytes_written: 0,
                }),
                cond: Condvar::new(),
                sink: Mutex::new(sink),
            }),
            thread: None,
        })
    }

    /// True while a writer thread is running.
    #[must_use]
    pub fn is_threaded(&self) -> bool {
        self.thread.is_some()
    }

    /// The buffer the next frame is built into, cleared.
    ///
    /// Returns `None` only if a buffer was lost to a panicked writer thread.
    pub fn begin_frame(&mut self) -> Option<&mut OutputBuffer> {
        if self.buffers[self.active].is_none() {
            self.reclaim();
        }
        let buffer = self.buffers[self.active].as_mut()?;
        buffer.clear();
        Some(buffer)
    }

    /// The buffer holding the last frame built, for diagnostics.
    #[must_use]
    pub fn active_buffer(&self) -> Option<&OutputBuffer> {
        self.buffers[self.active].as_ref()
    }

    fn reclaim(&mut self) {
        if self.buffers.iter().all(Option::is_some) {
            return;
        }
        self.shared.wait_idle();
        let mut state = self.shared.state.lock();
        if let Some(buffer) = state.returned.take() {
            if let Some(slot) = self.buffers.iter_mut().find(|slot| slot.is_none()) {
                *slot = Some(buffer);
            }
        }
    }

    /// Deliver the active buffer.
    ///
    /// Synchronous mode writes and flushes before returning. Threaded mode
    /// waits for the previous frame to finish, hands the buffer to the
    /// writer thread and switches to the other buffer.
    pub fn submit(&mut self) {
        if self.thread.is_none() {
            if let Some(buffer) = &self.buffers[self.active] {
                self.shared.deliver(buffer.as_bytes());
            }
            return;
        }

        self.reclaim();
        let Some(buffer) = self.buffers[self.active].take() else {
            return;
        };
        {
            let mut state = self.shared.state.lock();
            state.pending = Some(buffer);
            state.phase = Phase::RenderRequested;
        }
        self.shared.cond.notify_all();
        self.active ^= 1;
    }

    /// Write control bytes straight to the sink, after any in-flight frame.
    pub fn write_out(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        self.shared.wait_idle();
        self.shared.deliver(bytes);
    }

    /// Block until the writer thread has nothing queued or in progress.
    pub fn wait_idle(&self) {
        self.shared.wait_idle();
    }

    /// Start or stop the writer thread.
    pub fn set_threaded(&mut self, enabled: bool) -> io::Result<()> {
        self.shared.wait_idle();
        match (enabled, self.thread.is_some()) {
            (true, false) => {
                self.shared.state.lock().terminate = false;
                let shared = Arc::clone(&self.shared);
                let handle = thread::Builder::new()
                    .name("vtframe-writer".to_string())
                    .spawn(move || writer_thread_main(&shared))?;
                self.thread = Some(handle);
                tracing::debug!("writer thread started");
            }
            (false, true) => {
                self.stop_thread();
                self.reclaim();
            }
            _ => {}
        }
        Ok(())
    }

    fn stop_thread(&mut self) {
        let Some(handle) = self.thread.take() else {
            return;
        };
        self.shared.wait_idle();
        self.shared.state.lock().terminate = true;
        self.shared.cond.notify_all();
        if handle.join().is_err() {
            tracing::error!("writer thread panicked");
        } else {
            tracing::debug!("writer thread stopped");
        }
    }

    /// Wait for in-flight output and stop the writer thread.
    pub fn shutdown(&mut self) {
        self.stop_thread();
        self.reclaim();
    }

    /// Sink counters.
    #[must_use]
    pub fn stats(&self) -> WriterStats {
        let state = self.shared.state.lock();
        WriterStats {
            write_errors: state.write_errors,
            bytes_written: state.bytes_written,
        }
    }
}

impl Drop for OutputWriter {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn writer_thread_main(shared: &Shared) {
    loop {
        let buffer = {
            let mut state = shared.state.lock();
            while state.phase != Phase::RenderRequested && !state.terminate {
                shared.cond.wait(&mut state);
            }
            if state.phase != Phase::RenderRequested {
                break;
            }
            state.phase = Phase::InProgress;
            state.pending.take()
        };

        if let Some(buffer) = &buffer {
            shared.deliver(buffer.as_bytes());
        }

        let mut state = shared.state.lock();
        state.returned = buffer;
        state.phase = Phase::Idle;
        drop(state);
        shared.cond.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn frame(writer: &mut OutputWriter, bytes: &[u8]) {
        writer.begin_frame().unwrap().write_bytes(bytes).unwrap();
        writer.submit();
    }

    #[test]
    fn test_sync_writes_before_return() {
        let capture = Capture::default();
        let mut writer = OutputWriter::new(Box::new(capture.clone()), 1024).unwrap();
        frame(&mut writer, b"one");
        assert_eq!(&*capture.0.lock(), b"one");
        frame(&mut writer, b"two");
        assert_eq!(&*capture.0.lock(), b"onetwo");
        assert_eq!(writer.stats().bytes_written, 6);
    }

    #[test]
    fn test_threaded_frames_arrive_in_order() {
        let capture = Capture::default();
        let mut writer = OutputWriter::new(Box::new(capture.clone()), 1024).unwrap();
        writer.set_threaded(true).unwrap();
        assert!(writer.is_threaded());

        for i in 0..50u8 {
            frame(&mut writer, &[b'a' + i % 26]);
        }
        writer.wait_idle();
        let expected: Vec<u8> = (0..50u8).map(|i| b'a' + i % 26).collect();
        assert_eq!(*capture.0.lock(), expected);
    }

    #[test]
    fn test_write_out_waits_for_frame() {
        let capture = Capture::default();
        let mut writer = OutputWriter::new(Box::new(capture.clone()), 1024).unwrap();
        writer.set_threaded(true).unwrap();
        frame(&mut writer, b"frame");
        writer.write_out(b"|ctl");
        assert_eq!(&*capture.0.lock(), b"frame|ctl");
    }

    #[test]
    fn test_toggle_threaded_mode() {
        let capture = Capture::default();
        let mut writer = OutputWriter::new(Box::new(capture.clone()), 1024).unwrap();
        writer.set_threaded(true).unwrap();
        frame(&mut writer, b"a");
        writer.set_threaded(false).unwrap();
        assert!(!writer.is_threaded());
        frame(&mut writer, b"b");
        writer.set_threaded(true).unwrap();
        frame(&mut writer, b"c");
        writer.shutdown();
        assert_eq!(&*capture.0.lock(), b"abc");
        assert!(writer.buffers.iter().all(Option::is_some));
    }

    #[test]
    fn test_write_errors_swallowed_and_counted() {
        let mut writer = OutputWriter::new(Box::new(Broken), 1024).unwrap();
        frame(&mut writer, b"x");
        writer.write_out(b"y");
        writer.set_threaded(true).unwrap();
        frame(&mut writer, b"z");
        writer.wait_idle();
        let stats = writer.stats();
        assert_eq!(stats.write_errors, 3);
        assert_eq!(stats.bytes_written, 0);
    }
}
