//! Append buffer for one screen frame
//!
//! Escape sequences and text are accumulated here and written to the
//! terminal in a single call, so the user never sees a half-drawn frame.

use std::io::{self, Write};

use tracing::warn;

#[derive(Debug, Default)]
pub struct FrameBuffer {
    bytes: Vec<u8>,
}

impl FrameBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Append bytes to the frame.
    ///
    /// If the buffer cannot grow, the bytes are dropped and the existing
    /// content is kept.
    pub fn append(&mut self, bytes: &[u8]) {
        if self.bytes.try_reserve(bytes.len()).is_err() {
            warn!("Frame buffer allocation failed, dropping {} bytes", bytes.len());
            return;
        }
        self.bytes.extend_from_slice(bytes);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Write the whole frame with one `write_all` and flush. Consumes the buffer.
    pub fn flush_to<W: Write + ?Sized>(self, out: &mut W) -> io::Result<()> {
        out.write_all(self.as_bytes())?;
        out.flush()
    }
}

/// Lets crossterm commands be queued straight into the frame
impl Write for FrameBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
