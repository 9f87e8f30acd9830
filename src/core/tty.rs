//! Controlling terminal I/O
//!
//! This module provides the byte-level handle on the controlling terminal
//! and the error type shared by the terminal core.

use std::io;
#[cfg(unix)]
use std::io::{Read, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TtyError {
    #[error("Failed to open terminal: {0}")]
    Open(#[source] io::Error),

    #[cfg(unix)]
    #[error("tcgetattr: {0}")]
    GetAttr(#[source] nix::Error),

    #[cfg(unix)]
    #[error("tcsetattr: {0}")]
    SetAttr(#[source] nix::Error),

    #[error("read: {0}")]
    Read(#[source] io::Error),

    #[error("write: {0}")]
    Write(#[source] io::Error),

    #[error("malformed cursor position report: {0:?}")]
    CursorReport(String),

    #[error("getWindowSize: {0}")]
    WindowSize(#[source] Box<TtyError>),
}

pub type Result<T> = std::result::Result<T, TtyError>;

/// A source of terminal input, read one byte at a time.
pub trait ByteSource {
    /// Read a single byte.
    ///
    /// Returns `Ok(None)` when the read timed out without data. Hard I/O
    /// failures are returned as errors.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

/// The controlling terminal: stdin for input, stdout for output.
///
/// Both descriptors are duplicated into unbuffered `File`s so that one
/// `read` returns at most what the terminal delivered within its read
/// timeout, and one `write_all` of a frame goes straight to the device.
#[cfg(unix)]
pub struct Tty {
    input: std::fs::File,
    output: std::fs::File,
}

#[cfg(unix)]
impl Tty {
    pub fn open() -> Result<Self> {
        use std::os::fd::AsFd;

        let input = io::stdin()
            .as_fd()
            .try_clone_to_owned()
            .map_err(TtyError::Open)?;
        let output = io::stdout()
            .as_fd()
            .try_clone_to_owned()
            .map_err(TtyError::Open)?;

        Ok(Self {
            input: std::fs::File::from(input),
            output: std::fs::File::from(output),
        })
    }

    /// Input side of the terminal, used for termios calls
    pub fn input(&self) -> &std::fs::File {
        &self.input
    }
}

#[cfg(unix)]
impl ByteSource for Tty {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.input.read(&mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            // Some platforms report the VTIME timeout as EAGAIN
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted) => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(unix)]
impl Write for Tty {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.output.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.output.flush()
    }
}
