//! Terminal test doubles.

use std::collections::VecDeque;
use std::io::{self, Write};

#[cfg(unix)]
use std::{cell::RefCell, rc::Rc};

#[cfg(unix)]
use nix::sys::termios::{InputFlags, LocalFlags, OutputFlags, SpecialCharacterIndices, Termios};

#[cfg(unix)]
use super::raw_mode::ModeDevice;
use super::tty::ByteSource;
#[cfg(unix)]
use super::tty::{Result, TtyError};

/// A fake terminal fed from a script of bytes and read timeouts.
///
/// Every `write` call is recorded separately so tests can assert how many
/// writes a frame took. Reading past the end of the script is an error,
/// which ends any session loop driven by it.
#[derive(Default)]
pub struct ScriptedTty {
    input: VecDeque<Option<u8>>,
    pub writes: Vec<Vec<u8>>,
    pub flushes: usize,
}

impl ScriptedTty {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(bytes: &[u8]) -> Self {
        let mut tty = Self::new();
        tty.push_bytes(bytes);
        tty
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.input.extend(bytes.iter().copied().map(Some));
        self
    }

    /// Queue a read that times out with no data.
    pub fn push_timeout(&mut self) -> &mut Self {
        self.input.push_back(None);
        self
    }

    /// Everything written so far, concatenated.
    pub fn output(&self) -> Vec<u8> {
        self.writes.concat()
    }

    pub fn remaining_input(&self) -> usize {
        self.input.len()
    }
}

impl ByteSource for ScriptedTty {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        self.input
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "input script exhausted"))
    }
}

impl Write for ScriptedTty {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes.push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

/// Count non-overlapping occurrences of `needle` in `haystack`.
pub fn count_occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    if needle.is_empty() || haystack.len() < needle.len() {
        return 0;
    }
    let mut count = 0;
    let mut i = 0;
    while i + needle.len() <= haystack.len() {
        if &haystack[i..i + needle.len()] == needle {
            count += 1;
            i += needle.len();
        } else {
            i += 1;
        }
    }
    count
}

/// Termios as a cooked terminal would report it.
#[cfg(unix)]
pub fn cooked() -> Termios {
    // SAFETY: termios is a plain C struct; all-zero is a valid value
    let mut mode = Termios::from(unsafe { std::mem::zeroed::<nix::libc::termios>() });
    mode.input_flags.insert(InputFlags::ICRNL | InputFlags::IXON | InputFlags::BRKINT);
    mode.output_flags.insert(OutputFlags::OPOST);
    mode.local_flags.insert(
        LocalFlags::ECHO | LocalFlags::ICANON | LocalFlags::IEXTEN | LocalFlags::ISIG,
    );
    mode.control_chars[SpecialCharacterIndices::VMIN as usize] = 1;
    mode
}

/// Mode device that records whether each applied mode was raw (echo off)
/// or cooked.
#[cfg(unix)]
#[derive(Clone, Default)]
pub struct FakeDevice {
    pub applied: Rc<RefCell<Vec<bool>>>,
    pub fail_get: bool,
    pub fail_set: bool,
}

#[cfg(unix)]
impl ModeDevice for FakeDevice {
    fn get_mode(&self) -> Result<Termios> {
        if self.fail_get {
            return Err(TtyError::GetAttr(nix::Error::ENOTTY));
        }
        Ok(cooked())
    }

    fn set_mode(&self, mode: &Termios) -> Result<()> {
        if self.fail_set {
            return Err(TtyError::SetAttr(nix::Error::EIO));
        }
        let raw = !mode.local_flags.contains(LocalFlags::ECHO);
        self.applied.borrow_mut().push(raw);
        Ok(())
    }
}
