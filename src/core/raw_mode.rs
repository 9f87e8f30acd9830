//! Raw mode for the controlling terminal
//!
//! [`RawMode`] captures the terminal attributes, switches the terminal into
//! raw mode and puts the captured attributes back exactly once: on an
//! explicit [`RawMode::restore`], or when the guard is dropped (normal
//! return, fatal error path, or panic unwinding).

use std::fs::File;

use nix::sys::termios::{
    self, ControlFlags, InputFlags, LocalFlags, OutputFlags, SetArg, SpecialCharacterIndices,
    Termios,
};
use tracing::{debug, error};

use super::tty::{Result, Tty, TtyError};

/// Something whose termios attributes can be read and written
pub trait ModeDevice {
    fn get_mode(&self) -> Result<Termios>;
    fn set_mode(&self, mode: &Termios) -> Result<()>;
}

/// termios access to the terminal behind stdin
pub struct TtyMode {
    fd: File,
}

impl TtyMode {
    pub fn new(tty: &Tty) -> Result<Self> {
        let fd = tty.input().try_clone().map_err(TtyError::Open)?;
        Ok(Self { fd })
    }
}

impl ModeDevice for TtyMode {
    fn get_mode(&self) -> Result<Termios> {
        termios::tcgetattr(&self.fd).map_err(TtyError::GetAttr)
    }

    fn set_mode(&self, mode: &Termios) -> Result<()> {
        termios::tcsetattr(&self.fd, SetArg::TCSAFLUSH, mode).map_err(TtyError::SetAttr)
    }
}

/// Derive raw attributes from the original ones.
///
/// `read_timeout` is VTIME in tenths of a second. With VMIN = 0 a read
/// returns as soon as one byte is available, or with nothing once the
/// timeout expires.
pub fn make_raw(original: &Termios, read_timeout: u8) -> Termios {
    let mut raw = original.clone();

    // Break doesn't raise SIGINT, no CR->NL, no parity check, keep bit 8,
    // Ctrl-S/Ctrl-Q reach us
    raw.input_flags.remove(
        InputFlags::BRKINT
            | InputFlags::ICRNL
            | InputFlags::INPCK
            | InputFlags::ISTRIP
            | InputFlags::IXON,
    );
    // No NL->CRNL on output
    raw.output_flags.remove(OutputFlags::OPOST);
    raw.control_flags.insert(ControlFlags::CS8);
    // No echo, byte-at-a-time, no Ctrl-V, Ctrl-C/Ctrl-Z are plain bytes
    raw.local_flags.remove(
        LocalFlags::ECHO | LocalFlags::ICANON | LocalFlags::IEXTEN | LocalFlags::ISIG,
    );

    raw.control_chars[SpecialCharacterIndices::VMIN as usize] = 0;
    raw.control_chars[SpecialCharacterIndices::VTIME as usize] = read_timeout;
    raw
}

/// Guard holding the original terminal attributes while raw mode is active
pub struct RawMode<D: ModeDevice> {
    device: D,
    original: Option<Termios>,
}

impl<D: ModeDevice> RawMode<D> {
    /// Capture the current attributes and switch to raw mode.
    ///
    /// The guard exists before raw mode is applied, so a failing
    /// `tcsetattr` still puts the original attributes back.
    pub fn enable(device: D, read_timeout: u8) -> Result<Self> {
        let original = device.get_mode()?;
        let raw = make_raw(&original, read_timeout);

        let guard = Self {
            device,
            original: Some(original),
        };
        guard.device.set_mode(&raw)?;
        debug!("Raw mode enabled (read timeout {}ds)", read_timeout);
        Ok(guard)
    }

    /// Put the original attributes back. Only the first call has any effect.
    pub fn restore(&mut self) -> Result<()> {
        match self.original.take() {
            Some(original) => {
                self.device.set_mode(&original)?;
                debug!("Terminal mode restored");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl<D: ModeDevice> Drop for RawMode<D> {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            error!("Failed to restore terminal mode: {}", e);
        }
    }
}
