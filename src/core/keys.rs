//! Key decoding
//!
//! Turns raw terminal input bytes into logical key events. Escape sequences
//! for arrows and navigation keys are folded into a single [`Key`]; anything
//! truncated or unknown degrades to [`Key::Escape`].

use tracing::trace;

use super::tty::{ByteSource, Result, TtyError};

/// Escape character that starts every control sequence
pub const ESC: u8 = 0x1b;

/// Map a letter to its Ctrl-modified byte (`ctrl(b'q')` is Ctrl-Q).
pub const fn ctrl(key: u8) -> u8 {
    key & 0x1f
}

/// A single logical keypress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Any byte that does not start an escape sequence
    Byte(u8),
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    /// A lone ESC, or a sequence that could not be decoded
    Escape,
}

/// Read exactly one key from the terminal.
///
/// Timeouts while waiting for the first byte are retried. Timeouts or read
/// failures in the middle of an escape sequence produce [`Key::Escape`]
/// instead of blocking or failing.
pub fn read_key<S: ByteSource + ?Sized>(source: &mut S) -> Result<Key> {
    let first = loop {
        match source.read_byte() {
            Ok(Some(byte)) => break byte,
            Ok(None) => continue,
            Err(e) => return Err(TtyError::Read(e)),
        }
    };

    if first != ESC {
        return Ok(Key::Byte(first));
    }

    let Some(b0) = next_byte(source) else {
        return Ok(Key::Escape);
    };
    let Some(b1) = next_byte(source) else {
        return Ok(Key::Escape);
    };

    let b2 = if b0 == b'[' && b1.is_ascii_digit() {
        match next_byte(source) {
            Some(byte) => Some(byte),
            None => return Ok(Key::Escape),
        }
    } else {
        None
    };

    let key = decode_sequence(b0, b1, b2);
    if key == Key::Escape {
        trace!("unrecognized escape sequence: {:?}", [Some(b0), Some(b1), b2]);
    }
    Ok(key)
}

/// Continuation byte of an escape sequence; any failure ends the sequence.
fn next_byte<S: ByteSource + ?Sized>(source: &mut S) -> Option<u8> {
    source.read_byte().ok().flatten()
}

/// The escape grammar: `ESC b0 b1 [b2]` to a key.
fn decode_sequence(b0: u8, b1: u8, b2: Option<u8>) -> Key {
    match (b0, b1, b2) {
        (b'[', b'1' | b'7', Some(b'~')) => Key::Home,
        (b'[', b'3', Some(b'~')) => Key::Delete,
        (b'[', b'4' | b'8', Some(b'~')) => Key::End,
        (b'[', b'5', Some(b'~')) => Key::PageUp,
        (b'[', b'6', Some(b'~')) => Key::PageDown,
        (b'[', b'A', None) => Key::ArrowUp,
        (b'[', b'B', None) => Key::ArrowDown,
        (b'[', b'C', None) => Key::ArrowRight,
        (b'[', b'D', None) => Key::ArrowLeft,
        (b'[' | b'O', b'H', None) => Key::Home,
        (b'[' | b'O', b'F', None) => Key::End,
        _ => Key::Escape,
    }
}
