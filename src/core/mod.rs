//! Terminal control core.
//!
//! This module contains the low-level terminal logic:
//!
//! - **tty**: Controlling terminal handle and the shared error type
//! - **raw_mode**: termios raw mode with guaranteed restoration
//! - **keys**: Raw input bytes to logical key events
//! - **geometry**: Screen size detection with a cursor-report fallback
//!
//! # Architecture
//!
//! ```text
//! Tty (stdin/stdout)
//! ├── RawMode (original termios, restored on drop)
//! ├── read_key (escape sequence decoding)
//! └── geometry::resolve (ioctl, then ESC[6n)
//! ```

pub mod geometry;
pub mod keys;
#[cfg(unix)]
pub mod raw_mode;
pub mod tty;

#[cfg(test)]
pub mod testing;
