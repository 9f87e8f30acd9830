//! Terminal size detection
//!
//! The window size ioctl is tried first. When it is unavailable, the cursor
//! is pushed to the bottom-right corner and the terminal is asked to report
//! where it ended up.

use std::io::{self, Write};

use crossterm::cursor::{MoveDown, MoveRight};
use crossterm::queue;
use tracing::{debug, warn};

use super::tty::{ByteSource, Result, TtyError};

/// Device Status Report: request the cursor position
const REQUEST_CURSOR_POSITION: &[u8] = b"\x1b[6n";

/// Longest cursor position report we are willing to read
const REPORT_LIMIT: usize = 32;

/// Visible terminal dimensions, both always positive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub rows: u16,
    pub cols: u16,
}

impl Geometry {
    /// Build a geometry, rejecting zero-sized dimensions
    pub fn new(rows: u16, cols: u16) -> Option<Self> {
        (rows > 0 && cols > 0).then_some(Self { rows, cols })
    }
}

/// Window size ioctl on the controlling terminal, as `(cols, rows)`.
///
/// Uses `crossterm::terminal::window_size()` rather than `size()`: the
/// latter falls back to `tput`, which spawns a child and reads
/// `COLUMNS`/`LINES` from the environment.
pub fn window_size() -> io::Result<(u16, u16)> {
    crossterm::terminal::window_size().map(|size| (size.columns, size.rows))
}

/// Resolve the screen size.
///
/// `primary` is the result of the OS window size query as `(cols, rows)`,
/// see [`window_size`].
pub fn resolve<T>(primary: io::Result<(u16, u16)>, tty: &mut T) -> Result<Geometry>
where
    T: ByteSource + Write,
{
    match primary {
        Ok((cols, rows)) => {
            if let Some(geometry) = Geometry::new(rows, cols) {
                return Ok(geometry);
            }
            warn!("Window size query reported {}x{}, asking the terminal", cols, rows);
        }
        Err(e) => warn!("Window size query failed ({}), asking the terminal", e),
    }

    query_cursor_corner(tty).map_err(|e| TtyError::WindowSize(Box::new(e)))
}

/// Move the cursor as far right and down as the terminal allows, then read
/// back its position.
fn query_cursor_corner<T>(tty: &mut T) -> Result<Geometry>
where
    T: ByteSource + Write,
{
    queue!(tty, MoveRight(999), MoveDown(999)).map_err(TtyError::Write)?;
    cursor_position(tty)
}

/// Ask for a cursor position report and parse the reply.
pub fn cursor_position<T>(tty: &mut T) -> Result<Geometry>
where
    T: ByteSource + Write,
{
    tty.write_all(REQUEST_CURSOR_POSITION).map_err(TtyError::Write)?;
    tty.flush().map_err(TtyError::Write)?;

    let mut reply = Vec::with_capacity(REPORT_LIMIT);
    while reply.len() < REPORT_LIMIT {
        match tty.read_byte() {
            Ok(Some(b'R')) => break,
            Ok(Some(byte)) => reply.push(byte),
            Ok(None) => break,
            Err(e) => return Err(TtyError::Read(e)),
        }
    }

    debug!("Cursor position report: {:?}", String::from_utf8_lossy(&reply));
    parse_report(&reply)
}

/// Parse the body of `ESC [ rows ; cols R` (without the trailing `R`).
fn parse_report(reply: &[u8]) -> Result<Geometry> {
    let malformed = || TtyError::CursorReport(String::from_utf8_lossy(reply).into_owned());

    let body = reply.strip_prefix(b"\x1b[").ok_or_else(malformed)?;
    let body = std::str::from_utf8(body).map_err(|_| malformed())?;
    let (rows, cols) = body.split_once(';').ok_or_else(malformed)?;
    let rows = rows.parse::<u16>().map_err(|_| malformed())?;
    let cols = cols.parse::<u16>().map_err(|_| malformed())?;

    Geometry::new(rows, cols).ok_or_else(malformed)
}
