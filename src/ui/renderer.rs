//! Screen renderer
//!
//! Draws a full frame (empty-row markers, the welcome banner and the
//! cursor) into a [`FrameBuffer`] and writes it out in one go.

use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    queue,
    terminal::{Clear, ClearType},
};

use tracing::trace;

use super::frame::FrameBuffer;
use crate::config::DisplayConfig;
use crate::core::geometry::Geometry;
use crate::editor::Cursor;

/// Cursor to the top-left corner
pub const CURSOR_HOME: &[u8] = b"\x1b[H";

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn welcome_message() -> String {
    format!("Kilo editor -- version {}", VERSION)
}

/// Terminal renderer
pub struct Renderer {
    empty_row_glyph: char,
    show_welcome: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(&DisplayConfig::default())
    }
}

impl Renderer {
    pub fn new(config: &DisplayConfig) -> Self {
        Self {
            empty_row_glyph: config.empty_row_glyph,
            show_welcome: config.show_welcome,
        }
    }

    /// Draw one frame and flush it with a single write.
    ///
    /// The cursor is hidden while the frame is drawn and shown again at
    /// its logical position at the end.
    pub fn refresh<W: Write + ?Sized>(
        &self,
        geometry: Geometry,
        cursor: Cursor,
        out: &mut W,
    ) -> io::Result<()> {
        let capacity = geometry.rows as usize * (geometry.cols as usize + 8) + 32;
        let mut frame = FrameBuffer::with_capacity(capacity);

        queue!(frame, Hide)?;
        frame.append(CURSOR_HOME);

        self.draw_rows(&mut frame, geometry)?;

        queue!(frame, MoveTo(cursor.x, cursor.y), Show)?;
        trace!("Frame: {} bytes", frame.len());
        frame.flush_to(out)
    }

    fn draw_rows(&self, frame: &mut FrameBuffer, geometry: Geometry) -> io::Result<()> {
        let mut glyph_buf = [0u8; 4];
        let glyph = self.empty_row_glyph.encode_utf8(&mut glyph_buf).as_bytes();

        let welcome = self.show_welcome.then(welcome_message);
        let banner_row = geometry.rows / 2;
        let cols = geometry.cols as usize;

        for y in 0..geometry.rows {
            match &welcome {
                Some(message) if y == banner_row => {
                    let len = message.len().min(cols);
                    let mut padding = (cols - len) / 2;
                    if padding > 0 {
                        frame.append(glyph);
                        padding -= 1;
                    }
                    frame.append(" ".repeat(padding).as_bytes());
                    frame.append(&message.as_bytes()[..len]);
                }
                _ => frame.append(glyph),
            }

            queue!(frame, Clear(ClearType::UntilNewLine))?;
            if y + 1 < geometry.rows {
                frame.append(b"\r\n");
            }
        }
        Ok(())
    }
}
