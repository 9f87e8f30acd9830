//! Editor session loop
//!
//! Owns the session state (screen geometry and cursor) and drives the
//! refresh / read key / process key cycle until the quit key arrives.

use std::io::Write;

use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use tracing::info;

use crate::core::geometry::Geometry;
use crate::core::keys::{self, ctrl, Key};
use crate::core::tty::{ByteSource, Result, TtyError};
use crate::ui::renderer::{Renderer, CURSOR_HOME};

/// Ctrl-Q
pub const QUIT_KEY: Key = Key::Byte(ctrl(b'q'));

/// Zero-based cursor position on screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub x: u16,
    pub y: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Terminating,
}

pub struct Editor {
    geometry: Geometry,
    cursor: Cursor,
    renderer: Renderer,
}

impl Editor {
    pub fn new(geometry: Geometry, renderer: Renderer) -> Self {
        Self {
            geometry,
            cursor: Cursor::default(),
            renderer,
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Run until the quit key is pressed.
    ///
    /// On quit the screen is cleared and the cursor homed with a direct
    /// write, bypassing the frame buffer. Errors are terminal I/O failures
    /// and are fatal to the session.
    pub fn run<T: ByteSource + Write>(&mut self, tty: &mut T) -> Result<()> {
        loop {
            self.refresh_screen(tty)?;
            let key = keys::read_key(tty)?;
            if self.process_key(key) == SessionState::Terminating {
                info!("Quit requested");
                return clear_screen(tty).map_err(TtyError::Write);
            }
        }
    }

    pub fn refresh_screen<W: Write>(&self, out: &mut W) -> Result<()> {
        self.renderer
            .refresh(self.geometry, self.cursor, out)
            .map_err(TtyError::Write)
    }

    /// Apply one key to the session state.
    pub fn process_key(&mut self, key: Key) -> SessionState {
        match key {
            QUIT_KEY => return SessionState::Terminating,
            Key::Home => self.cursor.x = 0,
            Key::End => self.cursor.x = self.geometry.cols - 1,
            Key::PageUp | Key::PageDown => {
                let step = if key == Key::PageUp {
                    Key::ArrowUp
                } else {
                    Key::ArrowDown
                };
                for _ in 0..self.geometry.rows {
                    self.move_cursor(step);
                }
            }
            Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight => {
                self.move_cursor(key)
            }
            // Reserved for editing commands
            _ => {}
        }
        SessionState::Running
    }

    /// Move one cell; no-op at the screen edges.
    fn move_cursor(&mut self, key: Key) {
        let Cursor { x, y } = &mut self.cursor;
        match key {
            Key::ArrowLeft => *x = x.saturating_sub(1),
            Key::ArrowRight if *x + 1 < self.geometry.cols => *x += 1,
            Key::ArrowUp => *y = y.saturating_sub(1),
            Key::ArrowDown if *y + 1 < self.geometry.rows => *y += 1,
            _ => {}
        }
    }
}

/// Clear the screen and home the cursor, written and flushed immediately.
pub fn clear_screen<W: Write>(out: &mut W) -> std::io::Result<()> {
    queue!(out, Clear(ClearType::All))?;
    out.write_all(CURSOR_HOME)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DisplayConfig;
    use crate::core::testing::{count_occurrences, ScriptedTty};
    use proptest::prelude::*;

    fn editor(rows: u16, cols: u16) -> Editor {
        let geometry = Geometry::new(rows, cols).unwrap();
        Editor::new(geometry, Renderer::new(&DisplayConfig::default()))
    }

    fn press(editor: &mut Editor, keys: &[Key]) {
        for &key in keys {
            assert_eq!(editor.process_key(key), SessionState::Running);
        }
    }

    #[test]
    fn test_cursor_clamped_at_origin() {
        let mut ed = editor(24, 80);
        press(&mut ed, &[Key::ArrowUp, Key::ArrowLeft]);
        assert_eq!(ed.cursor(), Cursor { x: 0, y: 0 });
    }

    #[test]
    fn test_cursor_clamped_at_far_corner() {
        let mut ed = editor(3, 4);
        press(&mut ed, &[Key::ArrowRight; 10]);
        press(&mut ed, &[Key::ArrowDown; 10]);
        assert_eq!(ed.cursor(), Cursor { x: 3, y: 2 });

        press(&mut ed, &[Key::ArrowLeft, Key::ArrowUp]);
        assert_eq!(ed.cursor(), Cursor { x: 2, y: 1 });
    }

    #[test]
    fn test_home_end() {
        let mut ed = editor(24, 80);
        press(&mut ed, &[Key::ArrowRight, Key::ArrowRight, Key::End]);
        assert_eq!(ed.cursor().x, 79);
        press(&mut ed, &[Key::Home]);
        assert_eq!(ed.cursor().x, 0);
    }

    #[test]
    fn test_page_up_down() {
        let mut ed = editor(10, 80);
        press(&mut ed, &[Key::ArrowDown; 3]);
        press(&mut ed, &[Key::PageDown]);
        assert_eq!(ed.cursor().y, 9);
        press(&mut ed, &[Key::ArrowUp; 2]);
        press(&mut ed, &[Key::PageUp]);
        assert_eq!(ed.cursor().y, 0);
        assert_eq!(ed.cursor().x, 0);
    }

    #[test]
    fn test_other_keys_are_ignored() {
        let mut ed = editor(24, 80);
        press(&mut ed, &[Key::ArrowDown]);
        press(&mut ed, &[Key::Byte(b'a'), Key::Byte(ctrl(b'c')), Key::Delete, Key::Escape]);
        assert_eq!(ed.cursor(), Cursor { x: 0, y: 1 });
    }

    #[test]
    fn test_quit_key() {
        let mut ed = editor(24, 80);
        assert_eq!(ed.process_key(QUIT_KEY), SessionState::Terminating);
    }

    #[test]
    fn test_run_until_quit() {
        let mut ed = editor(5, 20);
        let mut tty = ScriptedTty::new();
        tty.push_bytes(b"\x1b[B").push_timeout().push_bytes(b"\x1b[C").push_bytes(&[ctrl(b'q')]);

        ed.run(&mut tty).unwrap();

        assert_eq!(ed.cursor(), Cursor { x: 1, y: 1 });
        let output = tty.output();
        // One frame per key, then a single clear at the end
        assert_eq!(count_occurrences(&output, b"\x1b[?25l"), 3);
        assert_eq!(count_occurrences(&output, b"\x1b[2J"), 1);
        assert!(output.ends_with(b"\x1b[2J\x1b[H"));
        assert_eq!(tty.remaining_input(), 0);
    }

    #[test]
    fn test_run_stops_on_read_failure() {
        let mut ed = editor(5, 20);
        let mut tty = ScriptedTty::with_input(b"x");
        let err = ed.run(&mut tty).unwrap_err();
        assert!(matches!(err, TtyError::Read(_)));
        assert_eq!(count_occurrences(&tty.output(), b"\x1b[2J"), 0);
    }

    fn arb_key() -> impl Strategy<Value = Key> {
        prop_oneof![
            Just(Key::ArrowUp),
            Just(Key::ArrowDown),
            Just(Key::ArrowLeft),
            Just(Key::ArrowRight),
            Just(Key::Home),
            Just(Key::End),
            Just(Key::PageUp),
            Just(Key::PageDown),
            Just(Key::Delete),
            Just(Key::Escape),
            any::<u8>().prop_filter("not quit", |b| *b != ctrl(b'q')).prop_map(Key::Byte),
        ]
    }

    proptest! {
        #[test]
        fn prop_cursor_stays_on_screen(
            rows in 1u16..60,
            cols in 1u16..200,
            keys in prop::collection::vec(arb_key(), 0..200)
        ) {
            let mut ed = editor(rows, cols);
            for key in keys {
                ed.process_key(key);
                let cursor = ed.cursor();
                prop_assert!(cursor.x < cols);
                prop_assert!(cursor.y < rows);
            }
        }

        #[test]
        fn prop_page_moves_by_screen_height(rows in 1u16..60, start in 0u16..60) {
            let mut ed = editor(rows, 80);
            for _ in 0..start {
                ed.process_key(Key::ArrowDown);
            }
            let y = ed.cursor().y;

            ed.process_key(Key::PageDown);
            prop_assert_eq!(ed.cursor().y, (y + rows).min(rows - 1));

            ed.process_key(Key::PageUp);
            prop_assert_eq!(ed.cursor().y, 0);
        }
    }
}
