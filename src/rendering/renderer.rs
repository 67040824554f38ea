//! Writes a [`Framebuffer`] to the terminal.
//!
//! Every frame is assembled into a single byte buffer and handed to the sink with one
//! `write_all` followed by a `flush`, so the terminal never sees a half-drawn frame.
//!
//! **Frame layout:**
//!
//! 1.  `ESC[2J` (clear screen), but only when the size differs from the last frame that
//!     was written. Clearing every frame makes the terminal flicker; overwriting in place
//!     is enough while the size is stable.
//! 2.  `ESC[H` (cursor home).
//! 3.  `height` rows of exactly `width` bytes, joined by `\r\n`. No newline after the
//!     last row, which would scroll a full-height frame.

use crate::rendering::framebuffer::{Dimensions, Framebuffer, MAX_H, MAX_W};
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use log::debug;
use std::fmt;
use std::io;
use std::io::Write;

/// Moves the cursor to the top-left cell using the short `ESC[H` form.
///
/// `crossterm::cursor::MoveTo(0, 0)` spells out the coordinates; the bare form is what
/// the frame protocol specifies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorHome;

impl crossterm::Command for CursorHome {
    fn write_ansi(&self, f: &mut impl fmt::Write) -> fmt::Result {
        f.write_str("\x1b[H")
    }

    #[cfg(windows)]
    fn execute_winapi(&self) -> io::Result<()> {
        crossterm::Command::execute_winapi(&crossterm::cursor::MoveTo(0, 0))
    }
}

/// Serializes framebuffers into a sink, remembering the last size it drew.
pub struct Renderer<W: Write> {
    sink: W,
    buf: Vec<u8>,
    last_size: Option<Dimensions>,
}

impl<W: Write> Renderer<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            // worst case: clear + home + every cell + separators
            buf: Vec::with_capacity(MAX_W * MAX_H + 2 * MAX_H + 16),
            last_size: None,
        }
    }

    /// Size of the last frame that was written successfully.
    pub fn last_size(&self) -> Option<Dimensions> {
        self.last_size
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    /// Builds the payload for `fb` into the internal buffer without writing it.
    fn encode(&mut self, fb: &Framebuffer) -> io::Result<()> {
        self.buf.clear();
        let dims = fb.dimensions();
        if self.last_size != Some(dims) {
            debug!(
                "frame size changed to {}x{}, clearing screen",
                dims.width, dims.height
            );
            queue!(self.buf, Clear(ClearType::All))?;
        }
        queue!(self.buf, CursorHome)?;
        for (y, row) in fb.rows().enumerate() {
            if y != 0 {
                self.buf.extend_from_slice(b"\r\n");
            }
            self.buf.extend_from_slice(row);
        }
        Ok(())
    }

    /// Writes `fb` to the sink as one payload and flushes.
    pub fn render(&mut self, fb: &Framebuffer) -> io::Result<()> {
        self.encode(fb)?;
        self.sink.write_all(&self.buf)?;
        self.sink.flush()?;
        self.last_size = Some(fb.dimensions());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Framebuffer {
        let mut fb = Framebuffer::new(Dimensions::clamped(3, 2));
        fb.clear();
        fb.put(0, 0, 'A');
        fb.put(1, 0, 'B');
        fb.put(1, 1, 'C');
        fb
    }

    #[test]
    fn first_frame_clears_the_screen() {
        let mut renderer = Renderer::new(Vec::new());
        renderer.render(&sample()).unwrap();
        assert_eq!(renderer.sink().as_slice(), b"\x1b[2J\x1b[HAB \r\n C ");
        assert_eq!(renderer.last_size(), Some(Dimensions::clamped(3, 2)));
    }

    #[test]
    fn unchanged_size_overwrites_in_place() {
        let mut renderer = Renderer::new(Vec::new());
        renderer.render(&sample()).unwrap();
        renderer.sink_mut().clear();

        renderer.render(&sample()).unwrap();
        assert_eq!(renderer.sink().as_slice(), b"\x1b[HAB \r\n C ");
    }

    #[test]
    fn size_change_clears_again() {
        let mut renderer = Renderer::new(Vec::new());
        let mut wide = Framebuffer::new(Dimensions::clamped(5, 2));
        wide.clear();
        renderer.render(&wide).unwrap();
        renderer.sink_mut().clear();

        renderer.render(&sample()).unwrap();
        assert_eq!(renderer.sink().as_slice(), b"\x1b[2J\x1b[HAB \r\n C ");
    }

    #[test]
    fn single_row_has_no_separator() {
        let mut fb = Framebuffer::new(Dimensions::clamped(2, 1));
        fb.clear();
        fb.put(1, 0, 'z');
        let mut renderer = Renderer::new(Vec::new());
        renderer.render(&fb).unwrap();
        assert_eq!(renderer.sink().as_slice(), b"\x1b[2J\x1b[H z");
    }

    /// Counts writes and flushes, and can be told to fail.
    #[derive(Default)]
    struct CountingSink {
        writes: usize,
        flushes: usize,
        fail: bool,
        bytes: Vec<u8>,
    }

    impl Write for CountingSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.fail {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            self.writes += 1;
            self.bytes.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn frame_is_written_in_one_call() {
        let mut renderer = Renderer::new(CountingSink::default());
        let mut fb = Framebuffer::new(Dimensions::clamped(80, 24));
        fb.clear();
        renderer.render(&fb).unwrap();
        assert_eq!(renderer.sink().writes, 1);
        assert_eq!(renderer.sink().flushes, 1);
        assert_eq!(renderer.sink().bytes.len(), 4 + 3 + 80 * 24 + 2 * 23);
    }

    #[test]
    fn failed_write_is_reported_and_does_not_record_size() {
        let mut renderer = Renderer::new(CountingSink {
            fail: true,
            ..Default::default()
        });
        let err = renderer.render(&sample()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(renderer.last_size(), None);
    }
}
