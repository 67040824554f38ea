//! Fixed-capacity character grid.
//!
//! This module defines the [`Framebuffer`], which holds the next frame before it is
//! written to the terminal, and [`Canvas`], the drawing handle passed to
//! [`Game::update`](crate::Game::update).
//!
//! The buffer is allocated once with room for [`MAX_W`] x [`MAX_H`] cells. Its logical
//! size follows the terminal every frame, but never exceeds that capacity:
//!
//! *   Every cell holds a printable ASCII character or [`BLANK`].
//! *   Writes outside the logical size are dropped silently, so drawing code does not
//!     have to clip itself.

use std::fmt;
use std::fmt::{Debug, Formatter};

/// Maximum number of columns the engine will draw.
pub const MAX_W: usize = 128;
/// Maximum number of rows the engine will draw.
pub const MAX_H: usize = 64;
/// The character every cell holds after [`Framebuffer::clear`].
pub const BLANK: u8 = b' ';

/// Size of a frame in cells.
///
/// Always within `1..=MAX_W` by `1..=MAX_H`; construct through [`Dimensions::clamped`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: usize,
    pub height: usize,
}

impl Dimensions {
    /// Clamps a requested size into the range the framebuffer can hold.
    ///
    /// ```rust
    /// use toybox::rendering::framebuffer::{Dimensions, MAX_H, MAX_W};
    ///
    /// let dims = Dimensions::clamped(500, 200);
    /// assert_eq!((dims.width, dims.height), (MAX_W, MAX_H));
    /// assert_eq!(Dimensions::clamped(0, 0), Dimensions::clamped(1, 1));
    /// ```
    pub fn clamped(width: usize, height: usize) -> Self {
        Self {
            width: width.clamp(1, MAX_W),
            height: height.clamp(1, MAX_H),
        }
    }
}

/// A 2D grid of ASCII cells, row-major, with fixed backing capacity.
///
/// # Example
///
/// ```rust
/// use toybox::rendering::framebuffer::{Dimensions, Framebuffer};
///
/// let mut fb = Framebuffer::new(Dimensions::clamped(4, 2));
/// fb.put(1, 0, 'x');
/// fb.put(9, 9, 'y'); // ignored
/// assert_eq!(fb.get(1, 0), Some('x'));
/// assert_eq!(fb.row(0), b" x  ");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    cells: Box<[u8]>,
}

impl Debug for Framebuffer {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "Framebuffer {{ width: {}, height: {}, lines: {:?} }}",
            self.width,
            self.height,
            self.to_lines()
        )
    }
}

impl Framebuffer {
    /// Allocates the full capacity and sets the logical size to `dims`.
    pub fn new(dims: Dimensions) -> Self {
        let dims = Dimensions::clamped(dims.width, dims.height);
        Self {
            width: dims.width,
            height: dims.height,
            cells: vec![BLANK; MAX_W * MAX_H].into_boxed_slice(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// Changes the logical size. Cell contents are left as they are; callers clear
    /// before drawing.
    pub fn resize(&mut self, dims: Dimensions) {
        let dims = Dimensions::clamped(dims.width, dims.height);
        self.width = dims.width;
        self.height = dims.height;
    }

    /// Sets every cell of the backing store to [`BLANK`].
    pub fn clear(&mut self) {
        self.cells.fill(BLANK);
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    /// Writes `ch` at `(x, y)`.
    ///
    /// Out-of-range coordinates and characters that are not printable ASCII are ignored.
    pub fn put(&mut self, x: i32, y: i32, ch: char) {
        if !(ch == ' ' || ch.is_ascii_graphic()) {
            return;
        }
        if let Some(idx) = self.index(x, y) {
            self.cells[idx] = ch as u8;
        }
    }

    /// Reads the cell at `(x, y)`, or `None` outside the logical size.
    pub fn get(&self, x: i32, y: i32) -> Option<char> {
        self.index(x, y).map(|idx| self.cells[idx] as char)
    }

    /// The `width` bytes of row `y`.
    ///
    /// # Panics
    /// If `y >= height`.
    pub fn row(&self, y: usize) -> &[u8] {
        assert!(y < self.height, "row {y} out of range");
        let start = y * self.width;
        &self.cells[start..start + self.width]
    }

    /// Iterates over the rows of the logical frame.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.cells[..self.width * self.height].chunks(self.width)
    }

    /// The frame as one `String` per row. Mostly useful in tests and debug output.
    pub fn to_lines(&self) -> Vec<String> {
        self.rows()
            .map(|row| String::from_utf8_lossy(row).into_owned())
            .collect()
    }
}

/// Drawing handle given to [`Game::update`](crate::Game::update).
///
/// A `Canvas` borrows the engine's framebuffer for the duration of one `update` call,
/// so it cannot be kept around between frames.
pub struct Canvas<'a> {
    fb: &'a mut Framebuffer,
}

impl<'a> Canvas<'a> {
    pub fn new(fb: &'a mut Framebuffer) -> Self {
        Self { fb }
    }

    pub fn width(&self) -> usize {
        self.fb.width()
    }

    pub fn height(&self) -> usize {
        self.fb.height()
    }

    /// Draws one character. See [`Framebuffer::put`].
    pub fn put(&mut self, x: i32, y: i32, ch: char) {
        self.fb.put(x, y, ch);
    }

    /// Draws `s` left to right starting at `(x, y)`, clipped like [`Canvas::put`].
    pub fn put_str(&mut self, x: i32, y: i32, s: &str) {
        for (dx, ch) in s.chars().enumerate() {
            self.fb.put(x.saturating_add(dx as i32), y, ch);
        }
    }

    /// Reads back a cell drawn earlier in this frame.
    pub fn get(&self, x: i32, y: i32) -> Option<char> {
        self.fb.get(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fb(w: usize, h: usize) -> Framebuffer {
        Framebuffer::new(Dimensions::clamped(w, h))
    }

    #[test]
    fn put_then_get_in_bounds() {
        let mut fb = fb(7, 5);
        for y in 0..5 {
            for x in 0..7 {
                let ch = (b'a' + ((x + y) % 26) as u8) as char;
                fb.put(x, y, ch);
                assert_eq!(fb.get(x, y), Some(ch));
            }
        }
    }

    #[test]
    fn out_of_bounds_put_changes_nothing() {
        let mut fb = fb(4, 3);
        let before = fb.clone();
        for (x, y) in [(-1, 0), (0, -1), (4, 0), (0, 3), (i32::MAX, i32::MAX), (i32::MIN, 2)] {
            fb.put(x, y, '#');
        }
        assert_eq!(fb, before);
    }

    #[test]
    fn put_ignores_non_printable() {
        let mut fb = fb(3, 1);
        fb.put(0, 0, '\n');
        fb.put(1, 0, 'é');
        fb.put(2, 0, '\x1b');
        assert_eq!(fb.to_lines(), vec!["   "]);
    }

    #[test]
    fn clear_blanks_every_cell() {
        let mut fb = fb(MAX_W, MAX_H);
        for y in 0..MAX_H as i32 {
            for x in 0..MAX_W as i32 {
                fb.put(x, y, '@');
            }
        }
        fb.clear();
        for y in 0..MAX_H as i32 {
            for x in 0..MAX_W as i32 {
                assert_eq!(fb.get(x, y), Some(' '));
            }
        }
    }

    #[test]
    fn resize_is_clamped_to_capacity() {
        let mut fb = fb(10, 10);
        fb.resize(Dimensions {
            width: MAX_W * 4,
            height: MAX_H + 1,
        });
        assert_eq!(fb.dimensions(), Dimensions::clamped(MAX_W, MAX_H));
        fb.put(MAX_W as i32 - 1, MAX_H as i32 - 1, 'z');
        assert_eq!(fb.get(MAX_W as i32 - 1, MAX_H as i32 - 1), Some('z'));
        fb.put(MAX_W as i32, 0, 'z');
        assert_eq!(fb.get(MAX_W as i32, 0), None);
    }

    #[test]
    fn rows_are_width_long() {
        let mut fb = fb(3, 2);
        fb.put(0, 0, 'A');
        fb.put(1, 0, 'B');
        fb.put(1, 1, 'C');
        let rows: Vec<&[u8]> = fb.rows().collect();
        assert_eq!(rows, vec![&b"AB "[..], &b" C "[..]]);
        assert_eq!(fb.row(1), b" C ");
    }

    #[test]
    fn canvas_put_str_clips() {
        let mut fb = fb(5, 2);
        let mut canvas = Canvas::new(&mut fb);
        canvas.put_str(3, 1, "hello");
        canvas.put_str(-2, 0, "abcd");
        assert_eq!(canvas.width(), 5);
        assert_eq!(fb.to_lines(), vec!["cd   ", "   he"]);
    }
}
