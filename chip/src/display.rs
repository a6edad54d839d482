//! The monochrome framebuffer of the chip.
use crate::{definitions::display, DisplayError};

/// A single row of pixels.
pub type Row = [bool; display::WIDTH];

/// The graphics of the Chip 8 are black and white and the screen has a total of `2048` pixels
/// `(64 x 32)`. Drawing is done by toggling pixels, which makes sprite drawing an XOR
/// operation.
///
/// The framebuffer also tracks if it has to be redrawn, the flag is set by the
/// interpreter after a drawing instruction and cleared by whoever consumes the
/// frame.
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: [Row; display::HEIGHT],
    dirty: bool,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self {
            pixels: [[false; display::WIDTH]; display::HEIGHT],
            dirty: false,
        }
    }
}

impl Framebuffer {
    pub fn new() -> Self {
        Default::default()
    }

    /// The amount of pixels per row.
    pub fn width(&self) -> usize {
        display::WIDTH
    }

    /// The amount of rows.
    pub fn height(&self) -> usize {
        display::HEIGHT
    }

    /// Will flip the pixel at the given position.
    ///
    /// Both coordinates wrap around the display, so drawing past the right
    /// edge continues on the left edge.
    ///
    /// Returns the new state of the pixel, so a `false` after toggling a sprite bit
    /// means a collision happend.
    ///
    /// # Example
    /// ```rust
    /// # use chip::display::Framebuffer;
    /// let mut fb = Framebuffer::new();
    /// assert!(fb.toggle_pixel(64 + 3, 2 * 32 + 1));
    /// assert_eq!(fb.pixel(3, 1), Ok(true));
    /// assert!(!fb.toggle_pixel(3, 1));
    /// ```
    pub fn toggle_pixel(&mut self, x: usize, y: usize) -> bool {
        let cell = &mut self.pixels[y % display::HEIGHT][x % display::WIDTH];
        *cell = !*cell;
        *cell
    }

    /// Will read a single pixel, reading does not wrap around.
    pub fn pixel(&self, x: usize, y: usize) -> Result<bool, DisplayError> {
        self.pixels
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .ok_or(DisplayError::OutOfBounds { x, y })
    }

    /// Will clear all the pixels, the dirty flag is left untouched.
    pub fn clear(&mut self) {
        for row in self.pixels.iter_mut() {
            row.fill(false);
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Acknowledges the frame, returns if it had to be redrawn.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// Will return a immutable slice of the current display configuration
    pub fn rows(&self) -> &[Row] {
        &self.pixels[..]
    }
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Framebuffer (dirty: {})", self.dirty)?;
        for row in self.pixels.iter() {
            let line: String = row.iter().map(|&p| if p { '#' } else { '.' }).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
