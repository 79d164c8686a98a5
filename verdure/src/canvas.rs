//! Interfaces to the pixel-output driver and to wall-clock pacing.
//!
//! The video driver itself is an external collaborator.  Drawing methods take
//! `&self` so that both renderers can hold the same canvas at once: the frame
//! buffer is shared without a lock, and implementations are expected to make
//! individual pixel writes safe to interleave (for example with atomic pixel
//! storage, or because the hardware has a single writer per bus cycle).

use serde::{Deserialize, Serialize};

/// The 3 bit palette of the VGA output (one bit each of red, green, blue)
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[repr(u8)]
pub enum Color {
    /// All channels off.  Used to clear the canvas
    #[default]
    Black,
    /// Red
    Red,
    /// Green
    Green,
    /// Red + Green
    Yellow,
    /// Blue
    Blue,
    /// Red + Blue
    Magenta,
    /// Green + Blue
    Cyan,
    /// All channels on
    White,
}

impl Color {
    const ELEM: [Color; 8] = [
        Self::Black,
        Self::Red,
        Self::Green,
        Self::Yellow,
        Self::Blue,
        Self::Magenta,
        Self::Cyan,
        Self::White,
    ];
    /// Returns a slice to all of the palette entries
    pub const fn colors() -> &'static [Color] {
        &Self::ELEM
    }
    /// Provides the name of the color
    pub const fn to_str(&self) -> &'static str {
        [
            "Black", "Red", "Green", "Yellow", "Blue", "Magenta", "Cyan", "White",
        ][*self as usize]
    }
    /// Try to create a Color from its palette index
    pub const fn new_from_u8(value: u8) -> Option<Self> {
        if (value as usize) < Self::ELEM.len() {
            Some(Self::ELEM[value as usize])
        } else {
            None
        }
    }
}

impl From<Color> for &'static str {
    fn from(value: Color) -> Self {
        value.to_str()
    }
}

impl TryFrom<u8> for Color {
    type Error = &'static str;
    fn try_from(value: u8) -> Result<Self, &'static str> {
        Self::new_from_u8(value).ok_or("Palette index out of range")
    }
}

/// The drawing primitives exported by the output driver.
///
/// Only [Canvas::draw_pixel] and the dimensions are required; the remaining
/// primitives have straightforward default implementations in terms of it,
/// which drivers with hardware acceleration may override.  Coordinates
/// outside the canvas must be ignored by the implementation.
pub trait Canvas {
    /// Width of the canvas, in pixels
    fn width(&self) -> i32;
    /// Height of the canvas, in pixels
    fn height(&self) -> i32;
    /// Set one pixel
    fn draw_pixel(&self, x: i32, y: i32, color: Color);
    /// Draw a line between two points (inclusive of both ends)
    fn draw_line(&self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        rasterize_line(x0, y0, x1, y1, |x, y| self.draw_pixel(x, y, color));
    }
    /// Fill a `w` by `h` rectangle with its upper left corner at `(x, y)`
    fn fill_rect(&self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        let x_end = (x + w).min(self.width());
        let y_end = (y + h).min(self.height());
        for py in y.max(0)..y_end {
            for px in x.max(0)..x_end {
                self.draw_pixel(px, py, color);
            }
        }
    }
    /// Clear the whole canvas to black
    fn clear(&self) {
        self.fill_rect(0, 0, self.width(), self.height(), Color::Black);
    }
    /// Draw a diagnostic text overlay.  Drivers without a font may ignore
    /// this.
    fn draw_text(&self, _x: i32, _y: i32, _text: &str, _size: u8, _color: Color) {}
}

/// Walk the pixels of the line from `(x0, y0)` to `(x1, y1)`, both ends
/// included, using Bresenham's algorithm
pub fn rasterize_line(x0: i32, y0: i32, x1: i32, y1: i32, mut plot: impl FnMut(i32, i32)) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let (mut x, mut y) = (x0, y0);
    let mut err = dx + dy;
    loop {
        plot(x, y);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Blocking pauses.  These are the timed suspension points of the renderers
/// (per-segment and per-layer pacing, and the pause before a canvas clear).
pub trait Delay {
    /// Pause for `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
    /// Pause for `us` microseconds
    fn delay_us(&mut self, us: u32);
}

/// A [Delay] that returns immediately, for running renderers as fast as
/// possible (tests, offline rendering)
#[derive(Default, Clone, Copy, Debug)]
pub struct NoDelay;

impl Delay for NoDelay {
    fn delay_ms(&mut self, _ms: u32) {}
    fn delay_us(&mut self, _us: u32) {}
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use core::cell::RefCell;
    use std::vec::Vec;

    /// A single-context canvas that keeps every write, for inspecting what a
    /// renderer produced
    pub struct RecordingCanvas {
        pub width: i32,
        pub height: i32,
        pub pixels: RefCell<Vec<Color>>,
        pub writes: RefCell<usize>,
        pub lines: RefCell<Vec<(i32, i32, i32, i32, Color)>>,
        pub clears: RefCell<usize>,
    }

    impl RecordingCanvas {
        pub fn new(width: i32, height: i32) -> Self {
            Self {
                width,
                height,
                pixels: RefCell::new(std::vec![Color::Black; (width * height) as usize]),
                writes: RefCell::new(0),
                lines: RefCell::new(Vec::new()),
                clears: RefCell::new(0),
            }
        }
        pub fn pixel(&self, x: i32, y: i32) -> Color {
            self.pixels.borrow()[(y * self.width + x) as usize]
        }
        pub fn lit(&self) -> usize {
            self.pixels
                .borrow()
                .iter()
                .filter(|c| **c != Color::Black)
                .count()
        }
    }

    impl Canvas for RecordingCanvas {
        fn width(&self) -> i32 {
            self.width
        }
        fn height(&self) -> i32 {
            self.height
        }
        fn draw_pixel(&self, x: i32, y: i32, color: Color) {
            *self.writes.borrow_mut() += 1;
            if x >= 0 && y >= 0 && x < self.width && y < self.height {
                self.pixels.borrow_mut()[(y * self.width + x) as usize] = color;
            }
        }
        fn draw_line(&self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
            self.lines.borrow_mut().push((x0, y0, x1, y1, color));
            rasterize_line(x0, y0, x1, y1, |x, y| self.draw_pixel(x, y, color));
        }
        fn clear(&self) {
            *self.clears.borrow_mut() += 1;
            self.pixels.borrow_mut().fill(Color::Black);
        }
    }

    #[derive(Default)]
    pub struct CountingDelay {
        pub ms: u64,
        pub us: u64,
    }

    impl Delay for CountingDelay {
        fn delay_ms(&mut self, ms: u32) {
            self.ms += ms as u64;
        }
        fn delay_us(&mut self, us: u32) {
            self.us += us as u64;
        }
    }
}
