//! An in-memory frame buffer that both simulated contexts draw into.

use std::fmt::Write;
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::Mutex;
use verdure::canvas::{Canvas, Color};

/// One palette index per pixel.  Pixels are atomics so the buffer can be
/// shared by reference between threads, the way the display controller's
/// memory is shared between the two cores.
pub struct FrameBuffer {
    width: i32,
    height: i32,
    pixels: Vec<AtomicU8>,
    clears: AtomicU32,
    overlay: Mutex<String>,
}

impl FrameBuffer {
    /// An all-black buffer
    pub fn new(width: i32, height: i32) -> Self {
        let len = (width.max(0) * height.max(0)) as usize;
        Self {
            width: width.max(0),
            height: height.max(0),
            pixels: (0..len).map(|_| AtomicU8::new(Color::Black as u8)).collect(),
            clears: AtomicU32::new(0),
            overlay: Mutex::new(String::new()),
        }
    }
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some((y * self.width + x) as usize)
    }
    /// The color of one pixel.  Out of range reads are black.
    pub fn pixel(&self, x: i32, y: i32) -> Color {
        self.index(x, y)
            .and_then(|i| Color::new_from_u8(self.pixels[i].load(Ordering::Relaxed)))
            .unwrap_or(Color::Black)
    }
    /// Number of pixels that are not black
    pub fn lit(&self) -> usize {
        self.pixels
            .iter()
            .filter(|p| p.load(Ordering::Relaxed) != Color::Black as u8)
            .count()
    }
    /// Number of pixels of `color`
    pub fn count(&self, color: Color) -> usize {
        self.pixels
            .iter()
            .filter(|p| p.load(Ordering::Relaxed) == color as u8)
            .count()
    }
    /// Number of times the whole buffer has been cleared
    pub fn clears(&self) -> u32 {
        self.clears.load(Ordering::Relaxed)
    }
    /// The most recent text overlay
    pub fn overlay(&self) -> String {
        self.overlay.lock().map(|s| s.clone()).unwrap_or_default()
    }
    /// A coarse text rendering, `cols` characters wide and `rows` lines tall.
    ///
    /// Each character covers a block of pixels and shows the first letter of
    /// the most common non-black color in it, or `.` if the block is empty.
    pub fn ascii_thumbnail(&self, cols: usize, rows: usize) -> String {
        let mut out = String::with_capacity((cols + 1) * rows);
        if cols == 0 || rows == 0 || self.width == 0 || self.height == 0 {
            return out;
        }
        let (w, h) = (self.width as usize, self.height as usize);
        for row in 0..rows {
            let (y0, y1) = (row * h / rows, ((row + 1) * h / rows).max(row * h / rows + 1));
            for col in 0..cols {
                let (x0, x1) = (col * w / cols, ((col + 1) * w / cols).max(col * w / cols + 1));
                let mut tally = [0usize; 8];
                for y in y0..y1.min(h) {
                    for x in x0..x1.min(w) {
                        let value = self.pixels[y * w + x].load(Ordering::Relaxed);
                        tally[(value & 7) as usize] += 1;
                    }
                }
                let best = (1..tally.len())
                    .filter(|i| tally[*i] > 0)
                    .max_by_key(|i| tally[*i])
                    .and_then(|i| Color::new_from_u8(i as u8));
                let ch = match best {
                    Some(color) => color.to_str().chars().next().unwrap_or('?'),
                    None => '.',
                };
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }
}

impl Canvas for FrameBuffer {
    fn width(&self) -> i32 {
        self.width
    }
    fn height(&self) -> i32 {
        self.height
    }
    fn draw_pixel(&self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i].store(color as u8, Ordering::Relaxed);
        }
    }
    fn clear(&self) {
        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "Clearing {} lit pixels:\n{}",
                self.lit(),
                self.ascii_thumbnail(64, 24)
            );
        }
        for p in self.pixels.iter() {
            p.store(Color::Black as u8, Ordering::Relaxed);
        }
        self.clears.fetch_add(1, Ordering::Relaxed);
    }
    fn draw_text(&self, x: i32, y: i32, text: &str, size: u8, color: Color) {
        log::trace!("Overlay at ({}, {}) size {} {}: {}", x, y, size, color.to_str(), text);
        if let Ok(mut overlay) = self.overlay.lock() {
            overlay.clear();
            let _ = write!(overlay, "{}", text);
        }
    }
}
