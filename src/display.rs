// src/display.rs
//
// Presenting decoded images: a renderable abstraction, a crossfade from the
// previous content to a freshly decoded bitmap, and the host-target helpers
// that install both.
//
// Everything here runs on the single render thread; nothing is Sync.

mod canvas;
mod clock;
mod crossfade;
mod target;

pub use canvas::{Canvas, PixelCanvas};
pub use clock::{Clock, ManualClock, SystemClock};
pub use crossfade::{BitmapRenderable, Crossfade, CrossfadeOptions, DEFAULT_FADE_DURATION};
pub use target::{set_bitmap, set_placeholder, ImageTarget, Placeholder};

/// Axis-aligned rectangle in canvas pixels, right/bottom exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }
}

/// Per-channel multiply applied to every drawn pixel (a tint).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColorFilter {
    multiply: [u8; 4],
}

impl ColorFilter {
    pub fn multiply(rgba: [u8; 4]) -> Self {
        Self { multiply: rgba }
    }

    pub fn apply(&self, pixel: [u8; 4]) -> [u8; 4] {
        let mut out = [0u8; 4];
        for ((o, p), m) in out.iter_mut().zip(pixel).zip(self.multiply) {
            *o = ((p as u16 * m as u16 + 127) / 255) as u8;
        }
        out
    }
}

/// Whether the host must call `draw` again on the next frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Redraw {
    Idle,
    NextFrame,
}

/// Something the host can draw into its surface.
pub trait Renderable {
    fn draw(&mut self, canvas: &mut dyn Canvas) -> Redraw;

    fn set_alpha(&mut self, alpha: u8);

    fn set_color_filter(&mut self, filter: Option<ColorFilter>);

    fn set_bounds(&mut self, bounds: Rect);

    fn intrinsic_size(&self) -> Option<(u32, u32)> {
        None
    }

    /// Start a self-animating renderable (animated placeholders). No-op otherwise.
    fn start(&mut self) {}

    /// Stop a self-animating renderable. No-op otherwise.
    fn stop(&mut self) {}
}
