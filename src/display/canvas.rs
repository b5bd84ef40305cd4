// src/display/canvas.rs
//
// Drawing surface seen by renderables, and a software implementation over a
// tiny-skia pixmap.

use super::{ColorFilter, Rect};
use image::{DynamicImage, Rgba, RgbaImage};
use tiny_skia::{
    BlendMode, Color, ColorU8, FillRule, FilterQuality, Paint, PathBuilder, Pixmap, PixmapPaint,
    Transform,
};

/// Drawing operations the display layer needs from a host surface.
pub trait Canvas {
    /// Draw `bitmap` scaled into `bounds` at `alpha` (0..=255), tinted by `filter`.
    fn draw_bitmap(
        &mut self,
        bitmap: &DynamicImage,
        bounds: Rect,
        alpha: u8,
        filter: Option<&ColorFilter>,
    );

    /// Fill the triangle with corners `origin`, `origin + (size, 0)` and
    /// `origin + (0, size)`.
    fn fill_triangle(&mut self, origin: (i32, i32), size: f32, color: [u8; 4]);
}

/// Software canvas: source-over compositing, nearest-neighbour scaling.
#[derive(Clone, Debug)]
pub struct PixelCanvas {
    pixmap: Pixmap,
}

impl PixelCanvas {
    /// Fully transparent canvas. `None` for an empty or oversized surface.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Pixmap::new(width, height).map(|pixmap| Self { pixmap })
    }

    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Option<Self> {
        let mut canvas = Self::new(width, height)?;
        let [r, g, b, a] = color;
        canvas.pixmap.fill(Color::from_rgba8(r, g, b, a));
        Some(canvas)
    }

    /// Straight-alpha RGBA at `(x, y)`; transparent outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixmap.pixel(x, y).map_or([0; 4], |p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn into_image(self) -> RgbaImage {
        RgbaImage::from_fn(self.width(), self.height(), |x, y| Rgba(self.pixel(x, y)))
    }
}

/// Premultiplied copy of `bitmap` with `filter` applied per pixel.
fn to_pixmap(bitmap: &DynamicImage, filter: Option<&ColorFilter>) -> Option<Pixmap> {
    let rgba = bitmap.to_rgba8();
    let mut pixmap = Pixmap::new(rgba.width(), rgba.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = filter.map_or(src.0, |f| f.apply(src.0));
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

impl Canvas for PixelCanvas {
    fn draw_bitmap(
        &mut self,
        bitmap: &DynamicImage,
        bounds: Rect,
        alpha: u8,
        filter: Option<&ColorFilter>,
    ) {
        if alpha == 0 || bounds.is_empty() {
            return;
        }
        let Some(source) = to_pixmap(bitmap, filter) else {
            return;
        };

        let paint = PixmapPaint {
            opacity: alpha as f32 / 255.0,
            blend_mode: BlendMode::SourceOver,
            quality: FilterQuality::Nearest,
        };
        let transform = Transform::from_row(
            bounds.width() as f32 / source.width() as f32,
            0.0,
            0.0,
            bounds.height() as f32 / source.height() as f32,
            bounds.left as f32,
            bounds.top as f32,
        );
        self.pixmap
            .draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);
    }

    fn fill_triangle(&mut self, origin: (i32, i32), size: f32, color: [u8; 4]) {
        let (x, y) = (origin.0 as f32, origin.1 as f32);
        let mut pb = PathBuilder::new();
        pb.move_to(x, y);
        pb.line_to(x + size, y);
        pb.line_to(x, y + size);
        pb.close();
        let Some(path) = pb.finish() else {
            return;
        };

        let mut paint = Paint::default();
        let [r, g, b, a] = color;
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = false;
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }
}
