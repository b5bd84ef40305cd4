// src/display/crossfade.rs
//
// Crossfade from the previous content of a target to a freshly decoded bitmap.

use super::{Canvas, Clock, ColorFilter, Rect, Redraw, Renderable};
use crate::hunter::{Decoded, LoadedFrom};
use image::DynamicImage;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

pub const DEFAULT_FADE_DURATION: Duration = Duration::from_millis(200);

/// Debug indicator triangle sizes, in density-independent pixels.
const DEBUG_OUTER_DP: f32 = 16.0;
const DEBUG_INNER_DP: f32 = 15.0;
const DEBUG_OUTLINE: [u8; 4] = [255, 255, 255, 255];

#[derive(Clone, Debug, PartialEq)]
pub struct CrossfadeOptions {
    /// Show the new image immediately.
    pub no_fade: bool,
    /// Draw the provenance indicator in the top-left corner.
    pub debugging: bool,
    pub fade_duration: Duration,
    /// Physical pixels per density-independent pixel.
    pub density: f32,
}

impl Default for CrossfadeOptions {
    fn default() -> Self {
        Self {
            no_fade: false,
            debugging: false,
            fade_duration: DEFAULT_FADE_DURATION,
            density: 1.0,
        }
    }
}

/// A bitmap drawn into its bounds.
#[derive(Clone, Debug)]
pub struct BitmapRenderable {
    bitmap: Arc<DynamicImage>,
    bounds: Option<Rect>,
    alpha: u8,
    filter: Option<ColorFilter>,
}

impl BitmapRenderable {
    pub fn new(bitmap: Arc<DynamicImage>) -> Self {
        Self {
            bitmap,
            bounds: None,
            alpha: u8::MAX,
            filter: None,
        }
    }

    /// Bake the decoded rotation into the pixels shown on screen.
    pub fn oriented(decoded: Decoded) -> Self {
        match decoded.rotation {
            crate::engine::Rotation::None => Self::new(decoded.bitmap),
            _ => Self::new(Arc::new(decoded.into_oriented())),
        }
    }

    pub fn bitmap(&self) -> &Arc<DynamicImage> {
        &self.bitmap
    }

    pub fn alpha(&self) -> u8 {
        self.alpha
    }
}

impl Renderable for BitmapRenderable {
    fn draw(&mut self, canvas: &mut dyn Canvas) -> Redraw {
        let bounds = self
            .bounds
            .unwrap_or_else(|| Rect::from_size(self.bitmap.width(), self.bitmap.height()));
        canvas.draw_bitmap(&self.bitmap, bounds, self.alpha, self.filter.as_ref());
        Redraw::Idle
    }

    fn set_alpha(&mut self, alpha: u8) {
        self.alpha = alpha;
    }

    fn set_color_filter(&mut self, filter: Option<ColorFilter>) {
        self.filter = filter;
    }

    fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = Some(bounds);
    }

    fn intrinsic_size(&self) -> Option<(u32, u32)> {
        Some((self.bitmap.width(), self.bitmap.height()))
    }
}

/// Fades `image` in over the previous content.
///
/// Images that come from memory, or with `no_fade`, show at once and drop the
/// placeholder. Otherwise every `draw` before `fade_duration` has elapsed
/// paints the placeholder and then the image at `alpha * elapsed / duration`,
/// and asks for another frame. The first draw at or past the duration ends
/// the fade for good.
pub struct Crossfade {
    image: BitmapRenderable,
    placeholder: Option<Box<dyn Renderable>>,
    loaded_from: LoadedFrom,
    options: CrossfadeOptions,
    clock: Arc<dyn Clock>,
    start: Duration,
    animating: bool,
    alpha: u8,
}

impl Crossfade {
    pub fn new(
        image: BitmapRenderable,
        placeholder: Option<Box<dyn Renderable>>,
        loaded_from: LoadedFrom,
        options: CrossfadeOptions,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let fade = loaded_from != LoadedFrom::Memory && !options.no_fade;
        let start = clock.now();
        Self {
            image,
            placeholder: if fade { placeholder } else { None },
            loaded_from,
            options,
            clock,
            start,
            animating: fade,
            alpha: u8::MAX,
        }
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn has_placeholder(&self) -> bool {
        self.placeholder.is_some()
    }

    pub fn loaded_from(&self) -> LoadedFrom {
        self.loaded_from
    }

    pub fn image(&self) -> &BitmapRenderable {
        &self.image
    }

    /// Fraction of the fade elapsed; 1.0 or more means done.
    fn progress(&self) -> f32 {
        if self.options.fade_duration.is_zero() {
            return 1.0;
        }
        let elapsed = self.clock.now().saturating_sub(self.start);
        elapsed.as_secs_f32() / self.options.fade_duration.as_secs_f32()
    }

    fn draw_debug_indicator(&self, canvas: &mut dyn Canvas) {
        let density = self.options.density;
        canvas.fill_triangle((0, 0), DEBUG_OUTER_DP * density, DEBUG_OUTLINE);
        canvas.fill_triangle(
            (0, 0),
            DEBUG_INNER_DP * density,
            self.loaded_from.debug_color(),
        );
    }
}

impl Renderable for Crossfade {
    fn draw(&mut self, canvas: &mut dyn Canvas) -> Redraw {
        let mut redraw = Redraw::Idle;
        if !self.animating {
            self.image.draw(canvas);
        } else {
            let progress = self.progress();
            if progress >= 1.0 {
                self.animating = false;
                self.placeholder = None;
                trace!(
                    target: "pixel_hunter::display",
                    loaded_from = ?self.loaded_from,
                    "fade complete"
                );
                self.image.draw(canvas);
            } else {
                if let Some(placeholder) = self.placeholder.as_mut() {
                    placeholder.draw(canvas);
                }
                let partial = (self.alpha as f32 * progress) as u8;
                self.image.set_alpha(partial);
                self.image.draw(canvas);
                self.image.set_alpha(self.alpha);
                redraw = Redraw::NextFrame;
            }
        }

        if self.options.debugging {
            self.draw_debug_indicator(canvas);
        }
        redraw
    }

    fn set_alpha(&mut self, alpha: u8) {
        self.alpha = alpha;
        if let Some(placeholder) = self.placeholder.as_mut() {
            placeholder.set_alpha(alpha);
        }
        self.image.set_alpha(alpha);
    }

    fn set_color_filter(&mut self, filter: Option<ColorFilter>) {
        if let Some(placeholder) = self.placeholder.as_mut() {
            placeholder.set_color_filter(filter);
        }
        self.image.set_color_filter(filter);
    }

    fn set_bounds(&mut self, bounds: Rect) {
        self.image.set_bounds(bounds);
        if let Some(placeholder) = self.placeholder.as_mut() {
            placeholder.set_bounds(bounds);
        }
    }

    fn intrinsic_size(&self) -> Option<(u32, u32)> {
        self.image.intrinsic_size()
    }
}
