// src/display/target.rs
//
// Installing placeholders and decoded images on a host view.

use super::{BitmapRenderable, Clock, Crossfade, CrossfadeOptions, Renderable};
use crate::hunter::Decoded;
use std::sync::Arc;
use tracing::debug;

/// A host view that shows one renderable at a time.
pub trait ImageTarget {
    /// The renderable currently shown, if any.
    fn renderable_mut(&mut self) -> Option<&mut (dyn Renderable + 'static)>;

    /// Detach and return the renderable currently shown.
    fn take_renderable(&mut self) -> Option<Box<dyn Renderable>>;

    fn set_renderable(&mut self, renderable: Box<dyn Renderable>);

    /// Show a host resource; the host resolves the id to a renderable.
    fn set_resource(&mut self, resource_id: u32);
}

/// What to show while a request is in flight.
pub enum Placeholder {
    Resource(u32),
    Renderable(Box<dyn Renderable>),
}

/// Replace the target's content with `decoded`, crossfading from whatever
/// it showed before. An animated placeholder is stopped first.
pub fn set_bitmap(
    target: &mut dyn ImageTarget,
    decoded: Decoded,
    options: &CrossfadeOptions,
    clock: Arc<dyn Clock>,
) {
    let mut placeholder = target.take_renderable();
    if let Some(previous) = placeholder.as_mut() {
        previous.stop();
    }
    let loaded_from = decoded.loaded_from;
    debug!(
        target: "pixel_hunter::display",
        loaded_from = ?loaded_from,
        had_placeholder = placeholder.is_some(),
        "installing decoded image"
    );
    let crossfade = Crossfade::new(
        BitmapRenderable::oriented(decoded),
        placeholder,
        loaded_from,
        options.clone(),
        clock,
    );
    target.set_renderable(Box::new(crossfade));
}

/// Show a placeholder and start it if it animates.
pub fn set_placeholder(target: &mut dyn ImageTarget, placeholder: Placeholder) {
    match placeholder {
        Placeholder::Resource(id) => target.set_resource(id),
        Placeholder::Renderable(renderable) => target.set_renderable(renderable),
    }
    if let Some(current) = target.renderable_mut() {
        current.start();
    }
}
