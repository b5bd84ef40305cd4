// lib.rs
//
// pixel-hunter: image acquisition and sampled decoding for UI image loaders
//
// Design goals:
// - One hunter per request, chosen by locator scheme
// - Never decode more pixels than the target needs
// - Orientation carried as metadata, not baked into pixels
// - Crossfade from placeholder to image on the render thread

pub mod display;
pub mod engine;
pub mod error;
pub mod hunter;
pub mod request;

pub use display::{set_bitmap, set_placeholder, Crossfade, CrossfadeOptions, ImageTarget};
pub use engine::{calculate_in_sample_size, Rotation};
pub use error::{DecodeError, ErrorCategory, Result};
pub use hunter::{
    decode_two_pass, Decoded, FakeStorage, HuntConfig, Hunter, LoadedFrom, SourceHunter, Sources,
};
pub use request::{DecodeOptions, PixelConfig, Request, TargetSize};
