// src/engine.rs
//
// The decode/acquisition engine shared by every hunter:
// 1. Probe intrinsic bounds from a bounded stream prefix
// 2. Pick an integer downsample factor for the requested target
// 3. Decode at that factor, routing each container to its best codec
//
// Plus the stream plumbing (mark/reset, format sniffing), orientation
// normalization and the network retry policy.
//
// This file is a facade over the decomposed modules in engine/

// =============================================================================
// SECURITY LIMITS
// =============================================================================

/// Maximum allowed image dimension (width or height).
/// Images larger than 32768x32768 are rejected to prevent decompression bombs.
pub const MAX_DIMENSION: u32 = 32768;

/// Maximum allowed total pixels (width * height), checked on the intrinsic size.
pub const MAX_PIXELS: u64 = 100_000_000;

// =============================================================================
// STREAM LIMITS
// =============================================================================

/// Bytes retained behind a mark so the stream can be rewound after sniffing
/// and after the bounds probe. The probe never reads past this window.
pub const MARK_LIMIT: usize = 64 * 1024;

/// Bytes peeked to classify a container.
pub const SNIFF_LEN: usize = 16;

/// Network retries granted to a fresh hunter.
pub const DEFAULT_RETRY_COUNT: u32 = 2;

// =============================================================================
// MEDIA STORE THUMBNAIL TIERS (width, height; bounds inclusive)
// =============================================================================

pub const MICRO_THUMBNAIL_SIZE: (u32, u32) = (96, 96);
pub const MINI_THUMBNAIL_SIZE: (u32, u32) = (512, 384);

// =============================================================================
// MODULE DECOMPOSITION
// =============================================================================

mod common;
mod decoder;
mod io;
mod orientation;
mod retry;
mod sample;
mod sniff;
mod stream;

pub use decoder::{
    check_dimensions, decode_bounds, decode_bytes, decode_jpeg_mozjpeg, decode_png_zune,
    decode_reader, decode_webp_libwebp, decode_with_image_crate, detect_exif_orientation,
    detect_format, probe_dimensions, read_file_orientation,
};
pub use io::{
    AssetStore, BundledResources, ByteStream, ContentResolver, DirectoryAssets, Downloader,
    ProviderError, ResourceStore, Response, ThumbnailKind, ThumbnailProvider,
};
pub use orientation::Rotation;
pub use retry::{NetworkInfo, NetworkState, RetryPolicy};
pub use sample::{calculate_in_sample_size, sampled_dimensions, subsample};
pub use sniff::Container;
pub use stream::MarkableReader;
