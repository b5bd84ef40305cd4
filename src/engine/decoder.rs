// src/engine/decoder.rs
//
// Decoder operations: bounds probing and sampled decoding.
// JPEG (mozjpeg, DCT-scaled), PNG (zune-png), WebP (libwebp), the rest via the image crate.

use crate::engine::common::run_with_panic_policy;
use crate::engine::orientation::Rotation;
use crate::engine::sample::{sampled_dimensions, subsample};
use crate::engine::{MARK_LIMIT, MAX_DIMENSION, MAX_PIXELS};
use crate::error::{DecodeError, Result};
use crate::request::DecodeOptions;
use image::{
    DynamicImage, GrayAlphaImage, GrayImage, ImageFormat, ImageReader, RgbImage, RgbaImage,
};
use mozjpeg::Decompress;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read, Seek};
use std::path::Path;
use tracing::{debug, trace};
use webp::{BitstreamFeatures, Decoder as WebPDecoder};
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_png::PngDecoder;

/// Detect input format using magic bytes. Returns None if unknown.
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes).ok()
}

/// Read intrinsic dimensions from the container header without decoding pixels.
pub fn probe_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::decode_failed(format!("failed to read image header: {e}")))?;
    if reader.format().is_none() {
        return Err(DecodeError::unknown_format());
    }
    reader
        .into_dimensions()
        .map_err(|e| DecodeError::decode_failed(format!("failed to read dimensions: {e}")))
}

/// Check if image dimensions are within safe limits.
/// Returns an error if the image is too large (potential decompression bomb).
pub fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(DecodeError::dimension_exceeds_limit(
            width.max(height),
            MAX_DIMENSION,
        ));
    }
    let pixels = width as u64 * height as u64;
    if pixels > MAX_PIXELS {
        return Err(DecodeError::pixel_count_exceeds_limit(pixels, MAX_PIXELS));
    }
    Ok(())
}

/// Bounds-only pass over a fresh stream.
///
/// The prefix grows from [`MARK_LIMIT`] bytes, doubling until the header
/// parses, the stream ends or `read_limit` is reached. A markable stream
/// passes its mark window as `read_limit` so it can always be rewound; a
/// source reopened for the full pass passes `None`. A header that cannot be
/// parsed leaves `out_size` empty; the full pass then runs at sample size 1
/// and reports the real failure if the bytes are not an image.
pub fn decode_bounds<R: Read>(
    mut reader: R,
    options: &mut DecodeOptions,
    locator: &str,
    read_limit: Option<usize>,
) -> Result<()> {
    options.bounds_only = true;
    let cap = read_limit.unwrap_or(usize::MAX);
    let mut window = MARK_LIMIT.min(cap);
    let mut prefix = Vec::with_capacity(8 * 1024);

    let probed = loop {
        let wanted = window - prefix.len();
        let read = reader
            .by_ref()
            .take(wanted as u64)
            .read_to_end(&mut prefix)
            .map_err(|e| DecodeError::from_io(locator.to_string(), e))?;
        let probed = probe_dimensions(&prefix);
        let exhausted = read < wanted;
        // Unrecognized magic will not improve with more bytes.
        if probed.is_ok() || exhausted || window >= cap || detect_format(&prefix).is_none() {
            break probed;
        }
        window = window.saturating_mul(2).min(cap);
    };

    options.out_size = match probed {
        Ok(dims) => Some(dims),
        Err(err) => {
            debug!(
                target: "pixel_hunter::decode",
                locator,
                prefix_len = prefix.len(),
                error = %err,
                "bounds probe failed; decoding at full size"
            );
            None
        }
    };
    Ok(())
}

/// Full pass over a fresh stream: buffer the body and decode it.
pub fn decode_reader<R: Read>(
    mut reader: R,
    options: &DecodeOptions,
    locator: &str,
) -> Result<DynamicImage> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| DecodeError::from_io(locator.to_string(), e))?;
    if bytes.is_empty() {
        return Err(DecodeError::decode_failed(format!("'{locator}' is empty")));
    }
    decode_bytes(&bytes, options)
}

/// Decode an in-memory container at `options.sample_size`.
///
/// The result is exactly `intrinsic / sample_size` on each axis (at least 1),
/// converted to `options.config` when one is set. Only JPEG is reduced inside
/// the codec; PNG, WebP and the image-crate formats decode at full resolution
/// and are box-reduced afterwards, so peak memory is bounded by the sample
/// size for JPEG alone.
pub fn decode_bytes(bytes: &[u8], options: &DecodeOptions) -> Result<DynamicImage> {
    let format = detect_format(bytes).ok_or_else(DecodeError::unknown_format)?;
    let (width, height) = probe_dimensions(bytes)?;
    check_dimensions(width, height)?;

    let sample_size = options.sample_size.max(1);
    let img = match format {
        ImageFormat::Jpeg => decode_jpeg_mozjpeg(bytes, sample_size)?,
        ImageFormat::Png => decode_png_zune(bytes)?,
        ImageFormat::WebP => decode_webp_libwebp(bytes)?,
        _ => decode_with_image_crate(bytes)?,
    };

    let (dst_width, dst_height) = sampled_dimensions(width, height, sample_size);
    trace!(
        target: "pixel_hunter::decode",
        format = ?format,
        width,
        height,
        sample_size,
        decoded_width = img.width(),
        decoded_height = img.height(),
        "decoded"
    );
    let img = subsample(img, dst_width, dst_height)?;

    Ok(match options.config {
        Some(config) => config.apply(img),
        None => img,
    })
}

/// libjpeg scales by n/8; pick the smallest n that does not undershoot the sample size.
fn jpeg_scale_num(sample_size: u32) -> u8 {
    match sample_size {
        0 | 1 => 8,
        2 | 3 => 4,
        4..=7 => 2,
        _ => 1,
    }
}

/// Decode JPEG using mozjpeg (backed by libjpeg-turbo), scaling inside the IDCT
/// so large photos never materialize at full resolution.
pub fn decode_jpeg_mozjpeg(data: &[u8], sample_size: u32) -> Result<DynamicImage> {
    run_with_panic_policy("decode:mozjpeg", || {
        if !data.windows(2).any(|pair| pair == [0xFF, 0xD9]) {
            return Err(DecodeError::decode_failed("mozjpeg: missing JPEG EOI marker"));
        }

        let mut decompress = Decompress::new_mem(data).map_err(|e| {
            DecodeError::decode_failed(format!("mozjpeg decompress init failed: {e:?}"))
        })?;

        let scale_num = jpeg_scale_num(sample_size);
        if scale_num < 8 {
            decompress.scale(scale_num);
        }

        let mut decompress = decompress.rgb().map_err(|e| {
            DecodeError::decode_failed(format!("mozjpeg rgb conversion failed: {e:?}"))
        })?;

        let width = decompress.width();
        let height = decompress.height();
        if width > MAX_DIMENSION as usize || height > MAX_DIMENSION as usize {
            return Err(DecodeError::dimension_exceeds_limit(
                width.max(height) as u32,
                MAX_DIMENSION,
            ));
        }

        let pixels: Vec<[u8; 3]> = decompress.read_scanlines().map_err(|e| {
            DecodeError::decode_failed(format!("mozjpeg: failed to read scanlines: {e:?}"))
        })?;
        let flat_pixels: Vec<u8> = pixels.into_iter().flatten().collect();

        RgbImage::from_raw(width as u32, height as u32, flat_pixels)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(|| DecodeError::decode_failed("mozjpeg: failed to create image from raw data"))
    })
}

/// Decode PNG using zune-png. 16-bit input is stripped to 8-bit.
pub fn decode_png_zune(data: &[u8]) -> Result<DynamicImage> {
    run_with_panic_policy("decode:png", || {
        let options = DecoderOptions::default().png_set_strip_to_8bit(true);
        let mut decoder = PngDecoder::new_with_options(zune_core::bytestream::ZCursor::new(data), options);
        let pixels = decoder
            .decode()
            .map_err(|e| DecodeError::decode_failed(format!("png: decode failed: {e}")))?;

        let info = decoder
            .info()
            .ok_or_else(|| DecodeError::decode_failed("png: missing header info"))?;
        let width = info.width as u32;
        let height = info.height as u32;
        check_dimensions(width, height)?;

        let buf = match pixels {
            zune_core::result::DecodingResult::U8(v) => v,
            _ => {
                return Err(DecodeError::decode_failed(
                    "png: unexpected non-U8 pixel buffer",
                ))
            }
        };

        let colorspace = decoder
            .colorspace()
            .ok_or_else(|| DecodeError::decode_failed("png: missing colorspace"))?;

        let img = match colorspace {
            ColorSpace::RGB => RgbImage::from_raw(width, height, buf).map(DynamicImage::ImageRgb8),
            ColorSpace::RGBA => RgbaImage::from_raw(width, height, buf).map(DynamicImage::ImageRgba8),
            ColorSpace::Luma => GrayImage::from_raw(width, height, buf).map(DynamicImage::ImageLuma8),
            ColorSpace::LumaA => {
                GrayAlphaImage::from_raw(width, height, buf).map(DynamicImage::ImageLumaA8)
            }
            other => {
                return Err(DecodeError::decode_failed(format!(
                    "png: unsupported colorspace {other:?}"
                )))
            }
        };
        img.ok_or_else(|| DecodeError::decode_failed("png: pixel buffer does not match header"))
    })
}

/// Decode WebP from memory using libwebp. Animated WebP falls back to the image crate.
pub fn decode_webp_libwebp(data: &[u8]) -> Result<DynamicImage> {
    run_with_panic_policy("decode:webp", || {
        // Parse header first to avoid allocating huge buffers on malformed files
        let features = BitstreamFeatures::new(data)
            .ok_or_else(|| DecodeError::decode_failed("webp: failed to read bitstream features"))?;

        if features.has_animation() {
            return image::load_from_memory(data).map_err(|e| {
                DecodeError::decode_failed(format!("webp (animated) decode failed: {e}"))
            });
        }

        check_dimensions(features.width(), features.height())?;

        let decoded = WebPDecoder::new(data)
            .decode()
            .ok_or_else(|| DecodeError::decode_failed("webp: decode failed"))?;
        check_dimensions(decoded.width(), decoded.height())?;

        Ok(decoded.to_image())
    })
}

/// Decode any other format using the image crate under the panic policy.
pub fn decode_with_image_crate(data: &[u8]) -> Result<DynamicImage> {
    run_with_panic_policy("decode:image", || {
        image::load_from_memory(data)
            .map_err(|e| DecodeError::decode_failed(format!("decode failed: {e}")))
    })
}

fn read_orientation_tag<R: BufRead + Seek>(reader: &mut R) -> Option<u32> {
    let exif = exif::Reader::new().read_from_container(reader).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    // Short or Long depending on the writer
    field.value.get_uint(0)
}

/// Extract EXIF Orientation tag (1-8). Returns None if missing or invalid.
pub fn detect_exif_orientation(bytes: &[u8]) -> Option<u16> {
    let value = read_orientation_tag(&mut Cursor::new(bytes))?;
    let orientation = value as u16;
    if (1..=8).contains(&orientation) {
        Some(orientation)
    } else {
        None
    }
}

/// Rotation requested by a file's embedded EXIF tags.
///
/// Unreadable files, files without EXIF and files without an Orientation
/// tag all report `Rotation::None`; the decode itself surfaces real I/O errors.
pub fn read_file_orientation(path: &Path) -> Rotation {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            debug!(
                target: "pixel_hunter::decode",
                path = %path.display(),
                error = %err,
                "cannot open file for EXIF; assuming no rotation"
            );
            return Rotation::None;
        }
    };
    read_orientation_tag(&mut BufReader::new(file))
        .map(Rotation::from_exif)
        .unwrap_or_default()
}
