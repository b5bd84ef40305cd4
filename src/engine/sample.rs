// src/engine/sample.rs
//
// Downsample factor calculation and the box-filter reduction that realizes a
// factor when the codec cannot subsample natively.

use crate::error::{DecodeError, Result};
use fast_image_resize::{self as fir, ImageBufferError, MulDiv, PixelType, ResizeOptions};
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage, RgbaImage};

/// Largest power-of-two factor that still decodes to at least the target.
///
/// `width / factor >= req_width && height / factor >= req_height` always holds
/// for the returned factor (trivially for 1), and doubling it would break one
/// of the two. A target larger than the source on either axis yields 1: the
/// decoder never shrinks below what was asked for.
pub fn calculate_in_sample_size(width: u32, height: u32, req_width: u32, req_height: u32) -> u32 {
    let req_width = req_width.max(1);
    let req_height = req_height.max(1);

    let mut sample = 1u32;
    while let Some(next) = sample.checked_mul(2) {
        if width / next >= req_width && height / next >= req_height {
            sample = next;
        } else {
            break;
        }
    }
    sample
}

/// Output size of a decode at `sample_size`. Never collapses an axis to zero.
pub fn sampled_dimensions(width: u32, height: u32, sample_size: u32) -> (u32, u32) {
    let sample_size = sample_size.max(1);
    ((width / sample_size).max(1), (height / sample_size).max(1))
}

/// Reduce `img` to exactly `dst_width` x `dst_height` with a box filter.
/// Returns the image untouched when it already has that size.
pub fn subsample(img: DynamicImage, dst_width: u32, dst_height: u32) -> Result<DynamicImage> {
    let src_width = img.width();
    let src_height = img.height();

    if (src_width, src_height) == (dst_width, dst_height) {
        return Ok(img);
    }
    if src_width == 0 || src_height == 0 || dst_width == 0 || dst_height == 0 {
        return Err(DecodeError::decode_failed(format!(
            "invalid subsample {src_width}x{src_height} -> {dst_width}x{dst_height}"
        )));
    }

    // Keep RGB as RGB; every other layout goes through RGBA.
    let (pixel_type, mut src_pixels): (PixelType, Vec<u8>) = match img {
        DynamicImage::ImageRgb8(rgb) => (PixelType::U8x3, rgb.into_raw()),
        DynamicImage::ImageRgba8(rgba) => (PixelType::U8x4, rgba.into_raw()),
        other => (PixelType::U8x4, other.to_rgba8().into_raw()),
    };

    let primary = match fir::images::Image::from_slice_u8(
        src_width,
        src_height,
        src_pixels.as_mut_slice(),
        pixel_type,
    ) {
        Ok(src_image) => box_reduce(src_image, pixel_type, dst_width, dst_height),
        Err(ImageBufferError::InvalidBufferAlignment) => {
            Err("fir source buffer is not aligned".to_string())
        }
        Err(other) => Err(format!("fir source image error: {other:?}")),
    };

    match primary {
        Ok(img) => Ok(img),
        Err(err) => image_crate_reduce(
            &src_pixels,
            src_width,
            src_height,
            pixel_type,
            dst_width,
            dst_height,
        )
        .map_err(|fallback| {
            DecodeError::decode_failed(format!(
                "subsample failed: {err}; image crate fallback failed: {fallback}"
            ))
        }),
    }
}

fn box_reduce(
    mut src_image: fir::images::Image<'_>,
    pixel_type: PixelType,
    dst_width: u32,
    dst_height: u32,
) -> std::result::Result<DynamicImage, String> {
    let mut dst_image = fir::images::Image::new(dst_width, dst_height, pixel_type);
    let options =
        ResizeOptions::new().resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::Box));

    // Averaging straight alpha bleeds the color of transparent pixels.
    let premultiply = pixel_type == PixelType::U8x4;
    let mul_div = MulDiv::default();
    if premultiply {
        mul_div
            .multiply_alpha_inplace(&mut src_image)
            .map_err(|e| format!("failed to premultiply alpha: {e}"))?;
    }

    let mut resizer = fir::Resizer::new();
    resizer
        .resize(&src_image, &mut dst_image, &options)
        .map_err(|e| format!("fir resize error: {e:?}"))?;

    if premultiply {
        mul_div
            .divide_alpha_inplace(&mut dst_image)
            .map_err(|e| format!("failed to unpremultiply alpha: {e}"))?;
    }

    let dst_pixels = dst_image.into_vec();
    match pixel_type {
        PixelType::U8x3 => RgbImage::from_raw(dst_width, dst_height, dst_pixels)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(|| "failed to create rgb image from reduced data".to_string()),
        PixelType::U8x4 => RgbaImage::from_raw(dst_width, dst_height, dst_pixels)
            .map(DynamicImage::ImageRgba8)
            .ok_or_else(|| "failed to create rgba image from reduced data".to_string()),
        _ => Err("unsupported pixel type after reduce".to_string()),
    }
}

fn image_crate_reduce(
    src_pixels: &[u8],
    src_width: u32,
    src_height: u32,
    pixel_type: PixelType,
    dst_width: u32,
    dst_height: u32,
) -> std::result::Result<DynamicImage, String> {
    let filter = FilterType::Triangle;
    match pixel_type {
        PixelType::U8x3 => {
            let rgb = RgbImage::from_raw(src_width, src_height, src_pixels.to_vec())
                .ok_or_else(|| "failed to build rgb image for fallback reduce".to_string())?;
            Ok(DynamicImage::ImageRgb8(image::imageops::resize(
                &rgb, dst_width, dst_height, filter,
            )))
        }
        PixelType::U8x4 => {
            let rgba = RgbaImage::from_raw(src_width, src_height, src_pixels.to_vec())
                .ok_or_else(|| "failed to build rgba image for fallback reduce".to_string())?;
            Ok(DynamicImage::ImageRgba8(image::imageops::resize(
                &rgba, dst_width, dst_height, filter,
            )))
        }
        _ => Err("fallback reduce supports only U8x3/U8x4 pixel types".to_string()),
    }
}
