// src/request.rs
//
// Request values handed to a hunter, and the per-decode scratch options.
// Requests are cheap, immutable and never mutated once built.

use crate::engine::calculate_in_sample_size;
use crate::error::{DecodeError, Result};
use image::DynamicImage;
use url::Url;

/// Requested output size. Both dimensions are always positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

/// Pixel layout the caller wants the final buffer in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelConfig {
    Rgba8,
    Rgb8,
    Luma8,
    LumaA8,
}

impl PixelConfig {
    /// Convert a decoded image into this layout. No-op when it already matches.
    pub fn apply(self, img: DynamicImage) -> DynamicImage {
        match (self, img) {
            (Self::Rgba8, img @ DynamicImage::ImageRgba8(_)) => img,
            (Self::Rgb8, img @ DynamicImage::ImageRgb8(_)) => img,
            (Self::Luma8, img @ DynamicImage::ImageLuma8(_)) => img,
            (Self::LumaA8, img @ DynamicImage::ImageLumaA8(_)) => img,
            (Self::Rgba8, img) => DynamicImage::ImageRgba8(img.to_rgba8()),
            (Self::Rgb8, img) => DynamicImage::ImageRgb8(img.to_rgb8()),
            (Self::Luma8, img) => DynamicImage::ImageLuma8(img.to_luma8()),
            (Self::LumaA8, img) => DynamicImage::ImageLumaA8(img.to_luma_alpha8()),
        }
    }
}

/// A logical image request: where the bytes live and how big the result should be.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    locator: Url,
    target: Option<TargetSize>,
    config: Option<PixelConfig>,
}

impl Request {
    /// Parse a scheme-qualified locator (`https://..`, `file:///..`, `asset:///..`, ...).
    pub fn new(locator: &str) -> Result<Self> {
        let url = Url::parse(locator)
            .map_err(|e| DecodeError::invalid_locator(locator.to_string(), e.to_string()))?;
        Ok(Self::from_url(url))
    }

    pub fn from_url(locator: Url) -> Self {
        Self {
            locator,
            target: None,
            config: None,
        }
    }

    /// Ask for a result no smaller than `width` x `height`.
    pub fn resize(mut self, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(DecodeError::invalid_target_size(width, height));
        }
        self.target = Some(TargetSize { width, height });
        Ok(self)
    }

    pub fn config(mut self, config: PixelConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn locator(&self) -> &Url {
        &self.locator
    }

    pub fn target_size(&self) -> Option<TargetSize> {
        self.target
    }

    pub fn pixel_config(&self) -> Option<PixelConfig> {
        self.config
    }

    pub fn has_size(&self) -> bool {
        self.target.is_some()
    }
}

/// Scratch state shared by the probe pass and the full pass of one decode.
///
/// Created fresh per decode; never shared across requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Probe pass: read the header only, allocate no pixels.
    pub bounds_only: bool,
    /// Integer downsample factor for the full pass (>= 1).
    pub sample_size: u32,
    /// Intrinsic size reported by the probe pass, if it could be read.
    pub out_size: Option<(u32, u32)>,
    pub config: Option<PixelConfig>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            bounds_only: false,
            sample_size: 1,
            out_size: None,
            config: None,
        }
    }
}

impl DecodeOptions {
    pub fn for_request(request: &Request) -> Self {
        Self {
            config: request.pixel_config(),
            ..Self::default()
        }
    }

    /// Finish the probe pass: pick the sample size from the probed bounds.
    /// Unknown bounds decode at full size.
    pub fn calculate_sample_size(&mut self, target: TargetSize) {
        self.sample_size = match self.out_size {
            Some((width, height)) => {
                calculate_in_sample_size(width, height, target.width, target.height)
            }
            None => 1,
        };
        self.bounds_only = false;
    }

    /// Like [`calculate_sample_size`](Self::calculate_sample_size), against a
    /// known nominal size instead of probed bounds.
    pub fn calculate_sample_size_for(&mut self, target: TargetSize, width: u32, height: u32) {
        self.out_size = Some((width, height));
        self.calculate_sample_size(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, RgbImage};

    #[test]
    fn test_request_without_size() {
        let request = Request::new("https://example.com/cat.jpg").unwrap();
        assert!(!request.has_size());
        assert_eq!(request.target_size(), None);
        assert_eq!(request.locator().scheme(), "https");
    }

    #[test]
    fn test_request_with_size() {
        let request = Request::new("file:///tmp/cat.jpg")
            .unwrap()
            .resize(100, 50)
            .unwrap();
        assert!(request.has_size());
        assert_eq!(
            request.target_size(),
            Some(TargetSize {
                width: 100,
                height: 50
            })
        );
    }

    #[test]
    fn test_request_rejects_zero_dimension() {
        let err = Request::new("file:///tmp/cat.jpg")
            .unwrap()
            .resize(0, 50)
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidTargetSize {
                width: 0,
                height: 50
            }
        ));
    }

    #[test]
    fn test_request_rejects_unparseable_locator() {
        let err = Request::new("not a locator").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidLocator { .. }));
    }

    #[test]
    fn test_decode_options_unknown_bounds_is_full_size() {
        let mut options = DecodeOptions {
            bounds_only: true,
            ..DecodeOptions::default()
        };
        options.calculate_sample_size(TargetSize {
            width: 10,
            height: 10,
        });
        assert_eq!(options.sample_size, 1);
        assert!(!options.bounds_only);
    }

    #[test]
    fn test_decode_options_uses_probed_bounds() {
        let mut options = DecodeOptions {
            bounds_only: true,
            out_size: Some((400, 300)),
            ..DecodeOptions::default()
        };
        options.calculate_sample_size(TargetSize {
            width: 100,
            height: 75,
        });
        assert_eq!(options.sample_size, 4);
    }

    #[test]
    fn test_pixel_config_converts_layout() {
        let rgb = DynamicImage::ImageRgb8(RgbImage::new(2, 2));
        assert!(matches!(
            PixelConfig::Rgba8.apply(rgb.clone()),
            DynamicImage::ImageRgba8(_)
        ));
        assert!(matches!(
            PixelConfig::Luma8.apply(rgb),
            DynamicImage::ImageLuma8(_)
        ));
        let gray = DynamicImage::ImageLuma8(GrayImage::new(1, 1));
        assert!(matches!(
            PixelConfig::Luma8.apply(gray),
            DynamicImage::ImageLuma8(_)
        ));
    }
}
