// src/engine/orientation.rs
//
// Orientation normalization: raw metadata codes -> clockwise rotation.

use image::DynamicImage;

/// Clockwise rotation a source asks for. Carried next to the pixels; hunters
/// never bake it in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

/// EXIF Orientation values that are pure rotations.
const EXIF_ROTATE_180: u32 = 3;
const EXIF_ROTATE_90: u32 = 6;
const EXIF_ROTATE_270: u32 = 8;

impl Rotation {
    /// Map an EXIF Orientation tag value. Only the three rotation codes
    /// rotate; normal, mirrored and unknown values map to `None`.
    pub fn from_exif(code: u32) -> Self {
        match code {
            EXIF_ROTATE_90 => Self::Cw90,
            EXIF_ROTATE_180 => Self::Cw180,
            EXIF_ROTATE_270 => Self::Cw270,
            _ => Self::None,
        }
    }

    /// Map an orientation expressed in degrees (content-provider column).
    /// Anything but exactly 90, 180 or 270 maps to `None`.
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees {
            90 => Self::Cw90,
            180 => Self::Cw180,
            270 => Self::Cw270,
            _ => Self::None,
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Cw90 => 90,
            Self::Cw180 => 180,
            Self::Cw270 => 270,
        }
    }

    /// Rotate pixels for callers that want the correction baked in.
    pub fn apply(self, img: DynamicImage) -> DynamicImage {
        match self {
            Self::None => img,
            Self::Cw90 => img.rotate90(),
            Self::Cw180 => img.rotate180(),
            Self::Cw270 => img.rotate270(),
        }
    }
}
