// src/error.rs
//
// Unified error handling for pixel-hunter
// Uses thiserror for simple, type-safe error handling
//
// Error Taxonomy:
// - NotFound: the locator resolves to nothing
// - InvalidFormat: bytes are not decodable as an image (or exceed limits)
// - IoFailure: transient or permanent I/O error reading the source
// - InvalidRequest: malformed locator/target, or no source for the scheme
// - InternalBug: a codec panicked (should not happen)
//
// Absent metadata (orientation) is never an error here: hunters recover it
// locally as Rotation::None.

use std::borrow::Cow;
use std::io;
use thiserror::Error;

/// Error taxonomy shared by every hunter variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Locator resolves to nothing
    NotFound,
    /// Bytes are not a decodable image
    InvalidFormat,
    /// Reading the source failed
    IoFailure,
    /// The request itself cannot be served
    InvalidRequest,
    /// Library bugs (should not happen)
    InternalBug,
}

/// pixel-hunter error types
#[derive(Debug, Error)]
pub enum DecodeError {
    // Source Errors
    #[error("No image at '{locator}'")]
    NotFound { locator: Cow<'static, str> },

    #[error("Failed to read '{locator}': {source}")]
    ReadFailed {
        locator: Cow<'static, str>,
        #[source]
        source: io::Error,
    },

    // Decode Errors
    #[error("Unrecognized image format")]
    UnknownFormat,

    #[error("Failed to decode image: {message}")]
    DecodeFailed { message: Cow<'static, str> },

    #[error("Image dimension {dimension} exceeds maximum {max}")]
    DimensionExceedsLimit { dimension: u32, max: u32 },

    #[error("Image pixel count {pixels} exceeds maximum {max}")]
    PixelCountExceedsLimit { pixels: u64, max: u64 },

    // Request Errors
    #[error("Invalid locator '{locator}': {reason}")]
    InvalidLocator {
        locator: Cow<'static, str>,
        reason: Cow<'static, str>,
    },

    #[error("Invalid target size: width={width}, height={height}. Both must be positive")]
    InvalidTargetSize { width: u32, height: u32 },

    #[error("No image source registered for scheme '{scheme}'")]
    NoHandler { scheme: Cow<'static, str> },

    // Internal Errors
    #[error("Internal error: {message}")]
    InternalPanic { message: Cow<'static, str> },
}

impl Clone for DecodeError {
    fn clone(&self) -> Self {
        match self {
            Self::NotFound { locator } => Self::NotFound {
                locator: locator.clone(),
            },
            Self::ReadFailed { locator, source } => Self::ReadFailed {
                locator: locator.clone(),
                source: io::Error::new(source.kind(), source.to_string()),
            },
            Self::UnknownFormat => Self::UnknownFormat,
            Self::DecodeFailed { message } => Self::DecodeFailed {
                message: message.clone(),
            },
            Self::DimensionExceedsLimit { dimension, max } => Self::DimensionExceedsLimit {
                dimension: *dimension,
                max: *max,
            },
            Self::PixelCountExceedsLimit { pixels, max } => Self::PixelCountExceedsLimit {
                pixels: *pixels,
                max: *max,
            },
            Self::InvalidLocator { locator, reason } => Self::InvalidLocator {
                locator: locator.clone(),
                reason: reason.clone(),
            },
            Self::InvalidTargetSize { width, height } => Self::InvalidTargetSize {
                width: *width,
                height: *height,
            },
            Self::NoHandler { scheme } => Self::NoHandler {
                scheme: scheme.clone(),
            },
            Self::InternalPanic { message } => Self::InternalPanic {
                message: message.clone(),
            },
        }
    }
}

// Constructor Helpers
impl DecodeError {
    pub fn not_found(locator: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound {
            locator: locator.into(),
        }
    }

    pub fn read_failed(locator: impl Into<Cow<'static, str>>, source: io::Error) -> Self {
        Self::ReadFailed {
            locator: locator.into(),
            source,
        }
    }

    /// Map an I/O error onto the taxonomy: a missing entry is `NotFound`,
    /// anything else is a read failure.
    pub fn from_io(locator: impl Into<Cow<'static, str>>, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::not_found(locator)
        } else {
            Self::read_failed(locator, source)
        }
    }

    pub fn unknown_format() -> Self {
        Self::UnknownFormat
    }

    pub fn decode_failed(message: impl Into<Cow<'static, str>>) -> Self {
        Self::DecodeFailed {
            message: message.into(),
        }
    }

    pub fn dimension_exceeds_limit(dimension: u32, max: u32) -> Self {
        Self::DimensionExceedsLimit { dimension, max }
    }

    pub fn pixel_count_exceeds_limit(pixels: u64, max: u64) -> Self {
        Self::PixelCountExceedsLimit { pixels, max }
    }

    pub fn invalid_locator(
        locator: impl Into<Cow<'static, str>>,
        reason: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::InvalidLocator {
            locator: locator.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_target_size(width: u32, height: u32) -> Self {
        Self::InvalidTargetSize { width, height }
    }

    pub fn no_handler(scheme: impl Into<Cow<'static, str>>) -> Self {
        Self::NoHandler {
            scheme: scheme.into(),
        }
    }

    pub fn internal_panic(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InternalPanic {
            message: message.into(),
        }
    }

    /// Get the error category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,

            Self::ReadFailed { .. } => ErrorCategory::IoFailure,

            // Limit violations are reported as format problems: the bytes describe
            // an image this pipeline refuses to materialize.
            Self::UnknownFormat
            | Self::DecodeFailed { .. }
            | Self::DimensionExceedsLimit { .. }
            | Self::PixelCountExceedsLimit { .. } => ErrorCategory::InvalidFormat,

            Self::InvalidLocator { .. }
            | Self::InvalidTargetSize { .. }
            | Self::NoHandler { .. } => ErrorCategory::InvalidRequest,

            Self::InternalPanic { .. } => ErrorCategory::InternalBug,
        }
    }

    /// True for I/O failures that may succeed on another attempt.
    ///
    /// Only read failures qualify; a missing source or undecodable bytes will
    /// fail the same way every time.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ReadFailed { source, .. } => matches!(
                source.kind(),
                io::ErrorKind::TimedOut
                    | io::ErrorKind::Interrupted
                    | io::ErrorKind::WouldBlock
                    | io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::NotConnected
                    | io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }
}

// Result type alias
pub type Result<T> = std::result::Result<T, DecodeError>;
