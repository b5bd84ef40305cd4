// src/engine/sniff.rs
//
// Container sniffing over a markable stream.

use crate::engine::stream::MarkableReader;
use crate::engine::SNIFF_LEN;
use image::ImageFormat;
use std::io::{self, Read};

/// Container classification used to pick the decode path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Container {
    /// RIFF/WEBP. Decoded from a fully buffered byte array.
    WebP,
    /// Anything else; `None` when the magic bytes are not recognized.
    Other(Option<ImageFormat>),
}

impl Container {
    /// Classify a header prefix.
    pub fn classify(header: &[u8]) -> Self {
        if is_webp(header) {
            return Self::WebP;
        }
        Self::Other(image::guess_format(header).ok())
    }

    /// Peek at the stream and rewind it to `mark`.
    ///
    /// `mark` must have been saved with a limit of at least [`SNIFF_LEN`].
    pub fn sniff<R: Read>(stream: &mut MarkableReader<R>, mark: u64) -> io::Result<Self> {
        let mut header = Vec::with_capacity(SNIFF_LEN);
        stream
            .by_ref()
            .take(SNIFF_LEN as u64)
            .read_to_end(&mut header)?;
        stream.reset(mark)?;
        Ok(Self::classify(&header))
    }

    /// The streaming decode path is unreliable for this container; buffer the
    /// whole body and decode from memory instead.
    pub fn requires_buffering(self) -> bool {
        matches!(self, Self::WebP)
    }
}

fn is_webp(header: &[u8]) -> bool {
    header.len() >= 12 && &header[0..4] == b"RIFF" && &header[8..12] == b"WEBP"
}
