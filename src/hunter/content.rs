// src/hunter/content.rs
//
// content://: streams from a content resolver. Media-store locators
// additionally carry an orientation column and pre-rendered thumbnails.

use super::{decode_two_pass, open_failed, Decoded, LoadedFrom, SourceHunter};
use crate::engine::{ContentResolver, Rotation, ThumbnailKind, ThumbnailProvider};
use crate::error::Result;
use crate::request::{DecodeOptions, Request};
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Authority of media-store locators (`content://media/...`).
pub const MEDIA_AUTHORITY: &str = "media";

pub struct ContentHunter {
    resolver: Arc<dyn ContentResolver>,
    thumbnails: Option<Arc<dyn ThumbnailProvider>>,
}

impl ContentHunter {
    pub fn new(
        resolver: Arc<dyn ContentResolver>,
        thumbnails: Option<Arc<dyn ThumbnailProvider>>,
    ) -> Self {
        Self {
            resolver,
            thumbnails,
        }
    }

    /// Orientation column, or no rotation when the provider cannot answer.
    fn media_rotation(&self, uri: &Url) -> Rotation {
        match self.resolver.query_orientation(uri) {
            Ok(Some(degrees)) => Rotation::from_degrees(degrees),
            Ok(None) => Rotation::None,
            Err(err) => {
                debug!(
                    target: "pixel_hunter::hunter",
                    locator = %uri,
                    error = %err,
                    "orientation query failed; assuming no rotation"
                );
                Rotation::None
            }
        }
    }

    /// Pre-rendered thumbnail for small targets. `None` falls through to a full decode.
    fn thumbnail(&self, request: &Request) -> Option<Arc<image::DynamicImage>> {
        let provider = self.thumbnails.as_ref()?;
        let target = request.target_size()?;
        let kind = ThumbnailKind::for_target(target);
        let (width, height) = kind.nominal_size()?;
        let id = content_id(request.locator())?;

        let mut options = DecodeOptions::for_request(request);
        options.bounds_only = true;
        options.calculate_sample_size_for(target, width, height);
        debug!(
            target: "pixel_hunter::hunter",
            locator = %request.locator(),
            id,
            kind = ?kind,
            sample_size = options.sample_size,
            "requesting thumbnail"
        );
        provider.thumbnail(id, kind, &options)
    }

    fn decode_stream(&self, request: &Request) -> Result<image::DynamicImage> {
        let uri = request.locator();
        decode_two_pass(request, || {
            self.resolver.open(uri).map_err(open_failed(uri.as_str()))
        })
    }
}

impl SourceHunter for ContentHunter {
    fn decode(&mut self, request: &Request) -> Result<Option<Decoded>> {
        let uri = request.locator();
        if !is_media_store(uri) {
            let bitmap = self.decode_stream(request)?;
            return Ok(Some(Decoded::new(bitmap, Rotation::None, LoadedFrom::Disk)));
        }

        let rotation = self.media_rotation(uri);
        if let Some(bitmap) = self.thumbnail(request) {
            return Ok(Some(Decoded::new(bitmap, rotation, LoadedFrom::Disk)));
        }
        let bitmap = self.decode_stream(request)?;
        Ok(Some(Decoded::new(bitmap, rotation, LoadedFrom::Disk)))
    }

    fn loaded_from(&self) -> LoadedFrom {
        LoadedFrom::Disk
    }
}

fn is_media_store(uri: &Url) -> bool {
    uri.host_str() == Some(MEDIA_AUTHORITY)
}

/// Trailing numeric path segment (`content://media/external/images/media/42` -> 42).
fn content_id(uri: &Url) -> Option<u64> {
    uri.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()?
        .parse()
        .ok()
}
