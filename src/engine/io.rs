// src/engine/io.rs
//
// Byte sources the hunters read from. Each trait is a seam owned by the host
// (network stack, packaged assets, content providers); the concrete types
// here cover the local cases.

use crate::engine::{MICRO_THUMBNAIL_SIZE, MINI_THUMBNAIL_SIZE};
use crate::request::{DecodeOptions, TargetSize};
use image::DynamicImage;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use url::Url;

pub type ByteStream = Box<dyn Read + Send>;

// =============================================================================
// NETWORK
// =============================================================================

/// What a downloader hands back for one fetch.
pub struct Response {
    cached: bool,
    bitmap: Option<Arc<DynamicImage>>,
    stream: Option<ByteStream>,
}

impl Response {
    pub fn from_stream(stream: impl Read + Send + 'static, cached: bool) -> Self {
        Self {
            cached,
            bitmap: None,
            stream: Some(Box::new(stream)),
        }
    }

    /// The transport already produced pixels (e.g. an in-process image cache).
    pub fn from_bitmap(bitmap: Arc<DynamicImage>, cached: bool) -> Self {
        Self {
            cached,
            bitmap: Some(bitmap),
            stream: None,
        }
    }

    /// Served, but with neither pixels nor a body.
    pub fn empty(cached: bool) -> Self {
        Self {
            cached,
            bitmap: None,
            stream: None,
        }
    }

    /// Answered from the transport's local cache rather than the network.
    pub fn is_cached(&self) -> bool {
        self.cached
    }

    pub fn take_bitmap(&mut self) -> Option<Arc<DynamicImage>> {
        self.bitmap.take()
    }

    pub fn take_stream(&mut self) -> Option<ByteStream> {
        self.stream.take()
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("cached", &self.cached)
            .field("bitmap", &self.bitmap.as_ref().map(|b| (b.width(), b.height())))
            .field("stream", &self.stream.is_some())
            .finish()
    }
}

/// Network transport. `Ok(None)` means the server definitively has no image.
pub trait Downloader: Send + Sync {
    fn load(&self, uri: &Url, local_cache_only: bool) -> io::Result<Option<Response>>;
}

// =============================================================================
// ASSETS
// =============================================================================

/// Files packaged with the application, addressed by relative path.
pub trait AssetStore: Send + Sync {
    fn open(&self, path: &str) -> io::Result<ByteStream>;
}

/// Assets served from a directory on disk.
#[derive(Clone, Debug)]
pub struct DirectoryAssets {
    root: PathBuf,
}

impl DirectoryAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if path.trim_start_matches('/').is_empty() || escapes {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("asset path '{path}' is outside the asset root"),
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl AssetStore for DirectoryAssets {
    fn open(&self, path: &str) -> io::Result<ByteStream> {
        let file = File::open(self.resolve(path)?)?;
        Ok(Box::new(file))
    }
}

// =============================================================================
// RESOURCES
// =============================================================================

/// Compiled-in resources, addressed by numeric id or by (type, name).
pub trait ResourceStore: Send + Sync {
    fn open(&self, id: u32) -> io::Result<ByteStream>;
    fn identifier(&self, kind: &str, name: &str) -> Option<u32>;
}

/// In-memory resource table.
#[derive(Clone, Debug, Default)]
pub struct BundledResources {
    by_id: HashMap<u32, Arc<[u8]>>,
    by_name: HashMap<(String, String), u32>,
}

impl BundledResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        id: u32,
        kind: impl Into<String>,
        name: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> &mut Self {
        self.by_id.insert(id, bytes.into());
        self.by_name.insert((kind.into(), name.into()), id);
        self
    }
}

impl ResourceStore for BundledResources {
    fn open(&self, id: u32) -> io::Result<ByteStream> {
        let bytes = self.by_id.get(&id).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no resource with id {id}"))
        })?;
        Ok(Box::new(Cursor::new(bytes)))
    }

    fn identifier(&self, kind: &str, name: &str) -> Option<u32> {
        self.by_name
            .get(&(kind.to_string(), name.to_string()))
            .copied()
    }
}

// =============================================================================
// CONTENT PROVIDERS
// =============================================================================

/// Failure of a provider metadata query. Never surfaced past a hunter.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("column '{column}' does not exist for this content")]
    ColumnMissing { column: &'static str },

    #[error("provider query failed: {0}")]
    Query(String),
}

/// Content-provider access (`content://` locators).
pub trait ContentResolver: Send + Sync {
    /// Open a fresh stream over the content. Called once per decode pass.
    fn open(&self, uri: &Url) -> io::Result<ByteStream>;

    /// Orientation column in degrees; `Ok(None)` when the row has no value.
    fn query_orientation(&self, uri: &Url) -> Result<Option<i32>, ProviderError>;
}

/// Pre-rendered thumbnail sizes offered by a media store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThumbnailKind {
    Micro,
    Mini,
    Full,
}

impl ThumbnailKind {
    /// Smallest tier that fits the target on both axes (bounds inclusive).
    pub fn for_target(target: TargetSize) -> Self {
        let fits = |(width, height): (u32, u32)| target.width <= width && target.height <= height;
        if fits(MICRO_THUMBNAIL_SIZE) {
            Self::Micro
        } else if fits(MINI_THUMBNAIL_SIZE) {
            Self::Mini
        } else {
            Self::Full
        }
    }

    /// Nominal size of the tier; `None` for full-size decodes.
    pub fn nominal_size(self) -> Option<(u32, u32)> {
        match self {
            Self::Micro => Some(MICRO_THUMBNAIL_SIZE),
            Self::Mini => Some(MINI_THUMBNAIL_SIZE),
            Self::Full => None,
        }
    }
}

/// Media-store thumbnail cache.
pub trait ThumbnailProvider: Send + Sync {
    fn thumbnail(
        &self,
        id: u64,
        kind: ThumbnailKind,
        options: &DecodeOptions,
    ) -> Option<Arc<DynamicImage>>;
}
