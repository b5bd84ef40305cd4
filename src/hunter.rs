// src/hunter.rs
//
// Source hunters: one per locator scheme. A hunter is built for exactly one
// request, fetches the bytes from its source, decodes them (two-pass when the
// request has a target size) and reports where the pixels came from.
//
// This file is a facade over the variants in hunter/

mod asset;
mod content;
mod fake;
mod file;
mod network;
mod resource;

pub use asset::AssetHunter;
pub use content::{ContentHunter, MEDIA_AUTHORITY};
pub use fake::{FakeHunter, FakeStorage};
pub use file::FileHunter;
pub use network::NetworkHunter;
pub use resource::ResourceHunter;

pub use crate::engine::ThumbnailKind;

use crate::engine::{
    decode_bounds, decode_bytes, decode_reader, AssetStore, ByteStream, Container,
    ContentResolver, Downloader, MarkableReader, NetworkInfo, ResourceStore, Rotation,
    ThumbnailProvider, DEFAULT_RETRY_COUNT, MARK_LIMIT,
};
use crate::error::{DecodeError, Result};
use crate::request::{DecodeOptions, Request};
use image::DynamicImage;
use std::fmt;
use std::io::Read;
use std::sync::Arc;
use tracing::debug;

/// Where a decoded image came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoadedFrom {
    Memory,
    Disk,
    Network,
}

impl LoadedFrom {
    /// Opaque RGBA color of the debug indicator for this provenance.
    pub fn debug_color(self) -> [u8; 4] {
        match self {
            Self::Memory => [0, 255, 0, 255],
            Self::Disk => [255, 255, 0, 255],
            Self::Network => [255, 0, 0, 255],
        }
    }
}

/// Pixels plus the rotation the source asked for. The rotation is not baked in.
#[derive(Clone, Debug)]
pub struct Decoded {
    pub bitmap: Arc<DynamicImage>,
    pub rotation: Rotation,
    pub loaded_from: LoadedFrom,
}

impl Decoded {
    pub fn new(bitmap: impl Into<Arc<DynamicImage>>, rotation: Rotation, loaded_from: LoadedFrom) -> Self {
        Self {
            bitmap: bitmap.into(),
            rotation,
            loaded_from,
        }
    }

    /// Pixels with the rotation applied.
    pub fn into_oriented(self) -> DynamicImage {
        let bitmap = Arc::try_unwrap(self.bitmap).unwrap_or_else(|shared| (*shared).clone());
        self.rotation.apply(bitmap)
    }
}

/// Common contract of every source.
pub trait SourceHunter {
    /// Fetch and decode. `Ok(None)` means the source definitively has no
    /// image for this locator, which is not an error.
    fn decode(&mut self, request: &Request) -> Result<Option<Decoded>>;

    fn loaded_from(&self) -> LoadedFrom;

    /// Whether a failed `decode` should be attempted again. Local sources never retry.
    fn should_retry(&mut self, _airplane_mode: bool, _network: Option<&NetworkInfo>) -> bool {
        false
    }
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Knobs shared by every hunter built from a [`Sources`] registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HuntConfig {
    /// Network retries per request.
    pub retry_budget: u32,
    /// Bytes retained behind the stream mark for sniffing and the bounds probe.
    pub mark_limit: usize,
}

impl Default for HuntConfig {
    fn default() -> Self {
        Self {
            retry_budget: DEFAULT_RETRY_COUNT,
            mark_limit: MARK_LIMIT,
        }
    }
}

impl HuntConfig {
    pub fn with_retry_budget(mut self, retry_budget: u32) -> Self {
        self.retry_budget = retry_budget;
        self
    }

    pub fn with_mark_limit(mut self, mark_limit: usize) -> Self {
        self.mark_limit = mark_limit;
        self
    }
}

/// Collaborators hunters read from. Absent collaborators make their scheme
/// unavailable; `file` and `fakelocal` always work.
#[derive(Clone, Default)]
pub struct Sources {
    config: HuntConfig,
    downloader: Option<Arc<dyn Downloader>>,
    assets: Option<Arc<dyn AssetStore>>,
    resources: Option<Arc<dyn ResourceStore>>,
    content: Option<Arc<dyn ContentResolver>>,
    thumbnails: Option<Arc<dyn ThumbnailProvider>>,
    fake: Option<Arc<FakeStorage>>,
}

impl Sources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: HuntConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_downloader(mut self, downloader: impl Downloader + 'static) -> Self {
        self.downloader = Some(Arc::new(downloader));
        self
    }

    pub fn with_assets(mut self, assets: impl AssetStore + 'static) -> Self {
        self.assets = Some(Arc::new(assets));
        self
    }

    pub fn with_resources(mut self, resources: impl ResourceStore + 'static) -> Self {
        self.resources = Some(Arc::new(resources));
        self
    }

    pub fn with_content(mut self, resolver: impl ContentResolver + 'static) -> Self {
        self.content = Some(Arc::new(resolver));
        self
    }

    pub fn with_thumbnails(mut self, provider: impl ThumbnailProvider + 'static) -> Self {
        self.thumbnails = Some(Arc::new(provider));
        self
    }

    /// Serve `fakelocal` from this table instead of [`FakeStorage::global`].
    pub fn with_fake_storage(mut self, storage: Arc<FakeStorage>) -> Self {
        self.fake = Some(storage);
        self
    }

    pub fn config(&self) -> &HuntConfig {
        &self.config
    }
}

impl fmt::Debug for Sources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sources")
            .field("config", &self.config)
            .field("downloader", &self.downloader.is_some())
            .field("assets", &self.assets.is_some())
            .field("resources", &self.resources.is_some())
            .field("content", &self.content.is_some())
            .field("thumbnails", &self.thumbnails.is_some())
            .field("fake", &self.fake.is_some())
            .finish()
    }
}

// =============================================================================
// DISPATCH
// =============================================================================

/// The closed set of source variants.
pub enum Hunter {
    Network(NetworkHunter),
    File(FileHunter),
    Asset(AssetHunter),
    Content(ContentHunter),
    Resource(ResourceHunter),
    Fake(FakeHunter),
}

impl Hunter {
    /// Pick the variant for the request's scheme.
    pub fn for_request(sources: &Sources, request: &Request) -> Result<Self> {
        let scheme = request.locator().scheme();
        let missing = || DecodeError::no_handler(scheme.to_string());

        let hunter = match scheme {
            "http" | "https" => {
                let downloader = sources.downloader.clone().ok_or_else(missing)?;
                Self::Network(NetworkHunter::new(downloader, &sources.config))
            }
            "file" => Self::File(FileHunter::new(request.locator())?),
            "asset" => {
                let assets = sources.assets.clone().ok_or_else(missing)?;
                Self::Asset(AssetHunter::new(assets))
            }
            "content" => {
                let resolver = sources.content.clone().ok_or_else(missing)?;
                Self::Content(ContentHunter::new(resolver, sources.thumbnails.clone()))
            }
            "res" => {
                let resources = sources.resources.clone().ok_or_else(missing)?;
                Self::Resource(ResourceHunter::new(resources))
            }
            "fakelocal" => Self::Fake(FakeHunter::new(sources.fake.clone())),
            _ => return Err(missing()),
        };
        debug!(
            target: "pixel_hunter::hunter",
            locator = %request.locator(),
            variant = hunter.name(),
            "hunter selected"
        );
        Ok(hunter)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::File(_) => "file",
            Self::Asset(_) => "asset",
            Self::Content(_) => "content",
            Self::Resource(_) => "resource",
            Self::Fake(_) => "fake",
        }
    }

    fn as_source(&mut self) -> &mut dyn SourceHunter {
        match self {
            Self::Network(h) => h,
            Self::File(h) => h,
            Self::Asset(h) => h,
            Self::Content(h) => h,
            Self::Resource(h) => h,
            Self::Fake(h) => h,
        }
    }
}

impl SourceHunter for Hunter {
    fn decode(&mut self, request: &Request) -> Result<Option<Decoded>> {
        let result = self.as_source().decode(request);
        match &result {
            Ok(Some(decoded)) => debug!(
                target: "pixel_hunter::hunter",
                locator = %request.locator(),
                width = decoded.bitmap.width(),
                height = decoded.bitmap.height(),
                rotation = decoded.rotation.degrees(),
                loaded_from = ?decoded.loaded_from,
                "decoded"
            ),
            Ok(None) => debug!(
                target: "pixel_hunter::hunter",
                locator = %request.locator(),
                "source has no image"
            ),
            Err(err) => debug!(
                target: "pixel_hunter::hunter",
                locator = %request.locator(),
                error = %err,
                category = ?err.category(),
                "decode failed"
            ),
        }
        result
    }

    fn loaded_from(&self) -> LoadedFrom {
        match self {
            Self::Network(h) => h.loaded_from(),
            Self::File(h) => h.loaded_from(),
            Self::Asset(h) => h.loaded_from(),
            Self::Content(h) => h.loaded_from(),
            Self::Resource(h) => h.loaded_from(),
            Self::Fake(h) => h.loaded_from(),
        }
    }

    fn should_retry(&mut self, airplane_mode: bool, network: Option<&NetworkInfo>) -> bool {
        self.as_source().should_retry(airplane_mode, network)
    }
}

// =============================================================================
// SHARED DECODE PATHS
// =============================================================================

/// Bounds-then-full decode over a source that can be reopened.
///
/// Without a target size the probe pass is skipped. The probe is not held to
/// the mark window since nothing has to be rewound. Every stream is dropped
/// before the next one is opened.
pub fn decode_two_pass<F>(request: &Request, mut open: F) -> Result<DynamicImage>
where
    F: FnMut() -> Result<ByteStream>,
{
    let locator = request.locator().as_str();
    let mut options = DecodeOptions::for_request(request);

    if let Some(target) = request.target_size() {
        decode_bounds(open()?, &mut options, locator, None)?;
        options.calculate_sample_size(target);
        debug!(
            target: "pixel_hunter::decode",
            locator,
            bounds = ?options.out_size,
            sample_size = options.sample_size,
            "probe pass done"
        );
    }

    decode_reader(open()?, &options, locator)
}

/// Bounds-then-full decode over a single forward-only stream.
///
/// The stream is marked, sniffed and rewound. Containers that need it are
/// buffered and decoded from memory; everything else is probed within the
/// mark window, rewound again and decoded.
pub(crate) fn decode_stream<R: Read>(
    request: &Request,
    stream: R,
    mark_limit: usize,
) -> Result<DynamicImage> {
    let locator = request.locator().as_str();
    let io_err = |e: std::io::Error| DecodeError::from_io(locator.to_string(), e);

    let mut stream = MarkableReader::new(stream);
    let mark = stream.save_position(mark_limit);
    let container = Container::sniff(&mut stream, mark).map_err(io_err)?;
    let mut options = DecodeOptions::for_request(request);

    if container.requires_buffering() {
        let mut bytes = Vec::new();
        stream.read_to_end(&mut bytes).map_err(io_err)?;
        debug!(
            target: "pixel_hunter::decode",
            locator,
            len = bytes.len(),
            "buffered stream for in-memory decode"
        );
        if let Some(target) = request.target_size() {
            decode_bounds(&bytes[..], &mut options, locator, None)?;
            options.calculate_sample_size(target);
        }
        return decode_bytes(&bytes, &options);
    }

    if let Some(target) = request.target_size() {
        decode_bounds(stream.by_ref(), &mut options, locator, Some(mark_limit))?;
        options.calculate_sample_size(target);
        stream.reset(mark).map_err(io_err)?;
    }
    decode_reader(stream, &options, locator)
}

fn open_failed(locator: &str) -> impl Fn(std::io::Error) -> DecodeError + '_ {
    move |e| DecodeError::from_io(locator.to_string(), e)
}
