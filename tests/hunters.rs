// tests/hunters.rs
//
// Every source variant end to end: locator -> Sources -> Hunter -> Decoded.

use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage};
use parking_lot::Mutex;
use pixel_hunter::engine::{
    BundledResources, ByteStream, ContentResolver, DirectoryAssets, Downloader, NetworkInfo,
    NetworkState, ProviderError, Response, ThumbnailKind, ThumbnailProvider,
};
use pixel_hunter::{
    DecodeOptions, ErrorCategory, FakeStorage, HuntConfig, Hunter, LoadedFrom, Request, Rotation,
    SourceHunter, Sources,
};
use std::io::{self, Cursor};
use std::sync::Arc;
use url::Url;

fn create_test_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }))
}

fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

fn encode_webp(width: u32, height: u32) -> Vec<u8> {
    let rgb = create_test_image(width, height).to_rgb8();
    webp::Encoder::from_rgb(rgb.as_raw(), width, height)
        .encode_lossless()
        .to_vec()
}

/// JPEG with an EXIF APP1 segment carrying only an Orientation tag.
fn jpeg_with_orientation(width: u32, height: u32, orientation: u16) -> Vec<u8> {
    let jpeg = encode(&create_test_image(width, height), ImageFormat::Jpeg);
    let mut tiff = vec![b'I', b'I', 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00];
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x0112u16.to_le_bytes());
    tiff.extend_from_slice(&3u16.to_le_bytes());
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&orientation.to_le_bytes());
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&0u32.to_le_bytes());

    let mut app1 = b"Exif\0\0".to_vec();
    app1.extend_from_slice(&tiff);
    let len = (app1.len() + 2) as u16;

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(&app1);
    out.extend_from_slice(&jpeg[2..]);
    out
}

fn hunt(sources: &Sources, request: &Request) -> pixel_hunter::Decoded {
    let mut hunter = Hunter::for_request(sources, request).unwrap();
    hunter.decode(request).unwrap().unwrap()
}

mod file_tests {
    use super::*;

    #[test]
    fn test_exif_rotation_is_reported_not_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rotated.jpg");
        std::fs::write(&path, jpeg_with_orientation(64, 32, 6)).unwrap();

        let request = Request::from_url(Url::from_file_path(&path).unwrap())
            .resize(16, 8)
            .unwrap();
        let decoded = hunt(&Sources::new(), &request);
        assert_eq!(decoded.rotation, Rotation::Cw90);
        assert_eq!(decoded.bitmap.dimensions(), (16, 8));
        assert_eq!(decoded.loaded_from, LoadedFrom::Disk);
        assert_eq!(decoded.into_oriented().dimensions(), (8, 16));
    }

    #[test]
    fn test_mirrored_exif_is_no_rotation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mirrored.jpg");
        std::fs::write(&path, jpeg_with_orientation(8, 8, 2)).unwrap();
        let request = Request::from_url(Url::from_file_path(&path).unwrap());
        assert_eq!(hunt(&Sources::new(), &request).rotation, Rotation::None);
    }
}

mod asset_tests {
    use super::*;

    #[test]
    fn test_asset_two_pass() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("banner.png"),
            encode(&create_test_image(200, 100), ImageFormat::Png),
        )
        .unwrap();
        let sources = Sources::new().with_assets(DirectoryAssets::new(dir.path()));
        let request = Request::new("asset:///banner.png").unwrap().resize(50, 20).unwrap();
        let decoded = hunt(&sources, &request);
        // 200x100 against 50x20: factor 4.
        assert_eq!(decoded.bitmap.dimensions(), (50, 25));
        assert_eq!(decoded.loaded_from, LoadedFrom::Disk);
    }
}

mod resource_tests {
    use super::*;

    #[test]
    fn test_resource_by_name() {
        let mut resources = BundledResources::new();
        resources.insert(
            1,
            "drawable",
            "hero",
            encode(&create_test_image(64, 64), ImageFormat::Jpeg),
        );
        let sources = Sources::new().with_resources(resources);
        let request = Request::new("res:///drawable/hero").unwrap().resize(8, 8).unwrap();
        assert_eq!(hunt(&sources, &request).bitmap.dimensions(), (8, 8));
    }
}

mod content_tests {
    use super::*;

    struct MediaStore {
        body: Vec<u8>,
    }

    impl ContentResolver for MediaStore {
        fn open(&self, _uri: &Url) -> io::Result<ByteStream> {
            Ok(Box::new(Cursor::new(self.body.clone())))
        }

        fn query_orientation(&self, uri: &Url) -> Result<Option<i32>, ProviderError> {
            if uri.path().contains("/video/") {
                Err(ProviderError::ColumnMissing {
                    column: "orientation",
                })
            } else {
                Ok(Some(270))
            }
        }
    }

    struct MicroOnly;

    impl ThumbnailProvider for MicroOnly {
        fn thumbnail(
            &self,
            _id: u64,
            kind: ThumbnailKind,
            _options: &DecodeOptions,
        ) -> Option<Arc<DynamicImage>> {
            (kind == ThumbnailKind::Micro).then(|| Arc::new(create_test_image(96, 96)))
        }
    }

    fn sources() -> Sources {
        Sources::new()
            .with_content(MediaStore {
                body: encode(&create_test_image(640, 480), ImageFormat::Png),
            })
            .with_thumbnails(MicroOnly)
    }

    #[test]
    fn test_media_store_thumbnail_and_fallback() {
        let sources = sources();

        let micro = Request::new("content://media/external/images/media/3")
            .unwrap()
            .resize(48, 48)
            .unwrap();
        let decoded = hunt(&sources, &micro);
        assert_eq!(decoded.bitmap.dimensions(), (96, 96));
        assert_eq!(decoded.rotation, Rotation::Cw270);

        let mini = Request::new("content://media/external/images/media/3")
            .unwrap()
            .resize(300, 200)
            .unwrap();
        let decoded = hunt(&sources, &mini);
        assert_eq!(decoded.bitmap.dimensions(), (320, 240));
        assert_eq!(decoded.loaded_from, LoadedFrom::Disk);
    }

    #[test]
    fn test_orientation_query_failure_is_swallowed() {
        let request = Request::new("content://media/external/video/media/9").unwrap();
        let decoded = hunt(&sources(), &request);
        assert_eq!(decoded.rotation, Rotation::None);
        assert_eq!(decoded.bitmap.dimensions(), (640, 480));
    }
}

mod network_tests {
    use super::*;

    /// Fails with a connection reset until asked for a cache-only load.
    struct Flaky {
        body: Vec<u8>,
        calls: Mutex<Vec<bool>>,
    }

    impl Downloader for Flaky {
        fn load(&self, _uri: &Url, local_cache_only: bool) -> io::Result<Option<Response>> {
            self.calls.lock().push(local_cache_only);
            if local_cache_only {
                Ok(Some(Response::from_stream(Cursor::new(self.body.clone()), true)))
            } else {
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"))
            }
        }
    }

    struct Shared(Arc<Flaky>);

    impl Downloader for Shared {
        fn load(&self, uri: &Url, local_cache_only: bool) -> io::Result<Option<Response>> {
            self.0.load(uri, local_cache_only)
        }
    }

    #[test]
    fn test_retry_until_cache_only() {
        let flaky = Arc::new(Flaky {
            body: encode(&create_test_image(40, 40), ImageFormat::Png),
            calls: Mutex::new(Vec::new()),
        });
        let sources = Sources::new().with_downloader(Shared(flaky.clone()));
        let request = Request::new("https://example.com/a.png").unwrap();
        let mut hunter = Hunter::for_request(&sources, &request).unwrap();

        let decoded = loop {
            match hunter.decode(&request) {
                Ok(decoded) => break decoded.unwrap(),
                Err(err) => {
                    assert_eq!(err.category(), ErrorCategory::IoFailure);
                    assert!(err.is_transient());
                    assert!(hunter.should_retry(false, None), "retry budget ran out");
                }
            }
        };
        assert_eq!(*flaky.calls.lock(), vec![false, false, true]);
        assert_eq!(decoded.loaded_from, LoadedFrom::Disk);
        assert_eq!(hunter.loaded_from(), LoadedFrom::Disk);
    }

    #[test]
    fn test_offline_stops_retrying() {
        let flaky = Arc::new(Flaky {
            body: Vec::new(),
            calls: Mutex::new(Vec::new()),
        });
        let sources = Sources::new()
            .with_config(HuntConfig::default().with_retry_budget(5))
            .with_downloader(Shared(flaky));
        let request = Request::new("https://example.com/a.png").unwrap();
        let mut hunter = Hunter::for_request(&sources, &request).unwrap();

        assert!(hunter.decode(&request).is_err());
        let offline = NetworkInfo::new(NetworkState::Disconnected);
        assert!(!hunter.should_retry(true, Some(&offline)));
    }

    struct Body(Vec<u8>, bool);

    impl Downloader for Body {
        fn load(&self, _uri: &Url, _local_cache_only: bool) -> io::Result<Option<Response>> {
            Ok(Some(Response::from_stream(Cursor::new(self.0.clone()), self.1)))
        }
    }

    #[test]
    fn test_webp_stream_is_buffered_and_sampled() {
        let sources = Sources::new().with_downloader(Body(encode_webp(64, 32), false));
        let request = Request::new("https://example.com/a.webp")
            .unwrap()
            .resize(16, 8)
            .unwrap();
        let decoded = hunt(&sources, &request);
        assert_eq!(decoded.bitmap.dimensions(), (16, 8));
        assert_eq!(decoded.loaded_from, LoadedFrom::Network);
    }

    #[test]
    fn test_small_mark_window_still_decodes() {
        let png = encode(&create_test_image(64, 64), ImageFormat::Png);
        let sources = Sources::new()
            .with_config(HuntConfig::default().with_mark_limit(1024))
            .with_downloader(Body(png, true));
        let request = Request::new("https://example.com/a.png").unwrap().resize(8, 8).unwrap();
        let decoded = hunt(&sources, &request);
        assert_eq!(decoded.bitmap.dimensions(), (8, 8));
    }

    struct Ready(Arc<DynamicImage>);

    impl Downloader for Ready {
        fn load(&self, _uri: &Url, _local_cache_only: bool) -> io::Result<Option<Response>> {
            Ok(Some(Response::from_bitmap(self.0.clone(), false)))
        }
    }

    #[test]
    fn test_ready_bitmap_skips_decode() {
        let bitmap = Arc::new(create_test_image(7, 5));
        let sources = Sources::new().with_downloader(Ready(bitmap.clone()));
        let request = Request::new("https://example.com/a.png").unwrap().resize(2, 2).unwrap();
        let decoded = hunt(&sources, &request);
        assert!(Arc::ptr_eq(&decoded.bitmap, &bitmap));
    }
}

mod fake_tests {
    use super::*;

    #[test]
    fn test_fake_lookup_by_path() {
        let storage = Arc::new(FakeStorage::new());
        let registered = Arc::new(create_test_image(3, 3));
        storage.put("/avatars/1", registered.clone());
        let sources = Sources::new().with_fake_storage(storage.clone());

        let request = Request::new("fakelocal:///avatars/1").unwrap();
        let decoded = hunt(&sources, &request);
        assert_eq!(decoded.loaded_from, LoadedFrom::Memory);
        assert!(Arc::ptr_eq(&decoded.bitmap, &registered));
        assert_eq!(storage.insertions(), 1);
    }

    #[test]
    fn test_fake_returns_registered_buffer_regardless_of_target() {
        let storage = Arc::new(FakeStorage::new());
        let registered = Arc::new(create_test_image(40, 40));
        storage.put("/big", registered.clone());
        let sources = Sources::new().with_fake_storage(storage);

        let request = Request::new("fakelocal:///big").unwrap().resize(4, 4).unwrap();
        let decoded = hunt(&sources, &request);
        assert!(Arc::ptr_eq(&decoded.bitmap, &registered));
        assert_eq!(decoded.bitmap.dimensions(), (40, 40));
    }
}
