// src/hunter/asset.rs
//
// asset:///<path>: bytes packaged with the application.

use super::{decode_two_pass, open_failed, Decoded, LoadedFrom, SourceHunter};
use crate::engine::{AssetStore, Rotation};
use crate::error::{DecodeError, Result};
use crate::request::Request;
use std::sync::Arc;

pub struct AssetHunter {
    assets: Arc<dyn AssetStore>,
}

impl AssetHunter {
    pub fn new(assets: Arc<dyn AssetStore>) -> Self {
        Self { assets }
    }
}

impl SourceHunter for AssetHunter {
    fn decode(&mut self, request: &Request) -> Result<Option<Decoded>> {
        let locator = request.locator().as_str();
        let path = request.locator().path().trim_start_matches('/');
        if path.is_empty() {
            return Err(DecodeError::invalid_locator(locator.to_string(), "empty asset path"));
        }
        let bitmap = decode_two_pass(request, || {
            self.assets.open(path).map_err(open_failed(locator))
        })?;
        Ok(Some(Decoded::new(bitmap, Rotation::None, LoadedFrom::Disk)))
    }

    fn loaded_from(&self) -> LoadedFrom {
        LoadedFrom::Disk
    }
}
