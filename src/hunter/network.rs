// src/hunter/network.rs
//
// http/https: fetch through the injected downloader, decode the body from a
// single forward-only stream.

use super::{decode_stream, Decoded, HuntConfig, LoadedFrom, SourceHunter};
use crate::engine::{Downloader, NetworkInfo, RetryPolicy, Rotation, SNIFF_LEN};
use crate::error::{DecodeError, Result};
use crate::request::Request;
use std::sync::Arc;
use tracing::debug;

pub struct NetworkHunter {
    downloader: Arc<dyn Downloader>,
    retry: RetryPolicy,
    mark_limit: usize,
    loaded_from: LoadedFrom,
}

impl NetworkHunter {
    pub fn new(downloader: Arc<dyn Downloader>, config: &HuntConfig) -> Self {
        Self {
            downloader,
            retry: RetryPolicy::new(config.retry_budget),
            // Sniffing alone needs this much rewind.
            mark_limit: config.mark_limit.max(SNIFF_LEN),
            loaded_from: LoadedFrom::Network,
        }
    }

    pub fn retries_remaining(&self) -> u32 {
        self.retry.remaining()
    }
}

impl SourceHunter for NetworkHunter {
    fn decode(&mut self, request: &Request) -> Result<Option<Decoded>> {
        let uri = request.locator();
        let local_cache_only = self.retry.local_cache_only();

        let response = self
            .downloader
            .load(uri, local_cache_only)
            .map_err(|e| DecodeError::from_io(uri.to_string(), e))?;
        let Some(mut response) = response else {
            return Ok(None);
        };

        self.loaded_from = if response.is_cached() {
            LoadedFrom::Disk
        } else {
            LoadedFrom::Network
        };
        debug!(
            target: "pixel_hunter::hunter",
            locator = %uri,
            local_cache_only,
            cached = response.is_cached(),
            "downloader responded"
        );

        if let Some(bitmap) = response.take_bitmap() {
            return Ok(Some(Decoded::new(bitmap, Rotation::None, self.loaded_from)));
        }

        let Some(stream) = response.take_stream() else {
            return Ok(None);
        };
        let bitmap = decode_stream(request, stream, self.mark_limit)?;
        Ok(Some(Decoded::new(bitmap, Rotation::None, self.loaded_from)))
    }

    fn loaded_from(&self) -> LoadedFrom {
        self.loaded_from
    }

    fn should_retry(&mut self, airplane_mode: bool, network: Option<&NetworkInfo>) -> bool {
        self.retry.should_retry(airplane_mode, network)
    }
}
