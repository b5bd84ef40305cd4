// src/hunter/resource.rs
//
// res:///<id> or res:///<type>/<name>: compiled-in resources.

use super::{decode_two_pass, open_failed, Decoded, LoadedFrom, SourceHunter};
use crate::engine::{ResourceStore, Rotation};
use crate::error::{DecodeError, Result};
use crate::request::Request;
use std::sync::Arc;

pub struct ResourceHunter {
    resources: Arc<dyn ResourceStore>,
}

impl ResourceHunter {
    pub fn new(resources: Arc<dyn ResourceStore>) -> Self {
        Self { resources }
    }

    fn resource_id(&self, request: &Request) -> Result<u32> {
        let locator = request.locator();
        let segments: Vec<&str> = locator
            .path_segments()
            .map(|s| s.filter(|segment| !segment.is_empty()).collect())
            .unwrap_or_default();

        match segments.as_slice() {
            [id] => id.parse().map_err(|_| {
                DecodeError::invalid_locator(locator.to_string(), "resource id is not a number")
            }),
            [kind, name] => self
                .resources
                .identifier(kind, name)
                .ok_or_else(|| DecodeError::not_found(locator.to_string())),
            _ => Err(DecodeError::invalid_locator(
                locator.to_string(),
                "expected res:///<id> or res:///<type>/<name>",
            )),
        }
    }
}

impl SourceHunter for ResourceHunter {
    fn decode(&mut self, request: &Request) -> Result<Option<Decoded>> {
        let id = self.resource_id(request)?;
        let locator = request.locator().as_str();
        let bitmap = decode_two_pass(request, || {
            self.resources.open(id).map_err(open_failed(locator))
        })?;
        Ok(Some(Decoded::new(bitmap, Rotation::None, LoadedFrom::Disk)))
    }

    fn loaded_from(&self) -> LoadedFrom {
        LoadedFrom::Disk
    }
}
