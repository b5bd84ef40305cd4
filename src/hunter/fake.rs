// src/hunter/fake.rs
//
// fakelocal://: images registered in-process under a string key.

use super::{Decoded, LoadedFrom, SourceHunter};
use crate::engine::Rotation;
use crate::error::Result;
use crate::request::Request;
use image::DynamicImage;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

static GLOBAL: Lazy<FakeStorage> = Lazy::new(FakeStorage::new);

/// Thread-safe key -> bitmap table backing `fakelocal` locators.
///
/// Keys are the locator path (`fakelocal:///avatars/1` -> `/avatars/1`).
#[derive(Debug, Default)]
pub struct FakeStorage {
    bitmaps: RwLock<HashMap<String, Arc<DynamicImage>>>,
    insertions: AtomicUsize,
}

impl FakeStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide table used when no storage is injected.
    pub fn global() -> &'static FakeStorage {
        &GLOBAL
    }

    /// Register (or replace) a bitmap. Every call counts as an insertion.
    pub fn put(&self, key: impl Into<String>, bitmap: impl Into<Arc<DynamicImage>>) {
        self.bitmaps.write().insert(key.into(), bitmap.into());
        self.insertions.fetch_add(1, Ordering::SeqCst);
    }

    /// Remove a key. Does not touch the insertion counter.
    pub fn remove(&self, key: &str) -> Option<Arc<DynamicImage>> {
        self.bitmaps.write().remove(key)
    }

    pub fn get(&self, key: &str) -> Option<Arc<DynamicImage>> {
        self.bitmaps.read().get(key).cloned()
    }

    /// Total `put` calls since creation (or the last `clear`).
    pub fn insertions(&self) -> usize {
        self.insertions.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.bitmaps.write().clear();
        self.insertions.store(0, Ordering::SeqCst);
    }
}

pub struct FakeHunter {
    storage: Option<Arc<FakeStorage>>,
}

impl FakeHunter {
    pub fn new(storage: Option<Arc<FakeStorage>>) -> Self {
        Self { storage }
    }

    fn storage(&self) -> &FakeStorage {
        self.storage.as_deref().unwrap_or_else(|| FakeStorage::global())
    }
}

impl SourceHunter for FakeHunter {
    fn decode(&mut self, request: &Request) -> Result<Option<Decoded>> {
        Ok(self
            .storage()
            .get(request.locator().path())
            .map(|bitmap| Decoded::new(bitmap, Rotation::None, LoadedFrom::Memory)))
    }

    fn loaded_from(&self) -> LoadedFrom {
        LoadedFrom::Memory
    }
}
