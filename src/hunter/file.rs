// src/hunter/file.rs
//
// file://: local files, with EXIF orientation.

use super::{decode_two_pass, open_failed, Decoded, LoadedFrom, SourceHunter};
use crate::engine::{read_file_orientation, ByteStream};
use crate::error::{DecodeError, Result};
use crate::request::Request;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

pub struct FileHunter {
    path: PathBuf,
}

impl FileHunter {
    pub fn new(uri: &Url) -> Result<Self> {
        let path = uri.to_file_path().map_err(|()| {
            DecodeError::invalid_locator(uri.to_string(), "not a local absolute path")
        })?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SourceHunter for FileHunter {
    fn decode(&mut self, request: &Request) -> Result<Option<Decoded>> {
        let locator = request.locator().as_str();
        let rotation = read_file_orientation(&self.path);
        let bitmap = decode_two_pass(request, || {
            let file = File::open(&self.path).map_err(open_failed(locator))?;
            Ok(Box::new(file) as ByteStream)
        })?;
        Ok(Some(Decoded::new(bitmap, rotation, LoadedFrom::Disk)))
    }

    fn loaded_from(&self) -> LoadedFrom {
        LoadedFrom::Disk
    }
}
