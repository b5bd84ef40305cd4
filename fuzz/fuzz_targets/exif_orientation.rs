#![no_main]

//! EXIF parsing on arbitrary containers.

use libfuzzer_sys::fuzz_target;
use pixel_hunter::engine::{detect_exif_orientation, Rotation};

fuzz_target!(|data: &[u8]| {
    if let Some(code) = detect_exif_orientation(data) {
        assert!((1..=8).contains(&code));
        let _ = Rotation::from_exif(code as u32);
    }
});
