#![no_main]

//! Header probing and the bounds-only pass must never panic on arbitrary input.

use libfuzzer_sys::fuzz_target;
use pixel_hunter::engine::{decode_bounds, probe_dimensions, Container, MARK_LIMIT};
use pixel_hunter::DecodeOptions;

fuzz_target!(|data: &[u8]| {
    let _ = Container::classify(data);
    let _ = probe_dimensions(data);
    let mut options = DecodeOptions::default();
    let _ = decode_bounds(data, &mut options, "fuzz", Some(MARK_LIMIT));
    let mut options = DecodeOptions::default();
    let _ = decode_bounds(data, &mut options, "fuzz", None);
});
