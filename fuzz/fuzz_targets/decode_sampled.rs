#![no_main]

//! Full decode at an arbitrary sample size. Output size must match the probe.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pixel_hunter::engine::{decode_bytes, probe_dimensions, sampled_dimensions};
use pixel_hunter::DecodeOptions;

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    sample_shift: u8,
    data: &'a [u8],
}

fuzz_target!(|input: Input<'_>| {
    let sample_size = 1u32 << (input.sample_shift % 6);
    let options = DecodeOptions {
        sample_size,
        ..DecodeOptions::default()
    };
    if let Ok(img) = decode_bytes(input.data, &options) {
        let (width, height) = probe_dimensions(input.data).expect("decoded but not probeable");
        assert_eq!(
            (img.width(), img.height()),
            sampled_dimensions(width, height, sample_size)
        );
    }
});
