use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage};
use pixel_hunter::engine::{
    calculate_in_sample_size, decode_bytes, sampled_dimensions, MarkableReader, Rotation,
};
use pixel_hunter::DecodeOptions;
use proptest::prelude::*;
use std::io::{Cursor, Read};

fn encode_png(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_sample_size_is_largest_fitting_power_of_two(
        width in 1u32..=20_000,
        height in 1u32..=20_000,
        req_w in 1u32..=4_000,
        req_h in 1u32..=4_000,
    ) {
        let sample = calculate_in_sample_size(width, height, req_w, req_h);

        prop_assert!(sample.is_power_of_two());
        if sample > 1 {
            prop_assert!(width / sample >= req_w);
            prop_assert!(height / sample >= req_h);
        }
        let next = sample * 2;
        prop_assert!(width / next < req_w || height / next < req_h);
    }

    #[test]
    fn prop_target_larger_than_source_never_samples(
        width in 1u32..=512,
        height in 1u32..=512,
        extra in 1u32..=512,
    ) {
        prop_assert_eq!(calculate_in_sample_size(width, height, width + extra, 1), 1);
        prop_assert_eq!(calculate_in_sample_size(width, height, 1, height + extra), 1);
    }

    #[test]
    fn prop_sampled_dimensions_never_zero(
        width in 1u32..=100_000,
        height in 1u32..=100_000,
        shift in 0u32..=16,
    ) {
        let (w, h) = sampled_dimensions(width, height, 1 << shift);
        prop_assert!(w >= 1 && h >= 1);
        prop_assert!(w <= width && h <= height);
    }

    #[test]
    fn prop_orientation_is_total(degrees in any::<i32>(), code in any::<u32>()) {
        let rotation = Rotation::from_degrees(degrees);
        prop_assert!([0, 90, 180, 270].contains(&rotation.degrees()));
        if ![90, 180, 270].contains(&degrees) {
            prop_assert_eq!(rotation, Rotation::None);
        }
        let rotation = Rotation::from_exif(code);
        prop_assert!([0, 90, 180, 270].contains(&rotation.degrees()));
    }

    #[test]
    fn prop_markable_reset_replays_exact_bytes(
        data in proptest::collection::vec(any::<u8>(), 0..2048),
        limit in 1usize..1024,
        consumed in 0usize..1024,
    ) {
        let consumed = consumed.min(limit);
        let mut reader = MarkableReader::new(&data[..]);
        let mark = reader.save_position(limit);

        let mut head = Vec::new();
        reader.by_ref().take(consumed as u64).read_to_end(&mut head).unwrap();
        prop_assert_eq!(&head[..], &data[..head.len()]);

        reader.reset(mark).unwrap();
        let mut all = Vec::new();
        reader.read_to_end(&mut all).unwrap();
        prop_assert_eq!(all, data);
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 24,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_decode_matches_sampled_dimensions(
        width in 1u32..=96,
        height in 1u32..=96,
        shift in 0u32..=4,
    ) {
        let png = encode_png(width, height);
        let options = DecodeOptions {
            sample_size: 1 << shift,
            ..DecodeOptions::default()
        };
        let img = decode_bytes(&png, &options).unwrap();
        prop_assert_eq!(img.dimensions(), sampled_dimensions(width, height, 1 << shift));
    }
}
