use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use pixel_hunter::engine::{
    calculate_in_sample_size, decode_bounds, decode_bytes, Container, MarkableReader, MARK_LIMIT,
};
use pixel_hunter::DecodeOptions;
use std::hint::black_box;
use std::io::Cursor;

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

fn bench_sample_size(c: &mut Criterion) {
    c.bench_function("calculate_in_sample_size", |b| {
        b.iter(|| calculate_in_sample_size(black_box(4032), black_box(3024), 200, 150))
    });
}

fn bench_probe(c: &mut Criterion) {
    let jpeg = encode(2048, 1536, ImageFormat::Jpeg);
    c.bench_function("decode_bounds/jpeg", |b| {
        b.iter(|| {
            let mut options = DecodeOptions::default();
            decode_bounds(black_box(&jpeg[..]), &mut options, "bench", None).unwrap();
            options.out_size
        })
    });

    c.bench_function("sniff/jpeg", |b| {
        b.iter(|| {
            let mut stream = MarkableReader::new(black_box(&jpeg[..]));
            let mark = stream.save_position(MARK_LIMIT);
            Container::sniff(&mut stream, mark).unwrap()
        })
    });
}

fn bench_sampled_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_bytes");
    group.sample_size(20);
    for (name, format) in [("jpeg", ImageFormat::Jpeg), ("png", ImageFormat::Png)] {
        let bytes = encode(2048, 1536, format);
        for sample_size in [1u32, 2, 4, 8] {
            let options = DecodeOptions {
                sample_size,
                ..DecodeOptions::default()
            };
            group.bench_with_input(BenchmarkId::new(name, sample_size), &options, |b, options| {
                b.iter(|| decode_bytes(black_box(&bytes), options).unwrap())
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_sample_size, bench_probe, bench_sampled_decode);
criterion_main!(benches);
