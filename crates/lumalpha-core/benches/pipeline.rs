//! Benchmarks for the lumalpha conversion pipeline.
//!
//! Run with: cargo bench -p lumalpha-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lumalpha_core::config::LimitsConfig;
use lumalpha_core::pipeline::{
    ImageDecoder, LumaParams, LuminanceAlphaTransform, PixelBuffer, PngEncoder, PreviewCompositor,
};
use lumalpha_core::DisplayMode;

/// Square gradient with every colour channel varying, alpha opaque.
fn gradient(size: u32) -> PixelBuffer {
    PixelBuffer::from_fn(size, size, |x, y| {
        [(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255]
    })
    .unwrap()
}

fn benchmark_transform(c: &mut Criterion) {
    let buffer = gradient(1000);
    let transform = LuminanceAlphaTransform::new(LumaParams::default());

    c.bench_function("luma_to_alpha_1mp", |b| {
        b.iter(|| transform.apply(black_box(&buffer)))
    });
}

fn benchmark_checkerboard(c: &mut Criterion) {
    let buffer = LuminanceAlphaTransform::new(LumaParams::default()).apply(&gradient(1000));
    let compositor = PreviewCompositor::default();

    c.bench_function("checkerboard_1mp", |b| {
        b.iter(|| compositor.render(black_box(&buffer), DisplayMode::Checkerboard))
    });
}

fn benchmark_encode(c: &mut Criterion) {
    let buffer = LuminanceAlphaTransform::new(LumaParams::default()).apply(&gradient(1000));

    c.bench_function("encode_png_1mp", |b| {
        b.iter(|| PngEncoder::encode_to_vec(black_box(&buffer)))
    });
}

fn benchmark_decode(c: &mut Criterion) {
    let png = PngEncoder::encode_to_vec(&gradient(1000)).unwrap();
    let decoder = ImageDecoder::new(LimitsConfig::default());
    let path = std::path::Path::new("bench.png");

    c.bench_function("decode_png_1mp", |b| {
        b.iter(|| decoder.decode_bytes(black_box(&png), path))
    });
}

criterion_group!(
    benches,
    benchmark_transform,
    benchmark_checkerboard,
    benchmark_encode,
    benchmark_decode,
);
criterion_main!(benches);
