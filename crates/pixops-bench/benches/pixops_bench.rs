//! Benchmarks for pixops operations.
//!
//! Run with: `cargo bench`

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use pixops_core::PixelBuffer;
use pixops_ops::filter::{self, EdgePolicy, Kernel};
use pixops_ops::{grayscale, parallel, resize, Filter};

fn test_image(size: u32) -> PixelBuffer {
    PixelBuffer::from_fn(size, size, |x, y| [(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
}

/// Benchmark grayscale conversion.
fn bench_grayscale(c: &mut Criterion) {
    let mut group = c.benchmark_group("grayscale");

    for size in [256u32, 1024] {
        let img = test_image(size);
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &img, |b, img| {
            b.iter(|| grayscale::grayscale(black_box(img)))
        });
    }

    group.finish();
}

/// Benchmark convolution, serial vs rayon.
fn bench_convolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("convolve");
    group.sample_size(20);

    let sharpen = Kernel::sharpen();
    let blur5 = Kernel::box_blur(5);

    for size in [256u32, 1024] {
        let img = test_image(size);
        group.throughput(Throughput::Elements((size * size) as u64));

        group.bench_with_input(BenchmarkId::new("sharpen", size), &img, |b, img| {
            b.iter(|| filter::convolve(black_box(img), &sharpen))
        });
        group.bench_with_input(BenchmarkId::new("sharpen_par", size), &img, |b, img| {
            b.iter(|| parallel::convolve(black_box(img), &sharpen))
        });
        group.bench_with_input(BenchmarkId::new("box5_clamp", size), &img, |b, img| {
            b.iter(|| filter::convolve_with(black_box(img), &blur5, EdgePolicy::Clamp))
        });
        group.bench_with_input(BenchmarkId::new("box5_clamp_par", size), &img, |b, img| {
            b.iter(|| parallel::convolve_with(black_box(img), &blur5, EdgePolicy::Clamp))
        });
    }

    group.finish();
}

/// Benchmark 2x upscale.
fn bench_resample(c: &mut Criterion) {
    let mut group = c.benchmark_group("resample");
    group.sample_size(20);

    let img = test_image(512);
    group.throughput(Throughput::Elements(1024 * 1024));

    for filter in [Filter::Nearest, Filter::Bilinear] {
        let name = format!("{filter:?}").to_lowercase();
        group.bench_with_input(BenchmarkId::new(&name, "2x"), &img, |b, img| {
            b.iter(|| resize::resample(black_box(img), 2.0, filter))
        });
        group.bench_with_input(BenchmarkId::new(format!("{name}_par"), "2x"), &img, |b, img| {
            b.iter(|| parallel::resample(black_box(img), 2.0, filter))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_grayscale, bench_convolve, bench_resample);
criterion_main!(benches);
