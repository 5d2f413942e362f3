//! Benchmarks for the HOG descriptor pass.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cv_hog::{compute_hog, visualize, HogParams, MultiImage, Weights};

/// Synthetic color image with diagonal stripes, so every phase has work.
fn striped_image(width: usize, height: usize) -> MultiImage {
    let mut img = MultiImage::new(width, height, 3);
    for x in 0..width {
        for y in 0..height {
            let stripe = (((x + 2 * y) / 12) % 2) as f64;
            img.set(x, y, 0, stripe);
            img.set(x, y, 1, 1.0 - stripe);
            img.set(x, y, 2, 0.5 * stripe);
        }
    }
    img
}

fn benchmark_compute_hog(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_hog");

    for (w, h) in [(320, 240), (640, 480), (1280, 960)] {
        let img = striped_image(w, h);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", w, h)),
            &img,
            |b, img| {
                b.iter(|| compute_hog(black_box(img), &HogParams::default()).unwrap());
            },
        );
    }
    group.finish();
}

fn benchmark_cell_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("cell_size");
    let img = striped_image(640, 480);

    for cell_size in [4usize, 6, 8] {
        group.bench_with_input(
            BenchmarkId::from_parameter(cell_size),
            &cell_size,
            |b, &cs| {
                b.iter(|| compute_hog(black_box(&img), &HogParams::new(cs)).unwrap());
            },
        );
    }
    group.finish();
}

fn benchmark_visualize(c: &mut Criterion) {
    let img = striped_image(640, 480);
    let feat = compute_hog(&img, &HogParams::default()).unwrap();

    c.bench_function("visualize_640x480", |b| {
        b.iter(|| visualize(black_box(&feat), Weights::Positive, 16).unwrap());
    });
}

criterion_group!(
    benches,
    benchmark_compute_hog,
    benchmark_cell_sizes,
    benchmark_visualize
);
criterion_main!(benches);
