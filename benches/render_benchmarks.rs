//! Rendering and estimation benchmarks for flowviz
//!
//! Run with: cargo bench --bench render_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use flowviz_lib::flow::{
    map_to_color, BlockMatchConfig, BlockMatchEstimator, FlowEstimator, FlowField, FlowRenderer,
    RenderConfig,
};
use flowviz_lib::util::{ColorWheel, PixelFormat};
use ndarray::Array2;

/// Rotational field: every direction and a range of magnitudes
fn swirl_field(width: usize, height: usize) -> FlowField {
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let dx = Array2::from_shape_fn((height, width), |(y, _)| (y as f32 - cy) / 4.0);
    let dy = Array2::from_shape_fn((height, width), |(_, x)| (cx - x as f32) / 4.0);
    FlowField::from_planes(dx, dy).unwrap()
}

fn textured_frame(width: usize, height: usize, shift: usize) -> Array2<f32> {
    Array2::from_shape_fn((height, width), |(y, x)| {
        let x = x + 1000 - shift;
        (((x * 7919) ^ (y * 104_729)) % 251) as f32 / 250.0
    })
}

/// Benchmark single vector mapping
fn bench_map_to_color(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_to_color");
    let wheel = ColorWheel::new();

    group.throughput(Throughput::Elements(1));
    group.bench_function("in_range", |b| {
        b.iter(|| map_to_color(&wheel, black_box(0.3), black_box(-0.4), 0.75, PixelFormat::RGBA))
    });
    group.bench_function("out_of_range", |b| {
        b.iter(|| map_to_color(&wheel, black_box(2.5), black_box(1.5), 0.5, PixelFormat::RGB24))
    });

    group.finish();
}

/// Benchmark full-field rendering
fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let wheel = ColorWheel::new();

    for (width, height) in [(320usize, 240usize), (640, 480), (1280, 720)] {
        let field = swirl_field(width, height);
        group.throughput(Throughput::Elements((width * height) as u64));

        let explicit = FlowRenderer::new(&wheel, RenderConfig::transparent());
        group.bench_with_input(
            BenchmarkId::new("explicit_scale", format!("{}x{}", width, height)),
            &field,
            |b, field| b.iter(|| explicit.render(black_box(field))),
        );

        let derived = FlowRenderer::new(&wheel, RenderConfig::opaque().with_scale(None));
        group.bench_with_input(
            BenchmarkId::new("derived_scale", format!("{}x{}", width, height)),
            &field,
            |b, field| b.iter(|| derived.render(black_box(field))),
        );
    }

    group.finish();
}

/// Benchmark block matching presets
fn bench_block_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("block_match");
    group.sample_size(20);

    let previous = textured_frame(320, 240, 0);
    let current = textured_frame(320, 240, 3);
    group.throughput(Throughput::Elements(320 * 240));

    for (name, config) in [
        ("fast", BlockMatchConfig::fast()),
        ("default", BlockMatchConfig::new()),
    ] {
        let mut estimator = BlockMatchEstimator::new(config).unwrap();
        group.bench_function(name, |b| {
            b.iter(|| estimator.estimate(black_box(&previous), black_box(&current)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_map_to_color, bench_render, bench_block_match);
criterion_main!(benches);
