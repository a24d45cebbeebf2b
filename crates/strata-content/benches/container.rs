//! Benchmarks for container framing and compression

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use strata_content::processors::ContainerProcessor;
use strata_content::{Asset, AssetType, Content, ContentConfig, MemoryFileSystem, Texture};
use strata_core::graphics::HeadlessGpu;
use strata_core::math::Color;

fn gradient(size: u16) -> Texture {
    let mut texture = Texture::create(size, size, 32).unwrap_or_else(|e| panic!("{}", e));
    for y in 0..size {
        for x in 0..size {
            let v = ((x ^ y) & 0xFF) as u8;
            texture.set_pixel(x, y, Color::from_rgba8(v, v / 2, 255 - v, 255));
        }
    }
    texture
}

fn bench_wrap(c: &mut Criterion) {
    let mut group = c.benchmark_group("container_wrap");

    for quality in [1, 6, 11] {
        let container = ContainerProcessor::new(quality, 22);
        let payload: Vec<u8> = gradient(128).data().to_vec();
        group.throughput(Throughput::Bytes(payload.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(quality), &payload, |b, payload| {
            b.iter(|| container.wrap(AssetType::Texture, black_box(payload)))
        });
    }

    group.finish();
}

fn bench_unwrap(c: &mut Criterion) {
    let mut group = c.benchmark_group("container_unwrap");

    for size in [32u16, 128, 512] {
        let payload = gradient(size).data().to_vec();
        let bytes = ContainerProcessor::new(11, 22)
            .wrap(AssetType::Texture, &payload)
            .unwrap_or_else(|e| panic!("{}", e));
        group.throughput(Throughput::Bytes(payload.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &bytes, |b, bytes| {
            b.iter(|| ContainerProcessor::unwrap(black_box(bytes)))
        });
    }

    group.finish();
}

fn bench_encode_texture(c: &mut Criterion) {
    let content = Content::new(ContentConfig::default(), MemoryFileSystem::new(), HeadlessGpu::new());
    let asset: Asset = gradient(256).into();

    c.bench_function("encode_texture_256", |b| {
        b.iter(|| content.encode(black_box(&asset)))
    });
}

criterion_group!(benches, bench_wrap, bench_unwrap, bench_encode_texture);
criterion_main!(benches);
