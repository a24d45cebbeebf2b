//! Benchmarks for the vertex layout engine and the slot arena

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use strata_core::alloc::sparse_set::SparseSet;
use strata_core::graphics::{VertexDeclaration, VertexElement, VertexFormat, VertexSemantic};

fn element_list(len: usize) -> Vec<VertexElement> {
    (0..len)
        .map(|i| {
            if i % 3 == 2 {
                VertexElement::aliased(VertexFormat::Vec3, VertexSemantic::Tangent, (i - 1) as u8)
            } else {
                VertexElement::new(VertexFormat::Vec4, VertexSemantic::Position)
            }
        })
        .collect()
}

fn bench_declaration_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("declaration_build");

    for len in [2, 8, 32, 255] {
        let elements = element_list(len);
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &elements, |b, elements| {
            b.iter(|| VertexDeclaration::new(black_box(elements.clone())))
        });
    }

    group.finish();
}

fn bench_slot_reuse(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_set_reuse_slots");

    group.bench_function("reuse_100_slots", |b| {
        b.iter(|| {
            let mut set = SparseSet::new();
            let slots: Vec<_> = (0..100u32).map(|i| set.push(i)).collect();
            for slot in &slots {
                set.remove(*slot);
            }
            for i in 0..100u32 {
                black_box(set.push(i));
            }
            set
        });
    });

    group.finish();
}

criterion_group!(benches, bench_declaration_build, bench_slot_reuse);
criterion_main!(benches);
