//! Benchmarks for the bitset primitives that dominate the step loop.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cortical::Bitset;

fn bench_counting(c: &mut Criterion) {
    let mut group = c.benchmark_group("counting");

    let mut sparse = Bitset::new(2048);
    sparse.set_indices(&[7, 300, 1999]).unwrap();
    group.bench_function("num_set_bits_sparse", |b| {
        b.iter(|| black_box(&sparse).num_set_bits())
    });

    let mut dense = Bitset::new(2048);
    dense.set_range(0, 2048).unwrap();
    group.bench_function("dense_count", |b| {
        b.iter(|| black_box(&dense).dense_count())
    });

    group.finish();
}

fn bench_overlap(c: &mut Criterion) {
    let mut a = Bitset::new(2048);
    let mut b = Bitset::new(2048);
    a.set_range(0, 64).unwrap();
    b.set_range(32, 96).unwrap();
    c.bench_function("overlap_2048", |bench| {
        bench.iter(|| black_box(&a).overlap(black_box(&b)).unwrap())
    });
}

fn bench_bulk_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk");

    let mut dest = Bitset::new(2048);
    let mut src = Bitset::new(2048);
    src.set_range(100, 400).unwrap();
    group.bench_function("or_2048", |b| {
        b.iter(|| {
            dest.or(black_box(&src)).unwrap();
        })
    });

    let mut wide = Bitset::new(4096);
    let narrow = {
        let mut n = Bitset::new(512);
        n.set_range(0, 100).unwrap();
        n
    };
    group.bench_function("set_from_bitset_at_unaligned", |b| {
        b.iter(|| {
            wide.reset();
            wide.set_from_bitset_at(black_box(&narrow), 37).unwrap();
        })
    });

    group.finish();
}

fn bench_iter_set(c: &mut Criterion) {
    let mut b = Bitset::new(2048);
    b.set_indices(&[1, 64, 100, 555, 1024, 2000]).unwrap();
    c.bench_function("iter_set_sparse", |bench| {
        bench.iter(|| black_box(&b).iter_set().sum::<usize>())
    });
}

criterion_group!(
    benches,
    bench_counting,
    bench_overlap,
    bench_bulk_ops,
    bench_iter_set
);
criterion_main!(benches);
