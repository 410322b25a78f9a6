//! Criterion micro-benchmarks for CPU-bound hot paths.
//!
//! Run all:     `cargo bench`
//! Run subset:  `cargo bench -- distance`
//! Save baseline: `cargo bench -- --save-baseline base`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;

use skiff::index::distance::{cosine_distance, inner_product_distance, l2_distance};
use skiff::index::{HnswIndex, IvfFlatIndex, VectorIndex};
use skiff::types::{DistanceMetric, Rid, Vector};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn random_vector(dim: usize) -> Vector {
    let mut rng = rand::thread_rng();
    (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

fn random_dataset(n: usize, dim: usize) -> Vec<(Vector, Rid)> {
    (0..n)
        .map(|i| (random_vector(dim), Rid(i as u64)))
        .collect()
}

// ---------------------------------------------------------------------------
// 1. Distance benchmarks
// ---------------------------------------------------------------------------

fn bench_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("distance");

    for &dim in &[32, 128, 768] {
        let a = random_vector(dim);
        let b = random_vector(dim);

        group.throughput(Throughput::Elements(dim as u64));

        group.bench_with_input(BenchmarkId::new("l2", dim), &dim, |bench, _| {
            bench.iter(|| l2_distance(black_box(&a), black_box(&b)));
        });

        group.bench_with_input(BenchmarkId::new("inner_product", dim), &dim, |bench, _| {
            bench.iter(|| inner_product_distance(black_box(&a), black_box(&b)));
        });

        group.bench_with_input(BenchmarkId::new("cosine", dim), &dim, |bench, _| {
            bench.iter(|| cosine_distance(black_box(&a), black_box(&b)));
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// 2. Index scan benchmarks
// ---------------------------------------------------------------------------

fn bench_ivf_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("ivf_scan");
    let dim = 32;

    let mut index = IvfFlatIndex::new(
        DistanceMetric::L2,
        &[("lists".into(), 16), ("probe_lists".into(), 4)],
    )
    .expect("valid options");
    index.build(random_dataset(2_000, dim));
    let query = random_vector(dim);

    for &k in &[1usize, 10, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(k), &k, |bench, &k| {
            bench.iter(|| index.scan(black_box(&query), k));
        });
    }

    group.finish();
}

fn bench_hnsw_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("hnsw_scan");
    let dim = 32;

    let mut index = HnswIndex::new(
        DistanceMetric::L2,
        &[
            ("m".into(), 16),
            ("ef_construction".into(), 64),
            ("ef_search".into(), 64),
        ],
    )
    .expect("valid options");
    index.build(random_dataset(2_000, dim));
    let query = random_vector(dim);

    for &k in &[1usize, 10, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(k), &k, |bench, &k| {
            bench.iter(|| index.scan(black_box(&query), k));
        });
    }

    group.finish();
}

fn bench_hnsw_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("hnsw_insert");
    group.sample_size(20);
    let dim = 32;

    group.bench_function("insert_1000", |bench| {
        bench.iter(|| {
            let mut index = HnswIndex::new(
                DistanceMetric::L2,
                &[
                    ("m".into(), 8),
                    ("ef_construction".into(), 32),
                    ("ef_search".into(), 32),
                ],
            )
            .expect("valid options");
            for (vec, rid) in random_dataset(1_000, dim) {
                index.insert(black_box(&vec), rid);
            }
            index
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_distance,
    bench_ivf_scan,
    bench_hnsw_scan,
    bench_hnsw_insert
);
criterion_main!(benches);
