//! Benchmark of the exact brute-force nearest-neighbor scan at realistic
//! corpus scale (a few thousand statute sections, MiniLM-sized vectors).

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use statute_semantic_search::vector::VectorIndex;

fn synthetic_vector(seed: usize, dimension: usize) -> Vec<f32> {
    (0..dimension)
        .map(|j| ((seed * 31 + j * 17) % 101) as f32 / 101.0)
        .collect()
}

fn bench_knn(c: &mut Criterion) {
    let dimension = 384;
    let vectors: Vec<Vec<f32>> = (0..2_000).map(|i| synthetic_vector(i, dimension)).collect();
    let index = VectorIndex::build(dimension, &vectors).unwrap();
    let query = synthetic_vector(7_919, dimension);

    c.bench_function("knn_2000x384_k5", |b| {
        b.iter(|| index.search(black_box(&query), 5).unwrap())
    });

    c.bench_function("knn_2000x384_k50", |b| {
        b.iter(|| index.search(black_box(&query), 50).unwrap())
    });
}

criterion_group!(benches, bench_knn);
criterion_main!(benches);
