//! Benchmarks for SPD metric operations
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use riemgeom_core::prelude::*;
use riemgeom_manifolds::{SPDMatrices, SPDMetricAffine, SPDMetricLogEuclidean, SPDMetricProcrustes};

fn benchmark_spd_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("spd_metrics");

    for &n in &[3, 10, 30] {
        let spd = SPDMatrices::<f64>::new(n).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let base = spd.random_uniform(&mut rng, 1).unwrap();
        let points = spd.random_uniform(&mut rng, 1).unwrap();

        let affine = SPDMetricAffine::new(n, 1.0).unwrap();
        let log_euclidean = SPDMetricLogEuclidean::new(n).unwrap();
        let procrustes = SPDMetricProcrustes::new(n).unwrap();

        group.bench_with_input(BenchmarkId::new("affine_log", n), &n, |b, _| {
            b.iter(|| affine.log(black_box(&points), black_box(&base)).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("log_euclidean_dist", n), &n, |b, _| {
            b.iter(|| log_euclidean.dist(black_box(&points), black_box(&base)).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("procrustes_squared_dist", n), &n, |b, _| {
            b.iter(|| procrustes.squared_dist(black_box(&points), black_box(&base)).unwrap())
        });
    }

    group.finish();
}

fn benchmark_batch_broadcasting(c: &mut Criterion) {
    let mut group = c.benchmark_group("spd_batch");
    let spd = SPDMatrices::<f64>::new(4).unwrap();
    let metric = SPDMetricAffine::new(4, 1.0).unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let base = spd.random_uniform(&mut rng, 1).unwrap();

    for &batch in &[1, 64, 512] {
        let points = spd.random_uniform(&mut rng, batch).unwrap();
        group.bench_with_input(BenchmarkId::new("affine_squared_dist", batch), &batch, |b, _| {
            b.iter(|| metric.squared_dist(black_box(&points), black_box(&base)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("differential_log", batch), &batch, |b, _| {
            b.iter(|| SPDMatrices::differential_log(black_box(&points), black_box(&base)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_spd_metrics, benchmark_batch_broadcasting);
criterion_main!(benches);
