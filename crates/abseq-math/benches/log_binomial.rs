//! Criterion benchmarks for `abseq-math`.
//!
//! Log binomial coefficients dominate the cost of every SPRT step.

use abseq_math::{log_binomial, log_sum_exp};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_log_binomial(c: &mut Criterion) {
    let mut group = c.benchmark_group("log_binomial");

    for n in [10u64, 1_000, 100_000] {
        group.bench_with_input(BenchmarkId::new("midpoint", n), &n, |b, &n| {
            b.iter(|| black_box(log_binomial(black_box(n), black_box(n / 2))));
        });
    }

    group.finish();
}

fn bench_log_sum_exp(c: &mut Criterion) {
    let mut group = c.benchmark_group("log_sum_exp");

    for len in [16usize, 256, 4096] {
        let values: Vec<f64> = (0..len).map(|i| (i as f64 * 0.37).sin() * 50.0).collect();
        group.bench_with_input(BenchmarkId::new("len", len), &values, |b, v| {
            b.iter(|| black_box(log_sum_exp(black_box(v))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_log_binomial, bench_log_sum_exp);
criterion_main!(benches);
