//! Criterion benchmarks for the sequence builder and the SPRT engine.
//!
//! Run with: `cargo bench -p abseq-core --bench sprt_engine`

use abseq_common::AggregateBucket;
use abseq_config::TestParams;
use abseq_core::sequence::build_trial_sequence;
use abseq_core::sprt::{likelihood, SprtEngine};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Deterministic 0/1 pattern with roughly `rate` ones.
fn pattern(len: usize, rate: f64, phase: f64) -> Vec<u8> {
    (0..len)
        .map(|i| (((i as f64 * 0.618_033_988 + phase).fract()) < rate) as u8)
        .collect()
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("sprt_engine");
    group.sample_size(20);

    // Null-ish arms so no early crossing shortens the scan.
    let engine = SprtEngine::new(TestParams::new(1.2, 0.01, 0.01));
    for len in [100usize, 500, 2_000] {
        let x = pattern(len, 0.3, 0.1);
        let y = pattern(len, 0.3, 0.5);
        group.bench_with_input(BenchmarkId::new("run", len), &len, |b, _| {
            b.iter(|| black_box(engine.run(black_box(&x), black_box(&y))));
        });
    }

    group.finish();
}

fn bench_statistic(c: &mut Criterion) {
    let mut group = c.benchmark_group("sprt_statistic");

    for n in [100u64, 1_000, 10_000] {
        let r = n / 2;
        let x = r / 2;
        let evaluator = likelihood::ConditionalLikelihood::new(n, 2.0);
        group.bench_with_input(BenchmarkId::new("step", n), &n, |b, &n| {
            b.iter(|| black_box(evaluator.step(x, r, black_box(n))));
        });
    }

    group.finish();
}

fn bench_builder(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequence_builder");

    let buckets: Vec<AggregateBucket> = (0..48)
        .map(|h| AggregateBucket::new(200 + h * 3, 40 + h))
        .collect();
    group.bench_function("48_hourly_buckets", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        b.iter(|| black_box(build_trial_sequence(black_box(&buckets), &mut rng)));
    });

    group.finish();
}

criterion_group!(benches, bench_engine, bench_statistic, bench_builder);
criterion_main!(benches);
