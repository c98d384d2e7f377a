//! Aggregation benchmarks over synthetic tick streams.
//!
//! Run with: `cargo bench --package tickbars-bench`

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use tickbars_bench::{SyntheticConfig, TickFile, synthetic_ticks};
use tickbars_lib::{BarAggregator, LatePolicy, RunConfig, TimeframeMap, build_bars_from_path, reduce_ticks};

const TICKS: usize = 200_000;

fn reduce_benchmark(c: &mut Criterion) {
    let ticks = synthetic_ticks(&SyntheticConfig {
        ticks: TICKS,
        ..SyntheticConfig::default()
    });

    let mut group = c.benchmark_group("reduce");
    group.throughput(Throughput::Elements(TICKS as u64));
    for (label, rule) in TimeframeMap::default().iter() {
        group.bench_with_input(BenchmarkId::from_parameter(label), &rule, |b, rule| {
            b.iter(|| reduce_ticks(black_box(&ticks), *rule));
        });
    }
    group.finish();
}

fn aggregator_benchmark(c: &mut Criterion) {
    let ticks = synthetic_ticks(&SyntheticConfig {
        ticks: TICKS,
        ..SyntheticConfig::default()
    });
    let rules = TimeframeMap::default().rules();

    let mut group = c.benchmark_group("aggregator");
    group.throughput(Throughput::Elements(TICKS as u64));
    for batch_size in [1_000, 20_000, TICKS] {
        group.bench_with_input(
            BenchmarkId::new("batch_size", batch_size),
            &batch_size,
            |b, &batch_size| {
                b.iter_batched(
                    || BarAggregator::new(rules.clone(), LatePolicy::Drop),
                    |mut aggregator| {
                        for batch in ticks.chunks(batch_size) {
                            aggregator
                                .ingest(black_box(batch))
                                .expect("drop policy never rejects");
                        }
                        aggregator.finish()
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }
    group.finish();
}

fn pipeline_benchmark(c: &mut Criterion) {
    let Ok(file) = TickFile::generate(&SyntheticConfig {
        ticks: TICKS,
        ..SyntheticConfig::default()
    }) else {
        eprintln!("Could not write synthetic tick file, skipping pipeline benchmark");
        return;
    };
    let Ok(runtime) = tokio::runtime::Runtime::new() else {
        eprintln!("Could not start tokio runtime, skipping pipeline benchmark");
        return;
    };

    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);
    group.throughput(Throughput::Elements(TICKS as u64));
    for batch_size in [20_000, TICKS] {
        let config = RunConfig::default().with_batch_size(batch_size);
        group.bench_with_input(
            BenchmarkId::new("csv_batch_size", batch_size),
            &config,
            |b, config| {
                b.to_async(&runtime)
                    .iter(|| async {
                        build_bars_from_path(file.path(), config)
                            .await
                            .expect("synthetic tick file aggregates")
                    });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, reduce_benchmark, aggregator_benchmark, pipeline_benchmark);
criterion_main!(benches);
