//! Benchmarks for the Archipelago merge engine
//!
//! Run with: cargo bench

use archipelago::merge::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn create_test_events(count: usize, keys: usize) -> Vec<Event<String, i64>> {
    (0..count)
        .map(|i| {
            let start = (i as i64 * 37) % 10_000;
            Event::new(format!("host-{}", i % keys), start, start + (i as i64 % 50))
        })
        .collect()
}

fn bench_merger(c: &mut Criterion) {
    let mut group = c.benchmark_group("merger");

    for size in [100, 1000, 10000] {
        let events = create_test_events(size, 1);

        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("merge_single_key_{}", size), |b| {
            b.iter(|| merge(black_box(events.clone())))
        });
    }

    group.finish();
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");

    let events = create_test_events(100_000, 500);
    group.throughput(Throughput::Elements(events.len() as u64));

    group.bench_function("sequential_500_keys", |b| {
        let engine = IntervalEngine::new(EngineConfig::sequential());
        b.iter(|| engine.run(black_box(events.clone())).unwrap())
    });

    group.bench_function("parallel_500_keys", |b| {
        let engine = IntervalEngine::default();
        b.iter(|| engine.run(black_box(events.clone())).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_merger, bench_engine);
criterion_main!(benches);
