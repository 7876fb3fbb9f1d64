//! Criterion micro-benchmarks for value creation, list traversal, and object lookup.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use sevm_arena::{Arena, List};
use sevm_bench::{keyed_object, series_sum};
use sevm_test_utils::fixtures::double_list;

/// Benchmark: create 10K Doubles in a fresh arena (page growth included).
fn bench_create_double_10k(c: &mut Criterion) {
    c.bench_function("create_double_10k", |b| {
        b.iter(|| {
            let mut arena = Arena::new();
            for i in 0..10_000i32 {
                black_box(arena.create_double(f64::from(i)).unwrap());
            }
        });
    });
}

/// Benchmark: append 1K items through one wrapper (incremental cache).
fn bench_list_append_1k(c: &mut Criterion) {
    c.bench_function("list_append_1k", |b| {
        b.iter(|| {
            let mut arena = Arena::new();
            let mut list = List::create(&mut arena).unwrap();
            for i in 0..1_000i64 {
                list.append(&mut arena, i.into()).unwrap();
            }
            black_box(list.cached_values_len());
        });
    });
}

/// Benchmark: full cache rebuild of a 1K-item list.
fn bench_list_refresh_1k(c: &mut Criterion) {
    let mut arena = Arena::new();
    let values: Vec<f64> = (0..1_000i32).map(f64::from).collect();
    let mut list = double_list(&mut arena, &values).unwrap();
    c.bench_function("list_refresh_1k", |b| {
        b.iter(|| {
            list.refresh(&arena).unwrap();
            black_box(list.cached_values_len());
        });
    });
}

/// Benchmark: 1K-step series sum through list content handles.
fn bench_series_sum(c: &mut Criterion) {
    c.bench_function("series_sum_1k", |b| {
        b.iter(|| {
            let mut arena = Arena::new();
            black_box(series_sum(&mut arena, 1_000.0, 1.0).unwrap());
        });
    });
}

/// Benchmark: last-key lookup in a 100-key object.
fn bench_object_get_last(c: &mut Criterion) {
    let mut arena = Arena::new();
    let mut obj = keyed_object(&mut arena, 100).unwrap();
    c.bench_function("object_get_last_of_100", |b| {
        b.iter(|| {
            black_box(obj.get_value(&arena, "k99").unwrap());
        });
    });
}

/// Benchmark: reassign a String slot 1K times (each leaves garbage).
fn bench_string_reassign(c: &mut Criterion) {
    c.bench_function("string_reassign_1k", |b| {
        b.iter(|| {
            let mut arena = Arena::new();
            let mut s = arena.create_string("").unwrap();
            for i in 0..1_000i32 {
                arena.assign(&mut s, f64::from(i)).unwrap();
            }
            black_box(arena.bytes_in_use());
        });
    });
}

criterion_group!(
    benches,
    bench_create_double_10k,
    bench_list_append_1k,
    bench_list_refresh_1k,
    bench_series_sum,
    bench_object_get_last,
    bench_string_reassign
);
criterion_main!(benches);
