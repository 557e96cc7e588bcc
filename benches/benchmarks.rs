//! Performance benchmarks for namex
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use namex::utils::{encode, partial_ratio};
use namex::{EngineConfig, SearchEngine};
use std::fmt::Write;
use std::fs;
use tempfile::TempDir;

const FIRST: &[&str] = &["John", "Jon", "Jonathan", "Mary", "Marie", "Robert", "Rupert", "Ann", "Anne", "Zoe"];
const LAST: &[&str] = &["Smith", "Smyth", "Ashcraft", "Ashcroft", "Lee", "Leigh", "Tymczak", "Pfister"];

/// Write a dataset of `count` synthetic names and return its directory
fn create_dataset(count: usize) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut content = String::from("id,name\n");
    for i in 0..count {
        let first = FIRST[i % FIRST.len()];
        let last = LAST[(i / FIRST.len()) % LAST.len()];
        writeln!(content, "{i},{first} {last}").unwrap();
    }
    fs::write(dir.path().join("people.csv"), content).expect("Failed to write dataset");
    dir
}

fn bench_encode(c: &mut Criterion) {
    c.bench_function("soundex_encode", |b| {
        b.iter(|| {
            for name in FIRST.iter().chain(LAST) {
                black_box(encode(black_box(name)));
            }
        })
    });
}

fn bench_partial_ratio(c: &mut Criterion) {
    let pairs = [
        ("Jon Smith", "John Smith"),
        ("Jonathan Smith", "John Smith"),
        ("Unrelated Person", "John Smith"),
    ];

    let mut group = c.benchmark_group("partial_ratio");
    for (a, b) in pairs {
        group.bench_with_input(BenchmarkId::from_parameter(a), &(a, b), |bench, &(a, b)| {
            bench.iter(|| partial_ratio(black_box(a), black_box(b)))
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(20);

    for count in [10_000, 100_000] {
        let dir = create_dataset(count);
        let engine = SearchEngine::new(
            dir.path().join("people.csv"),
            EngineConfig::default().with_chunk_size(10_000),
        )
        .expect("Failed to create engine");
        engine.refresh().expect("Failed to load dataset");

        group.bench_with_input(BenchmarkId::from_parameter(count), &engine, |b, engine| {
            b.iter(|| engine.search(black_box("John Smith")).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_partial_ratio, bench_search);
criterion_main!(benches);
