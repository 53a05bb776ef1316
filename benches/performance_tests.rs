//! Performance benchmarks for LogLens

use chrono::TimeZone;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use loglens::parser::LineParser;
use loglens::query::{self, LevelFilter, LogFilter, QueryOptions};
use loglens::stats;
use loglens::store::LogStore;
use loglens::types::{LogLevel, TimeWindow};
use rand::prelude::*;

/// Deterministic mix of the supported line shapes plus free-form noise.
fn synthetic_lines(count: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(42);
    let levels = ["INFO", "WARN", "ERROR"];
    let processes = ["sshd", "nginx", "cron", "kernel"];

    (0..count)
        .map(|i| {
            let minute = (i / 60) % 60;
            let second = i % 60;
            match rng.gen_range(0..4) {
                0 => format!(
                    "2024-01-15T10:{:02}:{:02}Z host {}[{}]: event {}",
                    minute,
                    second,
                    processes[i % 4],
                    100 + i % 900,
                    i
                ),
                1 => format!(
                    "2024 Jan 15 10:{:02}:{:02} host {}: event {}",
                    minute,
                    second,
                    processes[i % 4],
                    i
                ),
                2 => format!(
                    "2024-01-15 10:{:02}:{:02} {} {}: event {}",
                    minute,
                    second,
                    levels[i % 3],
                    processes[i % 4],
                    i
                ),
                _ => format!("free-form diagnostic text {}", i),
            }
        })
        .collect()
}

fn build_store(count: usize) -> LogStore {
    let parser = LineParser::with_default_year(2024);
    let records = synthetic_lines(count)
        .iter()
        .map(|line| parser.parse(line))
        .collect();
    LogStore::from_records("bench-host", records)
}

/// Benchmark raw line parsing throughput
fn bench_line_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_parsing");

    for line_count in [1_000, 10_000].iter() {
        let lines = synthetic_lines(*line_count);
        let parser = LineParser::with_default_year(2024);

        group.throughput(Throughput::Elements(*line_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(line_count),
            &lines,
            |b, lines| {
                b.iter(|| {
                    for line in lines {
                        std::hint::black_box(parser.parse(line));
                    }
                });
            },
        );
    }

    group.finish();
}

/// Benchmark filtered, sorted queries over a populated store
fn bench_query_filtering(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_filtering");

    for record_count in [1_000, 10_000].iter() {
        let store = build_store(*record_count);
        let options = QueryOptions {
            filter: LogFilter {
                level: LevelFilter::Exact(LogLevel::Error),
                message: Some("event".to_string()),
                ..LogFilter::default()
            },
            offset: 0,
            limit: 100,
            ..QueryOptions::default()
        };

        group.throughput(Throughput::Elements(*record_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(record_count),
            &store,
            |b, store| {
                b.iter(|| std::hint::black_box(query::run(store, &options)));
            },
        );
    }

    group.finish();
}

/// Benchmark statistics aggregation including series bucketing
fn bench_stats_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("stats_aggregation");
    let now = chrono::Utc.with_ymd_and_hms(2024, 1, 15, 11, 0, 0).unwrap();

    for record_count in [1_000, 10_000].iter() {
        let store = build_store(*record_count);

        for window in [TimeWindow::LastHour, TimeWindow::AllTime] {
            group.throughput(Throughput::Elements(*record_count as u64));
            group.bench_with_input(
                BenchmarkId::new(window.to_string(), record_count),
                &store,
                |b, store| {
                    b.iter(|| std::hint::black_box(stats::aggregate_at(store, window, now)));
                },
            );
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_line_parsing,
    bench_query_filtering,
    bench_stats_aggregation
);
criterion_main!(benches);
