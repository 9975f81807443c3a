//! Performance benchmarks for the measurement log
//!
//! Every `run` loads the whole table and rewrites it on append, so these
//! track how that cost grows with the size of a device's history.

use chrono::{DateTime, NaiveDateTime};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use speedlog::{
    output::{OutputFormatter, PlainFormatter},
    stats::{ChartSeries, HistorySummary},
    store::{table, LogStore},
    MeasurementRecord,
};
use tempfile::TempDir;

fn timestamp(secs: i64) -> NaiveDateTime {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.naive_utc())
        .unwrap_or_default()
}

/// Sample history, one test every 30 minutes
fn create_sample_records(count: usize) -> Vec<MeasurementRecord> {
    (0..count)
        .map(|i| {
            MeasurementRecord::new(
                timestamp(1_700_000_000 + i as i64 * 1800),
                Some(40.0 + (i % 25) as f64 * 0.37),
                Some(8.0 + (i % 10) as f64 * 0.21),
                Some(15.0 + (i % 7) as f64),
                if i % 3 == 0 { None } else { Some(1.25) },
            )
        })
        .collect()
}

fn bench_table_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_codec");

    for size in [10usize, 1_000, 10_000] {
        let records = create_sample_records(size);
        let encoded = table::encode(&records);

        group.bench_with_input(BenchmarkId::new("encode", size), &records, |b, records| {
            b.iter(|| table::encode(black_box(records)))
        });
        group.bench_with_input(BenchmarkId::new("decode", size), &encoded, |b, encoded| {
            b.iter(|| table::decode(black_box(encoded)))
        });
    }

    group.finish();
}

fn bench_log_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("log_store");
    group.sample_size(20);

    for size in [100usize, 5_000] {
        let temp = TempDir::new().unwrap();
        let store = LogStore::new(temp.path());
        for record in create_sample_records(size) {
            store.append("bench", &record).unwrap();
        }
        let extra = create_sample_records(1).remove(0);

        group.bench_with_input(BenchmarkId::new("read_all", size), &store, |b, store| {
            b.iter(|| store.read_all(black_box("bench")))
        });
        group.bench_with_input(BenchmarkId::new("append", size), &store, |b, store| {
            b.iter(|| store.append(black_box("bench"), black_box(&extra)))
        });
    }

    group.finish();
}

fn bench_dashboard(c: &mut Criterion) {
    let records = create_sample_records(1_000);
    let formatter = PlainFormatter::new(Default::default());

    c.bench_function("history_summary", |b| {
        b.iter(|| HistorySummary::from_records(black_box(&records)))
    });
    c.bench_function("chart_render", |b| {
        b.iter(|| {
            let chart = ChartSeries::from_records(black_box(&records));
            formatter.format_chart(&chart)
        })
    });
}

criterion_group!(benches, bench_table_codec, bench_log_store, bench_dashboard);
criterion_main!(benches);
