//! Criterion benchmarks for AssetLab transform hot paths.
//!
//! Benchmarks:
//! 1. Market-cap parsing over a listing-sized batch of raw strings
//! 2. Market-cap column normalization on a DataFrame
//! 3. Series merge + business-day resampling

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use polars::prelude::*;

use assetlab_core::source::fred::FredSeries;
use assetlab_core::transform::market_cap::normalize_column;
use assetlab_core::transform::{normalize_market_caps, SeriesTable};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_listing(n: usize) -> (Vec<String>, Vec<String>) {
    let tickers = (0..n).map(|i| format!("T{i:05}")).collect();
    let caps = (0..n)
        .map(|i| match i % 4 {
            0 => format!("${}.{}B", i % 900, i % 10),
            1 => format!("${}.{}M", i % 900, i % 10),
            2 => format!("${}K", i % 900),
            _ => "n/a".to_string(),
        })
        .collect();
    (tickers, caps)
}

fn make_series(count: usize, days: usize) -> Vec<FredSeries> {
    let start = chrono::NaiveDate::from_ymd_opt(2000, 1, 3).unwrap();
    (0..count)
        .map(|s| FredSeries {
            id: format!("S{s}"),
            observations: (0..days)
                // Offset each series so the date union is ragged.
                .filter(|d| (d + s) % 7 != 0)
                .map(|d| {
                    let value = (d % 11 != 0).then(|| 100.0 + (d as f64 * 0.05).sin() * 10.0);
                    (start + chrono::Duration::days(d as i64), value)
                })
                .collect(),
        })
        .collect()
}

// ── 1. Market-cap parsing ────────────────────────────────────────────

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("market_cap_parse");
    for n in [1_000, 10_000] {
        let (tickers, caps) = make_listing(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let pairs = tickers.iter().map(String::as_str).zip(caps.iter().map(String::as_str));
                black_box(normalize_market_caps(pairs))
            })
        });
    }
    group.finish();
}

// ── 2. Column normalization ──────────────────────────────────────────

fn bench_normalize_column(c: &mut Criterion) {
    let (tickers, caps) = make_listing(10_000);
    let df = DataFrame::new(vec![
        Column::new("ticker".into(), tickers),
        Column::new("marketcap".into(), caps),
    ])
    .unwrap();

    c.bench_function("market_cap_normalize_column_10k", |b| {
        b.iter(|| black_box(normalize_column(&df, "ticker", "marketcap").unwrap()))
    });
}

// ── 3. Series resampling ─────────────────────────────────────────────

fn bench_resample(c: &mut Criterion) {
    let series = make_series(5, 6_000);
    c.bench_function("fred_assets_merge_resample", |b| {
        b.iter(|| {
            let table = SeriesTable::merge(black_box(&series)).drop_all_missing();
            black_box(table.resample_business_days())
        })
    });
}

criterion_group!(benches, bench_parse, bench_normalize_column, bench_resample);
criterion_main!(benches);
