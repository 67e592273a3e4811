//! Benchmarks for the heavier dataset operations on a synthetic table.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use dataprep_engine::processing::{
    correlate, impute, remove_outliers, ImputeStrategy, NoProgress, OutlierMethod, ProcessingOptions,
};
use dataprep_engine::types::{Column, Table};

/// `rows` x `cols` numeric table, ~10% missing, with a few extreme values per column.
fn synthetic_table(rows: usize, cols: usize) -> Table {
    let mut rng = Pcg64::seed_from_u64(7);
    let columns = (0..cols)
        .map(|c| {
            let values = (0..rows)
                .map(|_| {
                    if rng.random_bool(0.1) {
                        None
                    } else if rng.random_bool(0.01) {
                        Some(rng.random_range(1_000.0..5_000.0))
                    } else {
                        Some(rng.random_range(0.0..100.0))
                    }
                })
                .collect();
            Column::numeric(format!("c{c}"), values)
        })
        .collect();
    Table::new(columns).unwrap()
}

fn benchmark_impute(c: &mut Criterion) {
    let mut group = c.benchmark_group("impute");
    let opts = ProcessingOptions::default();

    for strategy in [ImputeStrategy::Mean, ImputeStrategy::Median, ImputeStrategy::Knn] {
        let rows = if strategy == ImputeStrategy::Knn { 1_000 } else { 50_000 };
        let table = synthetic_table(rows, 8);
        let targets = table.column_names();
        group.bench_with_input(BenchmarkId::new(strategy.as_str(), rows), &table, |b, table| {
            b.iter_batched(
                || table.clone(),
                |mut t| impute(&mut t, black_box(&targets), strategy, &opts, &NoProgress),
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn benchmark_outliers(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove_outliers");
    let table = synthetic_table(50_000, 8);
    let targets = table.column_names();

    for method in [OutlierMethod::Iqr, OutlierMethod::Zscore] {
        group.bench_function(method.as_str(), |b| {
            b.iter_batched(
                || table.clone(),
                |mut t| remove_outliers(&mut t, black_box(&targets), method, 3.0, &NoProgress),
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn benchmark_correlate(c: &mut Criterion) {
    let mut group = c.benchmark_group("correlate");

    for cols in [4, 16, 32] {
        let table = synthetic_table(20_000, cols);
        group.bench_with_input(BenchmarkId::from_parameter(cols), &table, |b, table| {
            b.iter(|| correlate(black_box(table)));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_impute, benchmark_outliers, benchmark_correlate);
criterion_main!(benches);
