//! Benchmarks for meridian-model regression and aggregation.
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use meridian_model::{PureReturnsEstimator, RegressorConfig, StabilityAggregator, analyze_stability};
use meridian_primitives::{CoefficientSeries, MetricCatalog};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use rand::Rng;

fn names(n: usize) -> Vec<String> {
    (0..n).map(|j| format!("C{j}")).collect()
}

fn random_characteristics(n_assets: usize, n_chars: usize) -> Array2<f64> {
    let mut rng = rand::thread_rng();
    Array2::from_shape_fn((n_assets, n_chars), |_| rng.r#gen::<f64>() * 2.0 - 1.0)
}

fn random_target(x: &Array2<f64>) -> Array1<f64> {
    let mut rng = rand::thread_rng();
    x.rows().into_iter().map(|row| row.sum() * 0.1 + rng.r#gen::<f64>() * 0.05).collect()
}

fn asset_table(n_assets: usize, n_chars: usize) -> DataFrame {
    let x = random_characteristics(n_assets, n_chars);
    let y = random_target(&x);
    let mut columns: Vec<Column> =
        names(n_chars).iter().enumerate().map(|(j, n)| Column::new(n.as_str().into(), x.column(j).to_vec())).collect();
    for horizon in ["Return_21d", "Return_63d", "Return_126d", "Return_252d"] {
        columns.push(Column::new(horizon.into(), y.to_vec()));
    }
    DataFrame::new(columns).unwrap()
}

fn bench_pure_returns(c: &mut Criterion) {
    let mut group = c.benchmark_group("pure_returns_fit");
    group.sample_size(30);

    for (n_assets, n_chars) in [(100, 10), (500, 30), (2000, 60)] {
        group.throughput(Throughput::Elements(n_assets as u64));
        group.bench_with_input(
            BenchmarkId::new("assets_chars", format!("{n_assets}x{n_chars}")),
            &(n_assets, n_chars),
            |b, &(n_assets, n_chars)| {
                let estimator = PureReturnsEstimator::with_config(RegressorConfig {
                    seed: Some(7),
                    ..RegressorConfig::default()
                });
                let x = random_characteristics(n_assets, n_chars);
                let y = random_target(&x);
                let names = names(n_chars);
                b.iter(|| estimator.fit(black_box(&x), black_box(&y), black_box(&names)).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_stability(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze_stability");

    for n_chars in [10, 50, 200] {
        group.bench_with_input(BenchmarkId::from_parameter(n_chars), &n_chars, |b, &n_chars| {
            let mut rng = rand::thread_rng();
            let snapshots: Vec<CoefficientSeries> = (0..13)
                .map(|_| names(n_chars).into_iter().map(|n| (n, rng.r#gen::<f64>() - 0.5)).collect())
                .collect();
            b.iter(|| analyze_stability(black_box(&snapshots)));
        });
    }

    group.finish();
}

fn bench_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("stability_aggregation");
    group.sample_size(10);

    for (n_assets, n_chars) in [(200, 10), (1000, 40)] {
        group.bench_with_input(
            BenchmarkId::new("assets_chars", format!("{n_assets}x{n_chars}")),
            &(n_assets, n_chars),
            |b, &(n_assets, n_chars)| {
                let table = asset_table(n_assets, n_chars);
                let characteristics = names(n_chars);
                let catalog = MetricCatalog::standard();
                let aggregator = StabilityAggregator::new();
                b.iter(|| aggregator.run(black_box(&table), black_box(&characteristics), &catalog));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_pure_returns, bench_stability, bench_aggregation);
criterion_main!(benches);
