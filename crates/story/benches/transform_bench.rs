//! Criterion benchmarks for dataset transforms and chart geometry.
//!
//! Benchmarks:
//!   - trailing moving average over a century of annual flows
//!   - natural-flow transform from raw rows
//!   - monotone curve sampling for a 30-point series
//!   - Sankey layout of the water-sources graph
//!
//! Run with: cargo bench -p story --bench transform_bench

use bevy::math::Vec2;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use story::charts::{NaturalFlow, SankeyGraph};
use story::curve::monotone_x;
use story::transform::{trailing_moving_average, trailing_moving_average_sparse};

fn annual_flows(years: usize) -> Vec<f64> {
    (0..years)
        .map(|i| 15.0 + 4.0 * ((i as f64) * 0.7).sin())
        .collect()
}

fn river_rows(years: usize) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = (0..6).map(|i| vec![format!("preamble {i}")]).collect();
    for (i, flow) in annual_flows(years).into_iter().enumerate() {
        let mut row = vec![String::new(); 23];
        row[2] = (1906 + i).to_string();
        row[22] = format!("{:.0}", flow * 1_000_000.0);
        rows.push(row);
    }
    rows
}

// ---------------------------------------------------------------------------
// Benchmark: moving averages
// ---------------------------------------------------------------------------

fn bench_moving_average(c: &mut Criterion) {
    let mut group = c.benchmark_group("moving_average");

    let flows = annual_flows(120);
    group.bench_function("dense_120", |b| {
        b.iter(|| black_box(trailing_moving_average(black_box(&flows), 10)));
    });

    let sparse: Vec<Option<f64>> = flows
        .iter()
        .enumerate()
        .map(|(i, f)| (i % 17 != 0).then_some(*f))
        .collect();
    group.bench_function("sparse_120", |b| {
        b.iter(|| black_box(trailing_moving_average_sparse(black_box(&sparse), 10)));
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: natural-flow transform
// ---------------------------------------------------------------------------

fn bench_natural_flow(c: &mut Criterion) {
    let rows = river_rows(120);
    c.bench_function("natural_flow_from_rows", |b| {
        b.iter(|| black_box(NaturalFlow::from_rows(black_box(&rows))));
    });
}

// ---------------------------------------------------------------------------
// Benchmark: curve sampling and Sankey layout
// ---------------------------------------------------------------------------

fn bench_geometry(c: &mut Criterion) {
    let mut group = c.benchmark_group("chart_geometry");

    let points: Vec<Vec2> = annual_flows(30)
        .into_iter()
        .enumerate()
        .map(|(i, f)| Vec2::new(i as f32 * 20.0, f as f32 * 10.0))
        .collect();
    group.bench_function("monotone_x_30", |b| {
        b.iter(|| black_box(monotone_x(black_box(&points))));
    });

    let graph = SankeyGraph::phoenix_portfolio();
    group.bench_function("sankey_layout", |b| {
        b.iter(|| black_box(graph.layout(Vec2::new(600.0, 260.0), 14.0, 18.0)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_moving_average,
    bench_natural_flow,
    bench_geometry
);
criterion_main!(benches);
