//! Criterion benchmarks for Monte Carlo propagation.
//! Focus: vertex counts {4, 16, 64} for area, sample counts {1k, 10k} for both.
//! Results land under target/criterion.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use boundary::caps::Capabilities;
use boundary::measure::MeasurementRange;
use boundary::montecarlo::{
    area_with_uncertainty, perimeter_with_uncertainty, Coordinate, McCfg, UncertainVertex,
};

/// Regular polygon of radius 10 with every coordinate widened to ±0.25.
fn ranged_polygon(n: usize) -> Vec<UncertainVertex> {
    (0..n)
        .map(|i| {
            let t = std::f64::consts::TAU * i as f64 / n as f64;
            let (x, y) = (10.0 * t.cos(), 10.0 * t.sin());
            UncertainVertex::new(
                Coordinate::Pair([x - 0.25, x + 0.25]),
                Coordinate::Pair([y - 0.25, y + 0.25]),
            )
        })
        .collect()
}

fn ranged_edges(n: usize, seed: u64) -> Vec<MeasurementRange> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let lo: f64 = rng.gen_range(1.0..30.0);
            MeasurementRange::between(lo, lo + rng.gen_range(0.0..3.0)).unwrap()
        })
        .collect()
}

fn bench_area(c: &mut Criterion) {
    let mut group = c.benchmark_group("area_with_uncertainty");
    group.sample_size(20);
    for &samples in &[1_000usize, 10_000] {
        for &v in &[4usize, 16, 64] {
            let verts = ranged_polygon(v);
            let cfg = McCfg::with_samples(samples);
            group.bench_with_input(
                BenchmarkId::new(format!("n{samples}"), v),
                &verts,
                |b, verts| {
                    let mut caps = Capabilities::none().with_rng(StdRng::seed_from_u64(7));
                    b.iter(|| area_with_uncertainty(verts, &cfg, &mut caps, "FT").unwrap())
                },
            );
        }
    }
    group.finish();
}

fn bench_area_checked(c: &mut Criterion) {
    let mut group = c.benchmark_group("area_with_geometry_check");
    group.sample_size(10);
    let verts = ranged_polygon(16);
    let cfg = McCfg::with_samples(10_000);
    group.bench_function("v16_n10000", |b| {
        let mut caps = Capabilities::seeded(7);
        b.iter(|| area_with_uncertainty(&verts, &cfg, &mut caps, "FT").unwrap())
    });
    group.finish();
}

fn bench_perimeter(c: &mut Criterion) {
    let mut group = c.benchmark_group("perimeter_with_uncertainty");
    for &samples in &[1_000usize, 10_000] {
        let edges = ranged_edges(12, 11);
        let cfg = McCfg::with_samples(samples);
        group.bench_with_input(BenchmarkId::from_parameter(samples), &edges, |b, edges| {
            let mut caps = Capabilities::seeded(3);
            b.iter(|| perimeter_with_uncertainty(edges, &cfg, &mut caps, "FT").unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_area, bench_area_checked, bench_perimeter);
criterion_main!(benches);
