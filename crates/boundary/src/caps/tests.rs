use super::*;
use crate::geom::Point;

fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
    coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

#[test]
fn default_has_no_capabilities() {
    let mut caps = Capabilities::default();
    assert!(caps.rng_mut().is_none());
    assert!(caps.geometry().is_none());
    assert!(caps.minimizer().is_none());
    assert_eq!(
        caps.report(),
        CapabilityReport {
            stats: false,
            geometry: None,
            minimizer: None
        }
    );
}

#[test]
fn seeded_has_everything_and_is_reproducible() {
    let mut a = Capabilities::seeded(42);
    let mut b = Capabilities::seeded(42);
    let report = a.report();
    assert!(report.stats);
    assert_eq!(report.geometry, Some("geo_validity"));
    assert_eq!(report.minimizer, Some("brent_bounded"));
    let xa = a.rng_mut().map(|r| r.next_u64());
    let xb = b.rng_mut().map(|r| r.next_u64());
    assert!(xa.is_some());
    assert_eq!(xa, xb);
    assert!(a.without_rng().rng_mut().is_none());
    let b = b.without_geometry();
    assert!(b.geometry().is_none());
    assert!(b.minimizer().is_some());
}

#[test]
fn square_is_valid_and_simple() {
    let sq = pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
    let r = GeoValidity.check(&sq);
    assert!(r.is_valid && r.is_simple);

    let mut closed = sq.clone();
    closed.push(sq[0]);
    assert!(GeoValidity.check(&closed).is_simple);
}

#[test]
fn bowtie_is_not_simple() {
    let bowtie = pts(&[(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)]);
    let r = GeoValidity.check(&bowtie);
    assert!(!r.is_simple);
    assert!(!r.is_valid);
}

#[test]
fn spike_and_collinear_rings_are_rejected() {
    let spike = pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (10.0, 5.0), (0.0, 10.0)]);
    assert!(!GeoValidity.check(&spike).is_simple);

    let flat = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
    assert!(!GeoValidity.check(&flat).is_valid);

    assert!(!GeoValidity.check(&pts(&[(0.0, 0.0), (1.0, 0.0)])).is_valid);
}

#[test]
fn repeated_vertex_is_tolerated() {
    let ring = pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
    let r = GeoValidity.check(&ring);
    assert!(r.is_valid && r.is_simple);
}

#[test]
fn brent_finds_interior_minimum() {
    let brent = BrentBounded::default();
    let mut f = |x: f64| (x - 7.9).powi(2);
    let m = brent.minimize(&mut f, 7.0, 10.0);
    assert!(m.converged);
    assert!((m.x - 7.9).abs() < 1e-4, "x = {}", m.x);
    assert!(m.fx < 1e-8);
    assert!(m.evaluations < brent.max_evals);
}

#[test]
fn brent_pins_to_boundary_when_minimum_is_outside() {
    let brent = BrentBounded::default();
    let mut f = |x: f64| (x - 3.0).powi(2);
    let m = brent.minimize(&mut f, 7.0, 10.0);
    assert!(m.converged);
    assert!((m.x - 7.0).abs() < 1e-4);
}

#[test]
fn brent_handles_reversed_and_degenerate_brackets() {
    let brent = BrentBounded::default();
    let mut f = |x: f64| (x - 1.5).abs();
    let m = brent.minimize(&mut f, 4.0, -2.0);
    assert!(m.converged);
    assert!((m.x - 1.5).abs() < 1e-4);

    let mut calls = 0;
    let mut g = |x: f64| {
        calls += 1;
        x * x
    };
    let m = brent.minimize(&mut g, 2.0, 2.0);
    assert_eq!(m.x, 2.0);
    assert_eq!(m.evaluations, 1);
    assert!(m.converged);
    assert_eq!(calls, 1);
}

#[test]
fn brent_reports_budget_exhaustion_and_nan() {
    let tight = BrentBounded {
        xatol: 1e-5,
        max_evals: 3,
    };
    let mut f = |x: f64| (x - 0.123).powi(2);
    let m = tight.minimize(&mut f, 0.0, 100.0);
    assert!(!m.converged);
    assert_eq!(m.evaluations, 3);

    let mut nan = |_x: f64| f64::NAN;
    assert!(!BrentBounded::default().minimize(&mut nan, 0.0, 1.0).converged);

    let mut id = |x: f64| x;
    assert!(!BrentBounded::default()
        .minimize(&mut id, 0.0, f64::INFINITY)
        .converged);
}
